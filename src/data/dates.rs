use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use super::model::{CellValue, Month};

/// Full dates. Month-first numeric forms are tried before day-first ones,
/// so `03/04/2024` is March while `13/04/2024` still parses as April.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%B-%Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Month-only forms; parsed by pinning the day to the 1st.
const MONTH_FORMATS: &[&str] = &[
    "%b-%Y", "%B-%Y", "%b %Y", "%B %Y", "%b/%Y", "%Y-%m", "%Y/%m", "%m/%Y", "%m-%Y",
];

/// A format space also matches nothing, so `%b %d %Y` reads "Jan 2024" as
/// day 20 of year 24. Full-date matches outside four-digit years are dropped.
fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (1000..=9999).contains(&date.year()).then_some(date)
}

/// Parse free-form date text. Returns `None` instead of failing.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok().and_then(plausible))
    {
        return Some(d);
    }
    if let Some(d) = DATETIME_FORMATS.iter().find_map(|f| {
        NaiveDateTime::parse_from_str(s, f)
            .ok()
            .and_then(|dt| plausible(dt.date()))
    }) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    let pinned = format!("01 {s}");
    MONTH_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(&pinned, &format!("%d {f}")).ok())
}

/// Coerce a MONTH cell. Plain numbers are not treated as dates.
pub fn month_of(cell: &CellValue) -> Option<Month> {
    match cell {
        CellValue::Date(d) => Some(Month::of(*d)),
        CellValue::Text(s) => parse_date(s).map(Month::of),
        CellValue::Number(_) | CellValue::Empty => None,
    }
}
