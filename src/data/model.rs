use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};

use super::binning::{Bucket, REVENUE_RANGES, VARIANCE_BUCKETS};
use super::filter::ClosedRange;

// ---------------------------------------------------------------------------
// CellValue – a single raw cell as read from the source file
// ---------------------------------------------------------------------------

/// A loosely typed cell, before column-specific coercion.
///
/// Every source format (spreadsheet, CSV, JSON, Parquet) is first read into
/// rows of `CellValue`; typing into [`Record`] happens once, in the loader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// A native date cell (spreadsheet date, Parquet Date32/Timestamp).
    Date(NaiveDate),
    Empty,
}

impl CellValue {
    /// Numeric coercion. Text is trimmed and parsed; anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Date(_) | CellValue::Empty => None,
        }
    }

    /// Label coercion: trimmed text, whole numbers without a fraction.
    /// Blank cells are `None`.
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            CellValue::Number(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                Some(format!("{}", *v as i64))
            }
            CellValue::Number(v) if v.is_nan() => None,
            CellValue::Number(v) => Some(v.to_string()),
            CellValue::Date(d) => Some(d.to_string()),
            CellValue::Empty => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Month – calendar month with a chronological sort key
// ---------------------------------------------------------------------------

/// A calendar month. Ordering is chronological; `Display` gives `Mon-YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Month(date.with_day(1).unwrap_or(date))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%b-%Y"))
    }
}

// ---------------------------------------------------------------------------
// Record – one store-month row
// ---------------------------------------------------------------------------

/// One row of the P&L extract, typed and with both derived buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub store: Option<String>,
    pub month: Option<Month>,
    pub net_revenue: Option<f64>,
    pub kitchen_ebitda: Option<f64>,
    pub variance: Option<f64>,
    pub revenue_cohort: Option<String>,
    /// Derived from `variance`.
    pub variance_bucket: Option<Bucket>,
    /// Derived from `net_revenue`.
    pub revenue_range: Option<Bucket>,
}

impl Record {
    /// Build a record; the two bucket columns are always derived here so
    /// they can never disagree with the numbers they come from.
    pub fn new(
        store: Option<String>,
        month: Option<Month>,
        net_revenue: Option<f64>,
        kitchen_ebitda: Option<f64>,
        variance: Option<f64>,
        revenue_cohort: Option<String>,
    ) -> Self {
        Record {
            variance_bucket: variance.and_then(|v| VARIANCE_BUCKETS.bucket(v)),
            revenue_range: net_revenue.and_then(|v| REVENUE_RANGES.bucket(v)),
            store,
            month,
            net_revenue,
            kitchen_ebitda,
            variance,
            revenue_cohort,
        }
    }
}

// ---------------------------------------------------------------------------
// PnlDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded table plus what the UI needs to know about it up front.
/// Never mutated after construction; shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PnlDataset {
    /// File the dataset was read from.
    pub source: PathBuf,
    pub records: Vec<Record>,
    /// Normalized column names, in source order.
    pub column_names: Vec<String>,
    /// Observed min/max of KITCHEN_EBITDA at load time.
    pub ebitda_bounds: ClosedRange,
    /// Observed min/max of NET_REVENUE at load time.
    pub revenue_bounds: ClosedRange,
}

impl PnlDataset {
    /// Compute load-time bounds from the records.
    pub fn from_records(source: PathBuf, records: Vec<Record>, column_names: Vec<String>) -> Self {
        let ebitda_bounds = ClosedRange::observed(records.iter().filter_map(|r| r.kitchen_ebitda));
        let revenue_bounds = ClosedRange::observed(records.iter().filter_map(|r| r.net_revenue));
        PnlDataset {
            source,
            records,
            column_names,
            ebitda_bounds,
            revenue_bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
