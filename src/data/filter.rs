use super::model::Record;

// ---------------------------------------------------------------------------
// Closed numeric interval
// ---------------------------------------------------------------------------

/// A closed interval `[min, max]`, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedRange {
    pub min: f64,
    pub max: f64,
}

impl ClosedRange {
    /// Build an interval; endpoints given in reverse order are swapped.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            ClosedRange { min: a, max: b }
        } else {
            ClosedRange { min: b, max: a }
        }
    }

    /// Smallest interval covering every finite value, or `[0, 0]` when there
    /// are none.
    pub fn observed(values: impl IntoIterator<Item = f64>) -> Self {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<ClosedRange>, v| {
                Some(match acc {
                    Some(r) => ClosedRange {
                        min: r.min.min(v),
                        max: r.max.max(v),
                    },
                    None => ClosedRange { min: v, max: v },
                })
            })
            .unwrap_or(ClosedRange { min: 0.0, max: 0.0 })
    }

    /// A missing value is never inside the interval.
    pub fn contains(&self, value: Option<f64>) -> bool {
        value.is_some_and(|v| self.min <= v && v <= self.max)
    }
}

// ---------------------------------------------------------------------------
// Range filter over KITCHEN_EBITDA and NET_REVENUE
// ---------------------------------------------------------------------------

/// The two user-controlled intervals. Both must hold for a row to pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub kitchen_ebitda: ClosedRange,
    pub net_revenue: ClosedRange,
}

impl RangeFilter {
    pub fn new(kitchen_ebitda: ClosedRange, net_revenue: ClosedRange) -> Self {
        RangeFilter {
            kitchen_ebitda,
            net_revenue,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.kitchen_ebitda.contains(record.kitchen_ebitda)
            && self.net_revenue.contains(record.net_revenue)
    }
}

/// Return a new table holding the rows that pass `filter`.
pub fn apply(records: &[Record], filter: &RangeFilter) -> Vec<Record> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn row(ebitda: Option<f64>, revenue: Option<f64>) -> Record {
        Record::new(Some("S1".into()), None, revenue, ebitda, Some(1_000.0), None)
    }

    #[test]
    fn bounds_are_inclusive() {
        let f = RangeFilter::new(ClosedRange::new(-10.0, 10.0), ClosedRange::new(100.0, 200.0));
        assert!(f.matches(&row(Some(-10.0), Some(100.0))));
        assert!(f.matches(&row(Some(10.0), Some(200.0))));
        assert!(!f.matches(&row(Some(10.1), Some(150.0))));
        assert!(!f.matches(&row(Some(0.0), Some(99.9))));
    }

    #[test]
    fn missing_values_never_pass() {
        let f = RangeFilter::new(ClosedRange::new(f64::MIN, f64::MAX), ClosedRange::new(f64::MIN, f64::MAX));
        assert!(!f.matches(&row(None, Some(1.0))));
        assert!(!f.matches(&row(Some(1.0), None)));
    }

    #[test]
    fn reversed_endpoints_are_swapped() {
        assert_eq!(ClosedRange::new(5.0, -5.0), ClosedRange { min: -5.0, max: 5.0 });
    }

    #[test]
    fn observed_range_of_nothing_is_zero() {
        assert_eq!(ClosedRange::observed(std::iter::empty::<f64>()), ClosedRange::new(0.0, 0.0));
        assert_eq!(ClosedRange::observed([f64::NAN]), ClosedRange::new(0.0, 0.0));
        assert_eq!(ClosedRange::observed([3.0, -1.0, f64::NAN, 2.0]), ClosedRange::new(-1.0, 3.0));
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let rows = vec![row(Some(1.0), Some(1.0))];
        let f = RangeFilter::new(ClosedRange::new(5.0, 6.0), ClosedRange::new(5.0, 6.0));
        assert!(apply(&rows, &f).is_empty());
    }

    #[test]
    fn observed_bounds_keep_every_complete_row() {
        let rows = vec![
            row(Some(-300.0), Some(1_000.0)),
            row(Some(50.0), Some(9_000.0)),
            row(Some(0.0), Some(4_000.0)),
        ];
        let f = RangeFilter::new(
            ClosedRange::observed(rows.iter().filter_map(|r| r.kitchen_ebitda)),
            ClosedRange::observed(rows.iter().filter_map(|r| r.net_revenue)),
        );
        assert_eq!(apply(&rows, &f), rows);
    }

    fn arb_rows() -> impl Strategy<Value = Vec<Record>> {
        proptest::collection::vec(
            (
                proptest::option::of(-1e6f64..1e6),
                proptest::option::of(0f64..1e7),
            ),
            0..40,
        )
        .prop_map(|pairs| pairs.into_iter().map(|(e, r)| row(e, r)).collect())
    }

    proptest! {
        #[test]
        fn result_rows_satisfy_both_intervals(
            rows in arb_rows(),
            a in -1e6f64..1e6, b in -1e6f64..1e6,
            c in 0f64..1e7, d in 0f64..1e7,
        ) {
            let f = RangeFilter::new(ClosedRange::new(a, b), ClosedRange::new(c, d));
            let kept = apply(&rows, &f);
            for r in &kept {
                prop_assert!(f.kitchen_ebitda.contains(r.kitchen_ebitda));
                prop_assert!(f.net_revenue.contains(r.net_revenue));
            }
            let expected = rows.iter().filter(|r| f.matches(r)).count();
            prop_assert_eq!(kept.len(), expected);
        }

        #[test]
        fn filtering_is_idempotent(
            rows in arb_rows(),
            a in -1e6f64..1e6, b in -1e6f64..1e6,
            c in 0f64..1e7, d in 0f64..1e7,
        ) {
            let f = RangeFilter::new(ClosedRange::new(a, b), ClosedRange::new(c, d));
            let once = apply(&rows, &f);
            let twice = apply(&once, &f);
            prop_assert_eq!(once, twice);
        }
    }
}
