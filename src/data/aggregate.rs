use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::binning::Bucket;
use super::model::{Month, Record};

// ---------------------------------------------------------------------------
// View A – mean variance per revenue cohort
// ---------------------------------------------------------------------------

/// One bar of the cohort chart.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortVariance {
    pub cohort: String,
    /// Mean of the non-missing VARIANCE values; NaN when there are none.
    pub mean_variance: f64,
    /// Rows in the cohort, including those with no VARIANCE.
    pub rows: usize,
}

/// Group by REVENUE_COHORT and average VARIANCE. Rows without a cohort are
/// skipped; cohorts come back sorted by label.
pub fn cohort_variance(records: &[Record]) -> Vec<CohortVariance> {
    // cohort -> (sum, values, rows)
    let mut groups: BTreeMap<&str, (f64, usize, usize)> = BTreeMap::new();
    for r in records {
        let Some(cohort) = r.revenue_cohort.as_deref() else {
            continue;
        };
        let entry = groups.entry(cohort).or_default();
        entry.2 += 1;
        if let Some(v) = r.variance.filter(|v| !v.is_nan()) {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(cohort, (sum, n, rows))| CohortVariance {
            cohort: cohort.to_string(),
            mean_variance: if n == 0 { f64::NAN } else { sum / n as f64 },
            rows,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// View B – distinct store counts, month × revenue range
// ---------------------------------------------------------------------------

/// Distinct non-missing VARIANCE_BUCKET values in first-appearance order.
pub fn variance_buckets(records: &[Record]) -> Vec<Bucket> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|r| r.variance_bucket)
        .filter(|b| seen.insert(*b))
        .collect()
}

/// Month × revenue-range matrix of distinct store counts.
///
/// `counts[i][j]` is the count for `months[i]` and `ranges[j]`. Months are
/// chronological and ranges are in bin order; only values that occur in the
/// input appear on either axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorePivot {
    pub months: Vec<Month>,
    pub ranges: Vec<Bucket>,
    pub counts: Vec<Vec<u32>>,
}

impl StorePivot {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Sum of each month's row.
    pub fn row_totals(&self) -> Vec<u32> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }
}

/// Restrict to `bucket`, count distinct STORE per (MONTH, REVENUE_RANGE), and
/// pivot. Rows missing a month or a revenue range are left out.
pub fn store_pivot(records: &[Record], bucket: Bucket) -> StorePivot {
    let mut groups: BTreeMap<(Month, Bucket), BTreeSet<&str>> = BTreeMap::new();
    for r in records.iter().filter(|r| r.variance_bucket == Some(bucket)) {
        let (Some(month), Some(range)) = (r.month, r.revenue_range) else {
            continue;
        };
        let stores = groups.entry((month, range)).or_default();
        if let Some(store) = r.store.as_deref() {
            stores.insert(store);
        }
    }

    let months: Vec<Month> = groups
        .keys()
        .map(|(m, _)| *m)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let ranges: Vec<Bucket> = groups
        .keys()
        .map(|(_, r)| *r)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let counts = months
        .iter()
        .map(|m| {
            ranges
                .iter()
                .map(|r| groups.get(&(*m, *r)).map_or(0, |s| s.len() as u32))
                .collect()
        })
        .collect();

    StorePivot {
        months,
        ranges,
        counts,
    }
}
