use std::sync::Arc;

use crate::color::CohortColors;
use crate::data::aggregate::{
    cohort_variance, store_pivot, variance_buckets, CohortVariance, StorePivot,
};
use crate::data::binning::Bucket;
use crate::data::filter::{self, RangeFilter};
use crate::data::model::{PnlDataset, Record};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which report the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    CohortVariance,
    StoreCount,
}

/// The full UI state, independent of rendering.
///
/// Everything below `dataset` is derived and only recomputed when a filter
/// or the bucket selection actually changes.
pub struct AppState {
    /// Loaded once at startup, read-only afterwards.
    pub dataset: Arc<PnlDataset>,

    /// Current EBITDA / revenue intervals.
    pub filter: RangeFilter,

    /// Rows passing `filter`.
    pub filtered: Vec<Record>,

    /// View A: mean variance per cohort over `filtered`.
    pub cohorts: Vec<CohortVariance>,

    /// Variance buckets present in `filtered`, first-appearance order.
    pub buckets: Vec<Bucket>,

    /// Bucket driving view B; `None` only when `buckets` is empty.
    pub selected_bucket: Option<Bucket>,

    /// View B for `selected_bucket`.
    pub pivot: StorePivot,

    /// Bar colours, fixed per cohort for the whole session.
    pub cohort_colors: CohortColors,

    pub tab: Tab,
}

impl AppState {
    /// Build the state for a freshly loaded dataset with filters wide open.
    pub fn new(dataset: Arc<PnlDataset>) -> Self {
        let cohort_colors = CohortColors::new(
            dataset
                .records
                .iter()
                .filter_map(|r| r.revenue_cohort.as_deref()),
        );
        let mut state = Self {
            filter: Self::full_range(&dataset),
            dataset,
            filtered: Vec::new(),
            cohorts: Vec::new(),
            buckets: Vec::new(),
            selected_bucket: None,
            pivot: StorePivot::default(),
            cohort_colors,
            tab: Tab::CohortVariance,
        };
        state.refilter();
        state
    }

    /// Filter spanning the observed min/max of both columns.
    pub fn full_range(dataset: &PnlDataset) -> RangeFilter {
        RangeFilter::new(dataset.ebitda_bounds, dataset.revenue_bounds)
    }

    /// Replace the filter; recomputes only if it changed.
    pub fn set_filter(&mut self, filter: RangeFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.refilter();
        }
    }

    /// Restore the load-time bounds.
    pub fn reset_filter(&mut self) {
        let full = Self::full_range(&self.dataset);
        self.set_filter(full);
    }

    /// Choose the bucket for view B.
    pub fn select_bucket(&mut self, bucket: Bucket) {
        if self.selected_bucket != Some(bucket) {
            self.selected_bucket = Some(bucket);
            self.rebuild_pivot();
        }
    }

    /// Recompute the filtered table and both views.
    fn refilter(&mut self) {
        self.filtered = filter::apply(&self.dataset.records, &self.filter);
        log::debug!(
            "Filter EBITDA [{}, {}], revenue [{}, {}] keeps {} of {} rows",
            self.filter.kitchen_ebitda.min,
            self.filter.kitchen_ebitda.max,
            self.filter.net_revenue.min,
            self.filter.net_revenue.max,
            self.filtered.len(),
            self.dataset.len()
        );

        self.cohorts = cohort_variance(&self.filtered);
        self.buckets = variance_buckets(&self.filtered);

        // A selection that no longer exists falls back to the first bucket.
        if !self
            .selected_bucket
            .is_some_and(|b| self.buckets.contains(&b))
        {
            self.selected_bucket = self.buckets.first().copied();
        }
        self.rebuild_pivot();
    }

    fn rebuild_pivot(&mut self) {
        self.pivot = self
            .selected_bucket
            .map(|b| store_pivot(&self.filtered, b))
            .unwrap_or_default();
    }
}
