use std::fmt;

// ---------------------------------------------------------------------------
// Fixed-edge binning for the derived categorical columns
// ---------------------------------------------------------------------------

/// A derived categorical value. Ordering follows the position of the bin in
/// its list, so "5M+" sorts after "4–5M" rather than by label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bucket {
    rank: usize,
    label: &'static str,
}

impl Bucket {
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// An ordered list of `(upper_bound, label)` pairs above a lower edge.
///
/// Bins are open on the left and closed on the right: a value `v` falls in
/// the first bin whose upper bound satisfies `v <= upper`, provided
/// `v > lower`. Values at or below `lower`, NaN and infinities get no bin.
#[derive(Debug)]
pub struct Binning {
    pub column: &'static str,
    pub lower: f64,
    pub bins: &'static [(f64, &'static str)],
}

/// VARIANCE → VARIANCE_BUCKET.
pub static VARIANCE_BUCKETS: Binning = Binning {
    column: "VARIANCE_BUCKET",
    lower: 0.0,
    bins: &[
        (10_000.0, "0–10K"),
        (20_000.0, "10–20K"),
        (30_000.0, "20–30K"),
        (40_000.0, "30–40K"),
        (f64::INFINITY, "40K+"),
    ],
};

/// NET_REVENUE → REVENUE_RANGE.
pub static REVENUE_RANGES: Binning = Binning {
    column: "REVENUE_RANGE",
    lower: 0.0,
    bins: &[
        (2_000_000.0, "0–2M"),
        (3_000_000.0, "2–3M"),
        (4_000_000.0, "3–4M"),
        (5_000_000.0, "4–5M"),
        (f64::INFINITY, "5M+"),
    ],
};

impl Binning {
    /// Bin a single value.
    pub fn bucket(&self, value: f64) -> Option<Bucket> {
        if !value.is_finite() || value <= self.lower {
            return None;
        }
        self.bins
            .iter()
            .position(|&(upper, _)| value <= upper)
            .map(|rank| Bucket {
                rank,
                label: self.bins[rank].1,
            })
    }

    /// All buckets in bin order.
    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.bins
            .iter()
            .enumerate()
            .map(|(rank, &(_, label))| Bucket { rank, label })
    }
}
