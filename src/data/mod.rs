/// Data layer: core types, loading, filtering and the two report views.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → normalize columns → PnlDataset
///   └──────────┘   (dates: MONTH coercion, binning: derived buckets)
///        │
///        ▼
///   ┌──────────────┐
///   │  PnlDataset   │  Vec<Record>, load-time bounds (immutable, Arc)
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  EBITDA ∩ revenue intervals → filtered copy
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  cohort means (view A), store pivot (view B)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod binning;
pub mod dates;
pub mod filter;
pub mod loader;
pub mod model;
