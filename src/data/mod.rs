//! Data layer: core types, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  read file → RawPaper rows
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize │  dates, derived columns → PaperTable  (memoized by cache)
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterSpec → FilteredView (indices)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  stats    │  Metrics, year / month / category series, histograms
//!   └──────────┘
//! ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod stats;
