/// Data layer: core types, loading, filtering and derived series.
///
/// Architecture:
/// ```text
///        .csv
///         │
///         ▼
///   ┌──────────┐      ┌─────────┐
///   │  loader   │ ◄─── │  cache  │  memoized Arc<Dataset>
///   └──────────┘      └─────────┘
///         │
///         ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record> sorted by date, company index
///   └──────────┘
///         │
///         ▼
///   ┌──────────┐
///   │  filter   │  companies + inclusive date range → FilteredView
///   └──────────┘
///         │
///    ┌────┴──────┐
///    ▼           ▼
/// aggregate    smooth
/// (monthly)   (rolling mean)
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod smooth;
