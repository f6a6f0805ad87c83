/// Data layer: core types, loading, normalization, evaluation and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (headers + raw string cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ columns   │  variant headers → canonical fields
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  numbers, dates, categories → NormalizedRecord
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ evaluate  │  value vs threshold → Pass / Fail / Unknown
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  subject / category / date selections → visible indices
///   └──────────┘
/// ```

pub mod columns;
pub mod evaluate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
