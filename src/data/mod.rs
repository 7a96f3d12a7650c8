/// Data layer: parsing, validation and analysis of measurement files.
///
/// Architecture:
/// ```text
///  <timestamp>-F<fiber>-i<µs>.txt
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  list folder, parse files in parallel
///   └──────────┘
///        │  parser: filename tags + content header/samples
///        ▼
///   ┌────────────────┐
///   │ MeasurementSet │  Vec<MeasurementRecord>, distinct fibers / µs
///   └────────────────┘
///        │
///        ├──► validate  sample count vs. nr_pixels
///        ├──► analysis  success of integration-time changes
///        ├──► filter    viewer selection → visible indices
///        └──► export    CSV rows
/// ```

pub mod analysis;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod parser;
pub mod validate;
