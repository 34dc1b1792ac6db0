// Normalization of spreadsheet exports into canonical pool records, and the
// data sources that hand those records to the engine.

pub mod error;
pub mod games;
pub mod picks;
pub mod source;

pub use error::DataError;
pub use source::{CsvPoolSource, PoolSource, StaticPoolSource};
