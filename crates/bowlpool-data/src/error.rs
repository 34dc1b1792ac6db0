// Data loading error type.

use bowlpool_core::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {origin}: {source}")]
    Csv { origin: String, source: csv::Error },

    #[error("validation error in {origin}: {message}")]
    Validation { origin: String, message: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}
