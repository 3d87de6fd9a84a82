/// Centralized error types for the odds tracker
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OddsError {
    // Network Errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Odds source returned status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("No race meeting found: {0}")]
    MeetingNotFound(String),

    // Data Errors
    #[error("Deserialization failed: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("CSV parse error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid odds payload: {0}")]
    InvalidOddsPayload(String),

    // Storage Errors
    #[error("Storage operation failed: {0}")]
    StorageError(String),

    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // Prediction Errors
    #[error("Model error: {0}")]
    ModelError(String),

    // Generic Errors
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, OddsError>;

impl OddsError {
    /// Check if error is recoverable (worth retrying on the next refresh cycle)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OddsError::HttpError(_)
                | OddsError::ApiError { .. }
                | OddsError::StorageError(_)
        )
    }

    /// Get error code for logging/monitoring
    pub fn error_code(&self) -> &str {
        match self {
            OddsError::HttpError(_) => "NET_001",
            OddsError::ApiError { .. } => "NET_002",
            OddsError::MeetingNotFound(_) => "NET_003",
            OddsError::DeserializationError(_) => "DATA_001",
            OddsError::CsvError(_) => "DATA_002",
            OddsError::InvalidOddsPayload(_) => "DATA_003",
            OddsError::StorageError(_) => "STORE_001",
            OddsError::FileError(_) => "FILE_001",
            OddsError::ConfigError(_) => "CFG_001",
            OddsError::InvalidParameter(_) => "CFG_002",
            OddsError::ModelError(_) => "MODEL_001",
            OddsError::Other(_) => "GEN_001",
        }
    }
}
