use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartDataError {
    #[error("no data rows found")]
    NoDataRows,

    #[error("missing required columns: no metric column or product columns could be inferred")]
    InsufficientSchema,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChartDataError>;
