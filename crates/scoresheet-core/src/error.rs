use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoresheetError {
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
