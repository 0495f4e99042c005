use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    /// The predicted crop has no row in the reference dataset.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Weather error: {0}")]
    Weather(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
