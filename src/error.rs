use thiserror::Error;

#[derive(Debug, Error)]
pub enum FraudLensError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Service error: {0}")]
    Service(String),
}

impl From<FraudLensError> for String {
    fn from(err: FraudLensError) -> Self {
        err.to_string()
    }
}
