use thiserror::Error;

pub type Result<T> = std::result::Result<T, KaggleError>;

#[derive(Debug, Error)]
pub enum KaggleError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for KaggleError {
    fn from(err: reqwest::Error) -> Self {
        KaggleError::Network(err.to_string())
    }
}
