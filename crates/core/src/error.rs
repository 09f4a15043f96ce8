use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown position: {0}")]
    UnknownPosition(String),

    #[error("invalid field key: {0}")]
    InvalidKey(String),
}
