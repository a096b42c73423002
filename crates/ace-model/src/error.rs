use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to render object as json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
