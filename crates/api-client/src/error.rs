#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not reach the server: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server answered {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("not found: {detail}")]
    NotFound { detail: String },
    #[error("unauthorized: {detail}")]
    Unauthorized { detail: String },
    #[error("unexpected response from {endpoint} at {path}: {message}")]
    Decode {
        endpoint: String,
        path: String,
        message: String,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    /// The server's own message, when there is one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. }
            | ApiError::NotFound { detail }
            | ApiError::Unauthorized { detail } => Some(detail),
            _ => None,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
