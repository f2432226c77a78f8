#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read session file: {0}")]
    SessionRead(std::io::Error),
    #[error("failed to write session file: {0}")]
    SessionWrite(std::io::Error),
    #[error("session file is not valid: {0}")]
    SessionFormat(String),
    #[error("failed to read draft: {0}")]
    DraftRead(std::io::Error),
    #[error("draft schema mismatch at {path}: {message}")]
    DraftFormat { path: String, message: String },
    #[error("invalid patch: {0}")]
    InvalidPatch(String),
    #[error("code table error: {0}")]
    Codes(#[from] inder_codes::CodesError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
