//! INDER attachment handling
//!
//! Files attached to a medical history (complementary test results, vaccination
//! certificates, scanned documents) are stored by the backend. This crate does the local part
//! of the job before anything is sent:
//!
//! - the extension must be on the backend's allow-list
//! - the file must not exceed [`MAX_ATTACHMENT_BYTES`]
//! - the content is hashed (SHA-256) and its media type sniffed
//!
//! The result is an [`InspectedFile`]: the bytes to upload plus the [`AttachmentMetadata`]
//! recorded inside the history itself.
//!
//! ## Example Usage
//!
//! ```no_run
//! use inder_files::inspect;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = inspect(Path::new("resultados/hemograma.pdf"))?;
//! println!("{} ({} bytes, {})", file.metadata.nombre, file.metadata.tamano, file.metadata.tipo);
//! # Ok(())
//! # }
//! ```

mod files;

pub use files::{format_size, inspect, AttachmentMetadata, InspectedFile};

/// Extensions the backend accepts for clinical files.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "dcm"];

/// Largest attachment accepted (10 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Errors that can occur while inspecting an attachment
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Path does not point at a regular file
    #[error("not a regular file: {0}")]
    NotAFile(String),

    /// Extension is missing or not on the allow-list
    #[error("file type not allowed: {0} (allowed: pdf, jpg, jpeg, png, dcm)")]
    DisallowedExtension(String),

    /// File is larger than [`MAX_ATTACHMENT_BYTES`]
    #[error("file too large: {size} bytes (maximum {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FilesResult<T> = std::result::Result<T, FilesError>;
