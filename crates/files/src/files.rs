//! Attachment inspection.
//!
//! # Metadata on the wire
//!
//! A history does not embed file contents. Each complementary test carries a list of
//! `{nombre, tamaño, tipo}` objects describing what was attached, and the bytes go to the
//! file endpoint separately. [`AttachmentMetadata`] is that object, with the SHA-256 digest
//! added so an upload can be matched to its entry later.

use crate::{FilesError, FilesResult, ALLOWED_EXTENSIONS, MAX_ATTACHMENT_BYTES};
use inder_types::NonEmptyText;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Description of an attached file as recorded in a medical history.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct AttachmentMetadata {
    /// Original filename
    pub nombre: NonEmptyText,

    /// Size in bytes
    #[serde(rename = "tamaño")]
    pub tamano: u64,

    /// Media type (MIME)
    ///
    /// Sniffed from the content when possible, otherwise derived from the extension.
    pub tipo: String,

    /// Hexadecimal SHA-256 digest of the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// A file that passed inspection, ready to upload.
#[derive(Debug, Clone)]
pub struct InspectedFile {
    pub metadata: AttachmentMetadata,
    pub bytes: Vec<u8>,
}

/// Reads and checks a local file.
///
/// # Arguments
///
/// * `path` - Path to the file the clinician wants to attach
///
/// # Returns
///
/// The file contents and their [`AttachmentMetadata`].
///
/// # Errors
///
/// Returns `FilesError` if:
/// - the path is not a regular file
/// - the extension is not one of [`ALLOWED_EXTENSIONS`]
/// - the file exceeds [`MAX_ATTACHMENT_BYTES`]
/// - the file cannot be read
pub fn inspect(path: &Path) -> FilesResult<InspectedFile> {
    let metadata = fs::metadata(path).map_err(|e| {
        FilesError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to stat {}: {}", path.display(), e),
        ))
    })?;

    if !metadata.is_file() {
        return Err(FilesError::NotAFile(path.display().to_string()));
    }

    let extension = allowed_extension(path)?;

    // Size check before reading so an oversized file is never loaded.
    if metadata.len() > MAX_ATTACHMENT_BYTES {
        return Err(FilesError::TooLarge {
            size: metadata.len(),
            max: MAX_ATTACHMENT_BYTES,
        });
    }

    let bytes = fs::read(path).map_err(|e| {
        FilesError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let tipo = infer::get(&bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| mime_for_extension(&extension).to_string());

    let nombre = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| NonEmptyText::new(n).ok())
        .ok_or_else(|| FilesError::NotAFile(path.display().to_string()))?;

    tracing::debug!("inspected attachment {} ({} bytes, {})", nombre, bytes.len(), tipo);

    Ok(InspectedFile {
        metadata: AttachmentMetadata {
            nombre,
            tamano: bytes.len() as u64,
            tipo,
            sha256: Some(digest),
        },
        bytes,
    })
}

/// Human-readable size with two decimals at most, e.g. `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

fn allowed_extension(path: &Path) -> FilesResult<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(FilesError::DisallowedExtension(if extension.is_empty() {
            path.display().to_string()
        } else {
            extension
        }))
    }
}

fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "dcm" => "application/dicom",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_inspect_pdf_detects_type_and_hash() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hemograma.pdf");
        fs::write(&path, b"%PDF-1.4\n%test\n").unwrap();

        let file = inspect(&path).unwrap();

        assert_eq!(file.metadata.nombre.as_str(), "hemograma.pdf");
        assert_eq!(file.metadata.tamano, 15);
        assert_eq!(file.metadata.tipo, "application/pdf");
        let digest = file.metadata.sha256.as_deref().unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(file.bytes, b"%PDF-1.4\n%test\n");
    }

    #[test]
    fn test_inspect_png_sniffed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rx-rodilla.PNG");
        fs::write(&path, PNG_HEADER).unwrap();

        let file = inspect(&path).unwrap();
        assert_eq!(file.metadata.tipo, "image/png");
    }

    #[test]
    fn test_inspect_falls_back_to_extension_mime() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("estudio.dcm");
        fs::write(&path, b"not really dicom").unwrap();

        let file = inspect(&path).unwrap();
        assert_eq!(file.metadata.tipo, "application/dicom");
    }

    #[test]
    fn test_inspect_rejects_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notas.docx");
        fs::write(&path, b"hello").unwrap();

        let result = inspect(&path);
        assert!(matches!(result, Err(FilesError::DisallowedExtension(ext)) if ext == "docx"));
    }

    #[test]
    fn test_inspect_rejects_missing_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("README");
        fs::write(&path, b"hello").unwrap();

        assert!(matches!(inspect(&path), Err(FilesError::DisallowedExtension(_))));
    }

    #[test]
    fn test_inspect_rejects_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("carpeta.pdf");
        fs::create_dir_all(&path).unwrap();

        assert!(matches!(inspect(&path), Err(FilesError::NotAFile(_))));
    }

    #[test]
    fn test_inspect_rejects_large_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("grande.pdf");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_ATTACHMENT_BYTES + 1).unwrap();

        assert!(matches!(inspect(&path), Err(FilesError::TooLarge { .. })));
    }

    #[test]
    fn test_inspect_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nada.pdf");

        assert!(matches!(inspect(&path), Err(FilesError::Io(_))));
    }

    #[test]
    fn test_metadata_serialises_with_wire_names() {
        let metadata = AttachmentMetadata {
            nombre: NonEmptyText::new("a.pdf").unwrap(),
            tamano: 10,
            tipo: "application/pdf".into(),
            sha256: None,
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"nombre": "a.pdf", "tamaño": 10, "tipo": "application/pdf"})
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10 MB");
    }
}
