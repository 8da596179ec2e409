//! Input validation: confirm the supplied path is a readable PDF before any
//! work starts.
//!
//! pdfium error messages for a missing or non-PDF file are opaque, so the
//! existence, permission, and `%PDF` magic-byte checks run up front and map
//! each failure mode to a dedicated error. Validation happens before any
//! output file is created, keeping the no-partial-output contract for
//! extraction failures.

use crate::error::DocmarkError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists, is readable, and starts with `%PDF`.
///
/// Returns the canonical owned path on success.
pub fn validate_pdf(path: &Path) -> Result<PathBuf, DocmarkError> {
    if !path.exists() {
        return Err(DocmarkError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DocmarkError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(DocmarkError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
        return Err(DocmarkError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    debug!("validated PDF input: {}", path.display());
    Ok(path.to_path_buf())
}

/// The document name derived from the input path: the file stem, used as
/// the prefix of every output file.
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_reported() {
        let err = validate_pdf(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, DocmarkError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_magic_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"<html>not a pdf</html>")
            .unwrap();

        let err = validate_pdf(&path).unwrap_err();
        match err {
            DocmarkError::NotAPdf { magic, .. } => assert_eq!(&magic, b"<htm"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.7\n%rest of file")
            .unwrap();

        let validated = validate_pdf(&path).unwrap();
        assert_eq!(validated, path);
    }

    #[test]
    fn document_name_is_the_stem() {
        assert_eq!(document_name(Path::new("/tmp/report v2.pdf")), "report v2");
        assert_eq!(document_name(Path::new("contract.pdf")), "contract");
    }
}
