use crate::shared::error::BuildError;
use crate::shared::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `document` as two-space indented JSON followed by a newline
///
/// The file is flushed and closed before this returns.
///
/// # Errors
/// Returns [`BuildError::SbomWriteError`] if the file cannot be created,
/// serialized into or flushed
pub fn write_json_document<T: Serialize>(document: &T, path: &Path) -> Result<()> {
    let write_error = |details: String| BuildError::SbomWriteError {
        path: path.to_path_buf(),
        details,
    };

    let file = File::create(path).map_err(|e| write_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)
        .map_err(|e| write_error(format!("Failed to encode document: {}", e)))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| write_error(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_indented_with_trailing_newline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");

        write_json_document(&json!({"name": "sbom", "packages": []}), &path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\n  \"name\": \"sbom\",\n  \"packages\": []\n}\n"
        );
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing/doc.json");

        let error = write_json_document(&json!({}), &path).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<BuildError>(),
            Some(BuildError::SbomWriteError { .. })
        ));
    }
}
