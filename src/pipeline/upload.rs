//! Upload persistence: write the uploaded PDF bytes to a scoped temp file.
//!
//! The rasterisers need a file-system path, so every upload lands in a
//! uniquely named `.pdf` file. [`SavedUpload`] owns that file through a
//! [`NamedTempFile`]; dropping it deletes the file, so cleanup happens on
//! every exit path including early returns and panics.

use crate::error::GradeCheckError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// An uploaded PDF persisted to a temporary path.
#[derive(Debug)]
pub struct SavedUpload {
    file: NamedTempFile,
}

impl SavedUpload {
    /// Write `bytes` to a fresh temp file under `dir`, or the system temp
    /// directory when `dir` is None.
    pub fn save(bytes: &[u8], dir: Option<&Path>) -> Result<Self, GradeCheckError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("gradecheck-").suffix(".pdf");

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(GradeCheckError::SaveFailed)?;

        file.write_all(bytes).map_err(GradeCheckError::SaveFailed)?;
        file.flush().map_err(GradeCheckError::SaveFailed)?;

        if !bytes.starts_with(b"%PDF") {
            // Not rejected here: the rasteriser produces the authoritative error.
            warn!(
                "Upload does not start with %PDF magic ({} bytes)",
                bytes.len()
            );
        }

        debug!(
            "Saved upload ({} bytes) to {}",
            bytes.len(),
            file.path().display()
        );
        Ok(Self { file })
    }

    /// Path of the temporary PDF.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the temporary file now instead of waiting for drop.
    ///
    /// A failed removal is logged, not returned: the caller has already
    /// produced its answer and the file is not reused.
    pub fn discard(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed temp upload {}", path.display()),
            Err(e) => warn!("Failed to remove temp upload {}: {}", path.display(), e),
        }
    }
}
