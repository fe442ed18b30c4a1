//! Error types for the edgequake-gradecheck library.
//!
//! Every stage of the pipeline returns [`GradeCheckError`]. There is no
//! partial-success mode: a grade report is one document and one answer, so a
//! failure at any page aborts the whole analysis.
//!
//! The HTTP layer does not expose these variants directly. It groups them by
//! pipeline stage (save, processing, inference) in
//! [`crate::server::ApiError`] so clients see one stable message prefix per
//! stage while the detail text still comes from here.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-gradecheck library.
#[derive(Debug, Error)]
pub enum GradeCheckError {
    // ── Upload errors ─────────────────────────────────────────────────────
    /// The uploaded bytes could not be written to a temporary file.
    #[error("{0}")]
    SaveFailed(#[source] std::io::Error),

    // ── Rasterisation / OCR errors ────────────────────────────────────────
    /// An external binary could not be spawned because it is not installed.
    #[error("External tool not found: {tool}\nInstall it with: {hint}")]
    ToolNotFound { tool: String, hint: &'static str },

    /// An external binary ran but exited unsuccessfully or printed nothing.
    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    /// The rasteriser ran but reported a failure.
    #[error("Rasterisation failed for '{path}': {detail}")]
    RasterisationFailed { path: PathBuf, detail: String },

    /// The rasteriser succeeded but produced no page images.
    #[error("No page images were generated from '{path}'")]
    NoPagesRendered { path: PathBuf },

    /// Tesseract failed on a page image.
    #[error("OCR failed on page {page}: {detail}")]
    OcrFailed { page: usize, detail: String },

    // ── Inference errors ──────────────────────────────────────────────────
    /// `HF_TOKEN` is not set.
    #[error("No Hugging Face API token found in environment variables (set HF_TOKEN).")]
    MissingToken,

    /// The inference endpoint answered with a non-200 status.
    #[error("Request failed: {status}, {body}")]
    RequestFailed { status: u16, body: String },

    /// Transport-level failure talking to the inference endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The inference response did not contain `choices[0].message`.
    #[error("Unexpected response format from Hugging Face API")]
    UnexpectedResponse,

    /// The model's reply was not valid JSON.
    #[error("Model reply is not valid JSON: {source}")]
    InvalidReply {
        #[source]
        source: serde_json::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O ───────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GradeCheckError {
    /// Map a spawn error onto [`GradeCheckError::ToolNotFound`] when the
    /// binary is missing, or [`GradeCheckError::Io`] otherwise.
    pub(crate) fn from_spawn(err: std::io::Error, tool: &str, hint: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            GradeCheckError::ToolNotFound {
                tool: tool.to_string(),
                hint,
            }
        } else {
            GradeCheckError::Io(err)
        }
    }
}
