//! OCR: turn page images into text with Tesseract.

use crate::config::AnalyzerConfig;
use crate::error::GradeCheckError;
use crate::pipeline::render::RenderedPages;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

const TESSERACT_HINT: &str = "apt install tesseract-ocr";

/// Recognises the text on a single page image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// `page` is 1-indexed and only used for error reporting.
    async fn recognize(&self, page: usize, image_path: &Path) -> Result<String, GradeCheckError>;
}

/// OCR engine backed by the `tesseract` CLI.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    cmd: PathBuf,
    lang: String,
}

impl TesseractOcr {
    pub fn new(cmd: impl Into<PathBuf>, lang: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            lang: lang.into(),
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.tesseract_binary(), config.tesseract_lang.clone())
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, page: usize, image_path: &Path) -> Result<String, GradeCheckError> {
        let output = Command::new(&self.cmd)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.lang])
            .output()
            .await
            .map_err(|e| {
                GradeCheckError::from_spawn(e, &self.cmd.display().to_string(), TESSERACT_HINT)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GradeCheckError::OcrFailed {
                page,
                detail: format!("tesseract exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// OCR every rendered page in order and join the results.
///
/// Each page contributes its recognised text followed by a single `\n`, so a
/// document of N pages yields exactly N newline-terminated segments.
pub async fn extract_text(
    ocr: &dyn OcrEngine,
    pages: &RenderedPages,
) -> Result<String, GradeCheckError> {
    let start = Instant::now();
    let mut text = String::new();

    for (idx, image) in pages.pages().iter().enumerate() {
        let page_text = ocr.recognize(idx + 1, image).await?;
        debug!("Page {}: {} chars", idx + 1, page_text.len());
        text.push_str(&page_text);
        text.push('\n');
    }

    info!(
        "OCR complete: {} pages, {} chars in {}ms",
        pages.len(),
        text.len(),
        start.elapsed().as_millis()
    );
    Ok(text)
}
