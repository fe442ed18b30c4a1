//! PDF rasterisation: turn every page of a PDF into a PNG on disk.
//!
//! Tesseract reads images from files, so the rasteriser writes one PNG per
//! page into a [`TempDir`] owned by [`RenderedPages`]. The directory and all
//! page images are removed when `RenderedPages` is dropped.
//!
//! Two backends implement [`Rasterizer`]:
//!
//! * [`PopplerRasterizer`] (default) shells out to poppler's `pdftoppm`.
//! * `PdfiumRasterizer` (feature `pdfium`) renders in-process via
//!   `pdfium-render` on a blocking thread, since pdfium is not async-safe.

use crate::config::AnalyzerConfig;
use crate::error::GradeCheckError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

/// Page images for one document, in page order.
#[derive(Debug)]
pub struct RenderedPages {
    dir: TempDir,
    pages: Vec<PathBuf>,
}

impl RenderedPages {
    /// Wrap a directory of page images. `pages` must already be in page order.
    pub fn new(dir: TempDir, pages: Vec<PathBuf>) -> Self {
        Self { dir, pages }
    }

    /// Page image paths, first page first.
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Directory holding the page images.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Converts a PDF on disk into page images.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Render every page of `pdf_path`.
    async fn rasterize(&self, pdf_path: &Path) -> Result<RenderedPages, GradeCheckError>;
}

// ── Poppler ──────────────────────────────────────────────────────────────

const PDFTOPPM_HINT: &str = "apt install poppler-utils";

/// Rasteriser backed by poppler's `pdftoppm` binary.
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    pdftoppm: PathBuf,
    dpi: u32,
}

impl PopplerRasterizer {
    pub fn new(pdftoppm: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            pdftoppm: pdftoppm.into(),
            dpi,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.poppler_binary("pdftoppm"), config.dpi)
    }
}

#[async_trait]
impl Rasterizer for PopplerRasterizer {
    fn name(&self) -> &'static str {
        "pdftoppm"
    }

    async fn rasterize(&self, pdf_path: &Path) -> Result<RenderedPages, GradeCheckError> {
        let dir = TempDir::new()?;
        let prefix = dir.path().join("page");

        let output = Command::new(&self.pdftoppm)
            .args(["-png", "-r", &self.dpi.to_string()])
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .await
            .map_err(|e| {
                GradeCheckError::from_spawn(e, &self.pdftoppm.display().to_string(), PDFTOPPM_HINT)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GradeCheckError::RasterisationFailed {
                path: pdf_path.to_path_buf(),
                detail: format!("pdftoppm exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let pages = collect_page_images(dir.path())?;
        if pages.is_empty() {
            return Err(GradeCheckError::NoPagesRendered {
                path: pdf_path.to_path_buf(),
            });
        }

        info!("Rasterised {} pages at {} DPI", pages.len(), self.dpi);
        Ok(RenderedPages::new(dir, pages))
    }
}

/// List `page-N.png` files in `dir`, ordered by N.
///
/// pdftoppm zero-pads N to the width of the page count (`page-01.png` for a
/// 10-page document, `page-001.png` for 100 pages), so sorting must use the
/// parsed number rather than the file name.
pub fn collect_page_images(dir: &Path) -> Result<Vec<PathBuf>, GradeCheckError> {
    let mut numbered: Vec<(u32, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(n) = page_number(&path) {
            numbered.push((n, path));
        }
    }

    numbered.sort_by_key(|(n, _)| *n);
    debug!("Found {} page images in {}", numbered.len(), dir.display());
    Ok(numbered.into_iter().map(|(_, p)| p).collect())
}

/// Parse N out of a `page-N.png` path.
fn page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix("page-")?
        .parse()
        .ok()
}

// ── Pdfium ───────────────────────────────────────────────────────────────

#[cfg(feature = "pdfium")]
pub use self::pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use super::{Rasterizer, RenderedPages};
    use crate::error::GradeCheckError;
    use async_trait::async_trait;
    use pdfium_render::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use tracing::{debug, info};

    /// Rasteriser that renders through a system `libpdfium`.
    #[derive(Debug, Clone)]
    pub struct PdfiumRasterizer {
        dpi: u32,
    }

    impl PdfiumRasterizer {
        pub fn new(dpi: u32) -> Self {
            Self { dpi }
        }
    }

    #[async_trait]
    impl Rasterizer for PdfiumRasterizer {
        fn name(&self) -> &'static str {
            "pdfium"
        }

        async fn rasterize(&self, pdf_path: &Path) -> Result<RenderedPages, GradeCheckError> {
            let path = pdf_path.to_path_buf();
            let dpi = self.dpi;

            tokio::task::spawn_blocking(move || render_blocking(&path, dpi))
                .await
                .map_err(|e| GradeCheckError::Internal(format!("Render task panicked: {}", e)))?
        }
    }

    fn render_blocking(pdf_path: &Path, dpi: u32) -> Result<RenderedPages, GradeCheckError> {
        let failed = |detail: String| GradeCheckError::RasterisationFailed {
            path: pdf_path.to_path_buf(),
            detail,
        };

        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| failed(format!("could not bind to libpdfium: {:?}", e)))?;
        let pdfium = Pdfium::new(bindings);

        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| failed(format!("{:?}", e)))?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);
        let dir = TempDir::new()?;
        let mut pages: Vec<PathBuf> = Vec::new();

        for (idx, page) in document.pages().iter().enumerate() {
            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| failed(format!("page {}: {:?}", idx + 1, e)))?;

            let image = bitmap.as_image();
            let out = dir.path().join(format!("page-{}.png", idx + 1));
            image
                .save_with_format(&out, image::ImageFormat::Png)
                .map_err(|e| failed(format!("page {}: {}", idx + 1, e)))?;

            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            pages.push(out);
        }

        if pages.is_empty() {
            return Err(GradeCheckError::NoPagesRendered {
                path: pdf_path.to_path_buf(),
            });
        }

        info!("Rasterised {} pages at {} DPI via pdfium", pages.len(), dpi);
        Ok(RenderedPages::new(dir, pages))
    }
}
