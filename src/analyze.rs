//! The analysis entry points: PDF in, `{"GPA": …, "F": …}` out.
//!
//! [`Analyzer`] owns one instance of each collaborator and runs the stages
//! strictly in sequence. The stage methods are public so the HTTP layer can
//! attribute a failure to the step that caused it; [`Analyzer::analyze_file`]
//! and [`Analyzer::analyze_bytes`] chain them for library and CLI callers.

use crate::config::AnalyzerConfig;
use crate::error::GradeCheckError;
use crate::pipeline::llm::{HuggingFaceClient, InferenceClient};
use crate::pipeline::ocr::{self, OcrEngine, TesseractOcr};
use crate::pipeline::render::{PopplerRasterizer, Rasterizer};
use crate::pipeline::reply;
use crate::pipeline::upload::SavedUpload;
use crate::prompts::grade_report_prompt;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Runs the rasterise → OCR → infer pipeline.
#[derive(Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    rasterizer: Arc<dyn Rasterizer>,
    ocr: Arc<dyn OcrEngine>,
    inference: Arc<dyn InferenceClient>,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("rasterizer", &self.rasterizer.name())
            .field("ocr", &"<dyn OcrEngine>")
            .field("inference", &"<dyn InferenceClient>")
            .finish()
    }
}

impl Analyzer {
    /// Build an analyzer with the default collaborators: `pdftoppm`,
    /// `tesseract`, and the Hugging Face router.
    pub fn from_config(config: AnalyzerConfig) -> Result<Self, GradeCheckError> {
        let rasterizer = Arc::new(PopplerRasterizer::from_config(&config));
        let ocr = Arc::new(TesseractOcr::from_config(&config));
        let inference = Arc::new(HuggingFaceClient::from_config(&config)?);
        Ok(Self::new(config, rasterizer, ocr, inference))
    }

    /// Build an analyzer from explicit collaborators.
    pub fn new(
        config: AnalyzerConfig,
        rasterizer: Arc<dyn Rasterizer>,
        ocr: Arc<dyn OcrEngine>,
        inference: Arc<dyn InferenceClient>,
    ) -> Self {
        Self {
            config,
            rasterizer,
            ocr,
            inference,
        }
    }

    /// Replace the rasteriser, keeping the other collaborators.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    // ── Stages ───────────────────────────────────────────────────────────

    /// Persist uploaded bytes to a temporary `.pdf`.
    pub fn save_upload(&self, bytes: &[u8]) -> Result<SavedUpload, GradeCheckError> {
        SavedUpload::save(bytes, self.config.upload_dir.as_deref())
    }

    /// Rasterise the PDF and OCR every page, in page order.
    ///
    /// Page images are deleted before this returns.
    pub async fn extract_text(&self, pdf_path: &Path) -> Result<String, GradeCheckError> {
        let pages = self.rasterizer.rasterize(pdf_path).await?;
        ocr::extract_text(self.ocr.as_ref(), &pages).await
    }

    /// Build the prompt, call the model once, and decode its reply.
    pub async fn infer(&self, extracted_text: &str) -> Result<Value, GradeCheckError> {
        let prompt = grade_report_prompt(extracted_text);
        let content = self.inference.complete(&prompt).await?;
        reply::parse_reply(content)
    }

    // ── End-to-end ───────────────────────────────────────────────────────

    /// Analyse a PDF already on disk.
    pub async fn analyze_file(&self, pdf_path: impl AsRef<Path>) -> Result<Value, GradeCheckError> {
        let start = Instant::now();
        let pdf_path = pdf_path.as_ref();
        info!("Analysing {}", pdf_path.display());

        let text = self.extract_text(pdf_path).await?;
        let result = self.infer(&text).await?;

        info!("Analysis complete in {}ms", start.elapsed().as_millis());
        Ok(result)
    }

    /// Analyse PDF bytes held in memory.
    ///
    /// The bytes go to a managed temp file which is removed once text
    /// extraction finishes, before the inference call.
    pub async fn analyze_bytes(&self, bytes: &[u8]) -> Result<Value, GradeCheckError> {
        let upload = self.save_upload(bytes)?;
        let text = self.extract_text(upload.path()).await;
        upload.discard();
        self.infer(&text?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::render::RenderedPages;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Pages(usize);

    #[async_trait]
    impl Rasterizer for Pages {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn rasterize(&self, _pdf: &Path) -> Result<RenderedPages, GradeCheckError> {
            let dir = tempfile::tempdir()?;
            let pages = (1..=self.0)
                .map(|i| dir.path().join(format!("page-{i}.png")))
                .collect();
            Ok(RenderedPages::new(dir, pages))
        }
    }

    struct Echo;

    #[async_trait]
    impl OcrEngine for Echo {
        async fn recognize(&self, page: usize, _image: &Path) -> Result<String, GradeCheckError> {
            Ok(format!("Course{page} F"))
        }
    }

    #[derive(Default)]
    struct Canned {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl InferenceClient for Canned {
        async fn complete(&self, prompt: &str) -> Result<Value, GradeCheckError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(json!("{\"GPA\": 2.0, \"F\": 2}"))
        }
    }

    fn analyzer(inference: Arc<Canned>) -> Analyzer {
        Analyzer::new(
            AnalyzerConfig::default(),
            Arc::new(Pages(2)),
            Arc::new(Echo),
            inference,
        )
    }

    #[tokio::test]
    async fn analyze_bytes_embeds_ocr_text_in_prompt() {
        let canned = Arc::new(Canned::default());
        let result = analyzer(canned.clone())
            .analyze_bytes(b"%PDF-1.4")
            .await
            .unwrap();

        assert_eq!(result, json!({"GPA": 2.0, "F": 2}));
        let prompts = canned.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("'''Course1 F\nCourse2 F\n'''"));
    }

    #[test]
    fn debug_names_rasterizer() {
        let a = analyzer(Arc::new(Canned::default()));
        assert!(format!("{a:?}").contains("fake"));
    }
}
