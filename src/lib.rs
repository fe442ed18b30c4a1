//! # edgequake-gradecheck
//!
//! Read a PDF grade report and answer two questions: what is the overall GPA,
//! and how many subjects were failed?
//!
//! Scanned transcripts rarely carry a usable text layer, so every page is
//! rasterised and run through Tesseract OCR. The recognised text goes to a
//! chat-completion model with a fixed extraction prompt, and the model's JSON
//! reply is handed back as-is.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Upload   persist to a scoped temp file
//!  ├─ 2. Render   rasterise pages via pdftoppm (or pdfium)
//!  ├─ 3. OCR      tesseract per page, concatenated in page order
//!  ├─ 4. Prompt   fixed instruction + OCR text
//!  ├─ 5. Infer    one chat-completion call (Hugging Face router)
//!  └─ 6. Reply    decode {"GPA": <number>, "F": <integer>}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_gradecheck::{Analyzer, AnalyzerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads HF_TOKEN, TESSERACT_CMD, POPPLER_PATH, …
//!     let config = AnalyzerConfig::from_env()?;
//!     let analyzer = Analyzer::from_config(config)?;
//!     let result = analyzer.analyze_file("transcript.pdf").await?;
//!     println!("{result}");
//!     Ok(())
//! }
//! ```
//!
//! ## HTTP Service
//!
//! [`server::create_router`] exposes `POST /analyze` (multipart field `file`)
//! and `GET /healthcheck`. The `gradecheck serve` binary wraps it.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`    | on  | Enables the `gradecheck` binary (clap + anyhow + tracing-subscriber) |
//! | `pdfium` | off | Adds `PdfiumRasterizer`, rendering in-process through libpdfium |
//!
//! ## External Tools
//!
//! | Tool | Package | Used for |
//! |------|---------|----------|
//! | `pdftoppm`, `pdfinfo` | poppler-utils | rasterisation, health check |
//! | `tesseract` | tesseract-ocr | OCR, health check |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod health;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::Analyzer;
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, DEFAULT_API_URL, DEFAULT_MODEL};
pub use error::GradeCheckError;
pub use health::{check_tools, ToolVersions};
pub use pipeline::llm::{HuggingFaceClient, InferenceClient};
pub use pipeline::ocr::{OcrEngine, TesseractOcr};
#[cfg(feature = "pdfium")]
pub use pipeline::render::PdfiumRasterizer;
pub use pipeline::render::{PopplerRasterizer, Rasterizer, RenderedPages};
pub use pipeline::reply::GradeSummary;
