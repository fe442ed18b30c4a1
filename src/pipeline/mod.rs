//! Pipeline stages for grade-report analysis.
//!
//! Each submodule implements exactly one step. The three external
//! collaborators (rasteriser, OCR engine, inference API) sit behind traits so
//! each can be swapped or mocked without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ render ──▶ ocr ──▶ llm ──▶ reply
//! (tempfile) (pdftoppm) (tesseract) (HF router) (JSON)
//! ```
//!
//! 1. [`upload`]: persist uploaded bytes to a scoped temp `.pdf`
//! 2. [`render`]: rasterise every page to PNG ([`render::Rasterizer`])
//! 3. [`ocr`]   : OCR each page in order and join ([`ocr::OcrEngine`])
//! 4. [`llm`]   : one chat-completion call ([`llm::InferenceClient`])
//! 5. [`reply`] : decode the model's message content as JSON

pub mod llm;
pub mod ocr;
pub mod render;
pub mod reply;
pub mod upload;
