//! Configuration for grade-report analysis.
//!
//! All behaviour is controlled through [`AnalyzerConfig`], built via its
//! [`AnalyzerConfigBuilder`] or read from the process environment with
//! [`AnalyzerConfig::from_env`]. The binary maps its CLI flags onto the same
//! builder, so library users and the `gradecheck` service share one set of
//! defaults.

use crate::error::GradeCheckError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Chat-completion endpoint used when none is configured.
pub const DEFAULT_API_URL: &str = "https://router.huggingface.co/novita/v3/openai/chat/completions";

/// Model identifier sent with every chat-completion request by default.
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-v3-0324";

/// Default upload size limit for `POST /analyze`: 25 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Configuration for the OCR + LLM analysis pipeline.
///
/// # Example
/// ```rust
/// use edgequake_gradecheck::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .dpi(300)
///     .tesseract_lang("eng+deu")
///     .hf_token("hf_xxx")
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// Rendering DPI passed to the rasteriser. Range: 72–400. Default: 200.
    ///
    /// Tesseract is tuned for roughly 300 DPI scans; 200 keeps small-font
    /// transcripts legible without tripling OCR time.
    pub dpi: u32,

    /// Path or name of the `tesseract` binary. Default: `tesseract` (from `PATH`).
    pub tesseract_cmd: PathBuf,

    /// Tesseract language pack(s), e.g. `eng` or `eng+fra`. Default: `eng`.
    pub tesseract_lang: String,

    /// Directory holding the poppler binaries (`pdftoppm`, `pdfinfo`).
    /// If None, they are resolved from `PATH`.
    pub poppler_path: Option<PathBuf>,

    /// Chat-completion endpoint URL.
    pub api_url: String,

    /// Model identifier sent in the request body.
    pub model: String,

    /// Bearer token for the inference API. Checked at call time, not at startup.
    pub hf_token: Option<String>,

    /// Timeout for the inference call in seconds. Default: none.
    pub api_timeout_secs: Option<u64>,

    /// Largest accepted upload in bytes. Default: 25 MiB.
    pub max_upload_bytes: usize,

    /// Directory for temporary uploads. If None, the system temp dir is used.
    pub upload_dir: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            tesseract_cmd: PathBuf::from("tesseract"),
            tesseract_lang: "eng".to_string(),
            poppler_path: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            hf_token: None,
            api_timeout_secs: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_dir: None,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("dpi", &self.dpi)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("tesseract_lang", &self.tesseract_lang)
            .field("poppler_path", &self.poppler_path)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("hf_token", &self.hf_token.as_ref().map(|_| "<redacted>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `HF_TOKEN` | `hf_token` |
    /// | `HF_API_URL` | `api_url` |
    /// | `HF_MODEL` | `model` |
    /// | `TESSERACT_CMD` | `tesseract_cmd` |
    /// | `TESSERACT_LANG` | `tesseract_lang` |
    /// | `POPPLER_PATH` | `poppler_path` |
    /// | `GRADECHECK_DPI` | `dpi` |
    /// | `GRADECHECK_API_TIMEOUT` | `api_timeout_secs` |
    /// | `GRADECHECK_MAX_UPLOAD_MB` | `max_upload_bytes` |
    /// | `GRADECHECK_UPLOAD_DIR` | `upload_dir` |
    pub fn from_env() -> Result<Self, GradeCheckError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, GradeCheckError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut builder = Self::builder();

        if let Some(token) = get("HF_TOKEN") {
            builder = builder.hf_token(token);
        }
        if let Some(url) = get("HF_API_URL") {
            builder = builder.api_url(url);
        }
        if let Some(model) = get("HF_MODEL") {
            builder = builder.model(model);
        }
        if let Some(cmd) = get("TESSERACT_CMD") {
            builder = builder.tesseract_cmd(cmd);
        }
        if let Some(lang) = get("TESSERACT_LANG") {
            builder = builder.tesseract_lang(lang);
        }
        if let Some(dir) = get("POPPLER_PATH") {
            builder = builder.poppler_path(dir);
        }
        if let Some(dpi) = get("GRADECHECK_DPI") {
            builder = builder.dpi(parse_var("GRADECHECK_DPI", &dpi)?);
        }
        if let Some(secs) = get("GRADECHECK_API_TIMEOUT") {
            builder = builder.api_timeout_secs(parse_var("GRADECHECK_API_TIMEOUT", &secs)?);
        }
        if let Some(mb) = get("GRADECHECK_MAX_UPLOAD_MB") {
            let mb: usize = parse_var("GRADECHECK_MAX_UPLOAD_MB", &mb)?;
            let bytes = mb.checked_mul(1024 * 1024).ok_or_else(|| {
                GradeCheckError::InvalidConfig(format!(
                    "GRADECHECK_MAX_UPLOAD_MB is too large: {mb}"
                ))
            })?;
            builder = builder.max_upload_bytes(bytes);
        }
        if let Some(dir) = get("GRADECHECK_UPLOAD_DIR") {
            builder = builder.upload_dir(dir);
        }

        builder.build()
    }

    /// Resolve a poppler binary (`pdftoppm`, `pdfinfo`) against `poppler_path`.
    pub fn poppler_binary(&self, name: &str) -> PathBuf {
        match &self.poppler_path {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    /// The configured tesseract binary.
    pub fn tesseract_binary(&self) -> &Path {
        &self.tesseract_cmd
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, GradeCheckError> {
    value
        .trim()
        .parse()
        .map_err(|_| GradeCheckError::InvalidConfig(format!("{key} has invalid value '{value}'")))
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn tesseract_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.tesseract_lang = lang.into();
        self
    }

    pub fn poppler_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.poppler_path = Some(dir.into());
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn hf_token(mut self, token: impl Into<String>) -> Self {
        self.config.hf_token = Some(token.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, GradeCheckError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(GradeCheckError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.tesseract_lang.trim().is_empty() {
            return Err(GradeCheckError::InvalidConfig(
                "Tesseract language must not be empty".into(),
            ));
        }
        if !(c.api_url.starts_with("http://") || c.api_url.starts_with("https://")) {
            return Err(GradeCheckError::InvalidConfig(format!(
                "API URL must be http(s), got '{}'",
                c.api_url
            )));
        }
        if c.model.trim().is_empty() {
            return Err(GradeCheckError::InvalidConfig("Model must not be empty".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(GradeCheckError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}
