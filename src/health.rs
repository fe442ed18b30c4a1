//! Dependency check for the external OCR and PDF binaries.
//!
//! Runs `tesseract --version` and `pdfinfo -v` and reports the first line of
//! each banner. Both tools print their banner on stdout or stderr depending
//! on version, so stdout is preferred and stderr is the fallback.

use crate::config::AnalyzerConfig;
use crate::error::GradeCheckError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Versions reported by a successful check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolVersions {
    pub tesseract: String,
    pub poppler: String,
    pub status: String,
}

/// Check that tesseract and poppler are installed and runnable.
pub async fn check_tools(config: &AnalyzerConfig) -> Result<ToolVersions, GradeCheckError> {
    let tesseract = tool_version(
        config.tesseract_binary(),
        "--version",
        "apt install tesseract-ocr",
    )
    .await?;
    let poppler = tool_version(
        &config.poppler_binary("pdfinfo"),
        "-v",
        "apt install poppler-utils",
    )
    .await?;

    Ok(ToolVersions {
        tesseract,
        poppler,
        status: "OK".to_string(),
    })
}

/// Run `<binary> <flag>` and return the first non-empty line of its output.
async fn tool_version(
    binary: &Path,
    flag: &str,
    hint: &'static str,
) -> Result<String, GradeCheckError> {
    let tool = binary.display().to_string();
    let output = Command::new(binary)
        .arg(flag)
        .output()
        .await
        .map_err(|e| GradeCheckError::from_spawn(e, &tool, hint))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        warn!("{} {} exited with {}", tool, flag, output.status);
        return Err(GradeCheckError::ToolFailed {
            tool,
            detail: format!("exited with {}: {}", output.status, stderr.trim()),
        });
    }

    let version = first_line(&stdout)
        .or_else(|| first_line(&stderr))
        .ok_or_else(|| GradeCheckError::ToolFailed {
            tool: tool.clone(),
            detail: "printed no version information".to_string(),
        })?;

    debug!("{}: {}", tool, version);
    Ok(version.to_string())
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}
