//! Shared helpers for the integration tests: fake collaborators, multipart
//! request building, a stand-in chat-completion endpoint, and fake CLI tools.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use edgequake_gradecheck::{GradeCheckError, InferenceClient, OcrEngine, Rasterizer, RenderedPages};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "gradecheck-test-boundary";

// ── Fake collaborators ───────────────────────────────────────────────────────

/// Produces `pages` blank page paths and remembers the PDF path it was given.
#[derive(Default)]
pub struct FakeRasterizer {
    pub pages: usize,
    pub fail: bool,
    pub seen: Mutex<Option<PathBuf>>,
}

impl FakeRasterizer {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn seen_path(&self) -> Option<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn rasterize(&self, pdf_path: &Path) -> Result<RenderedPages, GradeCheckError> {
        assert!(pdf_path.exists(), "upload must exist while rasterising");
        *self.seen.lock().unwrap() = Some(pdf_path.to_path_buf());

        if self.fail {
            return Err(GradeCheckError::RasterisationFailed {
                path: pdf_path.to_path_buf(),
                detail: "Couldn't read xref table".into(),
            });
        }

        let dir = tempfile::tempdir()?;
        let pages = (1..=self.pages)
            .map(|i| dir.path().join(format!("page-{i}.png")))
            .collect();
        Ok(RenderedPages::new(dir, pages))
    }
}

/// OCR returning "Subject N: grade" for page N.
pub struct NumberedOcr;

#[async_trait]
impl OcrEngine for NumberedOcr {
    async fn recognize(&self, page: usize, _image: &Path) -> Result<String, GradeCheckError> {
        Ok(format!("Subject {page}: B"))
    }
}

/// Inference client that returns a fixed result and records prompts.
pub struct CannedInference {
    pub reply: Result<Value, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl CannedInference {
    pub fn ok(reply: Value) -> Self {
        Self {
            reply: Ok(reply),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl InferenceClient for CannedInference {
    async fn complete(&self, prompt: &str) -> Result<Value, GradeCheckError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(GradeCheckError::Internal)
    }
}

// ── Requests ─────────────────────────────────────────────────────────────────

/// Encode one multipart field.
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Encode one plain form field (no filename).
pub fn text_field_body(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes()
}

/// `POST /analyze` with the given multipart body.
pub fn analyze_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// `POST /analyze` uploading `data` as the `file` field.
pub fn upload_request(data: &[u8]) -> Request<Body> {
    analyze_request(multipart_body("file", "report.pdf", data))
}

pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Stand-in chat-completion endpoint ────────────────────────────────────────

/// What the mock endpoint saw and how it should answer.
#[derive(Clone)]
pub struct MockEndpoint {
    pub status: StatusCode,
    pub body: Value,
    pub requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

impl MockEndpoint {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A well-formed response whose message content is `content`.
    pub fn replying(content: Value) -> Self {
        Self::new(
            StatusCode::OK,
            serde_json::json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }]
            }),
        )
    }

    /// Serve on an ephemeral port; returns the full endpoint URL.
    pub async fn spawn(&self) -> String {
        async fn handle(
            State(mock): State<MockEndpoint>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> impl IntoResponse {
            mock.requests.lock().unwrap().push((headers, body));
            (mock.status, Json(mock.body.clone()))
        }

        let app = Router::new()
            .route("/v1/chat/completions", post(handle))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}/v1/chat/completions")
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

// ── Fake command-line tools ──────────────────────────────────────────────────

/// Write an executable shell script named `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// pdftoppm stand-in: reads `pages=N` from the PDF and writes
/// `<prefix>-1.png` … `<prefix>-N.png` (unpadded, so ordering must be numeric).
pub const FAKE_PDFTOPPM: &str = r#"pdf="$4"
prefix="$5"
n=$(sed -n 's/.*pages=\([0-9][0-9]*\).*/\1/p' "$pdf")
[ -n "$n" ] || { echo "Syntax Error: Couldn't read xref table" >&2; exit 1; }
i=1
while [ "$i" -le "$n" ]; do
  printf 'png' > "$prefix-$i.png"
  i=$((i + 1))
done"#;

/// tesseract stand-in: prints a version banner or "text from page-N".
pub const FAKE_TESSERACT: &str = r#"if [ "$1" = "--version" ]; then
  echo "tesseract 5.3.4"
  echo " leptonica-1.84.1"
  exit 0
fi
echo "text from $(basename "$1" .png)""#;

/// pdfinfo stand-in: poppler prints its version banner on stderr.
pub const FAKE_PDFINFO: &str = r#"echo "pdfinfo version 24.02.0" >&2
echo "Copyright 2005-2024 The Poppler Developers - http://poppler.freedesktop.org" >&2"#;
