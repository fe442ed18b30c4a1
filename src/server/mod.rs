//! HTTP service exposing the analysis pipeline.
//!
//! - `POST /analyze`: multipart field `file` (PDF) → `{"GPA": …, "F": …}`
//! - `GET /healthcheck`: tesseract / poppler versions

mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use handlers::UPLOAD_FIELD;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::analyze::Analyzer;

/// Shared state for the web server.
#[derive(Clone, Debug)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(analyzer: Analyzer, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(AppState::new(analyzer));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
