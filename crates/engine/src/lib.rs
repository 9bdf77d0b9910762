//! Diagram generation HTTP service.
//!
//! Exposes two routes:
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /generate_flowchart/?algorithm=...` | Prompt the model, extract, validate, render, return the JPEG |
//! | `GET /health` | Liveness probe with the current server time |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP framing, status mapping, and request logging live
//! here. Model access and rendering are injected through
//! [`flowchart::TextGenerator`] and [`renderer::FlowchartRenderer`].

pub mod config;
mod error;
mod middleware;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use flowchart::TextGenerator;
use renderer::FlowchartRenderer;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub use config::{EngineConfig, EngineConfigError};
pub use error::ApiError;
pub use routes::routes;

/// Shared state of the diagram service.
#[derive(Clone)]
pub struct AppState {
    generator: Arc<dyn TextGenerator>,
    renderer: Arc<dyn FlowchartRenderer>,
    // The renderer writes to a fixed path; render-then-read is one critical section.
    render_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Creates the service state from its two collaborators.
    pub fn new(generator: Arc<dyn TextGenerator>, renderer: Arc<dyn FlowchartRenderer>) -> Self {
        Self {
            generator,
            renderer,
            render_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Binds `addr` and serves the diagram service until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "diagram service listening");

    let app: Router = routes(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
