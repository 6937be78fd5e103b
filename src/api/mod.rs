//! API module for lecture search
//!
//! Serves search results and catalog facets over HTTP for browser front ends.

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::session::SearchSession;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{router, AppState};

/// HTTP server over a shared, read-only search session
pub struct ApiServer {
    session: Arc<SearchSession>,
    port: u16,
}

impl ApiServer {
    pub fn new(session: Arc<SearchSession>, port: u16) -> Self {
        Self { session, port }
    }

    /// Start the API server in the background
    pub fn start_background(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.start().await })
    }

    /// Serve until the listener fails
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.port);
        server::start_http_server(self.session, self.port).await
    }
}
