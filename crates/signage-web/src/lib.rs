//! # signage-web
//!
//! HTTP surface of the signage server.
//!
//! This crate provides:
//! - One-shot JSON media lists for a station
//! - The slider page that displays a station's playlist
//! - Server-push streams that send a station's playlist whenever it changes
//! - Station listing, health, discovery and statistics endpoints
//!
//! ## Usage
//!
//! ```rust,ignore
//! use signage_web::{create_router, ServerState};
//!
//! let state = ServerState::new(server);
//! let app = create_router(state);
//!
//! let listener = TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod routes;
pub mod statistics;

// Re-exports
pub use error::ApiError;
pub use routes::create_router;
pub use statistics::{ServerStatistics, StatisticsCollector};

use std::sync::Arc;

use signage_core::MemoryStore;
use signage_server::SignageServer;

/// Shared server state for all route handlers.
pub struct ServerState {
    pub server: SignageServer<MemoryStore>,
    pub statistics: StatisticsCollector,
}

impl ServerState {
    /// Wrap a server for use as router state.
    pub fn new(server: SignageServer<MemoryStore>) -> AppState {
        Arc::new(Self {
            server,
            statistics: StatisticsCollector::new(),
        })
    }
}

/// Type alias for shared state in Axum handlers.
pub type AppState = Arc<ServerState>;
