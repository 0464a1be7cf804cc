//! Signage server handle.
//!
//! Bundles the shared store, the selection resolver, the stream publisher and
//! the stream registry. The web layer holds one of these and clones it into
//! request handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use signage_core::{MediaStore, MediaUrlBuilder, ServerSettings, StationId};

use crate::publisher::{StationStream, StreamPublisher};
use crate::registry::StreamRegistry;
use crate::resolver::SelectionResolver;

/// Configuration for the signage server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name reported by discovery.
    pub name: String,
    /// Public URL prefix for media files.
    pub media_url: String,
    /// Delay between two polls of one stream.
    pub poll_interval: Duration,
    /// Capacity of each stream's output channel.
    pub stream_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_settings(&ServerSettings::default())
    }
}

impl ServerConfig {
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            name: "signage-server-rust".to_string(),
            media_url: settings.media_url().to_string(),
            poll_interval: settings.poll_interval(),
            stream_buffer: settings.stream_buffer(),
        }
    }
}

/// The signage server.
pub struct SignageServer<S> {
    config: ServerConfig,
    resolver: SelectionResolver<S>,
    publisher: StreamPublisher<S>,
    registry: StreamRegistry,
}

impl<S> Clone for SignageServer<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            resolver: self.resolver.clone(),
            publisher: self.publisher.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<S: MediaStore + 'static> SignageServer<S> {
    /// Create a server around an existing store.
    pub fn new(config: ServerConfig, store: S) -> Self {
        Self::with_shared_store(config, Arc::new(RwLock::new(store)))
    }

    /// Create a server around a store shared with other writers.
    pub fn with_shared_store(config: ServerConfig, store: Arc<RwLock<S>>) -> Self {
        let registry = StreamRegistry::new();
        let resolver = SelectionResolver::new(store, MediaUrlBuilder::new(&config.media_url));
        let publisher = StreamPublisher::new(
            resolver.clone(),
            registry.clone(),
            config.poll_interval,
            config.stream_buffer,
        );

        Self {
            config,
            resolver,
            publisher,
            registry,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &SelectionResolver<S> {
        &self.resolver
    }

    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    /// The shared store, for admin-side writers.
    pub fn store(&self) -> Arc<RwLock<S>> {
        self.resolver.store().clone()
    }

    /// Open a change-gated stream for a station.
    pub fn open_stream(&self, station_id: StationId) -> StationStream {
        self.publisher.spawn(station_id)
    }

    /// Stop every open stream.
    pub async fn shutdown(&self) {
        self.registry.shutdown().await;
    }
}
