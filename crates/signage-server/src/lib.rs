//! # signage-server
//!
//! Station media synchronisation.
//!
//! - [`resolver`] computes the displayable media of a station from the store
//! - [`gate`] decides whether a freshly resolved snapshot is worth sending
//! - [`publisher`] runs one cancellable polling task per connected station
//! - [`registry`] tracks those tasks for accounting and graceful shutdown
//! - [`server`] bundles the pieces behind one handle for the web layer

pub mod gate;
pub mod publisher;
pub mod registry;
pub mod resolver;
pub mod server;

pub use gate::ChangeGate;
pub use publisher::{StationStream, StreamError, StreamItem, StreamPublisher};
pub use registry::{StreamRegistry, StreamStats};
pub use resolver::{ResolveError, Resolution, SelectionResolver, Snapshot, SnapshotEntry};
pub use server::{ServerConfig, SignageServer};
pub use signage_core::{MediaStore, MemoryStore, StationId};
