//! # signage-core
//!
//! Core data model and store for station media playlists.
//!
//! This crate provides:
//! - Data model types (Station, Product, ProductMedia, Linewise)
//! - The `MediaStore` query trait consumed by the resolver
//! - In-memory store implementation, including the admin-side mutations
//!   (batch product assignment, linewise synchronisation)
//! - Media type derivation from file references
//! - Server settings and their storage
//!
//! This crate is intentionally runtime-agnostic and contains no async code.

pub mod config;
pub mod media;
pub mod model;
pub mod store;

pub use config::{ConfigError, ConfigStorage, FileConfigStorage, ServerSettings};
pub use media::{media_type_tag, validate_media_file, MediaKind, MediaUrlBuilder};
pub use model::*;
pub use store::{MediaStore, MemoryStore, StoreError};
