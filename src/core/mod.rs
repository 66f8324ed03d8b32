//! core
//!
//! Domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: MetaType, EntityType, EntityKey, RemoteId
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod types;
