//! transport
//!
//! Abstraction over how requests reach the metadata service.
//!
//! # Architecture
//!
//! The `Transport` trait defines a single async `send` operation. The client
//! layer builds [`Request`]s and classifies errors; it never touches HTTP
//! directly. Commands use the [`create_transport`] factory rather than
//! constructing implementations.
//!
//! # Modules
//!
//! - `traits`: Core `Transport` trait and request/response types
//! - [`http`]: reqwest implementation with pluggable authentication
//! - [`mock`]: In-memory routes for deterministic testing
//! - `factory`: Transport creation from adapter configuration
//!
//! # Example
//!
//! ```ignore
//! use metadata_service_client::transport::{create_transport, Request};
//!
//! let transport = create_transport(&adapter)?;
//! let response = transport.send(Request::get("/v1/keywords")).await?;
//! ```

mod factory;
pub mod http;
pub mod mock;
mod traits;

pub use factory::{create_authenticator, create_transport};
pub use traits::{Method, Request, Response, Transport, TransportError};
