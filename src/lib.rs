//! metadata-service-client - Client for a learning-object metadata service
//!
//! The service stores descriptive metadata (keywords, difficulty, licenses,
//! learning goals and more) for educational entities, plus user-defined custom
//! fields. Callers address an entity by its local type and id; the client maps
//! that to the identifier the service issued, registering the entity when
//! asked to.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface (`mdsc`)
//! - [`client`] - [`client::MetadataClient`]: identity resolution, facet operations, custom fields
//! - [`transport`] - Async request transport, HTTP and mock implementations
//! - [`auth`] - Request authenticators: anonymous, OAuth1, OAuth2 client credentials
//! - [`core`] - Domain types and configuration

pub mod auth;
pub mod cli;
pub mod client;
pub mod core;
pub mod transport;
