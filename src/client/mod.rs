//! client
//!
//! The metadata service client.
//!
//! # Overview
//!
//! A [`MetadataClient`] is bound to one entity at a time. The entity is
//! addressed by its [`EntityKey`] (a raw UUID, or the configured prefix plus
//! the entity id) until the service has issued a [`RemoteId`] for it. Facet
//! operations are scoped to the remote id; custom field and learning object
//! operations are scoped to the entity key.
//!
//! # Modules
//!
//! - `identity`: remote id lookup, creation and memoization
//! - `metadata`: facet reads and writes
//! - `custom_fields`: definition-driven custom fields
//! - `errors`: error taxonomy and transport error classification
//!
//! # Concurrency
//!
//! A client caches the remote id and custom field definitions, and every
//! operation that may touch those caches takes `&mut self`. Share a client
//! across tasks only behind a lock; otherwise create one client per task.
//!
//! # Example
//!
//! ```ignore
//! use metadata_service_client::client::MetadataClient;
//! use metadata_service_client::core::types::EntityType;
//!
//! let mut client = MetadataClient::from_config(&adapter)?
//!     .with_entity(EntityType::COURSE, "42");
//!
//! client.create("keywords", "algebra".into()).await?;
//! let keywords = client.get_keywords().await?;
//! ```

mod custom_fields;
mod errors;
mod identity;
mod metadata;
mod paths;

pub use custom_fields::{
    CollectionAdd, CustomFieldDefinition, FieldShape, ItemOutcome, SetValueOutcome,
};
pub use errors::MetadataError;
pub use metadata::CreatedFacet;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::config::{AdapterConfig, ConfigError};
use crate::core::types::{EntityKey, EntityType, RemoteId};
use crate::transport::{create_transport, Transport};

/// Client for the metadata service, bound to one entity.
pub struct MetadataClient {
    transport: Arc<dyn Transport>,
    prefix: String,
    entity_type: Option<EntityType>,
    entity_id: Option<String>,
    entity_key: EntityKey,
    /// Remote id for `entity_key`, once known
    remote_id: Option<RemoteId>,
    /// Field definitions by name, never invalidated
    field_definitions: HashMap<String, CustomFieldDefinition>,
}

impl fmt::Debug for MetadataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataClient")
            .field("transport", &self.transport.name())
            .field("entity_type", &self.entity_type)
            .field("entity_key", &self.entity_key)
            .field("remote_id", &self.remote_id)
            .finish_non_exhaustive()
    }
}

impl MetadataClient {
    /// Create a client with no entity selected.
    pub fn new(transport: Arc<dyn Transport>, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            transport,
            entity_key: EntityKey::derive(&prefix, None),
            prefix,
            entity_type: None,
            entity_id: None,
            remote_id: None,
            field_definitions: HashMap::new(),
        }
    }

    /// Create a client from adapter configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the adapter is incomplete.
    pub fn from_config(adapter: &AdapterConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(create_transport(adapter)?, adapter.prefix()))
    }

    /// Select the entity (builder style).
    pub fn with_entity(
        mut self,
        entity_type: impl Into<EntityType>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.set_entity_type(entity_type);
        self.set_entity_id(entity_id);
        self
    }

    /// Set the entity type.
    pub fn set_entity_type(&mut self, entity_type: impl Into<EntityType>) -> &mut Self {
        self.entity_type = Some(entity_type.into());
        self.refresh_key();
        self
    }

    /// Set the entity id.
    ///
    /// A different entity key drops the cached remote id.
    pub fn set_entity_id(&mut self, entity_id: impl Into<String>) -> &mut Self {
        self.entity_id = Some(entity_id.into());
        self.refresh_key();
        self
    }

    fn refresh_key(&mut self) {
        let key = EntityKey::derive(&self.prefix, self.entity_id.as_deref());
        if key != self.entity_key {
            self.entity_key = key;
            self.remote_id = None;
        }
    }

    pub fn entity_type(&self) -> Option<&EntityType> {
        self.entity_type.as_ref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// The entity key the service knows this entity by.
    pub fn entity_guid(&self) -> &str {
        self.entity_key.as_str()
    }

    /// The cached remote id, without asking the service.
    pub fn remote_id(&self) -> Option<&RemoteId> {
        self.remote_id.as_ref()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use serde_json::json;

    use super::MetadataClient;
    use crate::core::types::EntityType;
    use crate::transport::mock::{MockReply, MockTransport};
    use crate::transport::Method;

    pub const REMOTE_ID: &str = "7f5c1a9e-3b2d-4c6f-9a8e-1d2c3b4a5f60";
    pub const LOOKUP_PATH: &str = "/v1/learningobject/entity_guid/h5p-42";

    /// Client for entity `h5p-42` over `transport`.
    pub fn client(transport: &MockTransport) -> MetadataClient {
        MetadataClient::new(Arc::new(transport.clone()), "h5p-")
            .with_entity(EntityType::LEARNING_OBJECT, "42")
    }

    /// Mock where entity `h5p-42` is already registered.
    pub fn registered() -> MockTransport {
        MockTransport::new().on(
            Method::Get,
            LOOKUP_PATH,
            MockReply::json(200, json!({ "id": REMOTE_ID })),
        )
    }

    pub fn facet_path(meta_type: &str) -> String {
        format!("/v1/learningobject/{}/{}", REMOTE_ID, meta_type)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::transport::mock::MockTransport;

    #[test]
    fn key_derived_from_prefix_and_id() {
        let client = client(&MockTransport::new());
        assert_eq!(client.entity_guid(), "h5p-42");
        assert_eq!(client.entity_type(), Some(&EntityType::LEARNING_OBJECT));
        assert_eq!(client.entity_id(), Some("42"));
    }

    #[test]
    fn uuid_entity_id_used_verbatim() {
        let mut client = client(&MockTransport::new());
        client.set_entity_id(REMOTE_ID);
        assert_eq!(client.entity_guid(), REMOTE_ID);
    }

    #[test]
    fn wrapped_uuid_entity_id_used_verbatim() {
        let braced = format!("{{{}}}", REMOTE_ID);
        let mut client = client(&MockTransport::new());
        client.set_entity_id(braced.as_str());
        assert_eq!(client.entity_guid(), braced);

        let urn = format!("urn:uuid:{}", REMOTE_ID);
        client.set_entity_id(urn.as_str());
        assert_eq!(client.entity_guid(), urn);
    }

    #[test]
    fn no_entity_id_gives_bare_prefix() {
        let client = MetadataClient::new(Arc::new(MockTransport::new()), "h5p-");
        assert_eq!(client.entity_guid(), "h5p-");
        assert!(client.remote_id().is_none());
    }

    #[test]
    fn debug_names_transport() {
        let client = client(&MockTransport::new());
        let debug = format!("{:?}", client);
        assert!(debug.contains("mock"));
        assert!(debug.contains("h5p-42"));
    }

    #[test]
    fn from_config_uses_prefix() {
        let adapter = AdapterConfig {
            base_url: Some("http://localhost:8080".to_string()),
            prefix: Some("course-".to_string()),
            ..Default::default()
        };
        let client = MetadataClient::from_config(&adapter)
            .unwrap()
            .with_entity(EntityType::COURSE, "7");
        assert_eq!(client.entity_guid(), "course-7");
        assert_eq!(client.transport().name(), "http");
    }
}
