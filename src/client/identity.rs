//! client::identity
//!
//! Remote id resolution.
//!
//! The remote id for the current entity key is looked up once and memoized.
//! When the service does not know the key, the caller decides whether to
//! register the entity (`create = true`) or treat it as absent.

use serde_json::{json, Value};
use tracing::debug;

use super::errors::{decode, MetadataError};
use super::paths;
use super::MetadataClient;
use crate::core::types::RemoteId;
use crate::transport::{Request, Response};

impl MetadataClient {
    /// Resolve the remote id for the current entity.
    ///
    /// Returns the cached id without a network call when one is known.
    ///
    /// # Errors
    ///
    /// - [`MetadataError::NotFound`] if the entity is unknown and `create` is false
    /// - [`MetadataError::MalformedResponse`] if the service answers without an `id`
    /// - [`MetadataError::Transport`] for any other failure
    pub async fn resolve(&mut self, create: bool) -> Result<RemoteId, MetadataError> {
        if let Some(id) = &self.remote_id {
            return Ok(id.clone());
        }

        let id = match self.lookup().await? {
            Some(id) => id,
            None if create => self.create_identifier().await?,
            None => {
                return Err(MetadataError::NotFound(format!(
                    "entity '{}' has no metadata identifier",
                    self.entity_key
                )))
            }
        };

        self.remote_id = Some(id.clone());
        Ok(id)
    }

    /// Resolve the remote id without creating one; an unknown entity is `None`.
    pub async fn resolve_existing(&mut self) -> Result<Option<RemoteId>, MetadataError> {
        match self.resolve(false).await {
            Ok(id) => Ok(Some(id)),
            Err(MetadataError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn lookup(&self) -> Result<Option<RemoteId>, MetadataError> {
        let request = Request::get(paths::entity_guid(self.entity_key.as_str()));
        match self.transport.send(request).await {
            Ok(response) => parse_id(&response).map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Register the current entity with the service.
    pub(crate) async fn create_identifier(&self) -> Result<RemoteId, MetadataError> {
        debug!(entity = %self.entity_key, "registering entity");

        let body = json!({
            "entityType": self.entity_type.as_ref().map(|t| t.as_str()),
            "entityGuid": self.entity_key.as_str(),
        });
        let response = self
            .transport
            .send(Request::post(paths::CREATE_LEARNING_OBJECT, body))
            .await?;
        parse_id(&response)
    }
}

fn parse_id(response: &Response) -> Result<RemoteId, MetadataError> {
    let value: Value = decode(response)?;
    match value.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(RemoteId::new(id.clone())),
        _ => Err(MetadataError::MalformedResponse(
            "'id' is missing or not a string".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::testing::*;
    use super::*;
    use crate::transport::mock::{MockReply, MockTransport};
    use crate::transport::{Method, TransportError};

    const OTHER_ID: &str = "0b7e4c2a-9d1f-4e8b-8a6c-5f3e2d1c0b9a";

    #[tokio::test]
    async fn lookup_is_memoized() {
        let transport = registered();
        let mut client = client(&transport);

        let first = client.resolve(false).await.unwrap();
        let second = client.resolve(false).await.unwrap();

        assert_eq!(first.as_str(), REMOTE_ID);
        assert_eq!(first, second);
        assert_eq!(transport.request_count(), 1);
        assert_eq!(client.remote_id(), Some(&first));
    }

    #[tokio::test]
    async fn key_change_invalidates_cached_id() {
        let transport = registered().on(
            Method::Get,
            "/v1/learningobject/entity_guid/h5p-43",
            MockReply::json(200, json!({ "id": OTHER_ID })),
        );
        let mut client = client(&transport);

        assert_eq!(client.resolve(false).await.unwrap().as_str(), REMOTE_ID);

        client.set_entity_id("43");
        assert!(client.remote_id().is_none());
        assert_eq!(client.resolve(false).await.unwrap().as_str(), OTHER_ID);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn same_key_keeps_cached_id() {
        let transport = registered();
        let mut client = client(&transport);
        client.resolve(false).await.unwrap();

        client.set_entity_id("42");
        client.set_entity_type("course");
        assert!(client.remote_id().is_some());
    }

    #[tokio::test]
    async fn unknown_entity_without_create_is_not_found() {
        let transport = MockTransport::new();
        let mut client = client(&transport);

        assert!(matches!(
            client.resolve(false).await,
            Err(MetadataError::NotFound(_))
        ));
        assert_eq!(client.resolve_existing().await.unwrap(), None);
        assert!(transport
            .requests_to(Method::Post, paths::CREATE_LEARNING_OBJECT)
            .is_empty());
    }

    #[tokio::test]
    async fn unknown_entity_with_create_registers_and_caches() {
        let transport = MockTransport::new().on(
            Method::Post,
            paths::CREATE_LEARNING_OBJECT,
            MockReply::json(200, json!({ "id": REMOTE_ID })),
        );
        let mut client = client(&transport);

        let id = client.resolve(true).await.unwrap();
        assert_eq!(id.as_str(), REMOTE_ID);

        let created = transport.requests_to(Method::Post, paths::CREATE_LEARNING_OBJECT);
        assert_eq!(created.len(), 1);
        assert_eq!(
            created[0].body,
            Some(json!({ "entityType": "learningobject", "entityGuid": "h5p-42" }))
        );

        client.resolve(true).await.unwrap();
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn empty_lookup_body_is_malformed() {
        let transport = MockTransport::new().on(Method::Get, LOOKUP_PATH, MockReply::raw(200, ""));
        let mut client = client(&transport);

        assert!(matches!(
            client.resolve(false).await,
            Err(MetadataError::MalformedResponse(_))
        ));
        assert!(client.remote_id().is_none());
    }

    #[tokio::test]
    async fn non_string_id_is_malformed() {
        let transport = MockTransport::new()
            .on(Method::Get, LOOKUP_PATH, MockReply::status(404))
            .on(
                Method::Post,
                paths::CREATE_LEARNING_OBJECT,
                MockReply::json(200, json!({ "id": 17 })),
            );
        let mut client = client(&transport);

        assert!(matches!(
            client.resolve(true).await,
            Err(MetadataError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn server_error_keeps_status() {
        let transport = MockTransport::new().on(
            Method::Get,
            LOOKUP_PATH,
            MockReply::json(500, json!({ "message": "database down" })),
        );
        let mut client = client(&transport);

        let err = client.resolve(true).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("database down"));
    }

    #[tokio::test]
    async fn create_failure_propagates() {
        let transport = MockTransport::new().on(
            Method::Post,
            paths::CREATE_LEARNING_OBJECT,
            MockReply::fail(TransportError::Network("connection reset".into())),
        );
        let mut client = client(&transport);

        let err = client.resolve(true).await.unwrap_err();
        assert!(matches!(err, MetadataError::Transport { status: None, .. }));
    }
}
