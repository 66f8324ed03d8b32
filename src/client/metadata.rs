//! client::metadata
//!
//! Facet operations.
//!
//! Every facet name goes through [`MetaType`] before anything is sent, so an
//! unknown name fails as a caller error with no network traffic. Writes wrap
//! the value in the facet's wire property: `{"subjectDeweyCode": "510"}`.

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::errors::{decode, decode_non_empty, MetadataError};
use super::paths;
use super::MetadataClient;
use crate::core::types::{MetaType, RemoteId};
use crate::transport::Request;

/// Records created for one facet by [`MetadataClient::create_from_array`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CreatedFacet {
    /// The input was a single object.
    One(Value),
    /// The input was a list; one record per element.
    Many(Vec<Value>),
}

fn property_body(meta_type: MetaType, data: Value) -> Value {
    let mut body = Map::new();
    body.insert(meta_type.property().to_string(), data);
    Value::Object(body)
}

fn require_meta_id(meta_id: &str) -> Result<(), MetadataError> {
    if meta_id.trim().is_empty() {
        return Err(MetadataError::InvalidArgument(
            "meta id must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl MetadataClient {
    /// Read one facet.
    ///
    /// Returns `None` when the entity is not registered or the service has
    /// nothing stored for the facet.
    pub async fn get(&mut self, meta_type: impl AsRef<str>) -> Result<Option<Value>, MetadataError> {
        let meta_type = MetaType::parse(meta_type.as_ref())?;
        let Some(id) = self.resolve_existing().await? else {
            return Ok(None);
        };

        match self.transport.send(Request::get(paths::facet(&id, meta_type))).await {
            Ok(response) => decode(&response).map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Read every facet concurrently.
    ///
    /// Facets whose request fails or whose body cannot be decoded are logged
    /// and left out; only failing to resolve the entity fails the call.
    pub async fn get_all(&mut self) -> Result<BTreeMap<MetaType, Value>, MetadataError> {
        let id = self.resolve(false).await?;
        let transport = &self.transport;

        let requests = MetaType::ALL.iter().map(|&meta_type| {
            let request = Request::get(paths::facet(&id, meta_type));
            async move { (meta_type, transport.send(request).await) }
        });

        let mut facets = BTreeMap::new();
        for (meta_type, outcome) in join_all(requests).await {
            let decoded = outcome
                .map_err(MetadataError::from)
                .and_then(|response| decode::<Value>(&response));
            match decoded {
                Ok(Value::Null) => {
                    warn!(meta_type = %meta_type, "metadata facet response was empty");
                }
                Ok(value) => {
                    facets.insert(meta_type, value);
                }
                Err(err) => {
                    warn!(meta_type = %meta_type, error = %err, "metadata facet missing from response");
                }
            }
        }

        Ok(facets)
    }

    /// Store a facet value, registering the entity if needed.
    ///
    /// # Errors
    ///
    /// - [`MetadataError::UnknownMetaType`] before any request is sent
    /// - [`MetadataError::MalformedResponse`] if the service returns no record
    pub async fn create(
        &mut self,
        meta_type: impl AsRef<str>,
        data: Value,
    ) -> Result<Value, MetadataError> {
        let meta_type = MetaType::parse(meta_type.as_ref())?;
        let id = self.resolve(true).await?;
        self.create_for(&id, meta_type, data).await
    }

    async fn create_for(
        &self,
        id: &RemoteId,
        meta_type: MetaType,
        data: Value,
    ) -> Result<Value, MetadataError> {
        let path = if meta_type.uses_plain_create() {
            paths::facet(id, meta_type)
        } else {
            paths::facet_create(id, meta_type)
        };

        let response = self
            .transport
            .send(Request::post(path, property_body(meta_type, data)))
            .await?;
        decode_non_empty(&response)
    }

    /// Store several facets from a map of facet name to record(s).
    ///
    /// Each value is either an object carrying the facet's wire property or a
    /// list of such objects. Elements without the property are skipped, as are
    /// facets for which nothing was created.
    ///
    /// # Errors
    ///
    /// Fails on the first unknown facet name (before any request) or the first
    /// failed create.
    pub async fn create_from_array(
        &mut self,
        data: &Map<String, Value>,
    ) -> Result<BTreeMap<MetaType, CreatedFacet>, MetadataError> {
        let entries = data
            .iter()
            .map(|(name, value)| Ok((MetaType::parse(name)?, value)))
            .collect::<Result<Vec<_>, MetadataError>>()?;

        let id = self.resolve(true).await?;
        let mut created = BTreeMap::new();

        for (meta_type, value) in entries {
            let property = meta_type.property();
            match value {
                Value::Array(items) if !items.is_empty() => {
                    let mut records = Vec::new();
                    for item in items {
                        if let Some(data) = item.get(property) {
                            records.push(self.create_for(&id, meta_type, data.clone()).await?);
                        }
                    }
                    if !records.is_empty() {
                        created.insert(meta_type, CreatedFacet::Many(records));
                    }
                }
                Value::Object(object) => {
                    if let Some(data) = object.get(property) {
                        let record = self.create_for(&id, meta_type, data.clone()).await?;
                        created.insert(meta_type, CreatedFacet::One(record));
                    }
                }
                _ => {}
            }
        }

        Ok(created)
    }

    /// Delete a facet record.
    ///
    /// Returns `false` when the entity or the record does not exist.
    pub async fn delete(
        &mut self,
        meta_type: impl AsRef<str>,
        meta_id: &str,
    ) -> Result<bool, MetadataError> {
        let meta_type = MetaType::parse(meta_type.as_ref())?;
        require_meta_id(meta_id)?;
        let Some(id) = self.resolve_existing().await? else {
            return Ok(false);
        };

        let request = Request::delete(paths::facet_record(&id, meta_type, meta_id));
        match self.transport.send(request).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Replace a facet record's value.
    pub async fn update(
        &mut self,
        meta_type: impl AsRef<str>,
        meta_id: &str,
        data: Value,
    ) -> Result<Value, MetadataError> {
        let meta_type = MetaType::parse(meta_type.as_ref())?;
        require_meta_id(meta_id)?;
        let id = self.resolve(false).await?;

        let request = Request::put(
            paths::facet_record(&id, meta_type, meta_id),
            property_body(meta_type, data),
        );
        let response = self.transport.send(request).await?;
        decode_non_empty(&response)
    }

    /// Attach a learning goal.
    pub async fn add_goal(&mut self, goal_id: &str) -> Result<Value, MetadataError> {
        self.create(MetaType::LearningGoals, Value::String(goal_id.to_string()))
            .await
    }

    /// The entity's keywords.
    pub async fn get_keywords(&mut self) -> Result<Vec<Value>, MetadataError> {
        match self.get(MetaType::Keywords).await? {
            None => Ok(Vec::new()),
            Some(Value::Array(records)) => Ok(records
                .iter()
                .filter_map(|record| record.get(MetaType::Keywords.property()).cloned())
                .collect()),
            Some(_) => Err(MetadataError::MalformedResponse(
                "keywords were expected to be an array".to_string(),
            )),
        }
    }

    /// Search all keywords known to the service by prefix.
    pub async fn search_for_keywords(&self, text: &str) -> Result<Value, MetadataError> {
        let request = Request::get(paths::KEYWORDS).with_query("prefix", text);
        let response = self.transport.send(request).await?;
        decode(&response)
    }
}
