//! client::custom_fields
//!
//! Custom fields and the learning object representation.
//!
//! # Field Shapes
//!
//! A custom field is declared in the service with a [`CustomFieldDefinition`].
//! The definition decides how values are written:
//!
//! - [`FieldShape::Scalar`]: one value, replaced with `PUT`
//! - [`FieldShape::Collection`]: many values, each added with its own `POST`
//!
//! Definitions are fetched lazily and cached for the lifetime of the client.
//!
//! # Collection Adds
//!
//! Adding collection values is best-effort. Each value is posted on its own
//! and the outcome of every post is reported in a [`CollectionAdd`]; a failed
//! post does not stop the others. With deduplication, values that already
//! exist remotely or repeat within the input are skipped and reported.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use tracing::{debug, error, warn};

use super::errors::{decode, MetadataError};
use super::paths;
use super::MetadataClient;
use crate::core::types::EntityType;
use crate::transport::Request;

/// Definition of a custom field as stored in the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(default)]
    pub requires_unique_values: bool,
    /// Any further properties the service returns
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How values of a field are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Scalar,
    Collection,
}

impl CustomFieldDefinition {
    pub fn shape(&self) -> FieldShape {
        if self.is_collection {
            FieldShape::Collection
        } else {
            FieldShape::Scalar
        }
    }
}

/// Outcome of posting one collection value.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// The value that was posted
    pub value: Value,
    /// The created record, or why it was not created
    pub result: Result<Value, MetadataError>,
}

impl Serialize for ItemOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ItemOutcome", 3)?;
        state.serialize_field("value", &self.value)?;
        match &self.result {
            Ok(record) => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("record", record)?;
            }
            Err(err) => {
                state.serialize_field("ok", &false)?;
                state.serialize_field("error", &err.to_string())?;
            }
        }
        state.end()
    }
}

/// Result of adding values to a collection field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionAdd {
    /// Values not posted because they already existed or repeated
    pub skipped: Vec<Value>,
    /// One entry per posted value, in input order
    pub items: Vec<ItemOutcome>,
}

impl CollectionAdd {
    /// Records created successfully.
    pub fn created(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().filter_map(|item| item.result.as_ref().ok())
    }

    /// Values whose post failed.
    pub fn failed(&self) -> impl Iterator<Item = &Value> {
        self.items
            .iter()
            .filter(|item| item.result.is_err())
            .map(|item| &item.value)
    }

    /// Whether every posted value was created.
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|item| item.result.is_ok())
    }
}

/// Result of [`MetadataClient::set_value`], by field shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SetValueOutcome {
    /// The stored value record of a scalar field
    Scalar(Value),
    /// The collection add, `None` when nothing could be attempted
    Collection(Option<CollectionAdd>),
}

fn require_field_name(field_name: &str) -> Result<(), MetadataError> {
    if field_name.trim().is_empty() {
        return Err(MetadataError::InvalidArgument(
            "field name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn expect_array(value: Value, what: &str) -> Result<Vec<Value>, MetadataError> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(MetadataError::MalformedResponse(format!(
            "{} was expected to be an array",
            what
        ))),
    }
}

impl MetadataClient {
    /// Get a field definition, `None` if the field is not defined.
    pub async fn get_definition(
        &mut self,
        field_name: &str,
    ) -> Result<Option<CustomFieldDefinition>, MetadataError> {
        require_field_name(field_name)?;
        if let Some(definition) = self.field_definitions.get(field_name) {
            return Ok(Some(definition.clone()));
        }

        let request = Request::get(paths::field_definition(field_name));
        let definition: CustomFieldDefinition = match self.transport.send(request).await {
            Ok(response) => decode(&response)?,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        self.field_definitions
            .insert(field_name.to_string(), definition.clone());
        Ok(Some(definition))
    }

    /// Declare a new custom field.
    pub async fn define_field(
        &mut self,
        field_name: &str,
        data_type: &str,
        is_collection: bool,
        requires_unique_values: bool,
    ) -> Result<CustomFieldDefinition, MetadataError> {
        require_field_name(field_name)?;

        let body = json!({
            "name": field_name,
            "dataType": data_type,
            "isCollection": is_collection,
            "requiresUniqueValues": requires_unique_values,
        });
        let response = self
            .transport
            .send(Request::post(paths::FIELD_DEFINITIONS, body))
            .await?;
        let definition: CustomFieldDefinition = decode(&response)?;

        self.field_definitions
            .insert(field_name.to_string(), definition.clone());
        Ok(definition)
    }

    /// The values of a field for the current entity.
    pub async fn get_values(&self, field_name: &str) -> Result<Vec<Value>, MetadataError> {
        let request = Request::get(paths::field_values(self.entity_key.as_str()))
            .with_query("fieldName", field_name);
        let response = self.transport.send(request).await?;
        let records = expect_array(decode(&response)?, "field values")?;

        Ok(records
            .iter()
            .filter_map(|record| record.get("value").cloned())
            .collect())
    }

    /// Set a field's value according to its definition.
    ///
    /// Collection fields add `value` (a single value or an array) with
    /// [`add_collection_values`](Self::add_collection_values); scalar fields
    /// replace the stored value.
    ///
    /// # Errors
    ///
    /// - [`MetadataError::FieldNotDefined`] if the field has no definition
    /// - [`MetadataError::Transport`] if a scalar value cannot be stored
    pub async fn set_value(
        &mut self,
        field_name: &str,
        value: Value,
        deduplicate: bool,
    ) -> Result<SetValueOutcome, MetadataError> {
        let definition = self
            .get_definition(field_name)
            .await?
            .ok_or_else(|| MetadataError::FieldNotDefined(field_name.to_string()))?;

        match definition.shape() {
            FieldShape::Collection => Ok(SetValueOutcome::Collection(
                self.add_collection_values(field_name, value, deduplicate)
                    .await,
            )),
            FieldShape::Scalar => {
                let request = Request::put(
                    paths::field_value(self.entity_key.as_str(), field_name),
                    json!({ "value": value }),
                );
                let response = self.transport.send(request).await?;
                Ok(SetValueOutcome::Scalar(decode(&response)?))
            }
        }
    }

    /// Add values to a collection field, one post per value.
    ///
    /// Returns `None` when there is nothing to add (empty field name or null
    /// value) or when existing values could not be fetched for
    /// deduplication. Individual post failures are logged and reported in
    /// the returned [`CollectionAdd`].
    pub async fn add_collection_values(
        &self,
        field_name: &str,
        values: Value,
        deduplicate: bool,
    ) -> Option<CollectionAdd> {
        if field_name.is_empty() || values.is_null() {
            return None;
        }

        let values = match values {
            Value::Array(items) => items,
            single => vec![single],
        };

        let mut outcome = CollectionAdd::default();
        let candidates = if deduplicate {
            let existing = match self.get_values(field_name).await {
                Ok(existing) => existing,
                Err(err) => {
                    error!(field = field_name, error = %err, "failed to fetch existing field values");
                    return None;
                }
            };

            let mut unique: Vec<Value> = Vec::with_capacity(values.len());
            for value in values {
                if existing.contains(&value) || unique.contains(&value) {
                    outcome.skipped.push(value);
                } else {
                    unique.push(value);
                }
            }
            unique
        } else {
            values
        };

        debug!(
            field = field_name,
            count = candidates.len(),
            skipped = outcome.skipped.len(),
            "adding collection values"
        );

        for value in candidates {
            let result = self.post_collection_value(field_name, &value).await;
            if let Err(err) = &result {
                warn!(field = field_name, error = %err, "failed to add collection value");
            }
            outcome.items.push(ItemOutcome { value, result });
        }

        Some(outcome)
    }

    async fn post_collection_value(
        &self,
        field_name: &str,
        value: &Value,
    ) -> Result<Value, MetadataError> {
        let request = Request::post(
            paths::field_values(self.entity_key.as_str()),
            json!({ "name": field_name, "value": value }),
        );
        let response = self.transport.send(request).await?;
        decode(&response)
    }

    /// Every custom field value of the current entity.
    pub async fn fetch_all(&self) -> Result<Vec<Value>, MetadataError> {
        let request = Request::get(paths::field_values(self.entity_key.as_str()));
        match self.transport.send(request).await {
            Ok(response) => expect_array(decode(&response)?, "field values"),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// The entity's learning object representation.
    ///
    /// When the service does not know the entity and `create` is set, the
    /// entity is registered as a resource and fetched once more.
    pub async fn get_or_create_learning_object(
        &mut self,
        create: bool,
    ) -> Result<Option<Value>, MetadataError> {
        match self.fetch_learning_object().await {
            Ok(object) => Ok(Some(object)),
            Err(err) if err.is_not_found() && create => {
                self.set_entity_type(EntityType::RESOURCE);
                let id = self.create_identifier().await?;
                self.remote_id = Some(id);
                self.fetch_learning_object().await.map(Some)
            }
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn fetch_learning_object(&self) -> Result<Value, MetadataError> {
        let request = Request::get(paths::learning_object(self.entity_key.as_str()));
        let response = self.transport.send(request).await?;
        match decode(&response)? {
            object @ Value::Object(_) => Ok(object),
            _ => Err(MetadataError::MalformedResponse(
                "learning object was expected to be an object".to_string(),
            )),
        }
    }
}
