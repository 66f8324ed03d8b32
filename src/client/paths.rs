//! client::paths
//!
//! URL paths of the metadata service API.
//!
//! Caller-supplied segments (entity guids, field names, record ids) are
//! percent-encoded; facet names come from a fixed table and are not.

use crate::core::types::{MetaType, RemoteId};

pub(crate) const CREATE_LEARNING_OBJECT: &str = "/v1/learningobject/create";
pub(crate) const KEYWORDS: &str = "/v1/keywords";
pub(crate) const FIELD_DEFINITIONS: &str = "/v2/field_definitions";

fn enc(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

pub(crate) fn entity_guid(guid: &str) -> String {
    format!("/v1/learningobject/entity_guid/{}", enc(guid))
}

pub(crate) fn facet(id: &RemoteId, meta_type: MetaType) -> String {
    format!("/v1/learningobject/{}/{}", enc(id.as_str()), meta_type)
}

pub(crate) fn facet_create(id: &RemoteId, meta_type: MetaType) -> String {
    format!("{}/create", facet(id, meta_type))
}

pub(crate) fn facet_record(id: &RemoteId, meta_type: MetaType, meta_id: &str) -> String {
    format!("{}/{}", facet(id, meta_type), enc(meta_id))
}

pub(crate) fn learning_object(guid: &str) -> String {
    format!("/v2/learning_objects/{}", enc(guid))
}

pub(crate) fn field_values(guid: &str) -> String {
    format!("{}/field_values", learning_object(guid))
}

pub(crate) fn field_value(guid: &str, field_name: &str) -> String {
    format!("{}/{}", field_values(guid), enc(field_name))
}

pub(crate) fn field_definition(field_name: &str) -> String {
    format!("{}/{}", FIELD_DEFINITIONS, enc(field_name))
}
