//! core::types
//!
//! Strong types for metadata service domain concepts.
//!
//! # Types
//!
//! - [`MetaType`] - One of the fixed metadata facets and its wire property
//! - [`EntityType`] - Kind of content entity the metadata is attached to
//! - [`EntityKey`] - Caller-visible entity guid (raw UUID or prefix + id)
//! - [`RemoteId`] - Identifier issued by the metadata service
//!
//! # Examples
//!
//! ```
//! use metadata_service_client::core::types::{EntityKey, MetaType};
//!
//! let facet = MetaType::parse("subjects").unwrap();
//! assert_eq!(facet.property(), "subjectDeweyCode");
//! assert!(MetaType::parse("colour").is_err());
//!
//! let key = EntityKey::derive("h5p-", Some("42"));
//! assert_eq!(key.as_str(), "h5p-42");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown meta type '{0}'")]
    UnknownMetaType(String),
}

/// A metadata facet with a fixed wire-level property name.
///
/// The service stores each facet under a differently named JSON property,
/// so every read or write of a facet goes through [`MetaType::property`].
/// Unknown facet names cannot be represented.
///
/// Variants are declared in the order the service documents them, which is
/// also the iteration order of [`MetaType::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MetaType {
    EducationalStandard,
    EducationalUses,
    Keywords,
    Languages,
    LearningGoals,
    MaterialTypes,
    PrimaryUsers,
    Subjects,
    TargetAudience,
    EducationalLevel,
    EstimatedDuration,
    Difficulty,
    PublicStatus,
}

impl MetaType {
    /// Every facet known to the service.
    pub const ALL: [MetaType; 13] = [
        MetaType::EducationalStandard,
        MetaType::EducationalUses,
        MetaType::Keywords,
        MetaType::Languages,
        MetaType::LearningGoals,
        MetaType::MaterialTypes,
        MetaType::PrimaryUsers,
        MetaType::Subjects,
        MetaType::TargetAudience,
        MetaType::EducationalLevel,
        MetaType::EstimatedDuration,
        MetaType::Difficulty,
        MetaType::PublicStatus,
    ];

    /// Parse a public facet name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::UnknownMetaType` for names outside the table.
    pub fn parse(name: &str) -> Result<Self, TypeError> {
        Self::ALL
            .iter()
            .copied()
            .find(|meta_type| meta_type.as_str() == name)
            .ok_or_else(|| TypeError::UnknownMetaType(name.to_string()))
    }

    /// The public facet name, as used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaType::EducationalStandard => "educational_standards",
            MetaType::EducationalUses => "educational_uses",
            MetaType::Keywords => "keywords",
            MetaType::Languages => "languages",
            MetaType::LearningGoals => "learning_goals",
            MetaType::MaterialTypes => "material_types",
            MetaType::PrimaryUsers => "primary_users",
            MetaType::Subjects => "subjects",
            MetaType::TargetAudience => "target_audiences",
            MetaType::EducationalLevel => "levels",
            MetaType::EstimatedDuration => "estimated_duration",
            MetaType::Difficulty => "difficulty",
            MetaType::PublicStatus => "public",
        }
    }

    /// The JSON property the service expects for this facet.
    pub fn property(&self) -> &'static str {
        match self {
            MetaType::EducationalStandard => "educationalStandard",
            MetaType::EducationalUses => "educationalUse",
            MetaType::Keywords => "keyword",
            MetaType::Languages => "languageCode",
            MetaType::LearningGoals => "learningGoalId",
            MetaType::MaterialTypes => "materialType",
            MetaType::PrimaryUsers => "primaryUser",
            MetaType::Subjects => "subjectDeweyCode",
            MetaType::TargetAudience => "audience",
            MetaType::EducationalLevel => "level",
            MetaType::EstimatedDuration => "duration",
            MetaType::Difficulty => "difficulty",
            MetaType::PublicStatus => "is_public",
        }
    }

    /// Single-valued facets are created by posting to the facet URL itself
    /// rather than its `/create` sub-resource.
    pub fn uses_plain_create(&self) -> bool {
        matches!(
            self,
            MetaType::EstimatedDuration | MetaType::Difficulty | MetaType::PublicStatus
        )
    }
}

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for MetaType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for MetaType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MetaType {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MetaType> for String {
    fn from(value: MetaType) -> Self {
        value.as_str().to_string()
    }
}

/// The kind of content entity metadata is attached to.
///
/// The service accepts arbitrary entity types; the associated constants
/// cover the ones it knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(Cow<'static, str>);

impl EntityType {
    pub const ACTIVITY: EntityType = EntityType(Cow::Borrowed("activity"));
    pub const COURSE: EntityType = EntityType(Cow::Borrowed("course"));
    pub const LEARNING_GOAL: EntityType = EntityType(Cow::Borrowed("learninggoal"));
    pub const LEARNING_OBJECT: EntityType = EntityType(Cow::Borrowed("learningobject"));
    pub const MODULE: EntityType = EntityType(Cow::Borrowed("module"));
    pub const RESOURCE: EntityType = EntityType(Cow::Borrowed("resource"));
    pub const USER: EntityType = EntityType(Cow::Borrowed("user"));

    /// Get the entity type as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityType {
    fn from(value: &str) -> Self {
        EntityType(Cow::Owned(value.to_string()))
    }
}

impl From<String> for EntityType {
    fn from(value: String) -> Self {
        EntityType(Cow::Owned(value))
    }
}

/// The caller-side key that addresses an entity before it has a remote id.
///
/// An entity id that is already a UUID (see [`is_uuid`]) is used verbatim; any other
/// id is namespaced with the configured prefix. A missing id yields the bare
/// prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EntityKey(String);

impl EntityKey {
    /// Compute the key for an entity id under `prefix`.
    pub fn derive(prefix: &str, entity_id: Option<&str>) -> Self {
        match entity_id {
            Some(id) if is_uuid(id) => Self(id.to_string()),
            Some(id) => Self(format!("{}{}", prefix, id)),
            None => Self(prefix.to_string()),
        }
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wrappers ignored when checking for a UUID.
const UUID_WRAPPERS: [&str; 6] = ["urn:", "uuid:", "URN:", "UUID:", "{", "}"];

/// Check whether `value` is a hyphenated UUID.
///
/// Braced and URN spellings (`{...}`, `urn:uuid:...`) count; the 32 digit
/// simple form does not. The value itself is never rewritten.
pub fn is_uuid(value: &str) -> bool {
    let bare = UUID_WRAPPERS
        .iter()
        .fold(value.to_string(), |bare, wrapper| bare.replace(wrapper, ""));
    bare.len() == 36 && Uuid::try_parse(&bare).is_ok()
}

/// Identifier assigned to an entity by the metadata service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
