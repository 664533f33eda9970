//! Index mapping definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of a create-index request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub mappings: Mappings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(default)]
    pub properties: BTreeMap<String, FieldMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, FieldMapping>>,
    /// Multi-fields: the same value indexed again under `<field>.<name>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, FieldMapping>>,
}

impl FieldMapping {
    /// Exact-value field, not analyzed
    pub fn keyword() -> Self {
        Self {
            field_type: "keyword".to_string(),
            analyzer: None,
            properties: None,
            fields: None,
        }
    }

    /// Full-text field with the given analyzer
    pub fn text(analyzer: &str) -> Self {
        Self {
            field_type: "text".to_string(),
            analyzer: Some(analyzer.to_string()),
            properties: None,
            fields: None,
        }
    }

    /// Array of objects indexed as independent hidden documents
    pub fn nested<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldMapping)>,
        K: Into<String>,
    {
        Self {
            field_type: "nested".to_string(),
            analyzer: None,
            properties: Some(properties.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            fields: None,
        }
    }

    /// Add a `keyword` sub-field so the field can be sorted and aggregated on
    pub fn with_keyword(mut self, name: &str) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), Self::keyword());
        self
    }

    pub fn is_nested(&self) -> bool {
        self.field_type == "nested"
    }
}

impl IndexDefinition {
    pub fn new<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldMapping)>,
        K: Into<String>,
    {
        Self {
            mappings: Mappings {
                properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            },
        }
    }
}
