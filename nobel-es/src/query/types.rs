//! Elasticsearch Query DSL types
//!
//! These types represent the subset of the ES Query DSL the service emits.
//! They serialize to exactly the JSON the `_search` endpoint expects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relevance pseudo-field used in sort clauses
pub const SCORE_FIELD: &str = "_score";

/// Root ES search request body
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchRequest {
    /// The query to execute
    pub query: Query,

    /// Starting offset
    pub from: usize,

    /// Maximum number of results
    pub size: usize,

    /// Sort order, most significant key first
    #[serde(default)]
    pub sort: Vec<SortClause>,
}

/// ES Query types
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Multi-match across multiple fields
    MultiMatch(MultiMatchQuery),

    /// Bool query; only `should` is emitted
    Bool(BoolQuery),

    /// Query scoped to a nested object path
    Nested(NestedQuery),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    /// Field names, optionally suffixed with `^boost`
    pub fields: Vec<String>,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<Fuzziness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
}

impl MultiMatchQuery {
    pub fn new(query: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            query: query.into(),
            fields,
            match_type: MatchType::BestFields,
            fuzziness: None,
            operator: None,
        }
    }

    pub fn fuzziness(mut self, fuzziness: Fuzziness) -> Self {
        self.fuzziness = Some(fuzziness);
        self
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    BestFields,
}

/// Edit-distance tolerance for fuzzy matching; the engine scales the
/// distance to the term length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Fuzziness {
    #[serde(rename = "AUTO")]
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Or,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BoolQuery {
    #[serde(default)]
    pub should: Vec<Query>,
}

impl BoolQuery {
    /// A disjunction over `clauses`
    pub fn should(clauses: Vec<Query>) -> Self {
        Self { should: clauses }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NestedQuery {
    pub path: String,
    pub query: Box<Query>,
    pub score_mode: ScoreMode,
}

/// How scores of matching nested objects combine into the parent's score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SortOptions {
    pub order: SortOrder,
}

/// A single sort key, serialized as `{"<field>": {"order": "<asc|desc>"}}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(
    into = "BTreeMap<String, SortOptions>",
    try_from = "BTreeMap<String, SortOptions>"
)]
pub struct SortClause {
    pub field: String,
    pub order: SortOrder,
}

impl SortClause {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Sort by relevance
    pub fn score(order: SortOrder) -> Self {
        Self::new(SCORE_FIELD, order)
    }
}

impl From<SortClause> for BTreeMap<String, SortOptions> {
    fn from(clause: SortClause) -> Self {
        BTreeMap::from([(clause.field, SortOptions { order: clause.order })])
    }
}

impl TryFrom<BTreeMap<String, SortOptions>> for SortClause {
    type Error = String;

    fn try_from(map: BTreeMap<String, SortOptions>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "sort clause must name exactly one field, got {}",
                map.len()
            ));
        }
        let (field, options) = map
            .into_iter()
            .next()
            .ok_or_else(|| "empty sort clause".to_string())?;
        Ok(SortClause::new(field, options.order))
    }
}
