//! Search parameter compiler
//!
//! Turns validated [`SearchParams`] into a typed engine request. Laureates
//! are indexed as nested objects, so a top-level `multi_match` never sees
//! their fields; matching them needs a second clause scoped to the
//! `laureates` path. Both clauses sit under a `bool.should` so a hit on
//! either side is enough.

use crate::model::{SearchField, SearchParams, SortField, LAUREATES_PATH};
use nobel_es::{
    BoolQuery, Fuzziness, MultiMatchQuery, NestedQuery, Operator, Query, ScoreMode,
    SearchRequest, SortClause, SortOrder,
};

/// Compiles search parameters into engine search requests.
///
/// Pure and deterministic: equal parameters give equal requests.
pub struct QueryCompiler;

impl QueryCompiler {
    pub fn compile(params: &SearchParams) -> SearchRequest {
        let fields = params.effective_fields();

        let mut should = vec![Self::flat_clause(params.q(), &fields)];
        if let Some(nested) = Self::nested_clause(params.q(), &fields) {
            should.push(nested);
        }

        SearchRequest {
            query: Query::Bool(BoolQuery::should(should)),
            from: params.offset(),
            size: params.size() as usize,
            sort: Self::sort(params.sort_by(), params.sort_order().into()),
        }
    }

    fn flat_clause(q: &str, fields: &[SearchField]) -> Query {
        let boosted = fields
            .iter()
            .map(|f| format!("{}^{}", f.as_str(), f.boost()))
            .collect();
        Query::MultiMatch(Self::fuzzy_match(q, boosted))
    }

    fn nested_clause(q: &str, fields: &[SearchField]) -> Option<Query> {
        let laureate_fields: Vec<String> = fields
            .iter()
            .filter(|f| f.is_laureate())
            .map(|f| f.as_str().to_string())
            .collect();
        if laureate_fields.is_empty() {
            return None;
        }

        Some(Query::Nested(NestedQuery {
            path: LAUREATES_PATH.to_string(),
            query: Box::new(Query::MultiMatch(Self::fuzzy_match(q, laureate_fields))),
            score_mode: ScoreMode::Max,
        }))
    }

    fn fuzzy_match(q: &str, fields: Vec<String>) -> MultiMatchQuery {
        MultiMatchQuery::new(q, fields)
            .fuzziness(Fuzziness::Auto)
            .operator(Operator::Or)
    }

    fn sort(field: SortField, order: SortOrder) -> Vec<SortClause> {
        match field {
            SortField::Score => vec![SortClause::score(order)],
            other => vec![
                SortClause::new(other.engine_field(), order),
                SortClause::score(SortOrder::Desc),
            ],
        }
    }
}
