//! Domain model: prize records, search parameters and results

mod prize;
mod search;
mod validation;

pub use prize::{is_valid_year, prize_id, validate_batch, Laureate, Prize};
pub use search::{
    RawSearchParams, ScoredPrize, SearchField, SearchParams, SearchParamsBuilder, SearchResult,
    SortField, SortOrder, DEFAULT_PAGE, DEFAULT_SIZE, LAUREATES_PATH, MAX_PAGE, MAX_SIZE,
};
pub use validation::{FieldError, ValidationError, ValidationKind};
pub(crate) use validation::Validator;
