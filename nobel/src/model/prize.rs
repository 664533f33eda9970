//! Prize and laureate records

use super::validation::{ValidationError, ValidationKind, Validator};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static YEAR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn year_pattern() -> &'static Regex {
    YEAR_PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4}$").expect("year pattern is valid"))
}

/// Whether `year` is exactly four ASCII decimal digits
pub fn is_valid_year(year: &str) -> bool {
    year_pattern().is_match(year)
}

/// Document identifier of a prize: `"{year}_{category}"`
pub fn prize_id(year: &str, category: &str) -> String {
    format!("{}_{}", year, category)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laureate {
    pub id: String,
    pub firstname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<String>,
}

/// A prize awarded in one category in one year.
///
/// The laureate list is embedded; laureates have no lifecycle of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub year: String,
    pub category: String,
    pub laureates: Vec<Laureate>,
}

impl Prize {
    pub fn id(&self) -> String {
        prize_id(&self.year, &self.category)
    }

    /// Check the record before it is written to the index
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::default();
        self.validate_into(&mut v, "");
        v.finish()
    }

    /// Push this record's field errors, naming fields under `prefix`
    pub(crate) fn validate_into(&self, v: &mut Validator, prefix: &str) {
        if !is_valid_year(&self.year) {
            v.push(
                format!("{prefix}year"),
                ValidationKind::InvalidFormat,
                format!("year must be four digits, got {:?}", self.year),
            );
        }
        if self.category.trim().is_empty() {
            v.push(
                format!("{prefix}category"),
                ValidationKind::Missing,
                "category is required",
            );
        }
        for (i, laureate) in self.laureates.iter().enumerate() {
            if laureate.id.trim().is_empty() {
                v.push(
                    format!("{prefix}laureates[{i}].id"),
                    ValidationKind::Missing,
                    "laureate id is required",
                );
            }
            if laureate.firstname.trim().is_empty() {
                v.push(
                    format!("{prefix}laureates[{i}].firstname"),
                    ValidationKind::Missing,
                    "laureate firstname is required",
                );
            }
        }
    }
}

/// Validate a batch as a whole; any bad record rejects the batch
pub fn validate_batch(prizes: &[Prize]) -> Result<(), ValidationError> {
    let mut v = Validator::default();
    for (i, prize) in prizes.iter().enumerate() {
        prize.validate_into(&mut v, &format!("[{i}]."));
    }
    v.finish()
}
