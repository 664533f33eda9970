//! Search parameters and results

use super::prize::Prize;
use super::validation::{ValidationError, ValidationKind, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_SIZE: u32 = 10;
pub const MAX_SIZE: u32 = 100;
pub const MAX_PAGE: u32 = u32::MAX;

/// Path of the nested laureate objects inside a prize document
pub const LAUREATES_PATH: &str = "laureates";

/// The fixed set of searchable fields, in boost order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SearchField {
    #[serde(rename = "laureates.firstname")]
    LaureateFirstname,
    #[serde(rename = "laureates.surname")]
    LaureateSurname,
    #[serde(rename = "laureates.motivation")]
    LaureateMotivation,
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "year")]
    Year,
}

impl SearchField {
    pub const ALL: [SearchField; 5] = [
        SearchField::LaureateFirstname,
        SearchField::LaureateSurname,
        SearchField::LaureateMotivation,
        SearchField::Category,
        SearchField::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LaureateFirstname => "laureates.firstname",
            Self::LaureateSurname => "laureates.surname",
            Self::LaureateMotivation => "laureates.motivation",
            Self::Category => "category",
            Self::Year => "year",
        }
    }

    /// Relevance weight of a match in this field
    pub fn boost(self) -> u32 {
        match self {
            Self::LaureateFirstname | Self::LaureateSurname => 3,
            Self::LaureateMotivation => 2,
            Self::Category | Self::Year => 1,
        }
    }

    /// Whether the field lives inside the nested laureate list
    pub fn is_laureate(self) -> bool {
        matches!(
            self,
            Self::LaureateFirstname | Self::LaureateSurname | Self::LaureateMotivation
        )
    }

    fn valid_list() -> String {
        Self::ALL.map(|f| f.as_str()).join(", ")
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid field: {}. Valid fields are: {}",
                    s,
                    Self::valid_list()
                )
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Score,
    Year,
    Category,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Year => "year",
            Self::Category => "category",
        }
    }

    /// Name of the indexed field the engine sorts on.
    ///
    /// `category` is analyzed text, so it sorts on its keyword sub-field.
    pub fn engine_field(self) -> &'static str {
        match self {
            Self::Score => nobel_es::query::SCORE_FIELD,
            Self::Year => "year",
            Self::Category => "category.keyword",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "score" => Ok(Self::Score),
            "year" => Ok(Self::Year),
            "category" => Ok(Self::Category),
            other => Err(format!(
                "unknown sort field: {other} (expected score, year or category)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order: {other} (expected asc or desc)")),
        }
    }
}

impl From<SortOrder> for nobel_es::SortOrder {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => nobel_es::SortOrder::Asc,
            SortOrder::Desc => nobel_es::SortOrder::Desc,
        }
    }
}

/// Search parameters exactly as they arrived on the query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSearchParams {
    pub q: Option<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl RawSearchParams {
    /// Collect decoded query-string pairs.
    ///
    /// `include`/`exclude` may repeat and may hold comma-separated lists.
    /// For scalar keys the last occurrence wins. Unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut raw = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "q" => raw.q = Some(value),
                "include" => raw.include.extend(split_list(&value)),
                "exclude" => raw.exclude.extend(split_list(&value)),
                "page" => raw.page = Some(value),
                "size" => raw.size = Some(value),
                "sort_by" => raw.sort_by = Some(value),
                "sort_order" => raw.sort_order = Some(value),
                _ => {}
            }
        }
        raw
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Validated search parameters.
///
/// Only constructible through [`SearchParams::builder`] or
/// [`SearchParams::from_raw`], so every instance satisfies the range and
/// field-set invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    q: String,
    include: Option<Vec<SearchField>>,
    exclude: Option<Vec<SearchField>>,
    page: u32,
    size: u32,
    sort_by: SortField,
    sort_order: SortOrder,
}

impl SearchParams {
    pub fn builder(q: impl Into<String>) -> SearchParamsBuilder {
        SearchParamsBuilder {
            q: q.into(),
            include: None,
            exclude: None,
            page: i64::from(DEFAULT_PAGE),
            size: i64::from(DEFAULT_SIZE),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }

    /// Parse and validate raw query-string values, reporting every problem
    pub fn from_raw(raw: &RawSearchParams) -> Result<Self, ValidationError> {
        let mut v = Validator::default();

        let builder = SearchParamsBuilder {
            q: raw.q.clone().unwrap_or_default(),
            include: parse_fields(&mut v, "include", &raw.include),
            exclude: parse_fields(&mut v, "exclude", &raw.exclude),
            page: parse_number(&mut v, "page", raw.page.as_deref(), DEFAULT_PAGE),
            size: parse_number(&mut v, "size", raw.size.as_deref(), DEFAULT_SIZE),
            sort_by: parse_token(&mut v, "sort_by", raw.sort_by.as_deref()),
            sort_order: parse_token(&mut v, "sort_order", raw.sort_order.as_deref()),
        };

        builder.check(&mut v);
        v.finish()?;
        Ok(builder.into_params())
    }

    pub fn q(&self) -> &str {
        &self.q
    }

    pub fn include(&self) -> Option<&[SearchField]> {
        self.include.as_deref()
    }

    pub fn exclude(&self) -> Option<&[SearchField]> {
        self.exclude.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort_by(&self) -> SortField {
        self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Number of hits skipped before the requested page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.size as usize
    }

    /// Fields actually searched, in boost order
    pub fn effective_fields(&self) -> Vec<SearchField> {
        effective_fields(self.include.as_deref(), self.exclude.as_deref())
    }
}

/// `include ∖ exclude`, with an absent or empty `include` meaning every field
fn effective_fields(
    include: Option<&[SearchField]>,
    exclude: Option<&[SearchField]>,
) -> Vec<SearchField> {
    let include = match include {
        Some(fields) if !fields.is_empty() => fields,
        _ => &SearchField::ALL[..],
    };
    let exclude = exclude.unwrap_or(&[]);
    SearchField::ALL
        .into_iter()
        .filter(|f| include.contains(f) && !exclude.contains(f))
        .collect()
}

#[derive(Debug, Clone)]
pub struct SearchParamsBuilder {
    q: String,
    include: Option<Vec<SearchField>>,
    exclude: Option<Vec<SearchField>>,
    page: i64,
    size: i64,
    sort_by: SortField,
    sort_order: SortOrder,
}

impl SearchParamsBuilder {
    pub fn include(mut self, fields: impl IntoIterator<Item = SearchField>) -> Self {
        self.include = Some(fields.into_iter().collect());
        self
    }

    pub fn exclude(mut self, fields: impl IntoIterator<Item = SearchField>) -> Self {
        self.exclude = Some(fields.into_iter().collect());
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = field;
        self.sort_order = order;
        self
    }

    pub fn build(self) -> Result<SearchParams, ValidationError> {
        let mut v = Validator::default();
        self.check(&mut v);
        v.finish()?;
        Ok(self.into_params())
    }

    fn check(&self, v: &mut Validator) {
        if self.q.trim().is_empty() {
            v.push("q", ValidationKind::Missing, "search term is required");
        }
        if !(1..=i64::from(MAX_PAGE)).contains(&self.page) {
            v.push(
                "page",
                ValidationKind::InvalidRange,
                format!("page must be between 1 and {}, got {}", MAX_PAGE, self.page),
            );
        }
        if !(1..=i64::from(MAX_SIZE)).contains(&self.size) {
            v.push(
                "size",
                ValidationKind::InvalidRange,
                format!("size must be between 1 and {}, got {}", MAX_SIZE, self.size),
            );
        }
        if effective_fields(self.include.as_deref(), self.exclude.as_deref()).is_empty() {
            v.push(
                "exclude",
                ValidationKind::InvalidField,
                "no searchable fields remain after exclusions",
            );
        }
    }

    /// Only called after `check` found nothing; the fallbacks never apply
    fn into_params(self) -> SearchParams {
        SearchParams {
            page: u32::try_from(self.page).unwrap_or(DEFAULT_PAGE),
            size: u32::try_from(self.size).unwrap_or(DEFAULT_SIZE),
            q: self.q,
            include: self.include,
            exclude: self.exclude,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }
}

fn parse_fields(v: &mut Validator, name: &str, raw: &[String]) -> Option<Vec<SearchField>> {
    if raw.is_empty() {
        return None;
    }
    let mut fields = Vec::with_capacity(raw.len());
    for entry in raw {
        match entry.parse::<SearchField>() {
            Ok(field) => fields.push(field),
            Err(message) => v.push(name, ValidationKind::InvalidField, message),
        }
    }
    Some(fields)
}

fn parse_number(v: &mut Validator, name: &str, raw: Option<&str>, default: u32) -> i64 {
    match raw.map(str::trim) {
        None | Some("") => i64::from(default),
        Some(text) => text.parse::<i64>().unwrap_or_else(|_| {
            v.push(
                name,
                ValidationKind::InvalidFormat,
                format!("{name} must be an integer, got {text:?}"),
            );
            i64::from(default)
        }),
    }
}

fn parse_token<T>(v: &mut Validator, name: &str, raw: Option<&str>) -> T
where
    T: FromStr<Err = String> + Default,
{
    match raw.map(str::trim) {
        None | Some("") => T::default(),
        Some(text) => text.parse().unwrap_or_else(|message| {
            v.push(name, ValidationKind::InvalidEnum, message);
            T::default()
        }),
    }
}

/// A prize together with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPrize {
    #[serde(flatten)]
    pub prize: Prize,
    pub score: f32,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matches reported by the engine, before any records were dropped
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub results: Vec<ScoredPrize>,
}
