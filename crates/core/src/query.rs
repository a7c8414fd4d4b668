//! Search filter, page request and page envelope
//!
//! The filter is a plain data structure rather than a backend query object so
//! that every store (MongoDB, in-memory) evaluates it the same way.

use serde::{Deserialize, Serialize};

use crate::record::VoicemailRecord;

/// Page used when the request carries none or an invalid one
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when the request carries none or an invalid one
pub const DEFAULT_LIMIT: u64 = 10;

/// Record fields covered by free-text search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Category,
    Region,
    Sentiment,
    Text,
}

impl SearchField {
    /// All searchable fields, in match order
    pub const ALL: [SearchField; 4] = [
        SearchField::Category,
        SearchField::Region,
        SearchField::Sentiment,
        SearchField::Text,
    ];

    /// Stored field name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Region => "region",
            Self::Sentiment => "sentiment",
            Self::Text => "text",
        }
    }
}

/// Case-insensitive substring match OR-ed across a set of fields.
///
/// A filter without a needle matches every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    needle: Option<String>,
    needle_lower: Option<String>,
    fields: Vec<SearchField>,
}

impl SearchFilter {
    /// Filter over all searchable fields. An empty string matches everything.
    pub fn new(search: &str) -> Self {
        Self::over_fields(search, SearchField::ALL.to_vec())
    }

    /// Filter restricted to the given fields
    pub fn over_fields(search: &str, fields: Vec<SearchField>) -> Self {
        let needle = (!search.is_empty()).then(|| search.to_string());
        Self {
            needle_lower: needle.as_deref().map(str::to_lowercase),
            needle,
            fields,
        }
    }

    /// Filter matching every record
    pub fn match_all() -> Self {
        Self::new("")
    }

    /// Search text as supplied, if any
    pub fn needle(&self) -> Option<&str> {
        self.needle.as_deref()
    }

    pub fn fields(&self) -> &[SearchField] {
        &self.fields
    }

    pub fn is_match_all(&self) -> bool {
        self.needle.is_none()
    }

    /// Evaluate the predicate against a record
    pub fn matches(&self, record: &VoicemailRecord) -> bool {
        let Some(needle) = self.needle_lower.as_deref() else {
            return true;
        };

        self.fields.iter().any(|field| {
            record
                .field(*field)
                .is_some_and(|value| value.to_lowercase().contains(needle))
        })
    }
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self::match_all()
    }
}

/// How much of the filtered set a request wants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// One page of `limit` records; `page` is 1-based
    Paged { page: u64, limit: u64 },
    /// Every matching record in a single page
    All,
}

impl PageRequest {
    /// Build a request from raw query-string values.
    ///
    /// Non-numeric or non-positive pages become page 1. A limit of exactly 0
    /// selects [`PageRequest::All`]; a missing, non-numeric or negative limit
    /// becomes [`DEFAULT_LIMIT`]. Numbers too large for `u64` saturate.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(parse_unsigned)
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);

        match limit.and_then(parse_unsigned) {
            Some(0) => Self::All,
            Some(limit) => Self::Paged { page, limit },
            None => Self::Paged {
                page,
                limit: DEFAULT_LIMIT,
            },
        }
    }

    /// Skip/limit window to read from storage
    pub fn window(&self) -> Window {
        match *self {
            Self::Paged { page, limit } => Window {
                skip: page.saturating_sub(1).saturating_mul(limit),
                limit: Some(limit),
            },
            Self::All => Window::unbounded(),
        }
    }

    /// Page number reported back to the caller
    pub fn page(&self) -> u64 {
        match *self {
            Self::Paged { page, .. } => page,
            Self::All => DEFAULT_PAGE,
        }
    }

    /// Number of pages needed to hold `total` records
    pub fn total_pages(&self, total: u64) -> u64 {
        match *self {
            Self::Paged { limit, .. } => total.div_ceil(limit),
            Self::All => 1,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::Paged {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Non-negative decimal integer, saturating at `u64::MAX`
fn parse_unsigned(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

/// Offset and optional cap applied to a sorted result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub limit: Option<u64>,
}

impl Window {
    pub fn unbounded() -> Self {
        Self {
            skip: 0,
            limit: None,
        }
    }

    /// Apply the window to an already sorted iterator
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let iter = items.into_iter().skip(skip);
        match self.limit {
            Some(limit) => iter
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => iter.collect(),
        }
    }
}

/// A listing request: what to match and how much of it to return
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: SearchFilter,
    pub page: PageRequest,
}

impl ListQuery {
    pub fn new(filter: SearchFilter, page: PageRequest) -> Self {
        Self { filter, page }
    }

    /// Build a query from raw request parameters, normalising bad input
    pub fn from_params(search: Option<&str>, page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            filter: SearchFilter::new(search.unwrap_or_default()),
            page: PageRequest::parse(page, limit),
        }
    }
}

/// Page envelope returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicemailPage {
    pub voicemails: Vec<VoicemailRecord>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

impl VoicemailPage {
    /// Wrap a slice of records with pagination metadata
    pub fn assemble(request: PageRequest, voicemails: Vec<VoicemailRecord>, total: u64) -> Self {
        Self {
            voicemails,
            total,
            page: request.page(),
            total_pages: request.total_pages(total),
        }
    }

    /// 1-based (first, last) positions of this page within the filtered set,
    /// or `(0, 0)` when the page is empty
    pub fn display_range(&self, request: PageRequest) -> (u64, u64) {
        if self.voicemails.is_empty() {
            return (0, 0);
        }
        let start = request.window().skip + 1;
        (start, start + self.voicemails.len() as u64 - 1)
    }
}
