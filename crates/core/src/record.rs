//! Voicemail record and sentiment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::SearchField;

/// A single voicemail's metadata and transcript.
///
/// Only `id` is guaranteed. Every other field may be missing in storage and
/// is carried as `None` rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicemailRecord {
    /// Storage-assigned identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// When the voicemail was received
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Complaint type or similar label
    #[serde(default)]
    pub category: Option<String>,
    /// Geographic label
    #[serde(default)]
    pub region: Option<String>,
    /// Raw sentiment label as stored
    #[serde(default)]
    pub sentiment: Option<String>,
    /// Transcript body
    #[serde(default)]
    pub text: Option<String>,
}

impl VoicemailRecord {
    /// Create a record with only an id set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: None,
            category: None,
            region: None,
            sentiment: None,
            text: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_sentiment(mut self, sentiment: impl Into<String>) -> Self {
        self.sentiment = Some(sentiment.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Value of a searchable field, if present
    pub fn field(&self, field: SearchField) -> Option<&str> {
        match field {
            SearchField::Category => self.category.as_deref(),
            SearchField::Region => self.region.as_deref(),
            SearchField::Sentiment => self.sentiment.as_deref(),
            SearchField::Text => self.text.as_deref(),
        }
    }

    /// Sentiment bucket this record counts towards
    pub fn sentiment_bucket(&self) -> Sentiment {
        Sentiment::classify(self.sentiment.as_deref())
    }

    /// Category label, treating an empty string as absent
    pub fn category_label(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// Three-way sentiment bucket.
///
/// `Neutral` is the catch-all: missing and unrecognised labels land there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Bucket a raw sentiment label, case-insensitively
    pub fn classify(raw: Option<&str>) -> Self {
        match raw.map(str::to_lowercase).as_deref() {
            Some("positive") => Self::Positive,
            Some("negative") => Self::Negative,
            _ => Self::Neutral,
        }
    }
}
