//! Core types for the civic intel voicemail dashboard
//!
//! This crate provides the storage-agnostic pieces shared by every other crate:
//! - The voicemail record and sentiment bucketing
//! - The declarative search filter and page request modes
//! - The page envelope returned to clients
//! - Sentiment aggregation for the insights view

pub mod insights;
pub mod query;
pub mod record;

pub use insights::{compute_insights, Insights, SentimentCounts};
pub use query::{
    ListQuery, PageRequest, SearchField, SearchFilter, VoicemailPage, Window, DEFAULT_LIMIT,
    DEFAULT_PAGE,
};
pub use record::{Sentiment, VoicemailRecord};
