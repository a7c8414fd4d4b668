//! Sentiment aggregation for the insights view

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{Sentiment, VoicemailRecord};

/// Counts per sentiment bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl SentimentCounts {
    pub fn new(positive: u64, negative: u64, neutral: u64) -> Self {
        Self {
            positive,
            negative,
            neutral,
        }
    }

    /// Count one record in the given bucket
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral
    }
}

/// Sentiment breakdown over a record set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    /// Number of records aggregated
    pub total: u64,
    pub overall: SentimentCounts,
    /// Keyed by category label; uncategorised records are only in `overall`
    pub per_category: BTreeMap<String, SentimentCounts>,
}

/// Aggregate sentiment overall and per category.
///
/// Total over any input: missing fields fall into the neutral bucket or are
/// left out of the per-category map.
pub fn compute_insights(records: &[VoicemailRecord]) -> Insights {
    let mut insights = Insights::default();

    for record in records {
        let sentiment = record.sentiment_bucket();
        insights.total += 1;
        insights.overall.record(sentiment);

        if let Some(category) = record.category_label() {
            insights
                .per_category
                .entry(category.to_string())
                .or_default()
                .record(sentiment);
        }
    }

    insights
}
