//! Translation between BSON documents and core types

use bson::{doc, Bson, Document};
use chrono::{DateTime, NaiveDateTime, Utc};
use civic_intel_core::{SearchFilter, VoicemailRecord};

/// Build the MongoDB filter for a search.
///
/// The needle is regex-escaped so user text is matched literally.
pub fn filter_document(filter: &SearchFilter) -> Document {
    let Some(needle) = filter.needle() else {
        return Document::new();
    };

    let pattern = regex::escape(needle);
    let clauses: Vec<Bson> = filter
        .fields()
        .iter()
        .map(|field| {
            Bson::Document(doc! {
                field.as_str(): { "$regex": pattern.as_str(), "$options": "i" }
            })
        })
        .collect();

    doc! { "$or": clauses }
}

/// Newest first
pub fn sort_document() -> Document {
    doc! { "timestamp": -1 }
}

/// Convert a stored document into a record, dropping fields of the wrong type
pub fn record_from_document(document: &Document) -> VoicemailRecord {
    let id = match document.get("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => {
            tracing::warn!("Voicemail document without _id");
            String::new()
        }
    };

    VoicemailRecord {
        id,
        timestamp: document.get("timestamp").and_then(timestamp_from_bson),
        category: string_field(document, "category"),
        region: string_field(document, "region"),
        sentiment: string_field(document, "sentiment"),
        text: string_field(document, "text"),
    }
}

fn string_field(document: &Document, key: &str) -> Option<String> {
    match document.get(key) {
        Some(Bson::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Accepts BSON dates, RFC 3339 strings and epoch milliseconds
fn timestamp_from_bson(value: &Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => Some(dt.to_chrono()),
        Bson::String(s) => parse_timestamp(s),
        Bson::Int64(ms) => DateTime::from_timestamp_millis(*ms),
        Bson::Int32(ms) => DateTime::from_timestamp_millis(i64::from(*ms)),
        Bson::Double(ms) if ms.is_finite() => DateTime::from_timestamp_millis(*ms as i64),
        Bson::Timestamp(ts) => DateTime::from_timestamp(i64::from(ts.time), 0),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Zone-less ISO strings are taken as UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
