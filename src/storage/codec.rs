//! Text encodings for the non-scalar article columns.
//!
//! Timestamps are ISO-8601 UTC with nanosecond precision and a `Z` suffix.
//! The fixed width keeps lexicographic order in SQL equal to chronological
//! order. Lists and the
//! image are JSON. Decoding never fails: bad data degrades to an empty value
//! and a warning.

use chrono::{DateTime, SecondsFormat, Utc};

use super::types::ArticleImage;

pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn decode_timestamp(
    article_id: i64,
    column: &'static str,
    raw: Option<&str>,
) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(article_id, column, value = %raw, error = %e, "Unparseable timestamp, treating as absent");
            None
        }
    }
}

pub(crate) fn decode_list(article_id: i64, column: &'static str, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(article_id, column, error = %e, "Malformed JSON list, using empty list");
        Vec::new()
    })
}

/// Older rows stored a missing image as `[]`; that reads back as `None`.
pub(crate) fn decode_image(article_id: i64, raw: Option<&str>) -> Option<ArticleImage> {
    let raw = raw?.trim();
    if raw.is_empty() || raw == "[]" || raw == "null" {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::warn!(article_id, error = %e, "Malformed image JSON, dropping image");
            None
        }
    }
}
