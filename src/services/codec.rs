//! Canonical serialization of bookmark records.
//!
//! The stored text must be byte-identical between this client and the
//! server-side site generator, otherwise every save produces a spurious
//! storage diff. The layout is therefore fixed: fields in the order name,
//! url, tags, notes, date_added; four-space indent; the tag list on a
//! single line with `", "` separators; a trailing newline. The text travels
//! base64-encoded through the repository-files API.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Deserialize;

use crate::types::bookmark::Bookmark;
use crate::types::errors::CodecError;

/// Timestamp layout written into stored records.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp layouts accepted when reading records written by other tools.
const READ_DATE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
];

/// Formats a timestamp the way stored records carry it, collapsing to a
/// bare date when the time-of-day is exactly midnight.
pub fn format_date(ts: &DateTime<Utc>) -> String {
    if ts.time().num_seconds_from_midnight() == 0 {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format(DATE_FORMAT).to_string()
    }
}

/// Parses a stored timestamp, accepting every layout historically written
/// into collections. All values are UTC.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, CodecError> {
    let value = value.trim();
    for fmt in READ_DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(CodecError::Malformed(format!(
        "unrecognized date_added value: {}",
        value
    )))
}

/// Renders the canonical textual form of a record. Normalizes first, so a
/// record with no remaining fields renders as `{}` plus newline.
pub fn canonical_text(bookmark: &Bookmark) -> String {
    let b = bookmark.clone().normalized();
    let mut fields: Vec<String> = Vec::new();
    if let Some(name) = &b.name {
        fields.push(format!("    \"name\": {}", json_string(name)));
    }
    if let Some(url) = &b.url {
        fields.push(format!("    \"url\": {}", json_string(url)));
    }
    if let Some(tags) = &b.tags {
        let items: Vec<String> = tags.iter().map(|t| json_string(t)).collect();
        fields.push(format!("    \"tags\": [{}]", items.join(", ")));
    }
    if let Some(notes) = &b.notes {
        fields.push(format!("    \"notes\": {}", json_string(notes)));
    }
    if let Some(ts) = &b.date_added {
        fields.push(format!("    \"date_added\": {}", json_string(&format_date(ts))));
    }
    if fields.is_empty() {
        return "{}\n".to_string();
    }
    format!("{{\n{}\n}}\n", fields.join(",\n"))
}

fn json_string(s: &str) -> String {
    // serde_json string rendering cannot fail for a &str
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Encodes a record for transport: canonical text, then base64.
pub fn encode(bookmark: &Bookmark) -> String {
    BASE64.encode(canonical_text(bookmark).as_bytes())
}

#[derive(Deserialize)]
struct StoredRecord {
    name: Option<String>,
    url: Option<String>,
    tags: Option<Vec<String>>,
    notes: Option<String>,
    date_added: Option<String>,
}

/// Decodes a transport blob back into a normalized record.
pub fn decode(blob: &str) -> Result<Bookmark, CodecError> {
    let bytes = BASE64
        .decode(blob.trim())
        .map_err(|e| CodecError::Transport(format!("invalid base64: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| CodecError::Transport(format!("blob is not UTF-8: {}", e)))?;
    let stored: StoredRecord = serde_json::from_str(&text)
        .map_err(|e| CodecError::Malformed(format!("not a bookmark record: {}", e)))?;
    let date_added = match stored.date_added.as_deref() {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };
    Ok(Bookmark {
        name: stored.name,
        url: stored.url,
        tags: stored.tags,
        notes: stored.notes,
        date_added,
    }
    .normalized())
}
