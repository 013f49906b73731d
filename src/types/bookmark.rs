use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookmark record as kept in a collection.
///
/// Every field is optional at this level; a record that is persisted always
/// carries a `url`. The storage identity is never part of the record — it is
/// derived from the URL by `services::addressing` whenever it is needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the bookmark was first added (UTC). Carried through edits,
    /// never produced or compared by the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
}

impl Bookmark {
    /// Brings the record into canonical form: string fields are trimmed and
    /// dropped when empty; tags are trimmed, lower-cased, deduplicated and
    /// sorted, with an empty list dropped entirely. Idempotent.
    pub fn normalized(mut self) -> Self {
        self.name = normalize_string(self.name);
        self.url = normalize_string(self.url);
        self.notes = normalize_string(self.notes);
        self.tags = normalize_tags(self.tags);
        self
    }

    /// The lower-cased haystack that free-text query words are matched
    /// against: name, tags, and a URL token with the scheme prefix and any
    /// trailing `.htm`/`.html`/`.shtm`/`.shtml` suffix removed.
    pub fn search_text(&self) -> String {
        let mut result = String::new();
        if let Some(name) = &self.name {
            result.push_str(&name.trim().to_lowercase());
        }
        if let Some(tags) = &self.tags {
            if !tags.is_empty() {
                result.push(' ');
                result.push_str(&tags.join(" "));
            }
        }
        if let Some(url) = &self.url {
            if !url.is_empty() {
                result.push(' ');
                result.push_str(&url_search_token(url));
            }
        }
        result
    }
}

fn normalize_string(value: Option<String>) -> Option<String> {
    match value {
        Some(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        None => None,
    }
}

fn normalize_tags(tags: Option<Vec<String>>) -> Option<Vec<String>> {
    let tags = tags?;
    let mut cleaned: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    cleaned.sort();
    cleaned.dedup();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

const URL_SCHEMES: [&str; 4] = ["https://", "http://", "ftps://", "ftp://"];
const URL_SUFFIXES: [&str; 4] = [".shtml", ".html", ".shtm", ".htm"];

/// Reduces a URL to the token used in search text: percent-decoded,
/// lower-cased, scheme prefix and one markup-file suffix stripped.
fn url_search_token(url: &str) -> String {
    let mut token = percent_decode(url).to_lowercase();
    for scheme in URL_SCHEMES {
        if let Some(rest) = token.strip_prefix(scheme) {
            token = rest.to_string();
            break;
        }
    }
    for suffix in URL_SUFFIXES {
        if let Some(rest) = token.strip_suffix(suffix) {
            token = rest.to_string();
            break;
        }
    }
    token
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
