//! Change detection between two bookmark record versions.
//!
//! The engine runs on loosely-typed JSON maps rather than `Bookmark`
//! values: a stored file is the one place where a field can still carry the
//! wrong shape (say, `tags` as a plain string), and that condition must
//! surface as the inconsistency sentinel instead of a field change. The
//! engine does not normalize — callers diff normalized records.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::services::codec;
use crate::types::bookmark::Bookmark;

/// The loosely-typed record view the engine works on.
pub type RawRecord = Map<String, Value>;

/// A bookmark field that can differ between two record versions.
/// `date_added` is immutable metadata and is never part of a change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Url,
    Tags,
    Notes,
}

/// The outcome of a diff: either the set of changed fields, or the sentinel
/// meaning the records do not share a consistent shape. The sentinel is
/// never combined with field-level changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSet {
    Fields(BTreeSet<Field>),
    Inconsistent,
}

impl ChangeSet {
    pub fn empty() -> Self {
        ChangeSet::Fields(BTreeSet::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChangeSet::Fields(fields) if fields.is_empty())
    }

    pub fn contains(&self, field: Field) -> bool {
        matches!(self, ChangeSet::Fields(fields) if fields.contains(&field))
    }
}

const COMPARED_FIELDS: [(&str, Field); 4] = [
    ("name", Field::Name),
    ("url", Field::Url),
    ("tags", Field::Tags),
    ("notes", Field::Notes),
];

/// Diffs two raw records.
///
/// Both absent is no change. A record present on one side only reports each
/// of its set fields as changed. A key whose JSON type differs between the
/// two sides makes the whole result `Inconsistent`; this shape check covers
/// `date_added` too, even though its value is never compared.
pub fn diff(old: Option<&RawRecord>, new: Option<&RawRecord>) -> ChangeSet {
    let (old, new) = match (old, new) {
        (None, None) => return ChangeSet::empty(),
        (Some(o), Some(n)) => (o, n),
        (Some(present), None) | (None, Some(present)) => {
            let mut fields = BTreeSet::new();
            for (key, field) in COMPARED_FIELDS {
                if present.contains_key(key) {
                    fields.insert(field);
                }
            }
            return ChangeSet::Fields(fields);
        }
    };

    for key in old.keys().chain(new.keys()) {
        if let (Some(a), Some(b)) = (old.get(key), new.get(key)) {
            if value_kind(a) != value_kind(b) {
                return ChangeSet::Inconsistent;
            }
        }
    }

    let mut fields = BTreeSet::new();
    for (key, field) in COMPARED_FIELDS {
        match (old.get(key), new.get(key)) {
            (None, None) => {}
            (Some(_), None) | (None, Some(_)) => {
                fields.insert(field);
            }
            (Some(a), Some(b)) => {
                let changed = if field == Field::Tags {
                    !tag_sets_equal(a, b)
                } else {
                    a != b
                };
                if changed {
                    fields.insert(field);
                }
            }
        }
    }
    ChangeSet::Fields(fields)
}

/// Diffs two typed records through their raw form.
pub fn diff_bookmarks(old: Option<&Bookmark>, new: Option<&Bookmark>) -> ChangeSet {
    let old = old.map(raw_record);
    let new = new.map(raw_record);
    diff(old.as_ref(), new.as_ref())
}

/// Renders a typed record into the raw view used by `diff`. Does not
/// normalize.
pub fn raw_record(bookmark: &Bookmark) -> RawRecord {
    let mut map = Map::new();
    if let Some(name) = &bookmark.name {
        map.insert("name".to_string(), Value::String(name.clone()));
    }
    if let Some(url) = &bookmark.url {
        map.insert("url".to_string(), Value::String(url.clone()));
    }
    if let Some(tags) = &bookmark.tags {
        let items = tags.iter().cloned().map(Value::String).collect();
        map.insert("tags".to_string(), Value::Array(items));
    }
    if let Some(notes) = &bookmark.notes {
        map.insert("notes".to_string(), Value::String(notes.clone()));
    }
    if let Some(ts) = &bookmark.date_added {
        map.insert(
            "date_added".to_string(),
            Value::String(codec::format_date(ts)),
        );
    }
    map
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn tag_sets_equal(a: &Value, b: &Value) -> bool {
    match (a.as_array(), b.as_array()) {
        (Some(a), Some(b)) => {
            a.iter().all(|t| b.contains(t)) && b.iter().all(|t| a.contains(t))
        }
        // same-kind non-arrays (shape check ran first) compare directly
        _ => a == b,
    }
}
