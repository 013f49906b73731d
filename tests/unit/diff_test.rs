//! Unit tests for the change-detection engine.

use chrono::{TimeZone, Utc};
use serde_json::json;

use gitmarks::services::diff::{diff, diff_bookmarks, raw_record, ChangeSet, Field};
use gitmarks::types::bookmark::Bookmark;

fn record(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().expect("test record is an object").clone()
}

fn bookmark(url: &str) -> Bookmark {
    Bookmark {
        url: Some(url.to_string()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

#[test]
fn both_absent_is_no_change() {
    assert!(diff_bookmarks(None, None).is_empty());
}

#[test]
fn one_side_absent_reports_every_set_field() {
    let b = Bookmark {
        name: Some("n".to_string()),
        url: Some("https://example.com".to_string()),
        tags: Some(vec!["t".to_string()]),
        ..Default::default()
    };
    let changes = diff_bookmarks(None, Some(&b));
    assert!(changes.contains(Field::Name));
    assert!(changes.contains(Field::Url));
    assert!(changes.contains(Field::Tags));
    assert!(!changes.contains(Field::Notes));
    assert_eq!(changes, diff_bookmarks(Some(&b), None));
}

#[test]
fn field_unset_on_both_sides_is_not_a_change() {
    let a = bookmark("https://example.com");
    let b = bookmark("https://example.com");
    assert!(diff_bookmarks(Some(&a), Some(&b)).is_empty());
}

// ---------------------------------------------------------------------------
// Field changes
// ---------------------------------------------------------------------------

#[test]
fn string_field_changes_are_reported_per_field() {
    let mut a = bookmark("https://example.com");
    a.name = Some("old".to_string());
    let mut b = bookmark("https://example.com/other");
    b.name = Some("new".to_string());
    b.notes = Some("added".to_string());

    let changes = diff_bookmarks(Some(&a), Some(&b));
    assert!(changes.contains(Field::Name));
    assert!(changes.contains(Field::Url));
    assert!(changes.contains(Field::Notes));
    assert!(!changes.contains(Field::Tags));
}

#[test]
fn tags_compare_as_sets() {
    let a = record(json!({"url": "u", "tags": ["a", "b"]}));
    let b = record(json!({"url": "u", "tags": ["b", "a"]}));
    assert!(diff(Some(&a), Some(&b)).is_empty());

    let c = record(json!({"url": "u", "tags": ["a", "c"]}));
    assert!(diff(Some(&a), Some(&c)).contains(Field::Tags));
}

#[test]
fn date_added_is_never_compared() {
    let mut a = bookmark("https://example.com");
    a.date_added = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    let mut b = bookmark("https://example.com");
    b.date_added = Some(Utc.with_ymd_and_hms(2021, 6, 6, 12, 0, 0).unwrap());
    assert!(diff_bookmarks(Some(&a), Some(&b)).is_empty());
}

// ---------------------------------------------------------------------------
// Inconsistency sentinel
// ---------------------------------------------------------------------------

#[test]
fn type_mismatch_yields_the_sentinel_alone() {
    // tags as a plain string on one side, plus an unrelated name change:
    // the sentinel must swallow the field-level changes
    let a = record(json!({"name": "old", "url": "u", "tags": ["a"]}));
    let b = record(json!({"name": "new", "url": "u", "tags": "a"}));
    assert_eq!(diff(Some(&a), Some(&b)), ChangeSet::Inconsistent);
}

#[test]
fn sentinel_is_symmetric() {
    let a = record(json!({"url": "u", "tags": ["a"]}));
    let b = record(json!({"url": "u", "tags": "a"}));
    assert_eq!(diff(Some(&a), Some(&b)), diff(Some(&b), Some(&a)));
}

#[test]
fn shape_check_covers_date_added() {
    let a = record(json!({"url": "u", "date_added": "2021-01-01"}));
    let b = record(json!({"url": "u", "date_added": 1609459200}));
    assert_eq!(diff(Some(&a), Some(&b)), ChangeSet::Inconsistent);
}

// ---------------------------------------------------------------------------
// Raw view
// ---------------------------------------------------------------------------

#[test]
fn raw_record_mirrors_the_stored_fields() {
    let b = Bookmark {
        name: Some("n".to_string()),
        url: Some("u".to_string()),
        tags: Some(vec!["t".to_string()]),
        notes: None,
        date_added: Some(Utc.with_ymd_and_hms(2021, 3, 4, 0, 0, 0).unwrap()),
    };
    let raw = raw_record(&b);
    assert_eq!(raw.get("name"), Some(&json!("n")));
    assert_eq!(raw.get("tags"), Some(&json!(["t"])));
    assert_eq!(raw.get("date_added"), Some(&json!("2021-03-04")));
    assert!(!raw.contains_key("notes"));
}
