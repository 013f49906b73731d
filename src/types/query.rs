use std::fmt;

/// A parsed filter query: free-text words and required tags, all
/// lower-cased. Parsing lives in `services::query_filter`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

impl Query {
    /// An empty query matches every record.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.tags.is_empty()
    }
}

/// Renders the query back into filter syntax, tags first: `[news] market`.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.tags.iter().map(|t| format!("[{}]", t)).collect();
        parts.extend(self.words.iter().cloned());
        write!(f, "{}", parts.join(" "))
    }
}
