//! The bookmark filter language.
//!
//! `parse` turns a filter expression into a `Query`; `matches` evaluates a
//! query against one bookmark. The grammar knows bare words, `"quoted
//! phrases"` and `[tags]`, separated by whitespace. A quote only closes
//! when it is unescaped and followed by whitespace or end of input, which
//! lets a literal `"` appear inside a phrase without an escaping syntax.

use crate::types::bookmark::Bookmark;
use crate::types::query::Query;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Neutral,
    Word,
    Quoted,
    Tag,
}

/// Parses a filter expression. Words and tags are lower-cased here, after
/// tokenization, so the tokenizer itself stays case-preserving.
pub fn parse(input: &str) -> Query {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Query::default();
    }
    let mut query = tokenize(trimmed);
    for word in &mut query.words {
        *word = word.to_lowercase();
    }
    for tag in &mut query.tags {
        *tag = tag.to_lowercase();
    }
    query
}

/// Single-pass, character-by-character tokenizer.
fn tokenize(input: &str) -> Query {
    let chars: Vec<char> = input.chars().collect();
    let mut state = ParserState::Neutral;
    let mut term = String::new();
    let mut words: Vec<String> = Vec::new();
    let mut tags: Vec<String> = Vec::new();

    for (pos, &c) in chars.iter().enumerate() {
        match state {
            ParserState::Neutral => {
                if c == '"' {
                    state = ParserState::Quoted;
                } else if c == '[' {
                    state = ParserState::Tag;
                } else if c != ' ' && c != '\t' {
                    state = ParserState::Word;
                    term.push(c);
                }
            }
            ParserState::Word => {
                if c != ' ' && c != '\t' {
                    term.push(c);
                } else {
                    if !term.is_empty() {
                        words.push(std::mem::take(&mut term));
                    }
                    state = ParserState::Neutral;
                }
            }
            ParserState::Quoted => {
                if is_closing_quote(&chars, pos) {
                    if !term.is_empty() {
                        words.push(std::mem::take(&mut term));
                    }
                    state = ParserState::Neutral;
                } else {
                    term.push(c);
                }
            }
            ParserState::Tag => {
                if c == ']' {
                    if !term.is_empty() {
                        tags.push(std::mem::take(&mut term));
                    }
                    state = ParserState::Neutral;
                } else {
                    term.push(c);
                }
            }
        }
    }
    // an unterminated quote or tag still emits its accumulated text
    if !term.is_empty() {
        words.push(term);
    }
    Query { words, tags }
}

/// A quote closes the phrase only if it is unescaped (even number of
/// immediately preceding backslashes) and followed by whitespace or end of
/// input.
fn is_closing_quote(chars: &[char], pos: usize) -> bool {
    if chars[pos] != '"' {
        return false;
    }
    let backslashes = chars[..pos].iter().rev().take_while(|&&c| c == '\\').count();
    if backslashes % 2 != 0 {
        return false;
    }
    match chars.get(pos + 1) {
        None => true,
        Some(&next) => next == ' ' || next == '\t',
    }
}

/// Evaluates a query against one bookmark: every tag must be a member of
/// the record's tag set, and every word a substring of its search text.
pub fn matches(query: &Query, bookmark: &Bookmark) -> bool {
    if query.is_empty() {
        return true;
    }
    if !query.tags.is_empty() {
        let empty = Vec::new();
        let tags = bookmark.tags.as_ref().unwrap_or(&empty);
        if !query.tags.iter().all(|t| tags.contains(t)) {
            return false;
        }
    }
    if !query.words.is_empty() {
        let text = bookmark.search_text();
        if !query.words.iter().all(|w| text.contains(w.as_str())) {
            return false;
        }
    }
    true
}
