//! Tag set operations.
//!
//! The remote stores tags either as a `;`-delimited string (work item
//! `System.Tags`) or as a native list (test plans), and both shapes can
//! come back from reads. Parsing always yields an ordered, deduplicated
//! sequence; mutations are read-modify-write on the whole set, without a
//! concurrency token — two callers racing on the same entity can lose an
//! update, and the later write wins.

use serde_json::Value;

/// Split a delimited tag string into an ordered, deduplicated list.
pub fn split_tag_string(raw: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for piece in raw.split(';') {
        let tag = piece.trim();
        if tag.is_empty() {
            continue;
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Parse the remote's tag value, accepting either shape.
///
/// Non-string array entries and non-tag value kinds are ignored rather
/// than rejected; absent tags simply parse to an empty set.
pub fn parse(raw: &Value) -> Vec<String> {
    match raw {
        Value::String(s) => split_tag_string(s),
        Value::Array(items) => {
            let mut tags = Vec::new();
            for item in items {
                if let Some(tag) = item.as_str() {
                    let tag = tag.trim();
                    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                        tags.push(tag.to_string());
                    }
                }
            }
            tags
        }
        _ => Vec::new(),
    }
}

/// Set union preserving first-seen order: existing order first, then newly
/// introduced tags in the order given.
pub fn union(existing: &[String], requested: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(existing.len() + requested.len());
    for tag in existing.iter().chain(requested.iter()) {
        if !merged.iter().any(|t| t == tag) {
            merged.push(tag.clone());
        }
    }
    merged
}

/// Set difference: existing minus requested, deduplicated, order kept.
pub fn difference(existing: &[String], requested: &[String]) -> Vec<String> {
    let mut remaining = Vec::with_capacity(existing.len());
    for tag in existing {
        if requested.iter().any(|t| t == tag) {
            continue;
        }
        if !remaining.iter().any(|t| t == tag) {
            remaining.push(tag.clone());
        }
    }
    remaining
}

/// Re-encode a tag list in the remote's delimited string form.
pub fn join(tags: &[String]) -> String {
    tags.join("; ")
}
