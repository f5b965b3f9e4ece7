//! # Revision Writer
//!
//! Constructs insertion/deletion revision wrappers from raw text.
//!
//! A freshly written node carries a newly minted id, the author, an
//! ISO-8601 UTC timestamp, and exactly one child run holding the text
//! verbatim. Construction has no side effects on any tree; splicing the
//! node into a paragraph is the caller's explicit step.

use chrono::Utc;
use redline_parser::ast::{DeletedRun, DeletionNode, InsertionNode, Node, Run};
use redline_parser::IdGenerator;

/// Fixed system identity used when no author is given
pub const DEFAULT_AUTHOR: &str = "Agent";

/// Current UTC time in the markup's timestamp format
pub fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Build an insertion wrapper proposing `text` as an addition
pub fn create_insertion(
    ids: &mut IdGenerator,
    text: &str,
    author: Option<&str>,
    date: Option<String>,
) -> Node {
    Node::Insertion(InsertionNode {
        id: ids.new_id(),
        author: author.unwrap_or(DEFAULT_AUTHOR).to_string(),
        date: date.unwrap_or_else(utc_timestamp),
        runs: vec![Run {
            text: text.to_string(),
        }],
    })
}

/// Build a deletion wrapper proposing `text` for removal; the text is
/// retained under the wrapper until the revision is resolved
pub fn create_deletion(
    ids: &mut IdGenerator,
    text: &str,
    author: Option<&str>,
    date: Option<String>,
) -> Node {
    Node::Deletion(DeletionNode {
        id: ids.new_id(),
        author: author.unwrap_or(DEFAULT_AUTHOR).to_string(),
        date: date.unwrap_or_else(utc_timestamp),
        runs: vec![DeletedRun {
            text: text.to_string(),
        }],
    })
}
