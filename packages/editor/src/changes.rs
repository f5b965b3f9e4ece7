//! # Revision Scanner
//!
//! Walks a paragraph's child sequence and reports pending revisions as
//! normalized, human-reviewable `Change` records.
//!
//! A deletion wrapper immediately followed by an insertion wrapper is one
//! semantic replacement and is reported as a single `Update`. Pairing
//! looks exactly one sibling ahead: a plain run between the two keeps
//! them separate. Scanning never mutates the tree and is safely
//! repeatable; nothing is cached.

use redline_parser::ast::{Document, Node, Paragraph};
use serde::{Deserialize, Serialize};

/// Number of characters of paragraph text quoted as change context
pub const CONTEXT_CHARS: usize = 50;

/// A pending revision, normalized for review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Change {
    Insertion {
        id: String,
        author: String,
        date: String,
        text: String,
        context: String,
    },

    Deletion {
        id: String,
        author: String,
        date: String,
        text: String,
        context: String,
    },

    /// A deletion immediately followed by an insertion: one replacement.
    /// `ids` holds the deletion id then the insertion id.
    Update {
        ids: [String; 2],
        author: String,
        date: String,
        text: String,
        original: String,
        #[serde(rename = "new")]
        replacement: String,
        context: String,
    },
}

impl Change {
    /// Ids a caller must resolve to settle this change
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Change::Insertion { id, .. } | Change::Deletion { id, .. } => vec![id],
            Change::Update { ids, .. } => ids.iter().map(|id| id.as_str()).collect(),
        }
    }
}

/// Scan one paragraph for pending changes, in reading order
pub fn scan(paragraph: &Paragraph) -> Vec<Change> {
    // Context reflects the paragraph text as it stands right now
    let context = context_excerpt(paragraph);

    let children = &paragraph.children;
    let mut changes = Vec::new();
    let mut i = 0;

    while i < children.len() {
        match &children[i] {
            Node::Deletion(del) => {
                if let Some(Node::Insertion(ins)) = children.get(i + 1) {
                    let original = del.text();
                    let replacement = ins.text();
                    changes.push(Change::Update {
                        ids: [del.id.clone(), ins.id.clone()],
                        author: del.author.clone(),
                        date: del.date.clone(),
                        text: format!("Change '{}' to '{}'", original, replacement),
                        original,
                        replacement,
                        context: context.clone(),
                    });
                    i += 2; // both halves consumed
                } else {
                    changes.push(Change::Deletion {
                        id: del.id.clone(),
                        author: del.author.clone(),
                        date: del.date.clone(),
                        text: del.text(),
                        context: context.clone(),
                    });
                    i += 1;
                }
            }

            Node::Insertion(ins) => {
                changes.push(Change::Insertion {
                    id: ins.id.clone(),
                    author: ins.author.clone(),
                    date: ins.date.clone(),
                    text: ins.text(),
                    context: context.clone(),
                });
                i += 1;
            }

            Node::Run(_) => i += 1,
        }
    }

    changes
}

/// Scan every paragraph of a document, in document order
pub fn scan_document(doc: &Document) -> Vec<Change> {
    doc.paragraphs.iter().flat_map(scan).collect()
}

fn context_excerpt(paragraph: &Paragraph) -> String {
    let text = paragraph.text();
    let excerpt: String = text.chars().take(CONTEXT_CHARS).collect();
    format!("{}...", excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_parser::ast::{DeletedRun, DeletionNode, InsertionNode, Run};

    fn deletion(id: &str, text: &str) -> Node {
        Node::Deletion(DeletionNode {
            id: id.to_string(),
            author: "AI_Reviewer".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            runs: vec![DeletedRun {
                text: text.to_string(),
            }],
        })
    }

    fn insertion(id: &str, text: &str) -> Node {
        Node::Insertion(InsertionNode {
            id: id.to_string(),
            author: "AI_Reviewer".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            runs: vec![Run {
                text: text.to_string(),
            }],
        })
    }

    fn run(text: &str) -> Node {
        Node::Run(Run {
            text: text.to_string(),
        })
    }

    #[test]
    fn test_adjacent_del_ins_pairs_as_update() {
        let mut paragraph = Paragraph::new();
        paragraph.children.push(deletion("1", "Intro"));
        paragraph.children.push(insertion("2", "Intro (Refined)"));

        let changes = scan(&paragraph);
        assert_eq!(changes.len(), 1);
        match &changes[0] {
            Change::Update {
                ids,
                original,
                replacement,
                text,
                ..
            } => {
                assert_eq!(ids, &["1".to_string(), "2".to_string()]);
                assert_eq!(original, "Intro");
                assert_eq!(replacement, "Intro (Refined)");
                assert_eq!(text, "Change 'Intro' to 'Intro (Refined)'");
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_run_between_halves_blocks_pairing() {
        let mut paragraph = Paragraph::new();
        paragraph.children.push(deletion("1", "old"));
        paragraph.children.push(run(" filler "));
        paragraph.children.push(insertion("2", "new"));

        let changes = scan(&paragraph);
        assert_eq!(changes.len(), 2);
        assert!(matches!(changes[0], Change::Deletion { .. }));
        assert!(matches!(changes[1], Change::Insertion { .. }));
    }

    #[test]
    fn test_consecutive_pairs_pair_independently() {
        let mut paragraph = Paragraph::new();
        paragraph.children.push(deletion("1", "a"));
        paragraph.children.push(insertion("2", "b"));
        paragraph.children.push(deletion("3", "c"));
        paragraph.children.push(insertion("4", "d"));

        let changes = scan(&paragraph);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| matches!(c, Change::Update { .. })));
    }

    #[test]
    fn test_insertion_then_deletion_stays_separate() {
        // Pairing only consumes del followed by ins, never the reverse
        let mut paragraph = Paragraph::new();
        paragraph.children.push(insertion("1", "new"));
        paragraph.children.push(deletion("2", "old"));

        let changes = scan(&paragraph);
        assert_eq!(changes.len(), 2);
        assert!(matches!(changes[0], Change::Insertion { .. }));
        assert!(matches!(changes[1], Change::Deletion { .. }));
    }

    #[test]
    fn test_multi_run_wrappers_concatenate_in_order() {
        let mut paragraph = Paragraph::new();
        paragraph.children.push(Node::Deletion(DeletionNode {
            id: "1".to_string(),
            author: "AI_Reviewer".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            runs: vec![
                DeletedRun {
                    text: "first ".to_string(),
                },
                DeletedRun {
                    text: "second".to_string(),
                },
            ],
        }));

        let changes = scan(&paragraph);
        match &changes[0] {
            Change::Deletion { text, .. } => assert_eq!(text, "first second"),
            other => panic!("expected deletion, got {:?}", other),
        }
    }

    #[test]
    fn test_context_truncated_with_ellipsis() {
        let long = "x".repeat(80);
        let mut paragraph = Paragraph::new();
        paragraph.children.push(run(&long));
        paragraph.children.push(deletion("1", "gone"));

        let changes = scan(&paragraph);
        match &changes[0] {
            Change::Deletion { context, .. } => {
                assert_eq!(context.len(), CONTEXT_CHARS + 3);
                assert!(context.ends_with("..."));
            }
            other => panic!("expected deletion, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_is_repeatable() {
        let mut paragraph = Paragraph::new();
        paragraph.children.push(deletion("1", "a"));
        paragraph.children.push(insertion("2", "b"));

        let first = scan(&paragraph);
        let second = scan(&paragraph);
        assert_eq!(first, second);
    }

    #[test]
    fn test_update_json_shape() {
        let mut paragraph = Paragraph::new();
        paragraph.children.push(deletion("1", "old"));
        paragraph.children.push(insertion("2", "new"));

        let changes = scan(&paragraph);
        let json = serde_json::to_value(&changes[0]).unwrap();

        assert_eq!(json["type"], "update");
        assert_eq!(json["ids"], serde_json::json!(["1", "2"]));
        assert_eq!(json["original"], "old");
        assert_eq!(json["new"], "new");
        assert!(json["context"].as_str().unwrap().ends_with("..."));
    }
}
