//! # Revision Resolver
//!
//! Finalizes or discards a pending revision by id.
//!
//! ## Transition table
//!
//! | Node kind | action | Effect |
//! |---|---|---|
//! | Insertion | accept | children spliced into the paragraph at the wrapper's position |
//! | Insertion | reject | wrapper and content removed |
//! | Deletion  | accept | wrapper and content removed |
//! | Deletion  | reject | one plain run with the concatenated deleted text takes the wrapper's place |
//!
//! Sibling order of untouched nodes is preserved in every case. A failed
//! resolution leaves the tree exactly as it was.

use redline_parser::ast::{Document, Node, Run};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do with a pending revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    Accept,
    Reject,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("No pending revision with id '{0}'")]
    NotFound(String),

    #[error("Revision '{id}' cannot be resolved: {reason}")]
    InvalidState { id: String, reason: String },
}

/// One accept/reject decision for one revision id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub id: String,
    pub action: ResolveAction,
}

/// Resolve a single revision in place
pub fn resolve(doc: &mut Document, id: &str, action: ResolveAction) -> Result<(), ResolveError> {
    Resolution::new(id, action).apply(doc)
}

impl Resolution {
    pub fn new(id: impl Into<String>, action: ResolveAction) -> Self {
        Self {
            id: id.into(),
            action,
        }
    }

    /// Check that this resolution could apply, without mutating anything
    pub fn validate(&self, doc: &Document) -> Result<(), ResolveError> {
        find_revision(doc, &self.id)
            .map(|_| ())
            .ok_or_else(|| ResolveError::NotFound(self.id.clone()))
    }

    /// Apply the transition-table effect to the tree
    pub fn apply(&self, doc: &mut Document) -> Result<(), ResolveError> {
        let (paragraph_index, child_index) = find_revision(doc, &self.id)
            .ok_or_else(|| ResolveError::NotFound(self.id.clone()))?;

        let children = &mut doc.paragraphs[paragraph_index].children;
        let node = children.remove(child_index);

        match (node, self.action) {
            // Accepted insertion: promote the wrapped runs to ordinary
            // content at the wrapper's position, in order
            (Node::Insertion(ins), ResolveAction::Accept) => {
                for (offset, run) in ins.runs.into_iter().enumerate() {
                    children.insert(child_index + offset, Node::Run(run));
                }
            }

            // Rejected insertion / accepted deletion: content discarded
            (Node::Insertion(_), ResolveAction::Reject)
            | (Node::Deletion(_), ResolveAction::Accept) => {}

            // Rejected deletion: restore the deleted text as one plain run
            (Node::Deletion(del), ResolveAction::Reject) => {
                children.insert(
                    child_index,
                    Node::Run(Run { text: del.text() }),
                );
            }

            // find_revision never points at a plain run; put it back untouched
            (node @ Node::Run(_), _) => {
                children.insert(child_index, node);
                return Err(ResolveError::InvalidState {
                    id: self.id.clone(),
                    reason: "target is not a revision wrapper".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Locate a revision wrapper by id across all paragraphs
fn find_revision(doc: &Document, id: &str) -> Option<(usize, usize)> {
    for (paragraph_index, paragraph) in doc.paragraphs.iter().enumerate() {
        for (child_index, node) in paragraph.children.iter().enumerate() {
            if node.revision_id() == Some(id) {
                return Some((paragraph_index, child_index));
            }
        }
    }
    None
}
