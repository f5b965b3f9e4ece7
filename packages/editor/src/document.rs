//! # Document Handle
//!
//! Core document abstraction for tracked-revision editing.
//!
//! A Document wraps one markup file and its editing state. Documents can
//! be:
//! - **Memory-backed**: Temporary, for testing or in-memory operations
//! - **File-backed**: Disk persistence in the same markup the loader read
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Suggest/Resolve → Save
//!   ↓      ↓           ↓             ↓
//! File   Tree      Revisions      Markup
//! ```
//!
//! The parsed tree is cached for the whole editing session; every scan
//! and resolve works against it, and `save` re-serializes it. The core
//! performs no locking of its own: one `&mut Document` per editing
//! session is what serializes access.

use std::collections::HashSet;
use std::path::PathBuf;

use redline_parser::ast::{Document as Tree, Node};
use redline_parser::{parse, serialize, IdGenerator};
use tracing::debug;

use crate::changes::{scan_document, Change};
use crate::resolve::{Resolution, ResolveAction, ResolveError};
use crate::revisions;
use crate::EditorError;

/// Editable tracked-revision document
#[derive(Debug)]
pub struct Document {
    /// Path to source file (if any)
    pub path: PathBuf,

    /// Current version number (increments on each resolution)
    pub version: u64,

    /// Per-document revision-id source
    ids: IdGenerator,

    /// Ids already resolved in this session; resolution is terminal
    resolved: HashSet<String>,

    /// Backing storage strategy
    storage: DocumentStorage,
}

/// Storage backend for document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only (for testing, temp docs)
    Memory { tree: Tree },

    /// File-backed
    File { tree: Tree, dirty: bool },
}

impl Document {
    /// Create document from markup text (memory-backed)
    pub fn from_source(path: PathBuf, source: &str) -> Result<Self, EditorError> {
        let tree = parse(source)?;
        let ids = IdGenerator::seeded_from(&tree);

        Ok(Self {
            path,
            version: 0,
            ids,
            resolved: HashSet::new(),
            storage: DocumentStorage::Memory { tree },
        })
    }

    /// Load document from file (file-backed)
    pub fn load(path: PathBuf) -> Result<Self, EditorError> {
        let source = std::fs::read_to_string(&path)?;
        let tree = parse(&source)?;
        let ids = IdGenerator::seeded_from(&tree);
        debug!(path = %path.display(), paragraphs = tree.paragraphs.len(), "loaded document");

        Ok(Self {
            path,
            version: 0,
            ids,
            resolved: HashSet::new(),
            storage: DocumentStorage::File { tree, dirty: false },
        })
    }

    /// Get the current tree
    pub fn tree(&self) -> &Tree {
        match &self.storage {
            DocumentStorage::Memory { tree } => tree,
            DocumentStorage::File { tree, .. } => tree,
        }
    }

    /// Get mutable tree access (marks file-backed documents dirty)
    pub fn tree_mut(&mut self) -> &mut Tree {
        match &mut self.storage {
            DocumentStorage::Memory { tree } => tree,
            DocumentStorage::File { tree, dirty } => {
                *dirty = true;
                tree
            }
        }
    }

    /// Turn on revision tracking for the document. Idempotent; returns
    /// whether the flag changed.
    pub fn enable_track_revisions(&mut self) -> bool {
        if self.tree().track_revisions {
            return false;
        }
        self.tree_mut().track_revisions = true;
        true
    }

    /// Mint an insertion wrapper with a document-unique id
    pub fn create_insertion(&mut self, text: &str, author: &str) -> Node {
        let node = revisions::create_insertion(&mut self.ids, text, Some(author), None);
        self.mark_dirty();
        node
    }

    /// Mint a deletion wrapper with a document-unique id
    pub fn create_deletion(&mut self, text: &str, author: &str) -> Node {
        let node = revisions::create_deletion(&mut self.ids, text, Some(author), None);
        self.mark_dirty();
        node
    }

    /// All pending changes, in document order
    pub fn changes(&self) -> Vec<Change> {
        scan_document(self.tree())
    }

    /// Resolve one revision. Resolution is terminal: a second attempt on
    /// the same id fails with `InvalidState`, an id the document never
    /// carried fails with `NotFound`.
    pub fn resolve(&mut self, id: &str, action: ResolveAction) -> Result<(), ResolveError> {
        if self.resolved.contains(id) {
            return Err(ResolveError::InvalidState {
                id: id.to_string(),
                reason: "already resolved".to_string(),
            });
        }

        Resolution::new(id, action).apply(self.tree_raw_mut())?;

        self.resolved.insert(id.to_string());
        self.version += 1;
        self.mark_dirty();
        debug!(id, ?action, version = self.version, "resolved revision");
        Ok(())
    }

    /// Resolve both halves of a replacement as one unit. Both ids are
    /// validated before either half is touched, so the tree is never left
    /// with half a replacement applied. The per-half `resolve` calls
    /// remain available for callers that want split decisions.
    pub fn resolve_update(
        &mut self,
        deletion_id: &str,
        insertion_id: &str,
        action: ResolveAction,
    ) -> Result<(), ResolveError> {
        if deletion_id == insertion_id {
            return Err(ResolveError::InvalidState {
                id: deletion_id.to_string(),
                reason: "a replacement needs two distinct ids".to_string(),
            });
        }

        for id in [deletion_id, insertion_id] {
            if self.resolved.contains(id) {
                return Err(ResolveError::InvalidState {
                    id: id.to_string(),
                    reason: "already resolved".to_string(),
                });
            }
        }

        let first = Resolution::new(deletion_id, action);
        let second = Resolution::new(insertion_id, action);
        first.validate(self.tree())?;
        second.validate(self.tree())?;

        first.apply(self.tree_raw_mut())?;
        second.apply(self.tree_raw_mut())?;

        self.resolved.insert(deletion_id.to_string());
        self.resolved.insert(insertion_id.to_string());
        self.version += 1;
        self.mark_dirty();
        debug!(deletion_id, insertion_id, ?action, "resolved replacement");
        Ok(())
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            _ => false,
        }
    }

    /// Serialize the current tree to markup text
    pub fn to_markup(&self) -> String {
        serialize(self.tree())
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        match &mut self.storage {
            DocumentStorage::File { tree, dirty } => {
                std::fs::write(&self.path, serialize(tree))?;
                *dirty = false;
                debug!(path = %self.path.display(), "saved document");
                Ok(())
            }
            _ => Err(EditorError::NotFileBacked),
        }
    }

    /// Tree access without the dirty-flag side effect
    fn tree_raw_mut(&mut self) -> &mut Tree {
        match &mut self.storage {
            DocumentStorage::Memory { tree } => tree,
            DocumentStorage::File { tree, .. } => tree,
        }
    }

    fn mark_dirty(&mut self) {
        if let DocumentStorage::File { dirty, .. } = &mut self.storage {
            *dirty = true;
        }
    }
}
