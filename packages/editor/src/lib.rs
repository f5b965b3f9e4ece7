//! # Redline Editor
//!
//! Tracked-revision engine for WordprocessingML-style documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markup text → document tree         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: document lifecycle + revisions      │
//! │  - Load/save documents                      │
//! │  - Write insertion/deletion wrappers        │
//! │  - Scan paragraphs into Change records      │
//! │  - Resolve revisions (accept/reject)        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ serializer: document tree → markup text     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is source of truth**: change records are derived views
//! 2. **Resolution is terminal**: a resolved id never resolves again
//! 3. **Order is sacred**: sibling order survives every mutation
//! 4. **Exclusive ownership**: one `&mut Document` per editing session;
//!    cross-session coordination belongs to the embedding system
//!
//! ## Usage
//!
//! ```rust,ignore
//! use redline_editor::{CyclingPolicy, Document, ResolveAction};
//!
//! // Load document
//! let mut doc = Document::load("report.xml".into())?;
//!
//! // Propose tracked suggestions for headings
//! redline_editor::suggest_changes(&mut doc, &CyclingPolicy, "AI_Reviewer");
//!
//! // Review pending changes
//! for change in doc.changes() {
//!     println!("{:?}", change);
//! }
//!
//! // Accept one of them
//! doc.resolve("3", ResolveAction::Accept)?;
//!
//! // Save
//! doc.save()?;
//! ```

mod changes;
mod document;
mod errors;
mod resolve;
mod revisions;
mod suggest;

pub use changes::{scan, scan_document, Change, CONTEXT_CHARS};
pub use document::{Document, DocumentStorage};
pub use errors::EditorError;
pub use resolve::{resolve, Resolution, ResolveAction, ResolveError};
pub use revisions::{create_deletion, create_insertion, utc_timestamp, DEFAULT_AUTHOR};
pub use suggest::{suggest_changes, CyclingPolicy, SuggestionPolicy};

// Re-export common types for convenience
pub use redline_parser::ast::{self, Node, Paragraph};
pub use redline_parser::{IdGenerator, ParseError};
