//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] redline_parser::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resolve error: {0}")]
    Resolve(#[from] crate::resolve::ResolveError),

    #[error("Document is not file-backed")]
    NotFileBacked,
}
