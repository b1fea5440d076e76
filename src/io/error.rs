//! Model loading errors.

use crate::builder::BuildError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or saving a model file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML syntax error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Malformed attribute at byte {position}: {source}")]
    Attribute {
        position: u64,
        #[source]
        source: quick_xml::events::attributes::AttrError,
    },

    #[error("Unexpected element <{found}> in <{parent}> at byte {position}")]
    UnexpectedElement {
        found: String,
        parent: String,
        position: u64,
    },

    #[error("Element <{element}> at byte {position} is missing attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        position: u64,
    },

    #[error("Missing <{0}> element")]
    MissingElement(&'static str),

    #[error("Duplicate <{element}> element at byte {position}")]
    DuplicateElement {
        element: &'static str,
        position: u64,
    },

    #[error("DOT syntax error on line {line}: {message}")]
    Dot { line: usize, message: String },

    #[error(transparent)]
    Invalid(#[from] BuildError),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}
