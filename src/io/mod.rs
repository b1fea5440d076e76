//! Reading and writing model files.
//!
//! Two formats are supported: the XML model format in [`xml`] and a
//! Graphviz subset in [`dot`].

pub mod dot;
pub mod error;
pub mod xml;

pub use error::LoadError;

use crate::core::FeaturedTransitionSystem;
use crate::validation::ValidationRules;
use std::path::Path;

/// File formats understood by [`load_path`] and [`save_path`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Xml,
    Dot,
}

impl Format {
    /// Pick a format from the file extension. Anything but `.dot` or `.gv`
    /// is read as XML.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("dot") || ext.eq_ignore_ascii_case("gv") => {
                Format::Dot
            }
            _ => Format::Xml,
        }
    }
}

/// Load a model, choosing the parser from the file extension.
pub fn load_path(
    path: impl AsRef<Path>,
    rules: &ValidationRules,
) -> Result<FeaturedTransitionSystem, LoadError> {
    let path = path.as_ref();
    match Format::of(path) {
        Format::Dot => dot::load_file(path, rules),
        Format::Xml => xml::load_file(path, rules),
    }
}

/// Save a model, choosing the printer from the file extension.
pub fn save_path(fts: &FeaturedTransitionSystem, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let path = path.as_ref();
    match Format::of(path) {
        Format::Dot => dot::save_file(fts, path),
        Format::Xml => xml::save_file(fts, path),
    }
}
