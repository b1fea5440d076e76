//! The XML model format.
//!
//! ```xml
//! <fts>
//!     <start>state0</start>
//!     <states>
//!         <state id="state0">
//!             <transition action="map" target="state1" fexpression="mapping"></transition>
//!         </state>
//!     </states>
//! </fts>
//! ```
//!
//! Loading is two-phase: [`parse_document`] only checks the XML shape and
//! returns the raw [`Document`]; [`load_str`] then validates it.

use crate::builder::{Document, StateDecl, TransitionDecl};
use crate::core::FeaturedTransitionSystem;
use crate::io::error::LoadError;
use crate::validation::ValidationRules;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Element {
    Fts,
    Start,
    States,
    State,
    Transition,
}

impl Element {
    fn name(self) -> &'static str {
        match self {
            Element::Fts => "fts",
            Element::Start => "start",
            Element::States => "states",
            Element::State => "state",
            Element::Transition => "transition",
        }
    }
}

#[derive(Default)]
struct Shape {
    root: bool,
    start: bool,
    states: bool,
}

/// Parse the XML shape of a model without validating it.
pub fn parse_document(xml: &str) -> Result<Document, LoadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut doc = Document::default();
    let mut shape = Shape::default();
    let mut stack: Vec<Element> = Vec::new();
    let mut start_text = String::new();

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|source| LoadError::Xml { position, source })?;

        match event {
            Event::Start(e) => {
                let element = open(&e, stack.last().copied(), &mut shape, &mut doc, position)?;
                stack.push(element);
            }
            Event::Empty(e) => {
                open(&e, stack.last().copied(), &mut shape, &mut doc, position)?;
            }
            Event::End(_) => {
                if stack.pop() == Some(Element::Start) {
                    doc.start = Some(start_text.trim().to_string());
                }
            }
            Event::Text(t) => {
                if stack.last() == Some(&Element::Start) {
                    let text = t
                        .unescape()
                        .map_err(|source| LoadError::Xml { position, source })?;
                    start_text.push_str(&text);
                }
            }
            Event::CData(t) => {
                if stack.last() == Some(&Element::Start) {
                    let text = t
                        .decode()
                        .map_err(|source| LoadError::Xml { position, source: source.into() })?;
                    start_text.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !shape.root {
        return Err(LoadError::MissingElement("fts"));
    }
    if !shape.states {
        return Err(LoadError::MissingElement("states"));
    }

    tracing::trace!(
        states = doc.states.len(),
        transitions = doc.transition_count(),
        "parsed model document"
    );
    Ok(doc)
}

fn open(
    e: &BytesStart<'_>,
    parent: Option<Element>,
    shape: &mut Shape,
    doc: &mut Document,
    position: u64,
) -> Result<Element, LoadError> {
    let name = e.name();
    let element = match (parent, name.as_ref()) {
        (None, b"fts") => {
            if shape.root {
                return Err(LoadError::DuplicateElement {
                    element: "fts",
                    position,
                });
            }
            shape.root = true;
            Element::Fts
        }
        (Some(Element::Fts), b"start") => {
            if shape.start {
                return Err(LoadError::DuplicateElement {
                    element: "start",
                    position,
                });
            }
            shape.start = true;
            // An empty <start/> still declares a (blank) start.
            doc.start = Some(String::new());
            Element::Start
        }
        (Some(Element::Fts), b"states") => {
            if shape.states {
                return Err(LoadError::DuplicateElement {
                    element: "states",
                    position,
                });
            }
            shape.states = true;
            Element::States
        }
        (Some(Element::States), b"state") => {
            let mut attrs = Attributes::read(e, position)?;
            doc.states.push(StateDecl {
                id: attrs.require("state", "id", position)?,
                transitions: Vec::new(),
            });
            Element::State
        }
        (Some(Element::State), b"transition") => {
            let mut attrs = Attributes::read(e, position)?;
            let decl = TransitionDecl {
                action: attrs.require("transition", "action", position)?,
                target: attrs.require("transition", "target", position)?,
                fexpression: attrs.take("fexpression").unwrap_or_else(|| "true".to_string()),
            };
            if let Some(state) = doc.states.last_mut() {
                state.transitions.push(decl);
            }
            Element::Transition
        }
        (parent, found) => {
            return Err(LoadError::UnexpectedElement {
                found: String::from_utf8_lossy(found).into_owned(),
                parent: parent.map_or("document", Element::name).to_string(),
                position,
            })
        }
    };
    Ok(element)
}

struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn read(e: &BytesStart<'_>, position: u64) -> Result<Self, LoadError> {
        let mut out = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|source| LoadError::Attribute { position, source })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|source| LoadError::Xml { position, source })?;
            out.push((key, value.into_owned()));
        }
        Ok(Self(out))
    }

    fn take(&mut self, key: &str) -> Option<String> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.swap_remove(index).1)
    }

    fn require(
        &mut self,
        element: &'static str,
        attribute: &'static str,
        position: u64,
    ) -> Result<String, LoadError> {
        self.take(attribute).ok_or(LoadError::MissingAttribute {
            element,
            attribute,
            position,
        })
    }
}

/// Parse and validate a model.
pub fn load_str(xml: &str, rules: &ValidationRules) -> Result<FeaturedTransitionSystem, LoadError> {
    let doc = parse_document(xml)?;
    Ok(doc.build(rules)?)
}

/// Read, parse and validate a model file.
pub fn load_file(
    path: impl AsRef<Path>,
    rules: &ValidationRules,
) -> Result<FeaturedTransitionSystem, LoadError> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    tracing::debug!(path = %path.display(), "loading model");
    load_str(&xml, rules)
}

/// Print a system in canonical form: XML declaration, four-space indent,
/// guards through the expression printer.
pub fn to_string(fts: &FeaturedTransitionSystem) -> String {
    document_to_string(&Document::from(fts))
}

/// Print a raw document in canonical layout. Guard text is kept as is.
pub fn document_to_string(doc: &Document) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<fts>\n");
    if let Some(start) = &doc.start {
        let _ = writeln!(out, "    <start>{}</start>", escape(start.as_str()));
    }
    out.push_str("    <states>\n");
    for state in &doc.states {
        if state.transitions.is_empty() {
            let _ = writeln!(out, "        <state id=\"{}\"></state>", escape(state.id.as_str()));
            continue;
        }
        let _ = writeln!(out, "        <state id=\"{}\">", escape(state.id.as_str()));
        for t in &state.transitions {
            let _ = writeln!(
                out,
                "            <transition action=\"{}\" target=\"{}\" fexpression=\"{}\"></transition>",
                escape(t.action.as_str()),
                escape(t.target.as_str()),
                escape(t.fexpression.as_str()),
            );
        }
        out.push_str("        </state>\n");
    }
    out.push_str("    </states>\n");
    out.push_str("</fts>\n");
    out
}

/// Write a system to a file in canonical form.
pub fn save_file(fts: &FeaturedTransitionSystem, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let path = path.as_ref();
    std::fs::write(path, to_string(fts)).map_err(|e| LoadError::io(path, e))?;
    tracing::debug!(path = %path.display(), "saved model");
    Ok(())
}
