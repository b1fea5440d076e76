//! Graphviz DOT import and export.
//!
//! Edges carry `label="action/guard"`, split at the last `/`. A label
//! without `/` means the guard `true`; a missing label means the silent
//! action `tau`. Quoted ids and labels escape `"` and `\`. The start state
//! is the target of the edge leaving the point-shaped `__start` node, or
//! the first node mentioned when there is none.

use crate::builder::{Document, StateDecl, TransitionDecl};
use crate::core::FeaturedTransitionSystem;
use crate::io::error::LoadError;
use crate::validation::ValidationRules;
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

/// Action used for edges without a label.
pub const SILENT_ACTION: &str = "tau";

/// Name of the invisible node pointing at the start state.
pub const ENTRY_NODE: &str = "__start";

lazy_static! {
    static ref LABEL: Regex =
        Regex::new(r#"label\s*=\s*"((?:[^"\\]|\\.)*)""#).expect("LABEL regex is valid");
    static ref HEADER: Regex =
        Regex::new(r"^\s*(?:strict\s+)?digraph\b[^{]*\{").expect("HEADER regex is valid");
    static ref PLAIN_ID: Regex =
        Regex::new(r"^[A-Za-z0-9_.]+$").expect("PLAIN_ID regex is valid");
}

/// Render a system as a DOT digraph.
///
/// # Example
///
/// ```rust
/// use ftsmind::fts;
/// use ftsmind::io::dot::to_dot;
///
/// let system = fts! {
///     start: idle;
///     idle => [scan -> idle if "lidar"];
/// }
/// .unwrap();
///
/// let dot = to_dot(&system);
/// assert!(dot.contains("__start -> idle;"));
/// assert!(dot.contains(r#"idle -> idle [label="scan/lidar"];"#));
/// ```
pub fn to_dot(fts: &FeaturedTransitionSystem) -> String {
    let mut out = String::from("digraph fts {\n");
    let _ = writeln!(out, "    {ENTRY_NODE} [shape=point];");
    let _ = writeln!(out, "    {ENTRY_NODE} -> {};", quote(fts.start()));
    for state in fts.states() {
        let _ = writeln!(out, "    {};", quote(state.id()));
    }
    for t in fts.transitions() {
        // An action containing `/` always gets an explicit guard.
        let label = if t.guard.is_trivial() && !t.action.contains('/') {
            t.action.to_string()
        } else {
            format!("{}/{}", t.action, t.guard)
        };
        let _ = writeln!(
            out,
            "    {} -> {} [label=\"{}\"];",
            quote(&t.source),
            quote(&t.target),
            escape(&label)
        );
    }
    out.push_str("}\n");
    out
}

fn quote(id: &str) -> String {
    if PLAIN_ID.is_match(id) {
        id.to_string()
    } else {
        format!("\"{}\"", escape(id))
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if next == '"' || next == '\\' => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn unquote(id: &str) -> Cow<'_, str> {
    match id.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => unescape(inner),
        None => Cow::Borrowed(id),
    }
}

/// Collects states in first-mention order.
#[derive(Default)]
struct DocumentBuilder {
    start: Option<String>,
    first: Option<String>,
    states: Vec<StateDecl>,
    index: HashMap<String, usize>,
}

impl DocumentBuilder {
    fn declare(&mut self, id: &str) -> usize {
        if self.first.is_none() {
            self.first = Some(id.to_string());
        }
        if let Some(&i) = self.index.get(id) {
            return i;
        }
        self.states.push(StateDecl {
            id: id.to_string(),
            transitions: Vec::new(),
        });
        self.index.insert(id.to_string(), self.states.len() - 1);
        self.states.len() - 1
    }

    fn finish(self) -> Document {
        Document {
            start: self.start.or(self.first),
            states: self.states,
        }
    }
}

/// Parse the supported DOT subset into a raw document.
pub fn parse_document(text: &str) -> Result<Document, LoadError> {
    let text = strip_comments(text);
    let header = HEADER.find(&text).ok_or_else(|| LoadError::Dot {
        line: 1,
        message: "expected 'digraph <name> {'".to_string(),
    })?;
    let close = text.rfind('}').ok_or_else(|| LoadError::Dot {
        line: line_of(&text, text.len()),
        message: "missing closing '}'".to_string(),
    })?;
    if close < header.end() {
        return Err(LoadError::Dot {
            line: line_of(&text, close),
            message: "missing closing '}'".to_string(),
        });
    }

    let mut builder = DocumentBuilder::default();
    for (offset, statement) in statements(&text[header.end()..close]) {
        let line = line_of(&text, header.end() + offset);
        statement_into(statement.trim(), line, &mut builder)?;
    }
    Ok(builder.finish())
}

fn statement_into(stmt: &str, line: usize, builder: &mut DocumentBuilder) -> Result<(), LoadError> {
    if stmt.is_empty() {
        return Ok(());
    }
    if stmt.starts_with("subgraph") || stmt.starts_with('{') {
        return Err(LoadError::Dot {
            line,
            message: "subgraphs are not supported".to_string(),
        });
    }

    let (head, attrs) = match find_outside_quotes(stmt, "[") {
        Some(i) => (&stmt[..i], &stmt[i..]),
        None => (stmt, ""),
    };
    let head = head.trim();

    if matches!(head, "graph" | "node" | "edge") {
        return Ok(());
    }
    if find_outside_quotes(head, "--").is_some() {
        return Err(LoadError::Dot {
            line,
            message: "undirected edges are not supported".to_string(),
        });
    }

    if find_outside_quotes(head, "->").is_none() {
        // Graph attribute such as `rankdir=LR`.
        if find_outside_quotes(head, "=").is_some() {
            return Ok(());
        }
        let id = node_id(head, line)?;
        if id != ENTRY_NODE {
            builder.declare(&id);
        }
        return Ok(());
    }

    let nodes = split_outside_quotes(head, "->")
        .into_iter()
        .map(|n| node_id(n.trim(), line))
        .collect::<Result<Vec<_>, _>>()?;

    let (action, guard) = label(attrs);
    for pair in nodes.windows(2) {
        let (from, to) = (pair[0].as_ref(), pair[1].as_ref());
        if from == ENTRY_NODE {
            builder.start = Some(to.to_string());
            continue;
        }
        let source = builder.declare(from);
        builder.declare(to);
        builder.states[source].transitions.push(TransitionDecl {
            action: action.clone(),
            target: to.to_string(),
            fexpression: guard.clone(),
        });
    }
    Ok(())
}

fn node_id(raw: &str, line: usize) -> Result<Cow<'_, str>, LoadError> {
    // Port suffixes such as `a:n` are dropped.
    let raw = match find_outside_quotes(raw, ":") {
        Some(i) => raw[..i].trim(),
        None => raw,
    };
    let id = unquote(raw);
    if id.is_empty() || (!raw.starts_with('"') && !PLAIN_ID.is_match(&id)) {
        return Err(LoadError::Dot {
            line,
            message: format!("invalid node id '{raw}'"),
        });
    }
    Ok(id)
}

fn label(attrs: &str) -> (String, String) {
    let extracted = LABEL
        .captures(attrs)
        .and_then(|c| c.get(1))
        .map(|m| unescape(m.as_str()))
        .unwrap_or_default();
    let extracted = extracted.trim();
    if extracted.is_empty() {
        return (SILENT_ACTION.to_string(), "true".to_string());
    }
    match extracted.rsplit_once('/') {
        Some((action, guard)) if !guard.trim().is_empty() => {
            (action.trim().to_string(), guard.trim().to_string())
        }
        Some((action, _)) => (action.trim().to_string(), "true".to_string()),
        None => (extracted.to_string(), "true".to_string()),
    }
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_quotes = false;
    let mut line_start = true;
    while let Some(c) = chars.next() {
        if in_quotes {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                out.push(c);
            }
            '#' if line_start => {
                skip_line(&mut chars, &mut out);
                continue;
            }
            '/' if chars.peek() == Some(&'/') => {
                skip_line(&mut chars, &mut out);
                line_start = true;
                continue;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    // Keep line numbers stable.
                    if c == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(c),
        }
        line_start = c == '\n' || (line_start && c.is_whitespace());
    }
    out
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String) {
    for c in chars.by_ref() {
        if c == '\n' {
            out.push('\n');
            break;
        }
    }
}

/// Split a graph body into statements at `;` and newlines outside quotes
/// and attribute lists. Yields each statement with its byte offset.
fn statements(body: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ';' | '\n' if depth == 0 => {
                out.push((start, &body[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push((start, &body[start..]));
    out
}

fn find_outside_quotes(s: &str, pattern: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        if c == '"' {
            in_quotes = true;
        } else if s[i..].starts_with(pattern) {
            return Some(i);
        }
    }
    None
}

fn split_outside_quotes<'a>(s: &'a str, pattern: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(i) = find_outside_quotes(rest, pattern) {
        parts.push(&rest[..i]);
        rest = &rest[i + pattern.len()..];
    }
    parts.push(rest);
    parts
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset.min(text.len())].matches('\n').count() + 1
}

/// Parse and validate a DOT model.
pub fn from_dot(text: &str, rules: &ValidationRules) -> Result<FeaturedTransitionSystem, LoadError> {
    let doc = parse_document(text)?;
    Ok(doc.build(rules)?)
}

pub fn load_file(
    path: impl AsRef<Path>,
    rules: &ValidationRules,
) -> Result<FeaturedTransitionSystem, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    tracing::debug!(path = %path.display(), "loading DOT model");
    from_dot(&text, rules)
}

pub fn save_file(fts: &FeaturedTransitionSystem, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let path = path.as_ref();
    std::fs::write(path, to_dot(fts)).map_err(|e| LoadError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FtsBuilder;
    use crate::fts;

    #[test]
    fn labels_split_action_and_guard() {
        assert_eq!(
            label(r#"[label="liDet/(!mapping && lidar)"]"#),
            ("liDet".to_string(), "(!mapping && lidar)".to_string())
        );
        assert_eq!(label(r#"[label = " clean "]"#), ("clean".to_string(), "true".to_string()));
        assert_eq!(label("[color=red]"), ("tau".to_string(), "true".to_string()));
        assert_eq!(label(""), ("tau".to_string(), "true".to_string()));
        assert_eq!(
            label(r#"[label="scan/fast/true"]"#),
            ("scan/fast".to_string(), "true".to_string())
        );
        assert_eq!(
            label(r#"[label="say \"hi\"/lidar"]"#),
            ("say \"hi\"".to_string(), "lidar".to_string())
        );
    }

    #[test]
    fn first_node_is_start_without_entry_edge() {
        let doc = parse_document(
            r#"digraph g {
                b -> a [label="go"];
                a;
            }"#,
        )
        .unwrap();
        assert_eq!(doc.start.as_deref(), Some("b"));
        let ids: Vec<&str> = doc.states.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn chained_edges_share_the_label() {
        let doc = parse_document("digraph { a -> b -> c [label=\"x/f\"] }").unwrap();
        assert_eq!(doc.states[0].transitions[0].target, "b");
        assert_eq!(doc.states[1].transitions[0].target, "c");
        assert_eq!(doc.states[1].transitions[0].fexpression, "f");
        assert!(doc.states[2].transitions.is_empty());
    }

    #[test]
    fn attributes_and_comments_are_ignored() {
        let doc = parse_document(
            r#"
            # generated
            digraph g {
                rankdir=LR; // layout
                node [shape=circle];
                /* entry */
                __start [shape=point];
                __start -> "s 1";
                "s 1" -> s2 [label="go", color=blue];
            }"#,
        )
        .unwrap();
        assert_eq!(doc.start.as_deref(), Some("s 1"));
        assert_eq!(doc.states.len(), 2);
        assert_eq!(doc.states[0].transitions[0].action, "go");
    }

    #[test]
    fn syntax_errors_carry_line_numbers() {
        let err = parse_document("digraph g {\n a -- b;\n}").unwrap_err();
        assert!(matches!(err, LoadError::Dot { line: 2, .. }));

        let err = parse_document("graph g { a -- b }").unwrap_err();
        assert!(matches!(err, LoadError::Dot { line: 1, .. }));

        let err = parse_document("digraph g {\n\n a -> ;\n}").unwrap_err();
        assert!(matches!(err, LoadError::Dot { line: 3, .. }));
    }

    #[test]
    fn export_then_import_preserves_the_system() {
        let system = fts! {
            start: state2;
            state0 => [liDet -> state2 if "(!mapping && lidar)", move -> state3 if "!mapping"];
            state2 => [goAround -> state3];
            state3 => [];
        }
        .unwrap();

        let dot = to_dot(&system);
        assert!(dot.contains("    __start -> state2;"));
        assert!(dot.contains(r#"    state2 -> state3 [label="goAround"];"#));

        let back = from_dot(&dot, &ValidationRules::default()).unwrap();
        assert_eq!(back, system);
    }

    #[test]
    fn slashes_and_quotes_survive_export() {
        let system = FtsBuilder::new()
            .start("say \"hi\"")
            .add("say \"hi\"", "scan/fast", "a\\b", "true")
            .add("a\\b", "log \"x\"", "say \"hi\"", "lidar")
            .build()
            .unwrap();

        let dot = to_dot(&system);
        assert!(dot.contains(r#"[label="scan/fast/true"]"#));
        assert!(dot.contains(r#""say \"hi\"" -> "a\\b""#));

        let back = from_dot(&dot, &ValidationRules::default()).unwrap();
        assert_eq!(back, system);
        assert!(back.transitions().next().unwrap().guard.is_trivial());
    }
}
