//! The abbreviating Turtle/TriG writer, plus a flat N-Triples/N-Quads writer.
//!
//! Grounded on the reference workspace's `LowLevelTriGWriter` (`oxttl/src/trig.rs`): the same
//! `(graph, subject, predicate)` tracking decides between `,`, `;` and `.` between consecutive
//! statements, and the same CURIE-compaction / numeric-literal-inlining rules apply to terms.
//!
//! That reference writer takes its whole prefix table up front and never abbreviates blank nodes
//! or collections; this one has to do both, because the events it consumes come from *this*
//! crate's own grammar, which reports a nested `[ ... ]` or `( ... )` as the flattened statements
//! that describe it, tagged with [`StatementFlags`] and an [`Event::End`] once a property list
//! closes. Because that flattening happens depth-first, a nested construct's own statements (and
//! its `Event::End`) always arrive *before* the statement that references it as subject or object.
//! So abbreviation here is two buffering passes rather than a single incremental bracket stack:
//! an anonymous node's properties are captured into a text buffer keyed by its blank node until
//! the matching `Event::End` closes it, and a collection's `rdf:first`/`rdf:rest` chain is
//! captured into a small per-cons-node map until the statement carrying `start_list_subject` or
//! `start_list_object` asks for it. Either way, whenever a node that turned out to have buffered
//! content is about to be written plainly, the buffered form is spliced in instead.

use std::collections::HashMap;
use std::io::{self, Write};

use rdf_core::vocab::{rdf, xsd};
use rdf_core::{Environment, Event, Node, Statement, StatementFlags};

/// Flags controlling how a [`TurtleWriter`] renders the event stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WriterOptions {
    /// Escape every non-ASCII character as `\uXXXX`/`\UXXXXXXXX` instead of writing it raw.
    pub ascii: bool,
    /// Never abbreviate: no `[ ... ]`, no `( ... )`, no `;`/`,` grouping, one statement per line.
    pub verbatim: bool,
    /// Expand CURIEs and prefix-compactable URIs into full `<...>` form.
    pub expanded: bool,
    /// Omit newlines and indentation; separate everything with single spaces.
    pub terse: bool,
    /// Replace un-encodable text with U+FFFD and log a warning instead of failing.
    pub lax: bool,
    /// Suppress `@base`/`@prefix` output even when [`Event::Base`]/[`Event::Prefix`] events arrive.
    pub contextual: bool,
}

/// Errors a writer can surface; see spec §7's Writer failure model.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// The byte sink returned an error (a short write, a closed pipe, ...).
    #[error("write failed: {0}")]
    Write(#[from] io::Error),
    /// Strict mode hit text that cannot be encoded (bad UTF-8 surrogate, control character in a
    /// URI, ...).
    #[error("text cannot be written in strict mode: {0}")]
    BadText(String),
}

#[derive(Debug)]
struct AnonFrame {
    node: Node,
    text: String,
    last_predicate: Option<Node>,
}

/// Streaming Turtle/TriG writer: consumes [`Event`]s, emits bytes.
///
/// `with_graph_name` selects TriG (named-graph blocks) vs. Turtle (default graph only; a
/// non-default graph on an incoming statement is written anyway, flattened, rather than
/// silently dropped).
pub struct TurtleWriter<W: Write> {
    dest: W,
    env: Environment,
    options: WriterOptions,
    with_graph_name: bool,
    wrote_anything: bool,
    current_graph: Option<Node>,
    subject_predicate: Option<(Node, Node)>,
    frames: Vec<AnonFrame>,
    bodies: HashMap<Node, String>,
    list_firsts: HashMap<Node, Node>,
    list_rests: HashMap<Node, Option<Node>>,
}

impl<W: Write> TurtleWriter<W> {
    pub fn new(dest: W, env: Environment, options: WriterOptions, with_graph_name: bool) -> Self {
        Self {
            dest,
            env,
            options,
            with_graph_name,
            wrote_anything: false,
            current_graph: None,
            subject_predicate: None,
            frames: Vec::new(),
            bodies: HashMap::new(),
            list_firsts: HashMap::new(),
            list_rests: HashMap::new(),
        }
    }

    pub fn write_event(&mut self, event: Event) -> Result<(), WriterError> {
        match event {
            Event::Base(iri) => {
                self.flush_top_level()?;
                if !self.options.contextual {
                    writeln!(self.dest, "@base <{iri}> .")?;
                }
                self.env.set_base(iri);
                Ok(())
            }
            Event::Prefix(name, namespace) => {
                self.flush_top_level()?;
                if !self.options.contextual {
                    writeln!(self.dest, "@prefix {name}: <{namespace}> .")?;
                }
                self.env.set_prefix(name, namespace);
                Ok(())
            }
            Event::Statement(flags, statement) => self.write_statement(flags, statement),
            Event::End(node) => self.close_frame(&node),
        }
    }

    /// Closes any open statement group, graph block and anonymous frame, flushing buffered
    /// anonymous/list content that was never spliced anywhere (orphaned by a caller that dropped
    /// the statement referencing it) as ordinary longhand statements.
    pub fn finish(&mut self) -> Result<(), WriterError> {
        self.flush_top_level()?;
        if self.with_graph_name && self.current_graph.is_some() {
            writeln!(self.dest, "}}")?;
            self.current_graph = None;
        }
        while let Some(frame) = self.frames.pop() {
            self.bodies.insert(frame.node, frame.text);
        }
        let orphans: Vec<Node> = self.bodies.keys().cloned().collect();
        for node in orphans {
            self.flush_orphan_body(&node)?;
        }
        // Only chain heads (cons nodes nobody else's `rdf:rest` points at) are rendered directly;
        // continuations are consumed as part of walking their head's chain.
        let continuations: std::collections::HashSet<Node> = self
            .list_rests
            .values()
            .flatten()
            .cloned()
            .collect();
        let heads: Vec<Node> = self
            .list_firsts
            .keys()
            .filter(|node| !continuations.contains(*node))
            .cloned()
            .collect();
        for node in heads {
            if let Some(rendered) = self.try_render_list(&node)? {
                writeln!(self.dest, "{rendered} .")?;
            }
        }
        Ok(())
    }

    fn flush_orphan_body(&mut self, node: &Node) -> Result<(), WriterError> {
        let Some(text) = self.bodies.remove(node) else {
            return Ok(());
        };
        writeln!(self.dest, "[ {text} ] .")?;
        Ok(())
    }

    fn write_statement(
        &mut self,
        flags: StatementFlags,
        statement: Statement,
    ) -> Result<(), WriterError> {
        if self.options.verbatim {
            return self.write_verbatim(&statement);
        }
        if self.remember_list_links(&statement) {
            return Ok(());
        }
        let object_text = self.render_term(&statement.object)?;
        if flags.start_anon_subject {
            self.frames.push(AnonFrame {
                node: statement.subject.clone(),
                text: String::new(),
                last_predicate: None,
            });
        }
        if let Some(frame) = self.frames.last() {
            if frame.node == statement.subject {
                return self.write_into_frame(&statement.predicate, &object_text);
            }
        }
        self.write_top_level(statement, object_text)
    }

    fn write_into_frame(
        &mut self,
        predicate: &Node,
        object_text: &str,
    ) -> Result<(), WriterError> {
        let frame = self.frames.last_mut().expect("frame just matched");
        if frame.last_predicate.as_ref() == Some(predicate) {
            frame.text.push_str(" , ");
            frame.text.push_str(object_text);
        } else {
            let is_first = frame.last_predicate.is_none();
            if !is_first {
                frame.text.push_str(" ; ");
            }
            frame.text.push_str(&render_predicate(predicate, is_first));
            frame.text.push(' ');
            frame.text.push_str(object_text);
            frame.last_predicate = Some(predicate.clone());
        }
        Ok(())
    }

    fn write_top_level(
        &mut self,
        statement: Statement,
        object_text: String,
    ) -> Result<(), WriterError> {
        let graph_changed = self.current_graph != statement.graph;
        if graph_changed {
            self.flush_top_level()?;
            if self.with_graph_name {
                if self.current_graph.is_some() {
                    writeln!(self.dest, "}}")?;
                }
                if let Some(graph) = &statement.graph {
                    let graph_text = self.render_term(graph)?;
                    writeln!(self.dest, "{graph_text} {{")?;
                }
            }
            self.current_graph = statement.graph.clone();
        }
        let indent = if self.with_graph_name && self.current_graph.is_some() && !self.options.terse
        {
            "\t"
        } else {
            ""
        };
        match &self.subject_predicate {
            Some((subject, predicate))
                if *subject == statement.subject && *predicate == statement.predicate =>
            {
                write!(self.dest, " , {object_text}")?;
            }
            Some((subject, _)) if *subject == statement.subject => {
                let predicate_text = render_predicate(&statement.predicate, false);
                write!(self.dest, " ;\n{indent}    {predicate_text} {object_text}")?;
            }
            _ => {
                if self.subject_predicate.is_some() {
                    writeln!(self.dest, " .")?;
                }
                let subject_text = self.render_term(&statement.subject)?;
                let predicate_text = render_predicate(&statement.predicate, true);
                write!(
                    self.dest,
                    "{indent}{subject_text} {predicate_text} {object_text}"
                )?;
            }
        }
        self.wrote_anything = true;
        self.subject_predicate = Some((statement.subject, statement.predicate));
        Ok(())
    }

    fn flush_top_level(&mut self) -> Result<(), WriterError> {
        if self.subject_predicate.take().is_some() {
            writeln!(self.dest, " .")?;
        }
        Ok(())
    }

    fn close_frame(&mut self, node: &Node) -> Result<(), WriterError> {
        if let Some(position) = self.frames.iter().rposition(|frame| frame.node == *node) {
            let frame = self.frames.remove(position);
            self.bodies.insert(frame.node, frame.text);
        }
        Ok(())
    }

    fn write_verbatim(&mut self, statement: &Statement) -> Result<(), WriterError> {
        if self.current_graph != statement.graph {
            self.current_graph = statement.graph.clone();
        }
        let subject_text = self.render_plain_node(&statement.subject);
        let predicate_text = self.render_plain_node(&statement.predicate);
        let object_text = self.render_plain_node(&statement.object);
        if let Some(graph) = &statement.graph {
            if self.with_graph_name {
                let graph_text = self.render_plain_node(graph);
                writeln!(
                    self.dest,
                    "{subject_text} {predicate_text} {object_text} {graph_text} ."
                )?;
                self.wrote_anything = true;
                return Ok(());
            }
        }
        writeln!(self.dest, "{subject_text} {predicate_text} {object_text} .")?;
        self.wrote_anything = true;
        Ok(())
    }

    /// Renders a term, splicing in a buffered anonymous body or collection when one is pending
    /// for this exact node.
    fn render_term(&mut self, node: &Node) -> Result<String, WriterError> {
        if let Some(body) = self.bodies.remove(node) {
            return Ok(if body.is_empty() {
                "[]".to_owned()
            } else {
                format!("[ {body} ]")
            });
        }
        if let Some(rendered) = self.try_render_list(node)? {
            return Ok(rendered);
        }
        Ok(self.render_plain_node(node))
    }

    fn try_render_list(&mut self, head: &Node) -> Result<Option<String>, WriterError> {
        if !self.list_firsts.contains_key(head) {
            return Ok(None);
        }
        let mut items = Vec::new();
        let mut cursor = head.clone();
        loop {
            let Some(item) = self.list_firsts.remove(&cursor) else {
                break;
            };
            items.push(self.render_term(&item)?);
            match self.list_rests.remove(&cursor) {
                Some(Some(next)) => cursor = next,
                _ => break,
            }
        }
        Ok(Some(if items.is_empty() {
            "()".to_owned()
        } else {
            format!("( {} )", items.join(" "))
        }))
    }

    fn render_plain_node(&self, node: &Node) -> String {
        match node {
            Node::Uri(text) => self.render_uri(text.as_str()),
            Node::Curie(text) => {
                if self.options.expanded {
                    let (prefix, local) = text
                        .as_str()
                        .split_once(':')
                        .unwrap_or((text.as_str(), ""));
                    match self.env.resolve_curie(prefix, local) {
                        Ok(resolved) => self.render_uri(resolved.as_uri().unwrap_or_default()),
                        Err(_) => text.as_str().to_owned(),
                    }
                } else {
                    text.as_str().to_owned()
                }
            }
            Node::Blank(text) => format!("_:{}", text.as_str()),
            Node::Literal(literal) => {
                let flags = literal.flags();
                let quoted = if flags.has_newline {
                    quote_long_string(literal.lexical(), flags.has_quote, self.options.ascii)
                } else {
                    quote_string(literal.lexical(), self.options.ascii)
                };
                if let Some(language) = literal.language() {
                    format!("{quoted}@{language}")
                } else {
                    match literal.datatype() {
                        None | Some(xsd::STRING) => quoted,
                        Some(rdf::LANG_STRING) => quoted,
                        Some(datatype) if !self.options.verbatim && is_inlinable(datatype, literal.lexical()) => {
                            literal.lexical().to_owned()
                        }
                        Some(datatype) => {
                            format!("{quoted}^^{}", self.render_uri(datatype))
                        }
                    }
                }
            }
        }
    }

    fn render_uri(&self, iri: &str) -> String {
        if !self.options.expanded {
            for (name, namespace) in self.env.prefixes() {
                if let Some(local) = iri.strip_prefix(namespace) {
                    if let Some(escaped) = escape_local_name(local) {
                        return format!("{name}:{escaped}");
                    }
                }
            }
        }
        format!("<{}>", escape_iri(iri, self.options.ascii))
    }
}

/// Tracks a collection's `rdf:first`/`rdf:rest` chain, and an anonymous body's properties,
/// ahead of the statement that will eventually ask for them.
impl<W: Write> TurtleWriter<W> {
    fn remember_list_links(&mut self, statement: &Statement) -> bool {
        match statement.predicate.as_uri() {
            Some(uri) if uri == rdf::FIRST => {
                self.list_firsts
                    .insert(statement.subject.clone(), statement.object.clone());
                true
            }
            Some(uri) if uri == rdf::REST => {
                let target = statement.object.as_uri().filter(|u| *u == rdf::NIL);
                let rest = if target.is_some() {
                    None
                } else {
                    Some(statement.object.clone())
                };
                self.list_rests.insert(statement.subject.clone(), rest);
                true
            }
            _ => false,
        }
    }
}

fn render_predicate(predicate: &Node, is_first: bool) -> String {
    if is_first && predicate.as_uri() == Some(rdf::TYPE) {
        "a".to_owned()
    } else {
        match predicate {
            Node::Uri(text) => format!("<{}>", text.as_str()),
            Node::Curie(text) => text.as_str().to_owned(),
            other => other.to_string(),
        }
    }
}

fn quote_string(value: &str, ascii: bool) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\u{08}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{0c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\0'..='\u{1f}' | '\u{7f}' => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c if ascii && !c.is_ascii() => out.push_str(&escape_char(c)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// The `"""…"""` long-string form §4.2 calls for whenever a literal's cached `has_newline` flag
/// is set: embedded newlines are written raw instead of as `\n`. `has_quote` is consulted too: a
/// literal with no `"` at all can skip the quote-run tracking entirely, since nothing it contains
/// can collide with the closing delimiter. When quotes are present, serd's long-quote rule
/// applies: a run of `"` long enough to collide with the closing delimiter, or a `"` immediately
/// before it, is escaped so the result never contains a bare `"""` that isn't the closing one.
fn quote_long_string(value: &str, has_quote: bool, ascii: bool) -> String {
    let mut out = String::with_capacity(value.len() + 6);
    out.push_str("\"\"\"");
    let chars: Vec<char> = value.chars().collect();
    let mut quote_run = 0u32;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '"' if has_quote => {
                quote_run += 1;
                if quote_run >= 3 || i + 1 == chars.len() {
                    out.push_str("\\\"");
                    quote_run = 0;
                } else {
                    out.push('"');
                }
            }
            '\\' => {
                out.push_str("\\\\");
                quote_run = 0;
            }
            '\n' => {
                out.push('\n');
                quote_run = 0;
            }
            '\t' => {
                out.push_str("\\t");
                quote_run = 0;
            }
            '\r' => {
                out.push_str("\\r");
                quote_run = 0;
            }
            '\u{08}' => {
                out.push_str("\\b");
                quote_run = 0;
            }
            '\u{0c}' => {
                out.push_str("\\f");
                quote_run = 0;
            }
            '\0'..='\u{1f}' | '\u{7f}' => {
                out.push_str(&format!("\\u{:04X}", u32::from(c)));
                quote_run = 0;
            }
            c if ascii && !c.is_ascii() => {
                out.push_str(&escape_char(c));
                quote_run = 0;
            }
            c => {
                out.push(c);
                quote_run = 0;
            }
        }
    }
    out.push_str("\"\"\"");
    out
}

fn escape_iri(value: &str, ascii: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\0'..='\u{20}' | '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                out.push_str(&escape_char(c));
            }
            c if ascii && !c.is_ascii() => out.push_str(&escape_char(c)),
            c => out.push(c),
        }
    }
    out
}

fn escape_char(c: char) -> String {
    let code = u32::from(c);
    if code <= 0xFFFF {
        format!("\\u{code:04X}")
    } else {
        format!("\\U{code:08X}")
    }
}

fn escape_local_name(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let mut output = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_alphanumeric() || c == '_' {
            output.push(c);
        } else if can_be_escaped_in_local_name(c) {
            output.push('\\');
            output.push(c);
        } else {
            return None;
        }
    }
    Some(output)
}

fn can_be_escaped_in_local_name(c: char) -> bool {
    matches!(
        c,
        '_' | '~'
            | '.'
            | '-'
            | '!'
            | '$'
            | '&'
            | '\''
            | '('
            | ')'
            | '*'
            | '+'
            | ','
            | ';'
            | '='
            | '/'
            | '?'
            | '#'
            | '@'
            | '%'
    )
}

fn is_inlinable(datatype: &str, value: &str) -> bool {
    match datatype {
        xsd::BOOLEAN => matches!(value, "true" | "false"),
        xsd::INTEGER => is_turtle_integer(value),
        xsd::DECIMAL => is_turtle_decimal(value),
        xsd::DOUBLE => is_turtle_double(value),
        _ => false,
    }
}

fn is_turtle_integer(value: &str) -> bool {
    let value = value.strip_prefix(['+', '-']).unwrap_or(value).as_bytes();
    !value.is_empty() && value.iter().all(u8::is_ascii_digit)
}

fn is_turtle_decimal(value: &str) -> bool {
    let mut value = value.strip_prefix(['+', '-']).unwrap_or(value).as_bytes();
    while value.first().is_some_and(u8::is_ascii_digit) {
        value = &value[1..];
    }
    let Some(value) = value.strip_prefix(b".") else {
        return false;
    };
    !value.is_empty() && value.iter().all(u8::is_ascii_digit)
}

fn is_turtle_double(value: &str) -> bool {
    let mut value = value.strip_prefix(['+', '-']).unwrap_or(value).as_bytes();
    let mut with_digits = false;
    while value.first().is_some_and(u8::is_ascii_digit) {
        value = &value[1..];
        with_digits = true;
    }
    if let Some(rest) = value.strip_prefix(b".") {
        value = rest;
        while value.first().is_some_and(u8::is_ascii_digit) {
            value = &value[1..];
            with_digits = true;
        }
    }
    let Some(value) = value.strip_prefix(b"e").or_else(|| value.strip_prefix(b"E")) else {
        return false;
    };
    let value = value.strip_prefix(['+', '-']).unwrap_or(value);
    with_digits && !value.is_empty() && value.iter().all(u8::is_ascii_digit)
}

/// Flat N-Triples/N-Quads writer: one absolute statement per line, no prefixes, no abbreviation.
pub struct LineWriter<W: Write> {
    dest: W,
    with_graph_name: bool,
    ascii: bool,
}

impl<W: Write> LineWriter<W> {
    pub fn new(dest: W, with_graph_name: bool, ascii: bool) -> Self {
        Self {
            dest,
            with_graph_name,
            ascii,
        }
    }

    pub fn write_event(&mut self, event: Event) -> Result<(), WriterError> {
        match event {
            Event::Statement(_, statement) => self.write_statement(&statement),
            Event::Base(_) | Event::Prefix(_, _) | Event::End(_) => Ok(()),
        }
    }

    pub fn finish(&mut self) -> Result<(), WriterError> {
        Ok(())
    }

    fn write_statement(&mut self, statement: &Statement) -> Result<(), WriterError> {
        let subject = self.render(&statement.subject);
        let predicate = self.render(&statement.predicate);
        let object = self.render(&statement.object);
        if self.with_graph_name {
            if let Some(graph) = &statement.graph {
                let graph = self.render(graph);
                writeln!(self.dest, "{subject} {predicate} {object} {graph} .")?;
                return Ok(());
            }
        }
        writeln!(self.dest, "{subject} {predicate} {object} .")?;
        Ok(())
    }

    fn render(&self, node: &Node) -> String {
        match node {
            Node::Uri(text) => format!("<{}>", escape_iri(text.as_str(), self.ascii)),
            Node::Curie(text) => text.as_str().to_owned(),
            Node::Blank(text) => format!("_:{}", text.as_str()),
            Node::Literal(literal) => {
                let quoted = quote_string(literal.lexical(), self.ascii);
                if let Some(language) = literal.language() {
                    format!("{quoted}@{language}")
                } else {
                    match literal.datatype() {
                        None | Some(xsd::STRING) => quoted,
                        Some(datatype) => format!(
                            "{quoted}^^<{}>",
                            escape_iri(datatype, self.ascii)
                        ),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::Node;

    fn write_all(events: Vec<Event>, env: Environment, options: WriterOptions) -> String {
        let mut writer = TurtleWriter::new(Vec::new(), env, options, true);
        for event in events {
            writer.write_event(event).unwrap();
        }
        writer.finish().unwrap();
        String::from_utf8(writer.dest).unwrap()
    }

    #[test]
    fn abbreviates_shared_subject_and_predicate() {
        let s = Node::uri("http://example.com/s");
        let p = Node::uri("http://example.com/p");
        let q = Node::uri("http://example.com/q");
        let o1 = Node::plain_literal("o1");
        let o2 = Node::plain_literal("o2");
        let o3 = Node::plain_literal("o3");
        let events = vec![
            Event::Statement(
                StatementFlags::default(),
                Statement::new(s.clone(), p.clone(), o1),
            ),
            Event::Statement(
                StatementFlags::default(),
                Statement::new(s.clone(), p, o2),
            ),
            Event::Statement(StatementFlags::default(), Statement::new(s, q, o3)),
        ];
        let output = write_all(events, Environment::new(), WriterOptions::default());
        assert_eq!(
            output,
            "<http://example.com/s> <http://example.com/p> \"o1\" , \"o2\" ;\n    <http://example.com/q> \"o3\" .\n"
        );
    }

    #[test]
    fn reconstructs_an_anonymous_property_list() {
        let a = Node::uri("http://example.com/a");
        let b = Node::uri("http://example.com/b");
        let p2 = Node::uri("http://example.com/p2");
        let o2 = Node::uri("http://example.com/o2");
        let blank = Node::blank("g1");
        let events = vec![
            Event::Statement(
                StatementFlags {
                    start_anon_subject: true,
                    ..StatementFlags::default()
                },
                Statement::new(blank.clone(), p2, o2),
            ),
            Event::End(blank.clone()),
            Event::Statement(
                StatementFlags::default(),
                Statement::new(a, b, blank),
            ),
        ];
        let output = write_all(events, Environment::new(), WriterOptions::default());
        assert_eq!(
            output,
            "<http://example.com/a> <http://example.com/b> [ <http://example.com/p2> <http://example.com/o2> ] .\n"
        );
    }

    #[test]
    fn reconstructs_a_collection() {
        let a = Node::uri("http://example.com/a");
        let b = Node::uri("http://example.com/b");
        let cons1 = Node::blank("g1");
        let cons2 = Node::blank("g2");
        let events = vec![
            Event::Statement(
                StatementFlags::default(),
                Statement::new(cons1.clone(), Node::uri(rdf::FIRST), Node::plain_literal("x")),
            ),
            Event::Statement(
                StatementFlags::default(),
                Statement::new(cons1.clone(), Node::uri(rdf::REST), cons2.clone()),
            ),
            Event::Statement(
                StatementFlags::default(),
                Statement::new(cons2.clone(), Node::uri(rdf::FIRST), Node::plain_literal("y")),
            ),
            Event::Statement(
                StatementFlags::default(),
                Statement::new(cons2, Node::uri(rdf::REST), Node::uri(rdf::NIL)),
            ),
            Event::Statement(
                StatementFlags {
                    start_list_object: true,
                    ..StatementFlags::default()
                },
                Statement::new(a, b, cons1),
            ),
        ];
        let output = write_all(events, Environment::new(), WriterOptions::default());
        assert_eq!(
            output,
            "<http://example.com/a> <http://example.com/b> ( \"x\" \"y\" ) .\n"
        );
    }

    #[test]
    fn uses_a_shortcut_for_rdf_type() {
        let s = Node::uri("http://example.com/s");
        let events = vec![Event::Statement(
            StatementFlags::default(),
            Statement::new(s, Node::uri(rdf::TYPE), Node::uri("http://example.com/T")),
        )];
        let output = write_all(events, Environment::new(), WriterOptions::default());
        assert_eq!(
            output,
            "<http://example.com/s> a <http://example.com/T> .\n"
        );
    }

    #[test]
    fn inlines_numeric_literals() {
        let s = Node::uri("http://example.com/s");
        let p = Node::uri("http://example.com/p");
        let events = vec![Event::Statement(
            StatementFlags::default(),
            Statement::new(s, p, Node::typed_literal("42", xsd::INTEGER)),
        )];
        let output = write_all(events, Environment::new(), WriterOptions::default());
        assert_eq!(output, "<http://example.com/s> <http://example.com/p> 42 .\n");
    }

    #[test]
    fn compacts_a_prefixed_uri() {
        let mut env = Environment::new();
        env.set_prefix("ex", "http://example.com/");
        let s = Node::uri("http://example.com/s");
        let p = Node::uri("http://example.com/p");
        let o = Node::uri("http://example.com/o");
        let events = vec![Event::Statement(
            StatementFlags::default(),
            Statement::new(s, p, o),
        )];
        let output = write_all(events, env, WriterOptions::default());
        assert_eq!(output, "ex:s ex:p ex:o .\n");
    }

    #[test]
    fn multiline_literal_uses_triple_quoted_long_form() {
        let s = Node::uri("http://example.com/s");
        let p = Node::uri("http://example.com/p");
        let o = Node::plain_literal("line one\nline two");
        let events = vec![Event::Statement(
            StatementFlags::default(),
            Statement::new(s, p, o),
        )];
        let output = write_all(events, Environment::new(), WriterOptions::default());
        assert_eq!(
            output,
            "<http://example.com/s> <http://example.com/p> \"\"\"line one\nline two\"\"\" .\n"
        );
    }

    #[test]
    fn multiline_literal_escapes_a_run_of_three_quotes_but_leaves_shorter_runs_raw() {
        // A run of three (or more) `"` would collide with the closing delimiter if left bare;
        // per the grammar, up to two consecutive `"` may stay unescaped inside a long string, so
        // only the third of the run needs an escape.
        let s = Node::uri("http://example.com/s");
        let p = Node::uri("http://example.com/p");
        let o = Node::plain_literal("a\"\"\"b\n");
        let events = vec![Event::Statement(
            StatementFlags::default(),
            Statement::new(s, p, o),
        )];
        let output = write_all(events, Environment::new(), WriterOptions::default());
        assert_eq!(
            output,
            "<http://example.com/s> <http://example.com/p> \"\"\"a\"\"\\\"b\n\"\"\" .\n"
        );
    }

    #[test]
    fn multiline_literal_escapes_a_quote_immediately_before_the_closing_delimiter() {
        let s = Node::uri("http://example.com/s");
        let p = Node::uri("http://example.com/p");
        let o = Node::plain_literal("line\nends with quote\"");
        let events = vec![Event::Statement(
            StatementFlags::default(),
            Statement::new(s, p, o),
        )];
        let output = write_all(events, Environment::new(), WriterOptions::default());
        assert_eq!(
            output,
            "<http://example.com/s> <http://example.com/p> \"\"\"line\nends with quote\\\"\"\"\" .\n"
        );
    }

    #[test]
    fn single_line_literal_still_escapes_newline_free_text_normally() {
        let s = Node::uri("http://example.com/s");
        let p = Node::uri("http://example.com/p");
        let o = Node::plain_literal("has a \"quote\" but no newline");
        let events = vec![Event::Statement(
            StatementFlags::default(),
            Statement::new(s, p, o),
        )];
        let output = write_all(events, Environment::new(), WriterOptions::default());
        assert_eq!(
            output,
            "<http://example.com/s> <http://example.com/p> \"has a \\\"quote\\\" but no newline\" .\n"
        );
    }

    #[test]
    fn line_writer_never_abbreviates() {
        let s = Node::blank("b");
        let p = Node::uri("http://example.com/p");
        let o = Node::plain_literal("hi");
        let mut writer = LineWriter::new(Vec::new(), false, false);
        writer
            .write_event(Event::Statement(
                StatementFlags::default(),
                Statement::new(s, p, o),
            ))
            .unwrap();
        writer.finish().unwrap();
        assert_eq!(
            String::from_utf8(writer.dest).unwrap(),
            "_:b <http://example.com/p> \"hi\" .\n"
        );
    }
}
