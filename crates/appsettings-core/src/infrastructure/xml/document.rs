//! Minimal XML element tree.
//!
//! Just enough of a DOM to edit an `appSettings` section in place and write
//! the whole document back: elements with ordered attributes and children,
//! text, CDATA, comments, processing instructions and the XML declaration.
//! Parsing and writing go through `quick-xml`; whitespace-only text between
//! elements is dropped on read and the output is re-indented with two spaces.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Error type for XML parsing and writing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum XmlError {
    /// The text is not well-formed XML.
    #[error("XML syntax error at byte {position}: {reason}")]
    Syntax { position: u64, reason: String },

    /// The document has no root element.
    #[error("root element is missing")]
    MissingRoot,

    /// A second top-level element was found.
    #[error("more than one root element (found `{0}`)")]
    MultipleRoots(String),

    /// The input ended inside an element.
    #[error("element `{0}` is not closed")]
    Unclosed(String),

    /// The document could not be serialized.
    #[error("failed to write XML: {0}")]
    Write(String),
}

/// A node inside an element or around the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Unescaped character data.
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    /// `(name, unescaped value)` pairs in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the value of attribute `name`, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets attribute `name`, replacing its value if it already exists.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Child elements, skipping text and other nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First direct child element named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Mutable form of [`child`](Self::child).
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    pub fn append_child(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }
}

/// The `<?xml ...?>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("utf-8".to_string()),
            standalone: None,
        }
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDocument {
    pub declaration: Option<XmlDeclaration>,
    /// Comments, processing instructions and doctype before the root.
    pub prolog: Vec<XmlNode>,
    /// The document element.
    pub root: Option<XmlElement>,
    /// Comments and processing instructions after the root.
    pub epilog: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parses `text` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] if the text is not well-formed, has no root
    /// element, or has more than one.
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(text);

        let mut doc = XmlDocument::default();
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| XmlError::Syntax {
                position: reader.error_position() as u64,
                reason: e.to_string(),
            })?;
            let position = reader.buffer_position() as u64;
            let syntax = |reason: String| XmlError::Syntax { position, reason };

            match event {
                Event::Decl(decl) => doc.declaration = Some(read_declaration(&decl).map_err(syntax)?),
                Event::Start(start) => stack.push(read_element(&start).map_err(syntax)?),
                Event::Empty(start) => {
                    let element = read_element(&start).map_err(syntax)?;
                    attach(&mut doc, &mut stack, XmlNode::Element(element))?;
                }
                Event::End(_) => {
                    // The reader has already matched the end tag against the open element.
                    if let Some(element) = stack.pop() {
                        attach(&mut doc, &mut stack, XmlNode::Element(element))?;
                    }
                }
                Event::Text(text) => {
                    let raw = utf8(&text).map_err(syntax)?;
                    // Indentation between elements.
                    if raw.trim().is_empty() {
                        continue;
                    }
                    let value = unescape(raw).map_err(|e| syntax(e.to_string()))?;
                    push_text(&mut stack, &value);
                }
                Event::GeneralRef(reference) => {
                    let name = utf8(&reference).map_err(syntax)?;
                    let entity = format!("&{name};");
                    let value = unescape(&entity).map_err(|e| syntax(e.to_string()))?;
                    push_text(&mut stack, &value);
                }
                Event::CData(data) => {
                    let value = utf8(&data).map_err(syntax)?.to_string();
                    attach(&mut doc, &mut stack, XmlNode::CData(value))?;
                }
                Event::Comment(comment) => {
                    let value = utf8(&comment).map_err(syntax)?.to_string();
                    attach(&mut doc, &mut stack, XmlNode::Comment(value))?;
                }
                Event::PI(pi) => {
                    let value = utf8(&pi).map_err(syntax)?.to_string();
                    attach(&mut doc, &mut stack, XmlNode::ProcessingInstruction(value))?;
                }
                Event::DocType(doctype) => {
                    let value = utf8(&doctype).map_err(syntax)?.to_string();
                    doc.prolog.push(XmlNode::DocType(value));
                }
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }
        if doc.root.is_none() {
            return Err(XmlError::MissingRoot);
        }
        Ok(doc)
    }

    /// Serializes the document, indented by two spaces.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::Write`] if an event cannot be written.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        if let Some(decl) = &self.declaration {
            let event = BytesDecl::new(&decl.version, decl.encoding.as_deref(), decl.standalone.as_deref());
            writer
                .write_event(Event::Decl(event))
                .map_err(|e| XmlError::Write(e.to_string()))?;
        }
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        if let Some(root) = &self.root {
            write_element(&mut writer, root)?;
        }
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
    }
}

// ── Reading helpers ───────────────────────────────────────────────────────────

fn utf8(bytes: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|e| e.to_string())
}

fn read_declaration(decl: &BytesDecl<'_>) -> Result<XmlDeclaration, String> {
    let text = |value: &[u8]| utf8(value).map(str::to_string);
    let version = decl.version().map_err(|e| e.to_string())?;
    let encoding = match decl.encoding() {
        Some(value) => Some(text(&value.map_err(|e| e.to_string())?)?),
        None => None,
    };
    let standalone = match decl.standalone() {
        Some(value) => Some(text(&value.map_err(|e| e.to_string())?)?),
        None => None,
    };
    Ok(XmlDeclaration {
        version: text(&version)?,
        encoding,
        standalone,
    })
}

fn read_element(start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let mut element = XmlElement::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = utf8(attr.key.as_ref())?;
        let value = unescape(utf8(&attr.value)?).map_err(|e| e.to_string())?;
        element.attributes.push((key.to_string(), value.into_owned()));
    }
    Ok(element)
}

fn attach(doc: &mut XmlDocument, stack: &mut [XmlElement], node: XmlNode) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        XmlNode::Element(element) if doc.root.is_some() => Err(XmlError::MultipleRoots(element.name)),
        XmlNode::Element(element) => {
            doc.root = Some(element);
            Ok(())
        }
        other if doc.root.is_some() => {
            doc.epilog.push(other);
            Ok(())
        }
        other => {
            doc.prolog.push(other);
            Ok(())
        }
    }
}

/// Appends text to the open element, merging with a preceding text node so
/// that entity references do not split the value.  Text outside the root is
/// ignored.
fn push_text(stack: &mut [XmlElement], value: &str) {
    if value.is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        if let Some(XmlNode::Text(existing)) = parent.children.last_mut() {
            existing.push_str(value);
        } else {
            parent.children.push(XmlNode::Text(value.to_string()));
        }
    }
}

// ── Writing helpers ───────────────────────────────────────────────────────────

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        let escaped = escape_attribute(value)?;
        start.push_attribute((key.as_bytes(), escaped.as_bytes()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| XmlError::Write(e.to_string()))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), XmlError> {
    let event = match node {
        XmlNode::Element(element) => return write_element(writer, element),
        XmlNode::Text(text) => {
            check_chars(text)?;
            Event::Text(BytesText::new(text))
        }
        XmlNode::CData(data) => {
            check_chars(data)?;
            Event::CData(BytesCData::new(data.as_str()))
        }
        XmlNode::Comment(comment) => Event::Comment(BytesText::from_escaped(comment.as_str())),
        XmlNode::ProcessingInstruction(pi) => Event::PI(BytesPI::new(pi.as_str())),
        XmlNode::DocType(doctype) => Event::DocType(BytesText::from_escaped(doctype.as_str())),
    };
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}

/// Escapes an attribute value.  Tab, newline and carriage return are written
/// as character references so a reader's attribute-value normalization does
/// not turn them into spaces.
fn escape_attribute(value: &str) -> Result<String, XmlError> {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' => escaped.push_str("&#9;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            c if is_xml_char(c) => escaped.push(c),
            c => return Err(invalid_char(c)),
        }
    }
    Ok(escaped)
}

/// The XML 1.0 `Char` production.  Anything else cannot appear in a
/// document, not even as a character reference.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn check_chars(text: &str) -> Result<(), XmlError> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(invalid_char(c)),
        None => Ok(()),
    }
}

fn invalid_char(c: char) -> XmlError {
    XmlError::Write(format!("character U+{:04X} is not allowed in XML", u32::from(c)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
