//! Namespace-aware XML element tree.
//!
//! The tree knows nothing about RSS: it records, for every element, its
//! resolved namespace URI, the prefix it was written with, its attributes and
//! its concatenated text. [`crate::schema`] walks this tree to build the raw
//! feed model.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;

/// Maximum element nesting accepted before the document is rejected.
pub const MAX_DEPTH: usize = 64;

/// Errors produced while turning bytes into an element tree or binding it.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// The document nests elements deeper than [`MAX_DEPTH`].
    #[error("XML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// A structural element the schema requires is not present.
    #[error("Missing required element <{0}>")]
    MissingElement(&'static str),

    /// The input contained no root element at all.
    #[error("Document is empty")]
    Empty,
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::Xml(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub local: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Namespace URI the element resolved to, if its prefix was bound.
    pub namespace: Option<String>,
    /// Prefix as written in the document (`media` for `<media:content>`).
    pub prefix: Option<String>,
    pub local: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlElement>,
    /// Text and CDATA content directly inside this element, in order.
    pub text: String,
}

impl XmlElement {
    /// Value of the first unprefixed attribute with the given local name.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.prefix.is_none() && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Qualified name as it appeared in the source, for diagnostics.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }
}

/// Parses a complete document and returns its root element.
pub fn parse_document(bytes: &[u8]) -> Result<XmlElement, ParseError> {
    // Text is not trimmed here: text and CDATA sections are concatenated
    // first and the binder trims the joined value.
    let mut reader = NsReader::from_reader(bytes);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = resolved_uri(resolved);

        match event {
            Event::Start(e) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(ParseError::MaxDepthExceeded(MAX_DEPTH));
                }
                stack.push(open_element(&e, namespace, &reader)?);
            }
            Event::Empty(e) => {
                let element = open_element(&e, namespace, &reader)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                // quick-xml checks that end names match, so the top of the
                // stack is the element being closed.
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    match e.unescape() {
                        Ok(text) => current.text.push_str(&text),
                        Err(err) => {
                            // Bare HTML entities such as &nbsp; are common in
                            // feeds; keep those verbatim and decode the rest.
                            tracing::debug!(element = %current.qualified_name(), error = %err, "Keeping unknown entities");
                            current.text.push_str(&unescape_lenient(&String::from_utf8_lossy(&e)));
                        }
                    }
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = stack.first() {
        return Err(ParseError::Xml(format!(
            "unexpected end of document inside <{}>",
            unclosed.qualified_name()
        )));
    }

    root.ok_or(ParseError::Empty)
}

/// Unescapes every entity reference quick-xml understands and leaves the
/// others as written.
fn unescape_lenient(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = tail[1..]
            .find(|c: char| c == ';' || c == '&' || c.is_whitespace())
            .map(|i| i + 1);
        match end {
            Some(end) if tail.as_bytes()[end] == b';' => {
                let reference = &tail[..=end];
                match quick_xml::escape::unescape(reference) {
                    Ok(decoded) => out.push_str(&decoded),
                    Err(_) => out.push_str(reference),
                }
                rest = &tail[end + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    out
}

fn resolved_uri(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

fn open_element(
    e: &BytesStart<'_>,
    namespace: Option<String>,
    reader: &NsReader<&[u8]>,
) -> Result<XmlElement, ParseError> {
    let name = e.name();
    let prefix = name
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(err) => {
                tracing::warn!(element = %local, error = %err, "Skipping malformed attribute");
                continue;
            }
        };

        let attr_prefix = attr
            .key
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
        let attr_local = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();

        // Namespace declarations are consumed by the reader itself.
        if attr_prefix.as_deref() == Some("xmlns") || (attr_prefix.is_none() && attr_local == "xmlns") {
            continue;
        }

        let value = match attr.decode_and_unescape_value(reader.decoder()) {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };

        attributes.push(XmlAttribute {
            prefix: attr_prefix,
            local: attr_local,
            value,
        });
    }

    Ok(XmlElement {
        namespace,
        prefix,
        local,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
