//! XML plumbing on top of quick-xml
//!
//!     Parsers see a simplified event stream: start tags with local names and unescaped
//!     attributes, end tags, and text. Empty elements are expanded into start + end so the
//!     dialects never special-case `<verse sID="..."/>`. Namespace prefixes are dropped
//!     (`osis:verse` and `{ns}verse` are both `verse`).
//!
//!     The lexicon parsers want random access to children, so [`XmlNode`] builds a small tree
//!     from the same stream.

use crate::error::{ParseError, ParseResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Decode source bytes as UTF-8, dropping a leading byte order mark
pub fn decode_source(bytes: &[u8]) -> ParseResult<&str> {
    let text = std::str::from_utf8(bytes)?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First non-empty value among `keys`
    pub fn first_attr(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.attr(k))
            .map(str::trim)
            .find(|v| !v.is_empty())
    }

    /// Attribute lookup ignoring ASCII case of the key
    pub fn attr_ci(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    Start(Element),
    End(String),
    Text(String),
}

/// Pull-based event stream over a whole document held in memory
pub struct XmlStream<'a> {
    reader: Reader<&'a [u8]>,
    depth: usize,
    seen_root: bool,
}

impl<'a> XmlStream<'a> {
    pub fn new(src: &'a str) -> Self {
        let mut reader = Reader::from_str(src);
        reader.config_mut().expand_empty_elements = true;
        XmlStream {
            reader,
            depth: 0,
            seen_root: false,
        }
    }

    pub fn from_bytes(bytes: &'a [u8]) -> ParseResult<Self> {
        Ok(Self::new(decode_source(bytes)?))
    }

    /// Current element nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Next event, or `None` at the end of a well-formed document
    pub fn next_event(&mut self) -> ParseResult<Option<XmlEvent>> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => {
                    self.depth += 1;
                    self.seen_root = true;
                    let name = std::str::from_utf8(start.local_name().as_ref())?.to_string();
                    let mut attrs = Vec::new();
                    for attr in start.attributes() {
                        let attr = attr?;
                        let key = std::str::from_utf8(attr.key.local_name().as_ref())?.to_string();
                        let value = attr.unescape_value()?.into_owned();
                        attrs.push((key, value));
                    }
                    return Ok(Some(XmlEvent::Start(Element { name, attrs })));
                }
                Event::End(end) => {
                    self.depth = self.depth.saturating_sub(1);
                    let name = std::str::from_utf8(end.local_name().as_ref())?.to_string();
                    return Ok(Some(XmlEvent::End(name)));
                }
                Event::Text(text) => {
                    if self.depth == 0 {
                        continue;
                    }
                    return Ok(Some(XmlEvent::Text(text.unescape()?.into_owned())));
                }
                Event::CData(data) => {
                    if self.depth == 0 {
                        continue;
                    }
                    let text = std::str::from_utf8(&data)?.to_string();
                    return Ok(Some(XmlEvent::Text(text)));
                }
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(ParseError::MalformedXml(format!(
                            "document ended with {} unclosed element(s)",
                            self.depth
                        )));
                    }
                    if !self.seen_root {
                        return Err(ParseError::MalformedXml("no root element".into()));
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlChild {
    Element(XmlNode),
    Text(String),
}

/// Owned element tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlChild>,
}

impl XmlNode {
    /// Parse a whole document and return its root element
    pub fn parse(src: &str) -> ParseResult<XmlNode> {
        let mut stream = XmlStream::new(src);
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root = None;
        while let Some(event) = stream.next_event()? {
            match event {
                XmlEvent::Start(el) => stack.push(XmlNode {
                    name: el.name,
                    attrs: el.attrs,
                    children: Vec::new(),
                }),
                XmlEvent::End(_) => {
                    let Some(node) = stack.pop() else {
                        return Err(ParseError::MalformedXml("unbalanced end tag".into()));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlChild::Element(node)),
                        None => root = Some(node),
                    }
                }
                XmlEvent::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlChild::Text(text));
                    }
                }
            }
        }
        root.ok_or_else(|| ParseError::MalformedXml("no root element".into()))
    }

    pub fn parse_bytes(bytes: &[u8]) -> ParseResult<XmlNode> {
        Self::parse(decode_source(bytes)?)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Lower-cased local name
    pub fn tag(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter_map(|c| match c {
            XmlChild::Element(node) => Some(node),
            XmlChild::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.elements().find(|n| n.name == name)
    }

    /// This node and every descendant element, in document order
    pub fn descendants(&self) -> Vec<&XmlNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            let kids: Vec<&XmlNode> = node.elements().collect();
            stack.extend(kids.into_iter().rev());
        }
        out
    }

    /// All descendant text concatenated, trimmed
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlChild::Text(t) => out.push_str(t),
                XmlChild::Element(node) => node.collect_text(out),
            }
        }
    }
}
