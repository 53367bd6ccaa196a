//! Response document trees.
//!
//! The entity lifecycle reads responses through the [`XmlNode`] trait only:
//! first child by tag, all children by tag, text content and attributes.
//! [`Element`] is the owned tree the HTTP transport builds with quick-xml.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::KayakoError;

/// Read access to one node of a parsed response document.
pub trait XmlNode {
    /// Tag name of this node.
    fn tag(&self) -> &str;

    /// First direct child with the given tag.
    fn child(&self, tag: &str) -> Option<&Self>;

    /// All direct children with the given tag, in document order.
    fn children<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Self> + 'a;

    /// Text content of this node, if it has any.
    fn text(&self) -> Option<&str>;

    /// Value of the named XML attribute.
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// An owned XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Creates an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Sets the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds an XML attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child element holding only text.
    pub fn with_text_child(self, tag: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_child(Element::new(tag).with_text(text))
    }

    /// All direct children regardless of tag.
    pub fn all_children(&self) -> &[Element] {
        &self.children
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, KayakoError> {
        let tag = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| KayakoError::Xml(format!("tag name is not UTF-8: {}", e)))?
            .to_string();

        let mut element = Element::new(tag);
        for attr in start.attributes() {
            let attr = attr.map_err(|e| KayakoError::Xml(e.to_string()))?;
            let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| KayakoError::Xml(e.to_string()))?
                .into_owned();
            element.attributes.push((name, value));
        }
        Ok(element)
    }

    fn push_text(&mut self, text: &str) {
        match self.text.as_mut() {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }
}

impl XmlNode for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn child(&self, tag: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.tag == tag)
    }

    fn children<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parses a response body into its root element.
///
/// Surrounding whitespace in text nodes is trimmed; entity references and
/// CDATA sections are resolved into the element's text.
pub fn parse(input: &str) -> Result<Element, KayakoError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            KayakoError::Xml(format!("at position {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| KayakoError::Xml("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| KayakoError::Xml(e.to_string()))?;
                if let Some(open) = stack.last_mut() {
                    open.push_text(&text);
                }
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|e| KayakoError::Xml(format!("CDATA is not UTF-8: {}", e)))?;
                if let Some(open) = stack.last_mut() {
                    open.push_text(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(KayakoError::Xml(format!("unclosed element <{}>", open.tag)));
    }

    root.ok_or_else(|| KayakoError::Xml("document has no root element".to_string()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), KayakoError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(KayakoError::Xml("multiple root elements".to_string()));
    }
    *root = Some(element);
    Ok(())
}
