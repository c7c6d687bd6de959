//! Owned XML element tree built from quick-xml events.
//!
//! The tree keeps element names, attributes and children. Text content is
//! not needed by any Krita document this crate reads and is dropped.

use crate::common::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

use super::escape::unescape_xml;

/// Capabilities the document parsers need from an XML node.
///
/// Implementors only provide naming, attribute lookup and child access; path
/// selection and typed attribute reads are derived from those.
pub trait XmlNode: Sized {
    /// Local name of the node (namespace prefix removed)
    fn name(&self) -> &str;

    /// Raw attribute value by name
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Child nodes in document order
    fn children(&self) -> &[Self];

    /// Attribute parsed as an unsigned integer, 0 when absent or not numeric.
    fn attribute_u32(&self, name: &str) -> u32 {
        self.attribute(name)
            .and_then(|v| atoi_simd::parse::<u32, false, false>(v.trim().as_bytes()).ok())
            .unwrap_or(0)
    }

    /// Attribute parsed as a signed integer, 0 when absent or not numeric.
    fn attribute_i32(&self, name: &str) -> i32 {
        self.attribute(name)
            .and_then(|v| atoi_simd::parse::<i32, false, false>(v.trim().as_bytes()).ok())
            .unwrap_or(0)
    }

    /// Attribute as a string slice, empty when absent.
    fn attribute_str(&self, name: &str) -> &str {
        self.attribute(name).unwrap_or_default()
    }

    /// First direct child with the given name
    fn child(&self, name: &str) -> Option<&Self> {
        self.children().iter().find(|c| c.name() == name)
    }

    /// Select all descendants matching a slash separated path relative to this node.
    ///
    /// `"layers/layer"` yields every `layer` child of every `layers` child, in
    /// document order.
    fn select_nodes<'a>(&'a self, path: &str) -> Vec<&'a Self> {
        let mut current: Vec<&Self> = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|node| node.children().iter().filter(move |c| c.name() == segment))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// First node matching a path relative to this node
    fn select_node<'a>(&'a self, path: &str) -> Option<&'a Self> {
        self.select_nodes(path).into_iter().next()
    }
}

/// A parsed XML element
#[derive(Debug, Clone, Default)]
pub struct Element {
    local_name: String,
    attributes: HashMap<String, String>,
    children: Vec<Element>,
}

impl Element {
    /// Create an empty element with the given name
    fn new(name: &str) -> Self {
        Self {
            local_name: local_part(name).to_string(),
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    /// Set attribute value, keyed by its local name
    fn set_attribute(&mut self, name: &str, value: String) {
        self.attributes.insert(local_part(name).to_string(), value);
    }

    /// Add a child element
    fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let qname = e.name();
        let tag_name = std::str::from_utf8(qname.as_ref())?;
        let mut element = Element::new(tag_name);

        for attr_result in e.attributes() {
            let attr = attr_result?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            // Namespace declarations carry no document data
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = std::str::from_utf8(&attr.value)?;
            element.set_attribute(key, unescape_xml(value));
        }

        Ok(element)
    }

    /// Parse an XML buffer into its root element.
    ///
    /// Leading whitespace before the XML declaration is tolerated. Syntax
    /// errors, mismatched or unclosed elements and a missing root element
    /// are reported as [`Error::ParseError`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes.trim_ascii_start());
        reader.config_mut().check_end_names = true;
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let element = Self::from_start(e)?;
                    if root.is_some() {
                        return Err(Error::ParseError(format!(
                            "Element <{}> after the root element",
                            element.local_name
                        )));
                    }
                    stack.push(element);
                },
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                },
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| {
                        Error::ParseError("Closing tag without an open element".to_string())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::ParseError(format!(
                        "XML parsing error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(Error::ParseError(format!(
                "Unclosed element <{}>",
                open.local_name
            )));
        }

        root.ok_or_else(|| Error::ParseError("No root element found".to_string()))
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.add_child(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(Error::ParseError(format!(
            "Element <{}> after the root element",
            element.local_name
        )))
    }
}

/// Strip a namespace prefix from a qualified name
#[inline]
fn local_part(name: &str) -> &str {
    match memchr::memchr(b':', name.as_bytes()) {
        Some(colon_pos) => &name[colon_pos + 1..],
        None => name,
    }
}

impl XmlNode for Element {
    fn name(&self) -> &str {
        &self.local_name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// A parsed XML document rooted at a single element.
///
/// Paths passed to [`XmlDocument::select_nodes`] start with the root element
/// name, e.g. `"DOC/IMAGE"`.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    root: Element,
}

impl XmlDocument {
    /// Parse a document from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            root: Element::from_bytes(bytes)?,
        })
    }

    /// The root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Select all nodes matching an absolute path
    pub fn select_nodes(&self, path: &str) -> Vec<&Element> {
        let path = path.trim_start_matches('/');
        let (first, rest) = path.split_once('/').unwrap_or((path, ""));
        if self.root.name() != first {
            return Vec::new();
        }
        self.root.select_nodes(rest)
    }

    /// First node matching an absolute path
    pub fn select_node(&self, path: &str) -> Option<&Element> {
        self.select_nodes(path).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <!DOCTYPE DOC PUBLIC '-//KDE//DTD krita 2.0//EN' 'http://www.calligra.org/DTD/krita-2.0.dtd'>
        <DOC xmlns="http://www.calligra.org/DTD/krita" editor="Krita">
         <IMAGE name="Tom &amp; Jerry" width="64">
          <layers>
           <layer name="a" opacity="255"/>
           <layer name="b" opacity="-4"/>
          </layers>
         </IMAGE>
        </DOC>
    "#;

    #[test]
    fn test_parse_tree_and_select() {
        let doc = XmlDocument::from_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.root().name(), "DOC");
        assert!(doc.root().attribute("xmlns").is_none());

        let image = doc.select_node("DOC/IMAGE").unwrap();
        assert_eq!(image.attribute("name"), Some("Tom & Jerry"));
        assert_eq!(image.attribute_u32("width"), 64);

        let layers = image.select_nodes("layers/layer");
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1].attribute_str("name"), "b");
        assert_eq!(layers[1].attribute_i32("opacity"), -4);
        assert_eq!(layers[1].attribute_u32("opacity"), 0);
    }

    #[test]
    fn test_missing_path_yields_nothing() {
        let doc = XmlDocument::from_bytes(SAMPLE.as_bytes()).unwrap();
        assert!(doc.select_node("DOC/NOPE").is_none());
        assert!(doc.select_nodes("OTHER/IMAGE").is_empty());
        assert_eq!(doc.root().attribute_str("missing"), "");
    }

    #[test]
    fn test_prefixed_names_use_local_part() {
        let xml = br#"<k:keyframes xmlns:k="urn:x"><k:channel k:name="content"/></k:keyframes>"#;
        let root = Element::from_bytes(xml).unwrap();
        assert_eq!(root.name(), "keyframes");
        let channel = root.child("channel").unwrap();
        assert_eq!(channel.attribute("name"), Some("content"));
    }

    #[test]
    fn test_unclosed_declaration_is_parse_error() {
        let xml = b"<?xml version=\"1.0\"?\n<DOC>\n</DOC>";
        assert!(matches!(Element::from_bytes(xml), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_unclosed_element_is_parse_error() {
        let xml = b"<DOC><IMAGE></IMAGE>";
        assert!(matches!(Element::from_bytes(xml), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_mismatched_end_is_parse_error() {
        let xml = b"<DOC><IMAGE></DOC></IMAGE>";
        assert!(matches!(Element::from_bytes(xml), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_no_root_is_parse_error() {
        let xml = b"<?xml version=\"1.0\"?>\n";
        assert!(matches!(Element::from_bytes(xml), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_character_references_in_attributes() {
        let root = Element::from_bytes(br#"<layer name="A&#10;B&#x41;" filename="layer&#49;"/>"#).unwrap();
        assert_eq!(root.attribute("name"), Some("A\nBA"));
        assert_eq!(root.attribute("filename"), Some("layer1"));
    }

    #[test]
    fn test_prefixed_attribute_keys_use_local_part() {
        let root = Element::from_bytes(br#"<layer k:nodetype="paintlayer" xmlns:k="urn:x"/>"#).unwrap();
        assert_eq!(root.attribute_str("nodetype"), "paintlayer");
        assert!(root.attribute("xmlns:k").is_none());
        assert!(root.children().is_empty());
    }
}
