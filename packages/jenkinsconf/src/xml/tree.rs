//! Owned, shared-handle XML element tree.
//!
//! Configuration handlers wrap individual elements of one document, so an
//! element handle is a cheap clone of a reference-counted cell: a mutation made
//! through any handle is visible to the document that contains the element.
//! Documents are parsed with `roxmltree` and serialized with `quick-xml`.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use roxmltree::NodeType;

use crate::error::{ConfError, Result};

/// A single `name="value"` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
}

impl XmlAttribute {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Content of an element, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlChild {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

#[derive(Default)]
struct ElementData {
    name: String,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlChild>,
}

/// Handle to a mutable XML element.
///
/// Cloning the handle does not copy the element; use [`XmlElement::deep_copy`]
/// for an independent copy. Equality compares structure, not identity.
#[derive(Clone)]
pub struct XmlElement(Rc<RefCell<ElementData>>);

impl XmlElement {
    /// Create an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            name: name.into(),
            ..ElementData::default()
        })))
    }

    /// Parse the root element of an XML text.
    ///
    /// # Examples
    /// ```
    /// use jenkinsconf::xml::XmlElement;
    ///
    /// let root = XmlElement::parse("<project><disabled>false</disabled></project>").unwrap();
    /// assert_eq!(root.name(), "project");
    /// assert_eq!(root.child_text("disabled").as_deref(), Some("false"));
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text)?;
        Ok(Self::from_node(doc.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let element = Self::new(node.tag_name().name());
        {
            let mut data = element.0.borrow_mut();
            for attr in node.attributes() {
                data.attributes
                    .push(XmlAttribute::new(attr.name(), attr.value()));
            }
            for child in node.children() {
                match child.node_type() {
                    NodeType::Element => data.children.push(XmlChild::Element(Self::from_node(child))),
                    NodeType::Text => data
                        .children
                        .push(XmlChild::Text(child.text().unwrap_or_default().to_string())),
                    NodeType::Comment => data
                        .children
                        .push(XmlChild::Comment(child.text().unwrap_or_default().to_string())),
                    NodeType::Root | NodeType::PI => {}
                }
            }
        }
        element
    }

    /// Tag name.
    #[must_use]
    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// Check the tag name without cloning it.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.0.borrow().name == name
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.0.borrow_mut().name = name.into();
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0
            .borrow()
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.clone())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let mut data = self.0.borrow_mut();
        if let Some(attr) = data.attributes.iter_mut().find(|a| a.name == name) {
            attr.value = value;
        } else {
            data.attributes.push(XmlAttribute::new(name, value));
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        let mut data = self.0.borrow_mut();
        let index = data.attributes.iter().position(|a| a.name == name)?;
        Some(data.attributes.remove(index).value)
    }

    /// All attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> Vec<XmlAttribute> {
        self.0.borrow().attributes.clone()
    }

    /// Concatenated direct text content, or `None` if the element has no text.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let data = self.0.borrow();
        let mut text: Option<String> = None;
        for child in &data.children {
            if let XmlChild::Text(t) = child {
                text.get_or_insert_with(String::new).push_str(t);
            }
        }
        text
    }

    /// Replace all content with a single text node.
    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        let mut data = self.0.borrow_mut();
        data.children.clear();
        if !text.is_empty() {
            data.children.push(XmlChild::Text(text));
        }
    }

    /// Element children in document order.
    #[must_use]
    pub fn children(&self) -> Vec<XmlElement> {
        self.0
            .borrow()
            .children
            .iter()
            .filter_map(|c| match c {
                XmlChild::Element(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// All content nodes, including text and comments.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<XmlChild> {
        self.0.borrow().children.clone()
    }

    /// First child element with the given tag name.
    #[must_use]
    pub fn find_child(&self, tag: &str) -> Option<XmlElement> {
        self.0.borrow().children.iter().find_map(|c| match c {
            XmlChild::Element(e) if e.has_name(tag) => Some(e.clone()),
            _ => None,
        })
    }

    /// All child elements with the given tag name.
    #[must_use]
    pub fn find_children(&self, tag: &str) -> Vec<XmlElement> {
        self.children()
            .into_iter()
            .filter(|e| e.has_name(tag))
            .collect()
    }

    /// Find a descendant by a slash-separated path of tag names.
    #[must_use]
    pub fn find_by_path(&self, path: &str) -> Option<XmlElement> {
        let mut current = self.clone();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = current.find_child(part)?;
        }
        Some(current)
    }

    /// Trimmed text of the first child with the given tag name.
    #[must_use]
    pub fn child_text(&self, tag: &str) -> Option<String> {
        self.find_child(tag)
            .map(|c| c.text().map(|t| t.trim().to_string()).unwrap_or_default())
    }

    /// Set the text of a child element, appending the child if it is missing.
    pub fn set_child_text(&self, tag: &str, text: impl Into<String>) {
        match self.find_child(tag) {
            Some(child) => child.set_text(text),
            None => {
                let child = XmlElement::new(tag);
                child.set_text(text);
                self.append_child(child);
            }
        }
    }

    /// Append an element as the last child.
    pub fn append_child(&self, child: XmlElement) {
        self.0.borrow_mut().children.push(XmlChild::Element(child));
    }

    /// Remove a child by identity. Returns `false` if it is not a direct child.
    pub fn remove_child(&self, child: &XmlElement) -> bool {
        let mut data = self.0.borrow_mut();
        let before = data.children.len();
        data.children
            .retain(|c| !matches!(c, XmlChild::Element(e) if e.ptr_eq(child)));
        data.children.len() != before
    }

    /// Replace a child by identity, keeping its position.
    pub fn replace_child(&self, old: &XmlElement, new: XmlElement) -> bool {
        let mut data = self.0.borrow_mut();
        for child in &mut data.children {
            if matches!(child, XmlChild::Element(e) if e.ptr_eq(old)) {
                *child = XmlChild::Element(new);
                return true;
            }
        }
        false
    }

    /// Replace all content nodes.
    pub fn set_child_nodes(&self, children: Vec<XmlChild>) {
        self.0.borrow_mut().children = children;
    }

    /// Replace all attributes.
    pub fn set_attributes(&self, attributes: Vec<XmlAttribute>) {
        self.0.borrow_mut().attributes = attributes;
    }

    /// Remove all content.
    pub fn clear_children(&self) {
        self.0.borrow_mut().children.clear();
    }

    /// Independent copy of this element and all its descendants.
    #[must_use]
    pub fn deep_copy(&self) -> XmlElement {
        let data = self.0.borrow();
        let children = data
            .children
            .iter()
            .map(|c| match c {
                XmlChild::Element(e) => XmlChild::Element(e.deep_copy()),
                other => other.clone(),
            })
            .collect();
        Self(Rc::new(RefCell::new(ElementData {
            name: data.name.clone(),
            attributes: data.attributes.clone(),
            children,
        })))
    }

    /// Whether both handles point at the same element.
    #[must_use]
    pub fn ptr_eq(&self, other: &XmlElement) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Serialize this element and its descendants.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(write_error)
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let data = self.0.borrow();
        let mut start = BytesStart::new(data.name.as_str());
        for attr in &data.attributes {
            let value = escape_attribute(&attr.value);
            start.push_attribute(Attribute::from((attr.name.as_bytes(), value.as_bytes())));
        }

        if data.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(write_error)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        for child in &data.children {
            match child {
                XmlChild::Element(e) => e.write_to(writer)?,
                XmlChild::Text(t) => writer
                    .write_event(Event::Text(BytesText::from_escaped(escape_text(t))))
                    .map_err(write_error)?,
                XmlChild::Comment(c) => writer
                    .write_event(Event::Comment(BytesText::from_escaped(c.as_str())))
                    .map_err(write_error)?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(data.name.as_str())))
            .map_err(write_error)?;
        Ok(())
    }
}

/// Escape character data. A carriage return is written as a character
/// reference, since parsers fold a literal `\r\n` into `\n`.
fn escape_text(text: &str) -> Cow<'_, str> {
    let escaped = escape(text);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#xd;"))
    } else {
        escaped
    }
}

/// Escape an attribute value. Literal whitespace other than spaces would be
/// normalized to spaces when read back.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\r', "&#xd;")
        .replace('\n', "&#xa;")
        .replace('\t', "&#x9;")
}

fn write_error(err: impl fmt::Display) -> ConfError {
    ConfError::XmlWrite(err.to_string())
}

impl PartialEq for XmlElement {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let a = self.0.borrow();
        let b = other.0.borrow();
        a.name == b.name && a.attributes == b.attributes && a.children == b.children
    }
}

impl fmt::Debug for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("XmlElement")
            .field("name", &data.name)
            .field("attributes", &data.attributes)
            .field("children", &data.children)
            .finish()
    }
}
