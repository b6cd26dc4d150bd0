//! Configuration nodes: one XML element plus the link used to persist it.
//!
//! Ownership runs strictly downward from the [`ConfigDocument`]: the document
//! owns the element tree, nodes share handles into it, and a node only keeps
//! an upward link to whatever must be told about its mutations. The link to
//! the document itself is weak, so a node never keeps a document alive.
//!
//! The link to a parent node is strong. Parents never hold their children
//! (children are classified on demand), so handles form no cycles, and a
//! child handle that outlives its parent's handle still reaches the parent's
//! wrapper and the document on update.
//!
//! [`ConfigDocument`]: crate::document::ConfigDocument

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::identifier::{extract_identifier, plugin_provenance, PluginProvenance};
use super::plugin::Plugin;
use super::resolver::Resolver;
use super::transcode;
use crate::document::DocumentLink;
use crate::error::{ConfError, Result};
use crate::xml::{get_bool, set_bool, XmlElement};

/// Where a node reports its mutations.
#[derive(Clone, Default)]
pub enum Owner {
    /// Not part of any document yet; updates are local only.
    #[default]
    Detached,
    /// Nested inside another node.
    Node(ConfigNode),
    /// Root of a configuration document.
    Document(DocumentLink),
}

impl Owner {
    fn update(&self) -> Result<()> {
        match self {
            Self::Detached => Ok(()),
            Self::Node(parent) => parent.update(),
            Self::Document(link) => link.update(),
        }
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => f.write_str("Detached"),
            Self::Node(parent) => f.debug_tuple("Node").field(&parent.identifier()).finish(),
            Self::Document(_) => f.write_str("Document"),
        }
    }
}

struct NodeInner {
    element: XmlElement,
    resolver: Resolver,
    owner: RefCell<Owner>,
    /// Encoded form of this node inside its owner's tree, for fragments that
    /// were decoded out of a wrapper element.
    wrapper: RefCell<Option<XmlElement>>,
}

/// Typed wrapper around one XML element.
///
/// Clones share identity: they wrap the same element and report to the same
/// owner.
#[derive(Clone)]
pub struct ConfigNode {
    inner: Rc<NodeInner>,
}

impl ConfigNode {
    /// Create a detached node.
    #[must_use]
    pub fn new(element: XmlElement, resolver: Resolver) -> Self {
        Self::with_owner(element, resolver, Owner::Detached)
    }

    /// Create a node reporting to `owner`.
    #[must_use]
    pub fn with_owner(element: XmlElement, resolver: Resolver, owner: Owner) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                element,
                resolver,
                owner: RefCell::new(owner),
                wrapper: RefCell::new(None),
            }),
        }
    }

    /// Create a node for a fragment decoded out of `wrapper`.
    ///
    /// Every update re-encodes the fragment into the wrapper before it is
    /// forwarded to the owner.
    pub(crate) fn transcoded(
        element: XmlElement,
        wrapper: XmlElement,
        resolver: Resolver,
        owner: Owner,
    ) -> Self {
        let node = Self::with_owner(element, resolver, owner);
        *node.inner.wrapper.borrow_mut() = Some(wrapper);
        node
    }

    /// The wrapped element.
    #[must_use]
    pub fn element(&self) -> &XmlElement {
        &self.inner.element
    }

    /// Resolver used for nested fragments.
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.inner.resolver
    }

    #[must_use]
    pub fn owner(&self) -> Owner {
        self.inner.owner.borrow().clone()
    }

    /// Whether the node belongs to a container or document.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !matches!(*self.inner.owner.borrow(), Owner::Detached)
    }

    /// Whether the node was decoded out of a wrapper element.
    #[must_use]
    pub fn is_transcoded(&self) -> bool {
        self.inner.wrapper.borrow().is_some()
    }

    /// Re-parent the node as the decoded form of `wrapper`.
    pub(crate) fn bind(&self, wrapper: XmlElement, owner: Owner) {
        *self.inner.owner.borrow_mut() = owner;
        *self.inner.wrapper.borrow_mut() = Some(wrapper);
    }

    /// Re-parent the node. Any transcoding binding is dropped.
    pub(crate) fn attach(&self, owner: Owner) {
        *self.inner.owner.borrow_mut() = owner;
        *self.inner.wrapper.borrow_mut() = None;
    }

    /// Type identifier of the wrapped element.
    #[must_use]
    pub fn identifier(&self) -> String {
        extract_identifier(&self.inner.element)
    }

    #[must_use]
    pub fn provenance(&self) -> Option<PluginProvenance> {
        plugin_provenance(&self.inner.element)
    }

    /// Report a mutation.
    ///
    /// The call travels up the owner chain to the document, which writes the
    /// whole configuration once per call. Detached nodes stop the chain.
    pub fn update(&self) -> Result<()> {
        if let Some(wrapper) = self.inner.wrapper.borrow().as_ref() {
            transcode::encode_into(&self.inner.element, wrapper);
        }
        tracing::trace!(identifier = %self.identifier(), "Propagating update");
        let owner = self.owner();
        owner.update()
    }

    /// Child element that must exist.
    pub fn required_child(&self, tag: &str) -> Result<XmlElement> {
        self.required_path(tag)
    }

    /// Descendant element that must exist, by slash-separated path.
    pub fn required_path(&self, path: &str) -> Result<XmlElement> {
        self.inner
            .element
            .find_by_path(path)
            .ok_or_else(|| ConfError::missing(path, self.identifier()))
    }

    /// Trimmed text of a child, empty when the child is missing.
    #[must_use]
    pub fn child_text(&self, tag: &str) -> String {
        self.inner.element.child_text(tag).unwrap_or_default()
    }

    /// Set a child's text and report the mutation.
    pub fn set_child_text(&self, tag: &str, value: impl Into<String>) -> Result<()> {
        self.inner.element.set_child_text(tag, value);
        self.update()
    }

    #[must_use]
    pub fn flag(&self, tag: &str) -> bool {
        get_bool(&self.inner.element, tag)
    }

    pub fn set_flag(&self, tag: &str, value: bool) -> Result<()> {
        set_bool(&self.inner.element, tag, value);
        self.update()
    }

    /// Resolve an element nested below this node, tolerating unknown types.
    #[must_use]
    pub fn resolve(&self, element: XmlElement) -> Option<Plugin> {
        self.inner
            .resolver
            .resolve(element, &Owner::Node(self.clone()))
    }

    /// Resolve an element nested below this node, failing on unknown types.
    pub fn resolve_strict(&self, element: XmlElement) -> Result<Plugin> {
        self.inner
            .resolver
            .resolve_strict(element, &Owner::Node(self.clone()))
    }

    /// Whether both handles are the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &ConfigNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNode")
            .field("identifier", &self.identifier())
            .field("owner", &*self.inner.owner.borrow())
            .field("transcoded", &self.is_transcoded())
            .finish()
    }
}
