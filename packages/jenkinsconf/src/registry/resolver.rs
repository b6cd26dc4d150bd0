//! Resolution of raw elements into typed plugins.

use std::fmt;
use std::sync::Arc;

use super::core::PluginRegistry;
use super::identifier::extract_identifier;
use super::node::{ConfigNode, Owner};
use super::plugin::{Plugin, UnrecognizedPlugin};
use crate::error::{ConfError, Result};
use crate::xml::XmlElement;

/// Turns elements into typed plugins using a registry.
///
/// Cloning is cheap; every node carries the resolver that created it so
/// nested fragments resolve against the same registry.
#[derive(Clone)]
pub struct Resolver {
    registry: Arc<PluginRegistry>,
}

impl Resolver {
    #[must_use]
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Resolver over the process-wide built-in registry.
    #[must_use]
    pub fn shared() -> Self {
        Self::new(PluginRegistry::shared())
    }

    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Wrap an element, falling back to [`Plugin::Unrecognized`].
    #[must_use]
    pub fn classify(&self, element: XmlElement, owner: Owner) -> Plugin {
        self.classify_node(ConfigNode::with_owner(element, self.clone(), owner))
    }

    /// Wrap an existing node, falling back to [`Plugin::Unrecognized`].
    #[must_use]
    pub fn classify_node(&self, node: ConfigNode) -> Plugin {
        let identifier = node.identifier();
        self.construct(&identifier, node)
    }

    fn construct(&self, identifier: &str, node: ConfigNode) -> Plugin {
        match self.registry.find(identifier) {
            Some(descriptor) => descriptor.construct(node),
            None => Plugin::Unrecognized(UnrecognizedPlugin {
                identifier: identifier.to_string(),
                node,
            }),
        }
    }

    /// Resolve an element, returning `None` when no handler is registered.
    ///
    /// Callers decide whether to log; nothing is reported here.
    #[must_use]
    pub fn resolve(&self, element: XmlElement, owner: &Owner) -> Option<Plugin> {
        match self.classify(element, owner.clone()) {
            Plugin::Unrecognized(_) => None,
            plugin => Some(plugin),
        }
    }

    /// Resolve an element, failing with `UnsupportedPlugin` when no handler
    /// is registered.
    pub fn resolve_strict(&self, element: XmlElement, owner: &Owner) -> Result<Plugin> {
        let context = element.name();
        match self.classify(element, owner.clone()) {
            Plugin::Unrecognized(unrecognized) => Err(ConfError::UnsupportedPlugin {
                identifier: unrecognized.identifier,
                context: Some(format!("<{context}>")),
            }),
            plugin => Ok(plugin),
        }
    }

    /// Resolve an element under an identifier known from elsewhere, such as
    /// the `_class` of a status snapshot.
    pub fn resolve_as(&self, identifier: &str, element: XmlElement, owner: &Owner) -> Result<Plugin> {
        let node = ConfigNode::with_owner(element, self.clone(), owner.clone());
        match self.construct(identifier, node) {
            Plugin::Unrecognized(unrecognized) => Err(ConfError::unsupported(unrecognized.identifier)),
            plugin => Ok(plugin),
        }
    }

    /// Identifier an element would be resolved under.
    #[must_use]
    pub fn identify(&self, element: &XmlElement) -> String {
        extract_identifier(element)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("handlers", &self.registry.len())
            .finish()
    }
}
