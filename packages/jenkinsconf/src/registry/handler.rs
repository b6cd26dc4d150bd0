//! Plugin handler trait definition.

use super::core::{PluginDescriptor, PluginKind};
use super::node::ConfigNode;
use super::plugin::Plugin;
use super::resolver::Resolver;
use crate::error::{ConfError, Result};
use crate::xml::XmlElement;

/// Trait for typed plugin handlers.
///
/// A handler wraps one [`ConfigNode`] and exposes typed accessors over the
/// element it owns. Implementations are registered with a
/// [`PluginRegistry`](super::PluginRegistry) through their descriptor.
pub trait PluginHandler: Sized + Into<Plugin> {
    /// Identifier of the Jenkins class this handler models.
    const TYPE_ID: &'static str;

    /// Category used for listings and typed accessors.
    const KIND: PluginKind;

    /// Additional identifiers this handler answers to.
    const ALIASES: &'static [&'static str] = &[];

    /// Default XML fragment for creating a new instance.
    const TEMPLATE: Option<&'static str> = None;

    /// Wrap a node.
    fn from_node(node: ConfigNode) -> Self;

    /// The wrapped node.
    fn node(&self) -> &ConfigNode;

    /// Descriptor for registering this handler.
    fn descriptor() -> PluginDescriptor {
        PluginDescriptor::of::<Self>()
    }

    /// Create a detached instance from the handler's template.
    ///
    /// The instance has no owner until it is added to a container, so
    /// mutations made before that do not trigger any write.
    fn from_template(resolver: &Resolver) -> Result<Self> {
        let template = Self::TEMPLATE.ok_or_else(|| ConfError::MalformedDocument {
            context: Self::TYPE_ID.to_string(),
            reason: "handler has no template".to_string(),
        })?;
        let element = XmlElement::parse(template)?;
        Ok(Self::from_node(ConfigNode::new(element, resolver.clone())))
    }
}

/// Implement [`PluginHandler`] for a struct with a single `node` field.
macro_rules! plugin_handler {
    ($handler:ident, $kind:ident, $type_id:expr $(, aliases = $aliases:expr)? $(, template = $template:expr)? $(,)?) => {
        impl $crate::registry::PluginHandler for $handler {
            const TYPE_ID: &'static str = $type_id;
            const KIND: $crate::registry::PluginKind = $crate::registry::PluginKind::$kind;
            $(const ALIASES: &'static [&'static str] = $aliases;)?
            $(const TEMPLATE: Option<&'static str> = Some($template);)?

            fn from_node(node: $crate::registry::ConfigNode) -> Self {
                Self { node }
            }

            fn node(&self) -> &$crate::registry::ConfigNode {
                &self.node
            }
        }
    };
}

pub(crate) use plugin_handler;
