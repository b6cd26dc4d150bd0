//! Plugin registry mapping type identifiers to handler constructors.

use std::fmt;
use std::sync::{Arc, LazyLock};

use super::config::create_builtin_registry;
use super::handler::PluginHandler;
use super::identifier::normalize_identifier;
use super::node::ConfigNode;
use super::plugin::Plugin;
use crate::error::Result;
use crate::xml::XmlElement;

/// Constructor turning a node into a typed plugin.
pub type PluginConstructor = fn(ConfigNode) -> Plugin;

/// Category of a plugin handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    View,
    Section,
    Job,
    Builder,
    Condition,
    Publisher,
    TriggerConfig,
    BuildParameter,
    Scm,
}

impl PluginKind {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Section => "section",
            Self::Job => "job",
            Self::Builder => "builder",
            Self::Condition => "condition",
            Self::Publisher => "publisher",
            Self::TriggerConfig => "trigger-config",
            Self::BuildParameter => "build-parameter",
            Self::Scm => "scm",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration record for one handler.
#[derive(Debug, Clone, Copy)]
pub struct PluginDescriptor {
    type_id: &'static str,
    aliases: &'static [&'static str],
    kind: PluginKind,
    constructor: PluginConstructor,
    template: Option<&'static str>,
}

fn construct<H: PluginHandler>(node: ConfigNode) -> Plugin {
    H::from_node(node).into()
}

impl PluginDescriptor {
    /// Create a descriptor from its parts.
    #[must_use]
    pub fn new(type_id: &'static str, kind: PluginKind, constructor: PluginConstructor) -> Self {
        Self {
            type_id,
            aliases: &[],
            kind,
            constructor,
            template: None,
        }
    }

    /// Descriptor for a handler type.
    #[must_use]
    pub fn of<H: PluginHandler>() -> Self {
        Self {
            type_id: H::TYPE_ID,
            aliases: H::ALIASES,
            kind: H::KIND,
            constructor: construct::<H>,
            template: H::TEMPLATE,
        }
    }

    /// Set additional identifiers.
    #[must_use]
    pub fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Set the default fragment.
    #[must_use]
    pub fn with_template(mut self, template: &'static str) -> Self {
        self.template = Some(template);
        self
    }

    #[must_use]
    pub fn type_id(&self) -> &'static str {
        self.type_id
    }

    #[must_use]
    pub fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    #[must_use]
    pub fn kind(&self) -> PluginKind {
        self.kind
    }

    #[must_use]
    pub fn template(&self) -> Option<&'static str> {
        self.template
    }

    /// Parse the default fragment, if the handler has one.
    pub fn template_element(&self) -> Option<Result<XmlElement>> {
        self.template.map(XmlElement::parse)
    }

    /// Whether this descriptor answers to an already normalized identifier.
    #[must_use]
    pub fn matches(&self, normalized: &str) -> bool {
        normalize_identifier(self.type_id) == normalized
            || self
                .aliases
                .iter()
                .any(|alias| normalize_identifier(alias) == normalized)
    }

    /// Build the typed plugin for a node.
    #[must_use]
    pub fn construct(&self, node: ConfigNode) -> Plugin {
        (self.constructor)(node)
    }
}

static SHARED: LazyLock<Arc<PluginRegistry>> =
    LazyLock::new(|| Arc::new(create_builtin_registry()));

/// Catalog of plugin handlers.
///
/// Lookup accepts identifiers in either `class` attribute or tag spelling.
/// Registration order is discovery order: when several descriptors answer to
/// the same identifier, the first one registered wins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    descriptors: Vec<PluginDescriptor>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Create a registry holding every built-in handler.
    #[must_use]
    pub fn builtin() -> Self {
        create_builtin_registry()
    }

    /// Process-wide built-in registry, populated on first use.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// Register a descriptor.
    ///
    /// Descriptors without a type identifier are refused.
    pub fn register(&mut self, descriptor: PluginDescriptor) -> bool {
        if descriptor.type_id.trim().is_empty() {
            tracing::warn!(kind = %descriptor.kind, "Ignoring plugin descriptor without type identifier");
            return false;
        }
        self.descriptors.push(descriptor);
        true
    }

    /// Register a handler type.
    pub fn register_handler<H: PluginHandler>(&mut self) -> bool {
        self.register(H::descriptor())
    }

    /// All descriptors in discovery order.
    #[must_use]
    pub fn all_handlers(&self) -> &[PluginDescriptor] {
        &self.descriptors
    }

    /// Every descriptor answering to an identifier.
    #[must_use]
    pub fn find_all(&self, identifier: &str) -> Vec<&PluginDescriptor> {
        let normalized = normalize_identifier(identifier);
        self.descriptors
            .iter()
            .filter(|d| d.matches(&normalized))
            .collect()
    }

    /// Find the descriptor for an identifier.
    ///
    /// Logs a warning when more than one descriptor matches and returns the
    /// first registered.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&PluginDescriptor> {
        let matches = self.find_all(identifier);
        if matches.len() > 1 {
            tracing::warn!(
                identifier,
                count = matches.len(),
                "Multiple plugin handlers registered for identifier, using the first"
            );
        }
        matches.into_iter().next()
    }

    /// Check if a handler is registered for an identifier.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        let normalized = normalize_identifier(identifier);
        self.descriptors.iter().any(|d| d.matches(&normalized))
    }

    /// Primary identifiers of all registered handlers.
    #[must_use]
    pub fn type_ids(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.type_id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
