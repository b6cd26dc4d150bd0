//! The closed set of plugin kinds this crate understands.

use super::core::PluginKind;
use super::handler::PluginHandler;
use super::handlers::*;
use super::identifier::PluginProvenance;
use super::node::ConfigNode;
use crate::error::{ConfError, Result};

/// A fragment whose type identifier has no registered handler.
#[derive(Debug, Clone)]
pub struct UnrecognizedPlugin {
    pub identifier: String,
    pub node: ConfigNode,
}

macro_rules! plugins {
    ($($variant:ident),+ $(,)?) => {
        /// A resolved configuration fragment.
        ///
        /// Callers match on the variant to reach the typed handler.
        #[derive(Debug, Clone)]
        pub enum Plugin {
            $($variant($variant),)+
            Unrecognized(UnrecognizedPlugin),
        }

        impl Plugin {
            /// The node backing this plugin.
            #[must_use]
            pub fn node(&self) -> &ConfigNode {
                match self {
                    $(Self::$variant(p) => p.node(),)+
                    Self::Unrecognized(p) => &p.node,
                }
            }

            /// Category of the handler, `None` for unrecognized fragments.
            #[must_use]
            pub fn kind(&self) -> Option<PluginKind> {
                match self {
                    $(Self::$variant(_) => Some(<$variant as PluginHandler>::KIND),)+
                    Self::Unrecognized(_) => None,
                }
            }

            /// Identifier of the handler, or the raw identifier for
            /// unrecognized fragments.
            #[must_use]
            pub fn type_id(&self) -> String {
                match self {
                    $(Self::$variant(_) => <$variant as PluginHandler>::TYPE_ID.to_string(),)+
                    Self::Unrecognized(p) => p.identifier.clone(),
                }
            }
        }

        $(
            impl From<$variant> for Plugin {
                fn from(handler: $variant) -> Self {
                    Self::$variant(handler)
                }
            }

            impl TryFrom<Plugin> for $variant {
                type Error = ConfError;

                fn try_from(plugin: Plugin) -> Result<Self> {
                    match plugin {
                        Plugin::$variant(handler) => Ok(handler),
                        other => Err(ConfError::WrongPluginKind {
                            expected: <$variant as PluginHandler>::TYPE_ID.to_string(),
                            found: other.type_id(),
                        }),
                    }
                }
            }
        )+
    };
}

plugins! {
    ListView,
    AllView,
    NestedView,
    SectionedView,
    ListViewSection,
    TextSection,
    FreestyleJob,
    PipelineJob,
    FolderJob,
    ShellBuilder,
    BatchBuilder,
    ConditionalBuilder,
    SingleConditionalBuilder,
    AlwaysRun,
    NeverRun,
    BooleanCondition,
    AndCondition,
    OrCondition,
    NotCondition,
    ArtifactArchiver,
    Mailer,
    BuildTrigger,
    FlexiblePublisher,
    ConditionalPublisher,
    ParameterizedBuildTrigger,
    BuildTriggerConfig,
    CurrentBuildParameters,
    PredefinedBuildParameters,
    NullScm,
    GitScm,
}

impl Plugin {
    /// Plugin that wrote the fragment, from its `plugin` attribute.
    #[must_use]
    pub fn provenance(&self) -> Option<PluginProvenance> {
        self.node().provenance()
    }

    /// Whether no handler was registered for this fragment.
    #[must_use]
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }

    /// Nested plugins in document order; empty for leaf plugins.
    ///
    /// Unsupported nested fragments are left out, as in every container
    /// enumeration.
    pub fn children(&self) -> Result<Vec<Plugin>> {
        let mut children = Vec::new();
        match self {
            Self::NestedView(view) => children = view.views()?,
            Self::SectionedView(view) => children = view.sections()?,
            Self::FolderJob(job) => children = job.views()?,
            Self::FreestyleJob(job) => {
                children.extend(job.scm_if_supported()?);
                children.extend(job.builders()?);
                children.extend(job.publishers()?);
            }
            Self::PipelineJob(job) => children.extend(job.scm_if_supported()),
            Self::ConditionalBuilder(builder) => {
                children.extend(builder.condition()?);
                children.extend(builder.builders()?);
            }
            Self::SingleConditionalBuilder(builder) => {
                children.extend(builder.condition()?);
                children.extend(builder.build_step()?);
            }
            Self::AndCondition(condition) => children = condition.conditions()?,
            Self::OrCondition(condition) => children = condition.conditions()?,
            Self::NotCondition(condition) => children.extend(condition.condition()?),
            Self::FlexiblePublisher(publisher) => children = publisher.actions()?,
            Self::ConditionalPublisher(publisher) => {
                children.extend(publisher.condition()?);
                children.extend(publisher.publishers()?);
            }
            Self::ParameterizedBuildTrigger(trigger) => children = trigger.triggers()?,
            Self::BuildTriggerConfig(config) => children = config.parameters()?,
            _ => {}
        }
        Ok(children)
    }
}
