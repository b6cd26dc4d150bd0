//! Built-in handler registration.

use super::core::PluginRegistry;
use super::handlers::{
    AllView, AlwaysRun, AndCondition, ArtifactArchiver, BatchBuilder, BooleanCondition,
    BuildTrigger, BuildTriggerConfig, ConditionalBuilder, ConditionalPublisher,
    CurrentBuildParameters, FlexiblePublisher, FolderJob, FreestyleJob, GitScm, ListView,
    ListViewSection, Mailer, NestedView, NeverRun, NotCondition, NullScm, OrCondition,
    ParameterizedBuildTrigger, PipelineJob, PredefinedBuildParameters, SectionedView,
    ShellBuilder, SingleConditionalBuilder, TextSection,
};

/// Create a registry holding every handler shipped with this crate.
///
/// Registration order is the discovery order used to break ties between
/// handlers answering to the same identifier.
#[must_use]
pub fn create_builtin_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();

    // Views
    registry.register_handler::<ListView>();
    registry.register_handler::<AllView>();
    registry.register_handler::<NestedView>();
    registry.register_handler::<SectionedView>();
    registry.register_handler::<ListViewSection>();
    registry.register_handler::<TextSection>();

    // Jobs
    registry.register_handler::<FreestyleJob>();
    registry.register_handler::<PipelineJob>();
    registry.register_handler::<FolderJob>();

    // Build steps
    registry.register_handler::<ShellBuilder>();
    registry.register_handler::<BatchBuilder>();
    registry.register_handler::<ConditionalBuilder>();
    registry.register_handler::<SingleConditionalBuilder>();

    // Run conditions
    registry.register_handler::<AlwaysRun>();
    registry.register_handler::<NeverRun>();
    registry.register_handler::<BooleanCondition>();
    registry.register_handler::<AndCondition>();
    registry.register_handler::<OrCondition>();
    registry.register_handler::<NotCondition>();

    // Publishers
    registry.register_handler::<ArtifactArchiver>();
    registry.register_handler::<Mailer>();
    registry.register_handler::<BuildTrigger>();
    registry.register_handler::<FlexiblePublisher>();
    registry.register_handler::<ConditionalPublisher>();

    // Parameterized trigger
    registry.register_handler::<ParameterizedBuildTrigger>();
    registry.register_handler::<BuildTriggerConfig>();
    registry.register_handler::<CurrentBuildParameters>();
    registry.register_handler::<PredefinedBuildParameters>();

    // Source control
    registry.register_handler::<NullScm>();
    registry.register_handler::<GitScm>();

    registry
}
