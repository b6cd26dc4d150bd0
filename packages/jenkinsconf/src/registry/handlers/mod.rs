//! Built-in plugin handlers.

mod builders;
mod conditions;
mod jobs;
mod publishers;
mod scm;
mod sections;
mod triggers;
mod views;

pub use builders::{BatchBuilder, ConditionalBuilder, ShellBuilder, SingleConditionalBuilder};
pub use conditions::{AlwaysRun, AndCondition, BooleanCondition, NeverRun, NotCondition, OrCondition};
pub use jobs::{FolderJob, FreestyleJob, PipelineJob};
pub use publishers::{ArtifactArchiver, BuildTrigger, ConditionalPublisher, FlexiblePublisher, Mailer};
pub use scm::{GitScm, NullScm};
pub use sections::{ListViewSection, TextSection};
pub use triggers::{
    BuildTriggerConfig, CurrentBuildParameters, ParameterizedBuildTrigger, PredefinedBuildParameters,
};
pub use views::{AllView, ListView, NestedView, SectionedView};
