//! Post-build publishers.

use crate::error::Result;
use crate::registry::handler::plugin_handler;
use crate::registry::{container, ConfigNode, Plugin, PluginHandler, Resolver};
use crate::xml::{get_bool, get_text, join_names, split_names};

/// Archives build artifacts matching a pattern.
#[derive(Debug, Clone)]
pub struct ArtifactArchiver {
    node: ConfigNode,
}

plugin_handler!(
    ArtifactArchiver,
    Publisher,
    "hudson.tasks.ArtifactArchiver",
    template = "<hudson.tasks.ArtifactArchiver><artifacts></artifacts><allowEmptyArchive>false</allowEmptyArchive><onlyIfSuccessful>false</onlyIfSuccessful><fingerprint>false</fingerprint><defaultExcludes>true</defaultExcludes><caseSensitive>true</caseSensitive></hudson.tasks.ArtifactArchiver>",
);

impl ArtifactArchiver {
    /// Create a detached archiver for the Ant-style `pattern`.
    pub fn create(resolver: &Resolver, pattern: &str) -> Result<Self> {
        let archiver = Self::from_template(resolver)?;
        archiver.node.element().set_child_text("artifacts", pattern);
        Ok(archiver)
    }

    #[must_use]
    pub fn artifact_regex(&self) -> String {
        self.node.child_text("artifacts")
    }

    pub fn set_artifact_regex(&self, pattern: &str) -> Result<()> {
        self.node.set_child_text("artifacts", pattern)
    }

    #[must_use]
    pub fn allow_empty(&self) -> bool {
        get_bool(self.node.element(), "allowEmptyArchive")
    }

    pub fn set_allow_empty(&self, allow: bool) -> Result<()> {
        self.node.set_flag("allowEmptyArchive", allow)
    }
}

/// E-mail notification.
#[derive(Debug, Clone)]
pub struct Mailer {
    node: ConfigNode,
}

plugin_handler!(
    Mailer,
    Publisher,
    "hudson.tasks.Mailer",
    template = "<hudson.tasks.Mailer><recipients></recipients><dontNotifyEveryUnstableBuild>false</dontNotifyEveryUnstableBuild><sendToIndividuals>false</sendToIndividuals></hudson.tasks.Mailer>",
);

impl Mailer {
    /// Recipient addresses; Jenkins separates them with whitespace.
    #[must_use]
    pub fn recipients(&self) -> Vec<String> {
        self.node
            .child_text("recipients")
            .split_whitespace()
            .map(String::from)
            .collect()
    }

    pub fn set_recipients<S: AsRef<str>>(&self, recipients: &[S]) -> Result<()> {
        let joined = recipients
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        self.node.set_child_text("recipients", joined)
    }
}

/// Core downstream trigger, started when the build reaches a threshold.
#[derive(Debug, Clone)]
pub struct BuildTrigger {
    node: ConfigNode,
}

plugin_handler!(
    BuildTrigger,
    Publisher,
    "hudson.tasks.BuildTrigger",
    template = "<hudson.tasks.BuildTrigger><childProjects></childProjects><threshold><name>SUCCESS</name><ordinal>0</ordinal><color>BLUE</color><completeBuild>true</completeBuild></threshold></hudson.tasks.BuildTrigger>",
);

impl BuildTrigger {
    /// Create a detached trigger for the given downstream jobs.
    pub fn create<S: AsRef<str>>(resolver: &Resolver, job_names: &[S]) -> Result<Self> {
        let trigger = Self::from_template(resolver)?;
        trigger
            .node
            .element()
            .set_child_text("childProjects", join_names(job_names));
        Ok(trigger)
    }

    #[must_use]
    pub fn job_names(&self) -> Vec<String> {
        split_names(&self.node.child_text("childProjects"))
    }

    pub fn set_job_names<S: AsRef<str>>(&self, job_names: &[S]) -> Result<()> {
        self.node.set_child_text("childProjects", join_names(job_names))
    }

    /// Result the build must reach (`SUCCESS`, `UNSTABLE`, `FAILURE`).
    #[must_use]
    pub fn threshold(&self) -> String {
        self.node
            .element()
            .find_by_path("threshold/name")
            .map(|n| get_text(&n))
            .unwrap_or_default()
    }
}

/// Runs a list of conditional actions, each holding its own publishers.
#[derive(Debug, Clone)]
pub struct FlexiblePublisher {
    node: ConfigNode,
}

plugin_handler!(
    FlexiblePublisher,
    Publisher,
    "org.jenkins_ci.plugins.flexible_publish.FlexiblePublisher",
    template = "<org.jenkins__ci.plugins.flexible__publish.FlexiblePublisher><publishers/></org.jenkins__ci.plugins.flexible__publish.FlexiblePublisher>",
);

impl FlexiblePublisher {
    const ACTIONS: &'static str = "publishers";

    /// Conditional actions in document order.
    pub fn actions(&self) -> Result<Vec<Plugin>> {
        container::items(&self.node, Self::ACTIONS)
    }

    pub fn add_action(&self, action: &impl PluginHandler) -> Result<()> {
        container::add_item(&self.node, Self::ACTIONS, action.node())
    }
}

/// One action of a flexible publisher.
#[derive(Debug, Clone)]
pub struct ConditionalPublisher {
    node: ConfigNode,
}

plugin_handler!(
    ConditionalPublisher,
    Publisher,
    "org.jenkins_ci.plugins.flexible_publish.ConditionalPublisher",
    template = r#"<org.jenkins__ci.plugins.flexible__publish.ConditionalPublisher><condition class="org.jenkins_ci.plugins.run_condition.core.AlwaysRun"/><publisherList/><runner class="org.jenkins_ci.plugins.run_condition.BuildStepRunner$Fail"/><executionStrategy class="org.jenkins_ci.plugins.flexible_publish.strategy.FailAtEndExecutionStrategy"/></org.jenkins__ci.plugins.flexible__publish.ConditionalPublisher>"#,
);

impl ConditionalPublisher {
    const CONDITION: &'static str = "condition";
    const PUBLISHERS: &'static str = "publisherList";

    pub fn condition(&self) -> Result<Option<Plugin>> {
        container::slot(&self.node, Self::CONDITION)
    }

    pub fn set_condition(&self, condition: &impl PluginHandler) -> Result<()> {
        container::set_slot(&self.node, Self::CONDITION, condition.node())
    }

    pub fn publishers(&self) -> Result<Vec<Plugin>> {
        container::items(&self.node, Self::PUBLISHERS)
    }

    pub fn add_publisher(&self, publisher: &impl PluginHandler) -> Result<()> {
        container::add_item(&self.node, Self::PUBLISHERS, publisher.node())
    }
}
