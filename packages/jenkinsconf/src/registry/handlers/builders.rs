//! Build step handlers.
//!
//! The conditional build step plugin nests builders in two ways:
//! [`ConditionalBuilder`] keeps a plain list under `conditionalbuilders`,
//! while [`SingleConditionalBuilder`] stores exactly one step under
//! `buildStep` with the step's root tag moved into a `class` attribute.

use crate::error::Result;
use crate::registry::handler::plugin_handler;
use crate::registry::transcode::{self, BUILD_STEP_TAG};
use crate::registry::{container, ConfigNode, Owner, Plugin, PluginHandler, Resolver};

/// Untrimmed text of the `command` child; scripts keep their layout.
fn command(node: &ConfigNode) -> String {
    node.element()
        .find_child("command")
        .and_then(|c| c.text())
        .unwrap_or_default()
}

/// Class of the `runner` child, which decides what happens when the
/// condition cannot be evaluated.
fn runner(node: &ConfigNode) -> Option<String> {
    node.element()
        .find_child("runner")
        .and_then(|r| r.attribute("class"))
}

/// Shell script step.
#[derive(Debug, Clone)]
pub struct ShellBuilder {
    node: ConfigNode,
}

plugin_handler!(
    ShellBuilder,
    Builder,
    "hudson.tasks.Shell",
    template = "<hudson.tasks.Shell><command></command></hudson.tasks.Shell>",
);

impl ShellBuilder {
    /// Create a detached step running `script`.
    pub fn create(resolver: &Resolver, script: &str) -> Result<Self> {
        let builder = Self::from_template(resolver)?;
        builder.node.element().set_child_text("command", script);
        Ok(builder)
    }

    #[must_use]
    pub fn script(&self) -> String {
        command(&self.node)
    }

    pub fn set_script(&self, script: &str) -> Result<()> {
        self.node.set_child_text("command", script)
    }
}

/// Windows batch step.
#[derive(Debug, Clone)]
pub struct BatchBuilder {
    node: ConfigNode,
}

plugin_handler!(
    BatchBuilder,
    Builder,
    "hudson.tasks.BatchFile",
    template = "<hudson.tasks.BatchFile><command></command></hudson.tasks.BatchFile>",
);

impl BatchBuilder {
    /// Create a detached step running `script`.
    pub fn create(resolver: &Resolver, script: &str) -> Result<Self> {
        let builder = Self::from_template(resolver)?;
        builder.node.element().set_child_text("command", script);
        Ok(builder)
    }

    #[must_use]
    pub fn script(&self) -> String {
        command(&self.node)
    }

    pub fn set_script(&self, script: &str) -> Result<()> {
        self.node.set_child_text("command", script)
    }
}

/// Runs a list of builders when its run condition holds.
#[derive(Debug, Clone)]
pub struct ConditionalBuilder {
    node: ConfigNode,
}

plugin_handler!(
    ConditionalBuilder,
    Builder,
    "org.jenkinsci.plugins.conditionalbuildstep.ConditionalBuilder",
    template = r#"<org.jenkinsci.plugins.conditionalbuildstep.ConditionalBuilder><runner class="org.jenkins_ci.plugins.run_condition.BuildStepRunner$Fail"/><runCondition class="org.jenkins_ci.plugins.run_condition.core.AlwaysRun"/><conditionalbuilders/></org.jenkinsci.plugins.conditionalbuildstep.ConditionalBuilder>"#,
);

impl ConditionalBuilder {
    const CONDITION: &'static str = "runCondition";
    const BUILDERS: &'static str = "conditionalbuilders";

    #[must_use]
    pub fn runner(&self) -> Option<String> {
        runner(&self.node)
    }

    /// The run condition, `None` if its type is not supported.
    pub fn condition(&self) -> Result<Option<Plugin>> {
        container::slot(&self.node, Self::CONDITION)
    }

    /// Replace the run condition with a detached condition.
    pub fn set_condition(&self, condition: &impl PluginHandler) -> Result<()> {
        container::set_slot(&self.node, Self::CONDITION, condition.node())
    }

    pub fn builders(&self) -> Result<Vec<Plugin>> {
        container::items(&self.node, Self::BUILDERS)
    }

    /// Append a detached builder.
    pub fn add_builder(&self, builder: &impl PluginHandler) -> Result<()> {
        container::add_item(&self.node, Self::BUILDERS, builder.node())
    }
}

/// Runs a single build step when its run condition holds.
#[derive(Debug, Clone)]
pub struct SingleConditionalBuilder {
    node: ConfigNode,
}

plugin_handler!(
    SingleConditionalBuilder,
    Builder,
    "org.jenkinsci.plugins.conditionalbuildstep.singlestep.SingleConditionalBuilder",
    template = r#"<org.jenkinsci.plugins.conditionalbuildstep.singlestep.SingleConditionalBuilder><condition class="org.jenkins_ci.plugins.run_condition.core.AlwaysRun"/><buildStep class="hudson.tasks.Shell"><command></command></buildStep><runner class="org.jenkins_ci.plugins.run_condition.BuildStepRunner$Fail"/></org.jenkinsci.plugins.conditionalbuildstep.singlestep.SingleConditionalBuilder>"#,
);

impl SingleConditionalBuilder {
    const CONDITION: &'static str = "condition";

    #[must_use]
    pub fn runner(&self) -> Option<String> {
        runner(&self.node)
    }

    /// The run condition, `None` if its type is not supported.
    pub fn condition(&self) -> Result<Option<Plugin>> {
        container::slot(&self.node, Self::CONDITION)
    }

    pub fn set_condition(&self, condition: &impl PluginHandler) -> Result<()> {
        container::set_slot(&self.node, Self::CONDITION, condition.node())
    }

    /// The wrapped build step, decoded back to its standalone form.
    ///
    /// Mutations on the returned plugin are encoded into `buildStep` again
    /// before they propagate. Returns `Ok(None)` with a warning if the step's
    /// type is not supported.
    pub fn build_step(&self) -> Result<Option<Plugin>> {
        let wrapper = self.node.required_child(BUILD_STEP_TAG)?;
        let element = transcode::decode(&wrapper)?;
        let resolver = self.node.resolver();
        let node = ConfigNode::transcoded(
            element,
            wrapper,
            resolver.clone(),
            Owner::Node(self.node.clone()),
        );
        match resolver.classify_node(node) {
            Plugin::Unrecognized(unrecognized) => {
                tracing::warn!(
                    identifier = %unrecognized.identifier,
                    slot = BUILD_STEP_TAG,
                    parent = %self.node.identifier(),
                    "Skipping unsupported plugin"
                );
                Ok(None)
            }
            plugin => Ok(Some(plugin)),
        }
    }

    /// Replace the build step with a detached builder.
    pub fn set_build_step(&self, step: &impl PluginHandler) -> Result<()> {
        container::set_slot(&self.node, BUILD_STEP_TAG, step.node())
    }
}
