//! Job handlers.
//!
//! Job configurations use a short root tag (`project`, `flow-definition`)
//! instead of the class name, so these handlers also register the root tag as
//! an alias.

use crate::error::Result;
use crate::registry::handler::plugin_handler;
use crate::registry::{container, ConfigNode, Owner, Plugin, PluginHandler};
use crate::xml::{get_bool, get_text, set_bool, XmlElement};

fn description(node: &ConfigNode) -> String {
    node.child_text("description")
}

fn set_description(node: &ConfigNode, description: &str) -> Result<()> {
    node.set_child_text("description", description)
}

/// Freestyle project.
#[derive(Debug, Clone)]
pub struct FreestyleJob {
    node: ConfigNode,
}

plugin_handler!(
    FreestyleJob,
    Job,
    "hudson.model.FreeStyleProject",
    aliases = &["project"],
    template = r#"<project><actions/><description></description><keepDependencies>false</keepDependencies><properties/><scm class="hudson.scm.NullSCM"/><canRoam>true</canRoam><disabled>false</disabled><blockBuildWhenDownstreamBuilding>false</blockBuildWhenDownstreamBuilding><blockBuildWhenUpstreamBuilding>false</blockBuildWhenUpstreamBuilding><triggers/><concurrentBuild>false</concurrentBuild><builders/><publishers/><buildWrappers/></project>"#,
);

impl FreestyleJob {
    const SCM: &'static str = "scm";
    const BUILDERS: &'static str = "builders";
    const PUBLISHERS: &'static str = "publishers";

    #[must_use]
    pub fn description(&self) -> String {
        description(&self.node)
    }

    pub fn set_description(&self, description: &str) -> Result<()> {
        set_description(&self.node, description)
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.node.flag("disabled")
    }

    pub fn set_disabled(&self, disabled: bool) -> Result<()> {
        self.node.set_flag("disabled", disabled)
    }

    /// Label expression restricting where the job runs, if it may not roam.
    #[must_use]
    pub fn assigned_node(&self) -> Option<String> {
        if self.node.flag("canRoam") {
            return None;
        }
        self.node
            .element()
            .child_text("assignedNode")
            .filter(|n| !n.is_empty())
    }

    /// Pin the job to a label expression, or let it roam with `None`.
    pub fn set_assigned_node(&self, label: Option<&str>) -> Result<()> {
        let element = self.node.element();
        match label {
            Some(label) => {
                element.set_child_text("assignedNode", label);
                set_bool(element, "canRoam", false);
            }
            None => {
                if let Some(existing) = element.find_child("assignedNode") {
                    element.remove_child(&existing);
                }
                set_bool(element, "canRoam", true);
            }
        }
        self.node.update()
    }

    #[must_use]
    pub fn custom_workspace(&self) -> Option<String> {
        self.node
            .element()
            .child_text("customWorkspace")
            .filter(|w| !w.is_empty())
    }

    pub fn set_custom_workspace(&self, path: &str) -> Result<()> {
        self.node.set_child_text("customWorkspace", path)
    }

    /// Source control configuration.
    ///
    /// # Errors
    /// Returns `UnsupportedPlugin` if the SCM type has no handler; callers
    /// that can do without it should use [`Self::scm_if_supported`].
    pub fn scm(&self) -> Result<Plugin> {
        let element = self.node.required_child(Self::SCM)?;
        self.node.resolve_strict(element)
    }

    /// Source control configuration, `None` if it is absent or its type is
    /// not supported.
    pub fn scm_if_supported(&self) -> Result<Option<Plugin>> {
        if self.node.element().find_child(Self::SCM).is_none() {
            return Ok(None);
        }
        container::slot(&self.node, Self::SCM)
    }

    /// Replace the source control configuration with a detached one.
    pub fn set_scm(&self, scm: &impl PluginHandler) -> Result<()> {
        container::set_slot(&self.node, Self::SCM, scm.node())
    }

    pub fn builders(&self) -> Result<Vec<Plugin>> {
        container::items(&self.node, Self::BUILDERS)
    }

    pub fn add_builder(&self, builder: &impl PluginHandler) -> Result<()> {
        container::add_item(&self.node, Self::BUILDERS, builder.node())
    }

    pub fn publishers(&self) -> Result<Vec<Plugin>> {
        container::items(&self.node, Self::PUBLISHERS)
    }

    pub fn add_publisher(&self, publisher: &impl PluginHandler) -> Result<()> {
        container::add_item(&self.node, Self::PUBLISHERS, publisher.node())
    }
}

/// Pipeline job.
#[derive(Debug, Clone)]
pub struct PipelineJob {
    node: ConfigNode,
}

plugin_handler!(
    PipelineJob,
    Job,
    "org.jenkinsci.plugins.workflow.job.WorkflowJob",
    aliases = &["flow-definition"],
    template = r#"<flow-definition><actions/><description></description><keepDependencies>false</keepDependencies><properties/><definition class="org.jenkinsci.plugins.workflow.cps.CpsFlowDefinition"><script></script><sandbox>true</sandbox></definition><triggers/><disabled>false</disabled></flow-definition>"#,
);

impl PipelineJob {
    const DEFINITION: &'static str = "definition";
    const INLINE_DEFINITION: &'static str = "org.jenkinsci.plugins.workflow.cps.CpsFlowDefinition";

    #[must_use]
    pub fn description(&self) -> String {
        description(&self.node)
    }

    pub fn set_description(&self, description: &str) -> Result<()> {
        set_description(&self.node, description)
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.node.flag("disabled")
    }

    pub fn set_disabled(&self, disabled: bool) -> Result<()> {
        self.node.set_flag("disabled", disabled)
    }

    /// Inline pipeline script, `None` for SCM-backed definitions.
    #[must_use]
    pub fn script(&self) -> Option<String> {
        self.node
            .element()
            .find_by_path("definition/script")
            .map(|s| s.text().unwrap_or_default())
    }

    /// Store an inline script, replacing an SCM-backed definition if needed.
    pub fn set_script(&self, script: &str) -> Result<()> {
        let definition = self.inline_definition();
        definition.set_child_text("script", script);
        if definition.find_child("sandbox").is_none() {
            set_bool(&definition, "sandbox", true);
        }
        self.node.update()
    }

    /// Whether an inline script runs in the Groovy sandbox.
    #[must_use]
    pub fn sandbox(&self) -> bool {
        self.node
            .element()
            .find_child(Self::DEFINITION)
            .is_some_and(|d| get_bool(&d, "sandbox"))
    }

    /// Path of the pipeline script inside the repository, for SCM-backed
    /// definitions.
    #[must_use]
    pub fn script_path(&self) -> Option<String> {
        self.node
            .element()
            .find_by_path("definition/scriptPath")
            .map(|p| get_text(&p))
    }

    /// SCM of an SCM-backed definition; `None` for inline scripts.
    ///
    /// # Errors
    /// Returns `UnsupportedPlugin` if the SCM type has no handler.
    pub fn scm(&self) -> Result<Option<Plugin>> {
        match self.node.element().find_by_path("definition/scm") {
            Some(element) => self.node.resolve_strict(element).map(Some),
            None => Ok(None),
        }
    }

    /// SCM of an SCM-backed definition, `None` for inline scripts or when the
    /// SCM type is not supported.
    #[must_use]
    pub fn scm_if_supported(&self) -> Option<Plugin> {
        let element = self.node.element().find_by_path("definition/scm")?;
        match self
            .node
            .resolver()
            .classify(element, Owner::Node(self.node.clone()))
        {
            Plugin::Unrecognized(unrecognized) => {
                tracing::warn!(
                    identifier = %unrecognized.identifier,
                    slot = "definition/scm",
                    parent = %self.node.identifier(),
                    "Skipping unsupported plugin"
                );
                None
            }
            plugin => Some(plugin),
        }
    }

    fn inline_definition(&self) -> XmlElement {
        let element = self.node.element();
        if let Some(definition) = element.find_child(Self::DEFINITION) {
            if definition.attribute("class").as_deref() == Some(Self::INLINE_DEFINITION) {
                return definition;
            }
            element.remove_child(&definition);
        }
        let definition = XmlElement::new(Self::DEFINITION);
        definition.set_attribute("class", Self::INLINE_DEFINITION);
        element.append_child(definition.clone());
        definition
    }
}

/// Folder holding other jobs and its own views.
#[derive(Debug, Clone)]
pub struct FolderJob {
    node: ConfigNode,
}

plugin_handler!(
    FolderJob,
    Job,
    "com.cloudbees.hudson.plugins.folder.Folder",
    template = r#"<com.cloudbees.hudson.plugins.folder.Folder><actions/><description></description><properties/><folderViews class="com.cloudbees.hudson.plugins.folder.views.DefaultFolderViewHolder"><views><hudson.model.AllView><owner class="com.cloudbees.hudson.plugins.folder.Folder" reference="../../../.."/><name>All</name><filterExecutors>false</filterExecutors><filterQueue>false</filterQueue><properties class="hudson.model.View$PropertyList"/></hudson.model.AllView></views><tabBar class="hudson.views.DefaultViewsTabBar"/></folderViews><healthMetrics/><icon class="com.cloudbees.hudson.plugins.folder.icons.StockFolderIcon"/></com.cloudbees.hudson.plugins.folder.Folder>"#,
);

impl FolderJob {
    const VIEWS: &'static str = "folderViews/views";

    #[must_use]
    pub fn description(&self) -> String {
        description(&self.node)
    }

    pub fn set_description(&self, description: &str) -> Result<()> {
        set_description(&self.node, description)
    }

    /// Views defined on the folder.
    pub fn views(&self) -> Result<Vec<Plugin>> {
        container::items(&self.node, Self::VIEWS)
    }

    pub fn add_view(&self, view: &impl PluginHandler) -> Result<()> {
        container::add_item(&self.node, Self::VIEWS, view.node())
    }
}
