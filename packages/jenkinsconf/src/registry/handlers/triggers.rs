//! Parameterized trigger plugin.
//!
//! A trigger publisher holds trigger configurations under `configs`, and each
//! configuration holds its build parameters under its own `configs`.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::Result;
use crate::registry::handler::plugin_handler;
use crate::registry::{container, ConfigNode, Plugin, PluginHandler, Resolver};
use crate::xml::{join_names, split_names};

/// `KEY=VALUE` line of a predefined parameter block.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PROPERTY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^#=\s][^=]*?)\s*=(.*)$").expect("valid regex"));

/// Publisher starting other jobs with parameters.
#[derive(Debug, Clone)]
pub struct ParameterizedBuildTrigger {
    node: ConfigNode,
}

plugin_handler!(
    ParameterizedBuildTrigger,
    Publisher,
    "hudson.plugins.parameterizedtrigger.BuildTrigger",
    template = "<hudson.plugins.parameterizedtrigger.BuildTrigger><configs/></hudson.plugins.parameterizedtrigger.BuildTrigger>",
);

impl ParameterizedBuildTrigger {
    const CONFIGS: &'static str = "configs";

    pub fn triggers(&self) -> Result<Vec<Plugin>> {
        container::items(&self.node, Self::CONFIGS)
    }

    pub fn add_trigger(&self, trigger: &impl PluginHandler) -> Result<()> {
        container::add_item(&self.node, Self::CONFIGS, trigger.node())
    }
}

/// One group of downstream jobs started together.
#[derive(Debug, Clone)]
pub struct BuildTriggerConfig {
    node: ConfigNode,
}

plugin_handler!(
    BuildTriggerConfig,
    TriggerConfig,
    "hudson.plugins.parameterizedtrigger.BuildTriggerConfig",
    template = "<hudson.plugins.parameterizedtrigger.BuildTriggerConfig><configs/><projects></projects><condition>SUCCESS</condition><triggerWithNoParameters>false</triggerWithNoParameters><triggerFromChildProjects>false</triggerFromChildProjects></hudson.plugins.parameterizedtrigger.BuildTriggerConfig>",
);

impl BuildTriggerConfig {
    const CONFIGS: &'static str = "configs";

    /// Create a detached configuration triggering `job_names`.
    pub fn create<S: AsRef<str>>(resolver: &Resolver, job_names: &[S]) -> Result<Self> {
        let config = Self::from_template(resolver)?;
        config
            .node
            .element()
            .set_child_text("projects", join_names(job_names));
        Ok(config)
    }

    #[must_use]
    pub fn job_names(&self) -> Vec<String> {
        split_names(&self.node.child_text("projects"))
    }

    pub fn set_job_names<S: AsRef<str>>(&self, job_names: &[S]) -> Result<()> {
        self.node.set_child_text("projects", join_names(job_names))
    }

    /// Result that starts the downstream jobs (`SUCCESS`, `ALWAYS`, ...).
    #[must_use]
    pub fn condition(&self) -> String {
        self.node.child_text("condition")
    }

    pub fn parameters(&self) -> Result<Vec<Plugin>> {
        container::items(&self.node, Self::CONFIGS)
    }

    pub fn add_parameter(&self, parameter: &impl PluginHandler) -> Result<()> {
        container::ensure_detached(parameter.node())?;
        let configs = self.node.required_child(Self::CONFIGS)?;
        // An empty list is stored as `<configs class="java.util.Collections$EmptyList"/>`.
        configs.remove_attribute("class");
        container::add_item(&self.node, Self::CONFIGS, parameter.node())
    }
}

/// Passes the current build's parameters on.
#[derive(Debug, Clone)]
pub struct CurrentBuildParameters {
    node: ConfigNode,
}

plugin_handler!(
    CurrentBuildParameters,
    BuildParameter,
    "hudson.plugins.parameterizedtrigger.CurrentBuildParameters",
    template = "<hudson.plugins.parameterizedtrigger.CurrentBuildParameters/>",
);

/// Fixed `KEY=VALUE` parameters.
#[derive(Debug, Clone)]
pub struct PredefinedBuildParameters {
    node: ConfigNode,
}

plugin_handler!(
    PredefinedBuildParameters,
    BuildParameter,
    "hudson.plugins.parameterizedtrigger.PredefinedBuildParameters",
    template = "<hudson.plugins.parameterizedtrigger.PredefinedBuildParameters><properties></properties><textParamValueOnNewLine>false</textParamValueOnNewLine></hudson.plugins.parameterizedtrigger.PredefinedBuildParameters>",
);

impl PredefinedBuildParameters {
    /// Parameters in the order they are listed. Comments and lines without
    /// `=` are ignored.
    #[must_use]
    pub fn parameters(&self) -> Vec<(String, String)> {
        let text = self
            .node
            .element()
            .find_child("properties")
            .and_then(|p| p.text())
            .unwrap_or_default();
        text.lines()
            .filter_map(|line| PROPERTY_LINE.captures(line))
            .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
            .collect()
    }

    pub fn set_parameters<K: AsRef<str>, V: AsRef<str>>(&self, parameters: &[(K, V)]) -> Result<()> {
        let text = parameters
            .iter()
            .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
            .collect::<Vec<_>>()
            .join("\n");
        self.node.set_child_text("properties", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Owner;
    use crate::xml::XmlElement;
    use pretty_assertions::assert_eq;

    const TRIGGER: &str = r#"<hudson.plugins.parameterizedtrigger.BuildTrigger plugin="parameterized-trigger@2.35">
        <configs>
            <hudson.plugins.parameterizedtrigger.BuildTriggerConfig>
                <configs>
                    <hudson.plugins.parameterizedtrigger.CurrentBuildParameters/>
                    <hudson.plugins.parameterizedtrigger.PredefinedBuildParameters>
                        <properties>VERSION=1.2
# release channel
CHANNEL = stable
</properties>
                    </hudson.plugins.parameterizedtrigger.PredefinedBuildParameters>
                </configs>
                <projects>deploy, smoke-test</projects>
                <condition>ALWAYS</condition>
            </hudson.plugins.parameterizedtrigger.BuildTriggerConfig>
        </configs>
    </hudson.plugins.parameterizedtrigger.BuildTrigger>"#;

    #[test]
    fn test_trigger_tree() {
        let plugin = Resolver::shared()
            .resolve(XmlElement::parse(TRIGGER).unwrap(), &Owner::Detached)
            .unwrap();
        let trigger = ParameterizedBuildTrigger::try_from(plugin).unwrap();

        let configs = trigger.triggers().unwrap();
        assert_eq!(configs.len(), 1);
        let config = BuildTriggerConfig::try_from(configs[0].clone()).unwrap();
        assert_eq!(config.job_names(), vec!["deploy", "smoke-test"]);
        assert_eq!(config.condition(), "ALWAYS");

        let parameters = config.parameters().unwrap();
        assert_eq!(parameters.len(), 2);
        assert!(matches!(parameters[0], Plugin::CurrentBuildParameters(_)));
        let predefined = PredefinedBuildParameters::try_from(parameters[1].clone()).unwrap();
        assert_eq!(
            predefined.parameters(),
            vec![
                ("VERSION".to_string(), "1.2".to_string()),
                ("CHANNEL".to_string(), "stable".to_string()),
            ]
        );
    }

    #[test]
    fn test_add_parameter_to_empty_list() {
        let resolver = Resolver::shared();
        let config = BuildTriggerConfig::create(&resolver, &["downstream"]).unwrap();
        config
            .node()
            .required_child("configs")
            .unwrap()
            .set_attribute("class", "java.util.Collections$EmptyList");

        let predefined = PredefinedBuildParameters::from_template(&resolver).unwrap();
        predefined.set_parameters(&[("A", "1"), ("B", "x=y")]).unwrap();
        config.add_parameter(&predefined).unwrap();

        let configs = config.node().required_child("configs").unwrap();
        assert_eq!(configs.attribute("class"), None);
        let parameters = config.parameters().unwrap();
        let predefined = PredefinedBuildParameters::try_from(parameters[0].clone()).unwrap();
        assert_eq!(
            predefined.parameters(),
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "x=y".to_string()),
            ]
        );
    }
}
