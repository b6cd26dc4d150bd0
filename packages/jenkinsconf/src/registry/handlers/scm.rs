//! Source control configurations.

use crate::error::Result;
use crate::registry::handler::plugin_handler;
use crate::registry::{ConfigNode, PluginHandler, Resolver};
use crate::xml::get_text;

/// No source control.
#[derive(Debug, Clone)]
pub struct NullScm {
    node: ConfigNode,
}

plugin_handler!(
    NullScm,
    Scm,
    "hudson.scm.NullSCM",
    template = "<hudson.scm.NullSCM/>",
);

#[derive(Debug, Clone)]
pub struct GitScm {
    node: ConfigNode,
}

plugin_handler!(
    GitScm,
    Scm,
    "hudson.plugins.git.GitSCM",
    template = r#"<hudson.plugins.git.GitSCM><configVersion>2</configVersion><userRemoteConfigs><hudson.plugins.git.UserRemoteConfig><url></url></hudson.plugins.git.UserRemoteConfig></userRemoteConfigs><branches><hudson.plugins.git.BranchSpec><name>*/master</name></hudson.plugins.git.BranchSpec></branches><doGenerateSubmoduleConfigurations>false</doGenerateSubmoduleConfigurations><submoduleCfg class="list"/><extensions/></hudson.plugins.git.GitSCM>"#,
);

impl GitScm {
    const REMOTES: &'static str = "userRemoteConfigs";
    const REMOTE: &'static str = "hudson.plugins.git.UserRemoteConfig";
    const BRANCHES: &'static str = "branches";
    const BRANCH: &'static str = "hudson.plugins.git.BranchSpec";

    /// Create a detached configuration cloning `url` and building `branch`.
    pub fn create(resolver: &Resolver, url: &str, branch: &str) -> Result<Self> {
        let scm = Self::from_template(resolver)?;
        let remote = scm.node.required_path(&format!("{}/{}", Self::REMOTES, Self::REMOTE))?;
        remote.set_child_text("url", url);
        let spec = scm.node.required_path(&format!("{}/{}", Self::BRANCHES, Self::BRANCH))?;
        spec.set_child_text("name", branch);
        Ok(scm)
    }

    /// Remote repository URLs in configuration order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.entries(Self::REMOTES, Self::REMOTE, "url")
    }

    /// Branch specifiers in configuration order.
    #[must_use]
    pub fn branches(&self) -> Vec<String> {
        self.entries(Self::BRANCHES, Self::BRANCH, "name")
    }

    fn entries(&self, list: &str, entry: &str, field: &str) -> Vec<String> {
        let Some(list) = self.node.element().find_child(list) else {
            return Vec::new();
        };
        list.find_children(entry)
            .iter()
            .filter_map(|e| e.find_child(field))
            .map(|f| get_text(&f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Owner, Plugin};
    use crate::xml::XmlElement;

    #[test]
    fn test_git_from_class_attribute() {
        let element = XmlElement::parse(
            r#"<scm class="hudson.plugins.git.GitSCM" plugin="git@4.11.0">
                <configVersion>2</configVersion>
                <userRemoteConfigs>
                    <hudson.plugins.git.UserRemoteConfig><url>https://example.com/a.git</url></hudson.plugins.git.UserRemoteConfig>
                    <hudson.plugins.git.UserRemoteConfig><url>https://example.com/b.git</url></hudson.plugins.git.UserRemoteConfig>
                </userRemoteConfigs>
                <branches><hudson.plugins.git.BranchSpec><name>*/main</name></hudson.plugins.git.BranchSpec></branches>
            </scm>"#,
        )
        .unwrap();
        let plugin = Resolver::shared().resolve(element, &Owner::Detached).unwrap();
        assert_eq!(plugin.provenance().unwrap().version.as_deref(), Some("4.11.0"));

        let git = GitScm::try_from(plugin).unwrap();
        assert_eq!(git.urls(), vec!["https://example.com/a.git", "https://example.com/b.git"]);
        assert_eq!(git.branches(), vec!["*/main"]);
    }

    #[test]
    fn test_create() {
        let git = GitScm::create(&Resolver::shared(), "git@example.com:x.git", "*/release").unwrap();
        assert_eq!(git.urls(), vec!["git@example.com:x.git"]);
        assert_eq!(git.branches(), vec!["*/release"]);
        assert!(matches!(Plugin::from(git), Plugin::GitScm(_)));
    }
}
