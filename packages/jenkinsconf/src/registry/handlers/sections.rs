//! Sections of a sectioned view.

use crate::error::Result;
use crate::registry::handler::plugin_handler;
use crate::registry::handlers::views;
use crate::registry::{ConfigNode, PluginHandler, Resolver};

/// Section listing jobs, like a list view.
#[derive(Debug, Clone)]
pub struct ListViewSection {
    node: ConfigNode,
}

plugin_handler!(
    ListViewSection,
    Section,
    "hudson.plugins.sectioned_view.ListViewSection",
    template = r#"<hudson.plugins.sectioned__view.ListViewSection><jobNames><comparator class="hudson.util.CaseInsensitiveComparator"/></jobNames><jobFilters/><name></name><width>FULL</width><alignment>CENTER</alignment><columns/></hudson.plugins.sectioned__view.ListViewSection>"#,
);

impl ListViewSection {
    /// Create a detached section named `name`.
    pub fn create(resolver: &Resolver, name: &str) -> Result<Self> {
        let section = Self::from_template(resolver)?;
        section.node.set_child_text("name", name)?;
        Ok(section)
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.node.child_text("name")
    }

    #[must_use]
    pub fn job_names(&self) -> Vec<String> {
        views::job_names(&self.node)
    }

    pub fn add_job_name(&self, name: &str) -> Result<bool> {
        views::add_job_name(&self.node, name)
    }

    #[must_use]
    pub fn include_regex(&self) -> Option<String> {
        views::include_regex(&self.node)
    }

    pub fn set_include_regex(&self, regex: Option<&str>) -> Result<()> {
        views::set_include_regex(&self.node, regex)
    }
}

/// Free-text section.
#[derive(Debug, Clone)]
pub struct TextSection {
    node: ConfigNode,
}

plugin_handler!(
    TextSection,
    Section,
    "hudson.plugins.sectioned_view.TextSection",
    template = r#"<hudson.plugins.sectioned__view.TextSection><jobNames><comparator class="hudson.util.CaseInsensitiveComparator"/></jobNames><jobFilters/><name></name><width>FULL</width><alignment>CENTER</alignment><text></text><style>NONE</style></hudson.plugins.sectioned__view.TextSection>"#,
);

impl TextSection {
    /// Create a detached section named `name` showing `text`.
    pub fn create(resolver: &Resolver, name: &str, text: &str) -> Result<Self> {
        let section = Self::from_template(resolver)?;
        section.node.element().set_child_text("name", name);
        section.node.element().set_child_text("text", text);
        Ok(section)
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.node.child_text("name")
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.node.child_text("text")
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        self.node.set_child_text("text", text)
    }

    /// Display style (`NONE`, `NOTE`, `INFO`, `WARNING`, `TIP`).
    #[must_use]
    pub fn style(&self) -> String {
        self.node.child_text("style")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_section() {
        let section = TextSection::create(&Resolver::shared(), "Intro", "hello").unwrap();
        assert_eq!(section.name(), "Intro");
        assert_eq!(section.text(), "hello");
        assert_eq!(section.style(), "NONE");

        section.set_text("bye").unwrap();
        assert_eq!(section.text(), "bye");
    }

    #[test]
    fn test_list_view_section() {
        let section = ListViewSection::create(&Resolver::shared(), "Builds").unwrap();
        assert!(section.job_names().is_empty());
        assert!(section.add_job_name("nightly").unwrap());
        assert_eq!(section.job_names(), vec!["nightly"]);
        assert_eq!(section.include_regex(), None);
    }
}
