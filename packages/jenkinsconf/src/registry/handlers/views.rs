//! View handlers.
//!
//! Nested views embed complete view configurations, so a view tree can be
//! arbitrarily deep; [`NestedView::all_views`] walks it without a depth limit.

use crate::error::Result;
use crate::registry::container;
use crate::registry::handler::plugin_handler;
use crate::registry::{ConfigNode, Plugin, PluginHandler};
use crate::xml::XmlElement;

/// Names of the jobs listed under `jobNames`.
pub(crate) fn job_names(node: &ConfigNode) -> Vec<String> {
    node.element()
        .find_child("jobNames")
        .map(|names| {
            names
                .find_children("string")
                .iter()
                .filter_map(XmlElement::text)
                .map(|t| t.trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Add a job name to `jobNames`. Returns `false` if it was already listed.
pub(crate) fn add_job_name(node: &ConfigNode, name: &str) -> Result<bool> {
    if job_names(node).iter().any(|n| n == name) {
        return Ok(false);
    }
    let names = node.required_child("jobNames")?;
    let entry = XmlElement::new("string");
    entry.set_text(name);
    names.append_child(entry);
    node.update()?;
    Ok(true)
}

/// Remove a job name from `jobNames`. Returns `false` if it was not listed.
pub(crate) fn remove_job_name(node: &ConfigNode, name: &str) -> Result<bool> {
    let names = node.required_child("jobNames")?;
    let Some(entry) = names
        .find_children("string")
        .into_iter()
        .find(|e| e.text().is_some_and(|t| t.trim() == name))
    else {
        return Ok(false);
    };
    names.remove_child(&entry);
    node.update()?;
    Ok(true)
}

/// Regular expression selecting additional jobs, if enabled.
pub(crate) fn include_regex(node: &ConfigNode) -> Option<String> {
    node.element()
        .child_text("includeRegex")
        .filter(|r| !r.is_empty())
}

/// Set or clear the job-selecting regular expression.
pub(crate) fn set_include_regex(node: &ConfigNode, regex: Option<&str>) -> Result<()> {
    match regex {
        Some(regex) => node.set_child_text("includeRegex", regex),
        None => {
            if let Some(existing) = node.element().find_child("includeRegex") {
                node.element().remove_child(&existing);
            }
            node.update()
        }
    }
}

/// Standard list view.
#[derive(Debug, Clone)]
pub struct ListView {
    node: ConfigNode,
}

plugin_handler!(
    ListView,
    View,
    "hudson.model.ListView",
    template = r#"<hudson.model.ListView><name></name><filterExecutors>false</filterExecutors><filterQueue>false</filterQueue><properties class="hudson.model.View$PropertyList"/><jobNames><comparator class="hudson.util.CaseInsensitiveComparator"/></jobNames><jobFilters/><columns/><recurse>false</recurse></hudson.model.ListView>"#,
);

impl ListView {
    /// Create a detached list view named `name`.
    pub fn create(resolver: &crate::registry::Resolver, name: &str) -> Result<Self> {
        let view = Self::from_template(resolver)?;
        view.node.set_child_text("name", name)?;
        Ok(view)
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.node.child_text("name")
    }

    #[must_use]
    pub fn job_names(&self) -> Vec<String> {
        job_names(&self.node)
    }

    pub fn add_job_name(&self, name: &str) -> Result<bool> {
        add_job_name(&self.node, name)
    }

    pub fn remove_job_name(&self, name: &str) -> Result<bool> {
        remove_job_name(&self.node, name)
    }

    #[must_use]
    pub fn include_regex(&self) -> Option<String> {
        include_regex(&self.node)
    }

    pub fn set_include_regex(&self, regex: Option<&str>) -> Result<()> {
        set_include_regex(&self.node, regex)
    }
}

/// The built-in "all jobs" view.
#[derive(Debug, Clone)]
pub struct AllView {
    node: ConfigNode,
}

plugin_handler!(
    AllView,
    View,
    "hudson.model.AllView",
    template = r#"<hudson.model.AllView><name>all</name><filterExecutors>false</filterExecutors><filterQueue>false</filterQueue><properties class="hudson.model.View$PropertyList"/></hudson.model.AllView>"#,
);

impl AllView {
    #[must_use]
    pub fn name(&self) -> String {
        self.node.child_text("name")
    }
}

/// View grouping other views.
#[derive(Debug, Clone)]
pub struct NestedView {
    node: ConfigNode,
}

plugin_handler!(
    NestedView,
    View,
    "hudson.plugins.nested_view.NestedView",
    template = r#"<hudson.plugins.nested__view.NestedView><name></name><filterExecutors>false</filterExecutors><filterQueue>false</filterQueue><properties class="hudson.model.View$PropertyList"/><views/><columns/></hudson.plugins.nested__view.NestedView>"#,
);

impl NestedView {
    const VIEWS: &'static str = "views";

    /// Create a detached nested view named `name`.
    pub fn create(resolver: &crate::registry::Resolver, name: &str) -> Result<Self> {
        let view = Self::from_template(resolver)?;
        view.node.set_child_text("name", name)?;
        Ok(view)
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.node.child_text("name")
    }

    /// Direct sub-views.
    pub fn views(&self) -> Result<Vec<Plugin>> {
        container::items(&self.node, Self::VIEWS)
    }

    /// Every view below this one, depth first, in document order.
    pub fn all_views(&self) -> Result<Vec<Plugin>> {
        let mut result = Vec::new();
        let mut pending: Vec<Plugin> = self.views()?;
        pending.reverse();
        while let Some(view) = pending.pop() {
            if let Plugin::NestedView(nested) = &view {
                let mut children = nested.views()?;
                children.reverse();
                pending.extend(children);
            }
            result.push(view);
        }
        Ok(result)
    }

    /// Find a direct sub-view by name.
    pub fn find_view(&self, name: &str) -> Result<Option<Plugin>> {
        Ok(self
            .views()?
            .into_iter()
            .find(|v| v.node().child_text("name") == name))
    }

    /// Append a detached view.
    pub fn add_view(&self, view: &impl PluginHandler) -> Result<()> {
        container::add_item(&self.node, Self::VIEWS, view.node())
    }
}

/// View made of independently configured sections.
#[derive(Debug, Clone)]
pub struct SectionedView {
    node: ConfigNode,
}

plugin_handler!(
    SectionedView,
    View,
    "hudson.plugins.sectioned_view.SectionedView",
    template = r#"<hudson.plugins.sectioned__view.SectionedView><name></name><filterExecutors>false</filterExecutors><filterQueue>false</filterQueue><properties class="hudson.model.View$PropertyList"/><sections/></hudson.plugins.sectioned__view.SectionedView>"#,
);

impl SectionedView {
    const SECTIONS: &'static str = "sections";

    /// Create a detached sectioned view named `name`.
    pub fn create(resolver: &crate::registry::Resolver, name: &str) -> Result<Self> {
        let view = Self::from_template(resolver)?;
        view.node.set_child_text("name", name)?;
        Ok(view)
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.node.child_text("name")
    }

    pub fn sections(&self) -> Result<Vec<Plugin>> {
        container::items(&self.node, Self::SECTIONS)
    }

    /// Append a detached section.
    pub fn add_section(&self, section: &impl PluginHandler) -> Result<()> {
        container::add_item(&self.node, Self::SECTIONS, section.node())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Owner, Resolver};

    fn resolve(xml: &str) -> Plugin {
        Resolver::shared()
            .resolve(XmlElement::parse(xml).unwrap(), &Owner::Detached)
            .unwrap()
    }

    /// Nested views `depth` levels deep, each holding one list view and the
    /// next level.
    fn nested_tree(depth: usize) -> String {
        let mut xml = String::new();
        for level in 0..depth {
            xml.push_str(&format!(
                "<hudson.plugins.nested__view.NestedView><name>level{level}</name><views><hudson.model.ListView><name>list{level}</name></hudson.model.ListView>"
            ));
        }
        for _ in 0..depth {
            xml.push_str("</views></hudson.plugins.nested__view.NestedView>");
        }
        xml
    }

    fn depth_of(plugin: &Plugin) -> usize {
        match plugin {
            Plugin::NestedView(view) => {
                1 + view
                    .views()
                    .unwrap()
                    .iter()
                    .map(depth_of)
                    .max()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    #[test]
    fn test_list_view_job_names() {
        let view = ListView::try_from(resolve(
            "<hudson.model.ListView><name>v</name><jobNames><string>a</string><string>b</string></jobNames></hudson.model.ListView>",
        ))
        .unwrap();

        assert_eq!(view.name(), "v");
        assert_eq!(view.job_names(), vec!["a", "b"]);
        assert!(view.add_job_name("c").unwrap());
        assert!(!view.add_job_name("c").unwrap());
        assert!(view.remove_job_name("a").unwrap());
        assert_eq!(view.job_names(), vec!["b", "c"]);
    }

    #[test]
    fn test_list_view_regex() {
        let view = ListView::create(&Resolver::shared(), "v").unwrap();
        assert_eq!(view.include_regex(), None);
        view.set_include_regex(Some("build-.*")).unwrap();
        assert_eq!(view.include_regex().as_deref(), Some("build-.*"));
        view.set_include_regex(None).unwrap();
        assert_eq!(view.include_regex(), None);
    }

    #[test]
    fn test_nested_view_depth() {
        for depth in 1..=5 {
            let plugin = resolve(&nested_tree(depth));
            assert_eq!(depth_of(&plugin), depth);
        }
    }

    #[test]
    fn test_nested_view_all_views_order() {
        let view = NestedView::try_from(resolve(&nested_tree(3))).unwrap();
        let names: Vec<String> = view
            .all_views()
            .unwrap()
            .iter()
            .map(|v| v.node().child_text("name"))
            .collect();
        assert_eq!(names, vec!["list0", "level1", "list1", "level2", "list2"]);
    }

    #[test]
    fn test_nested_view_omits_unknown_views() {
        let view = NestedView::try_from(resolve(
            "<hudson.plugins.nested__view.NestedView><views><hudson.model.AllView><name>all</name></hudson.model.AllView><com.acme.FancyView/></views></hudson.plugins.nested__view.NestedView>",
        ))
        .unwrap();
        let views = view.views().unwrap();
        assert_eq!(views.len(), 1);
        assert!(view.find_view("all").unwrap().is_some());
        assert!(view.find_view("fancy").unwrap().is_none());
    }

    #[test]
    fn test_add_view_to_new_nested_view() {
        let resolver = Resolver::shared();
        let outer = NestedView::create(&resolver, "outer").unwrap();
        let inner = SectionedView::create(&resolver, "inner").unwrap();
        outer.add_view(&inner).unwrap();

        let views = outer.views().unwrap();
        assert_eq!(views.len(), 1);
        let inner = SectionedView::try_from(views.into_iter().next().unwrap()).unwrap();
        assert_eq!(inner.name(), "inner");
        assert!(inner.sections().unwrap().is_empty());
    }
}
