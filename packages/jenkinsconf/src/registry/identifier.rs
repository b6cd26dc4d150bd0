//! Type identifier extraction.
//!
//! Jenkins serializes a plugin object either under a tag named after its class
//! (with `_` escaped as `__`) or under a field tag carrying the class in a
//! `class` attribute. Both forms reduce to the same identifier.

use std::fmt;

use crate::xml::XmlElement;

/// Attribute naming the class of a fragment embedded under a field tag.
pub const CLASS_ATTRIBUTE: &str = "class";

/// Attribute recording which plugin (and version) wrote a fragment.
pub const PLUGIN_ATTRIBUTE: &str = "plugin";

/// Identify the kind of an element.
///
/// The `class` attribute wins when present; otherwise the tag name is
/// unescaped.
///
/// # Examples
/// ```
/// use jenkinsconf::registry::extract_identifier;
/// use jenkinsconf::xml::XmlElement;
///
/// let tagged = XmlElement::new("hudson.plugins.sectioned__view.TextSection");
/// assert_eq!(extract_identifier(&tagged), "hudson.plugins.sectioned_view.TextSection");
///
/// let classed = XmlElement::parse(r#"<scm class="hudson.scm.NullSCM"/>"#).unwrap();
/// assert_eq!(extract_identifier(&classed), "hudson.scm.NullSCM");
/// ```
pub fn extract_identifier(element: &XmlElement) -> String {
    match element.attribute(CLASS_ATTRIBUTE) {
        Some(class) => class,
        None => unescape_tag(&element.name()),
    }
}

/// Reverse the doubled-underscore tag escaping.
pub fn unescape_tag(tag: &str) -> String {
    tag.replace("__", "_")
}

/// Apply the doubled-underscore escaping to an identifier used as a tag name.
pub fn escape_identifier(identifier: &str) -> String {
    identifier.replace('_', "__")
}

/// Normalize an identifier given in either attribute or tag spelling.
pub fn normalize_identifier(identifier: &str) -> String {
    unescape_tag(identifier)
}

/// Short name and version of the plugin that wrote a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginProvenance {
    pub name: String,
    pub version: Option<String>,
}

impl PluginProvenance {
    /// Parse a `shortname@version` value.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.split_once('@') {
            Some((name, version)) => Self {
                name: name.to_string(),
                version: Some(version.to_string()),
            },
            None => Self {
                name: value.to_string(),
                version: None,
            },
        }
    }
}

impl fmt::Display for PluginProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}

/// Read the `plugin="name@version"` attribute of an element.
pub fn plugin_provenance(element: &XmlElement) -> Option<PluginProvenance> {
    element
        .attribute(PLUGIN_ATTRIBUTE)
        .map(|value| PluginProvenance::parse(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_attribute_takes_precedence() {
        let el = XmlElement::parse(
            r#"<hudson.tasks.Shell class="org.jenkins_ci.plugins.run_condition.core.AlwaysRun"/>"#,
        )
        .unwrap();
        assert_eq!(
            extract_identifier(&el),
            "org.jenkins_ci.plugins.run_condition.core.AlwaysRun"
        );
    }

    #[test]
    fn test_class_attribute_used_verbatim() {
        let el = XmlElement::parse(r#"<runner class="a__b"/>"#).unwrap();
        assert_eq!(extract_identifier(&el), "a__b");
    }

    #[test]
    fn test_tag_without_escaping() {
        assert_eq!(extract_identifier(&XmlElement::new("hudson.tasks.Shell")), "hudson.tasks.Shell");
    }

    #[test]
    fn test_escaping_symmetry() {
        for tag in [
            "hudson.plugins.sectioned__view.SectionedView",
            "hudson.plugins.nested__view.NestedView",
            "org.jenkins__ci.plugins.flexible__publish.FlexiblePublisher",
            "org.jenkins__ci.plugins.run__condition.logic.ConditionContainer",
        ] {
            let identifier = extract_identifier(&XmlElement::new(tag));
            assert!(!identifier.contains("__"));
            assert_eq!(escape_identifier(&identifier), tag);
        }
    }

    #[test]
    fn test_provenance() {
        let el = XmlElement::parse(r#"<x plugin="git@3.9.1"/>"#).unwrap();
        let provenance = plugin_provenance(&el).unwrap();
        assert_eq!(provenance.name, "git");
        assert_eq!(provenance.version.as_deref(), Some("3.9.1"));
        assert_eq!(provenance.to_string(), "git@3.9.1");

        assert_eq!(PluginProvenance::parse("mailer").version, None);
        assert!(plugin_provenance(&XmlElement::new("x")).is_none());
    }
}
