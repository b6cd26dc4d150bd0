//! Tag-to-class relocation for fragments stored under a field tag.
//!
//! Some plugins store a nested plugin under a fixed field tag and move the
//! nested plugin's own root tag into a `class` attribute:
//!
//! ```xml
//! <buildStep class="hudson.tasks.Shell"><command>make</command></buildStep>
//! ```
//!
//! [`decode`] rebuilds the standalone fragment (`<hudson.tasks.Shell>...`) and
//! [`encode`] produces the wrapper again.

use super::identifier::{escape_identifier, extract_identifier, CLASS_ATTRIBUTE};
use crate::error::{ConfError, Result};
use crate::xml::{XmlAttribute, XmlChild, XmlElement};

/// Field tag used by single conditional build steps.
pub const BUILD_STEP_TAG: &str = "buildStep";

/// Wrap a standalone fragment under `wrapper_tag`.
///
/// The fragment is copied; the result shares nothing with the input.
pub fn encode(element: &XmlElement, wrapper_tag: &str) -> XmlElement {
    let wrapper = XmlElement::new(wrapper_tag);
    encode_into(element, &wrapper);
    wrapper
}

/// Overwrite an existing wrapper with the encoding of `element`, keeping the
/// wrapper's tag and identity.
pub fn encode_into(element: &XmlElement, wrapper: &XmlElement) {
    let mut attributes = vec![XmlAttribute {
        name: CLASS_ATTRIBUTE.to_string(),
        value: extract_identifier(element),
    }];
    attributes.extend(
        element
            .attributes()
            .into_iter()
            .filter(|a| a.name != CLASS_ATTRIBUTE),
    );
    wrapper.set_attributes(attributes);
    wrapper.set_child_nodes(copy_children(element));
}

/// Rebuild the standalone fragment stored in a wrapper.
///
/// # Errors
/// Returns `MissingElement` if the wrapper has no `class` attribute.
pub fn decode(wrapper: &XmlElement) -> Result<XmlElement> {
    let class = wrapper
        .attribute(CLASS_ATTRIBUTE)
        .ok_or_else(|| ConfError::missing("@class", format!("<{}>", wrapper.name())))?;

    let element = XmlElement::new(escape_identifier(&class));
    element.set_attributes(
        wrapper
            .attributes()
            .into_iter()
            .filter(|a| a.name != CLASS_ATTRIBUTE)
            .collect(),
    );
    element.set_child_nodes(copy_children(wrapper));
    Ok(element)
}

fn copy_children(element: &XmlElement) -> Vec<XmlChild> {
    element
        .child_nodes()
        .into_iter()
        .map(|child| match child {
            XmlChild::Element(e) => XmlChild::Element(e.deep_copy()),
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shell_builder_round_trip() {
        let original = XmlElement::parse("<ShellBuilder><command>echo hi</command></ShellBuilder>").unwrap();

        let wrapper = encode(&original, BUILD_STEP_TAG);
        assert_eq!(
            wrapper.to_xml_string().unwrap(),
            r#"<buildStep class="ShellBuilder"><command>echo hi</command></buildStep>"#
        );

        let decoded = decode(&wrapper).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.name(), "ShellBuilder");
        assert_eq!(decoded.child_text("command").as_deref(), Some("echo hi"));
    }

    #[test]
    fn test_escaped_tags_survive() {
        let original = XmlElement::parse(
            r#"<org.jenkins__ci.plugins.run__condition.core.AlwaysRun plugin="run-condition@1.0"/>"#,
        )
        .unwrap();

        let wrapper = encode(&original, "condition");
        assert_eq!(
            wrapper.attribute("class").as_deref(),
            Some("org.jenkins_ci.plugins.run_condition.core.AlwaysRun")
        );
        assert_eq!(wrapper.attribute("plugin").as_deref(), Some("run-condition@1.0"));
        assert_eq!(decode(&wrapper).unwrap(), original);
    }

    #[test]
    fn test_encode_copies() {
        let original = XmlElement::parse("<hudson.tasks.Shell><command>a</command></hudson.tasks.Shell>").unwrap();
        let wrapper = encode(&original, BUILD_STEP_TAG);
        original.find_child("command").unwrap().set_text("b");

        assert_eq!(wrapper.child_text("command").as_deref(), Some("a"));
    }

    #[test]
    fn test_decode_without_class() {
        let wrapper = XmlElement::new(BUILD_STEP_TAG);
        assert!(decode(&wrapper).is_err());
    }
}
