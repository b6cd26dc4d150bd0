//! Container protocol shared by every handler holding nested plugins.
//!
//! A container handler designates one descendant element as its items
//! container. Enumeration resolves each direct child of that element in
//! document order and leaves out the ones no handler is registered for.

use super::node::{ConfigNode, Owner};
use super::plugin::Plugin;
use super::transcode;
use crate::error::{ConfError, Result};
use crate::xml::XmlElement;

/// Resolve the items stored under `path` below `node`.
///
/// # Errors
/// Returns `MissingElement` if the items container does not exist.
pub fn items(node: &ConfigNode, path: &str) -> Result<Vec<Plugin>> {
    let container = node.required_path(path)?;
    Ok(resolve_children(node, &container, path))
}

/// Resolve every child element of `container`, owned by `node`.
pub fn resolve_children(node: &ConfigNode, container: &XmlElement, path: &str) -> Vec<Plugin> {
    let owner = Owner::Node(node.clone());
    container
        .children()
        .into_iter()
        .filter_map(|child| match node.resolver().classify(child, owner.clone()) {
            Plugin::Unrecognized(unrecognized) => {
                tracing::warn!(
                    identifier = %unrecognized.identifier,
                    container = path,
                    parent = %node.identifier(),
                    "Skipping unsupported plugin"
                );
                None
            }
            plugin => Some(plugin),
        })
        .collect()
}

/// Append a detached item to the container at `path` and report the change.
///
/// # Errors
/// Returns `AlreadyAttached` if the item belongs to another container, or
/// `MissingElement` if the items container does not exist.
pub fn add_item(node: &ConfigNode, path: &str, item: &ConfigNode) -> Result<()> {
    ensure_detached(item)?;
    let container = node.required_path(path)?;
    container.append_child(item.element().clone());
    item.attach(Owner::Node(node.clone()));
    node.update()
}

/// Remove an item from the container at `path`.
///
/// Returns `false` without writing anything if the item is not a direct child
/// of the container.
pub fn remove_item(node: &ConfigNode, path: &str, item: &ConfigNode) -> Result<bool> {
    let container = node.required_path(path)?;
    if !container.remove_child(item.element()) {
        return Ok(false);
    }
    item.attach(Owner::Detached);
    node.update()?;
    Ok(true)
}

/// Store a detached item in the single-plugin slot `tag` below `node`.
///
/// The slot holds the item in class-attribute form (`<tag class="...">`),
/// replacing whatever the slot held before. The item stays usable: later
/// updates through it are re-encoded into the slot.
pub fn set_slot(node: &ConfigNode, tag: &str, item: &ConfigNode) -> Result<()> {
    ensure_detached(item)?;
    let wrapper = transcode::encode(item.element(), tag);
    match node.element().find_child(tag) {
        Some(existing) => {
            node.element().replace_child(&existing, wrapper.clone());
        }
        None => node.element().append_child(wrapper.clone()),
    }
    item.bind(wrapper, Owner::Node(node.clone()));
    node.update()
}

/// Resolve the plugin stored in class-attribute form in slot `tag`.
///
/// Returns `Ok(None)` with a warning if its type is not supported.
pub fn slot(node: &ConfigNode, tag: &str) -> Result<Option<Plugin>> {
    let element = node.required_child(tag)?;
    let plugin = node.resolver().classify(element, Owner::Node(node.clone()));
    if let Plugin::Unrecognized(unrecognized) = &plugin {
        tracing::warn!(
            identifier = %unrecognized.identifier,
            slot = tag,
            parent = %node.identifier(),
            "Skipping unsupported plugin"
        );
        return Ok(None);
    }
    Ok(Some(plugin))
}

/// Refuse to move a node that already belongs to a tree.
pub(crate) fn ensure_detached(item: &ConfigNode) -> Result<()> {
    if item.is_attached() {
        return Err(ConfError::AlreadyAttached {
            identifier: item.identifier(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Resolver;
    use crate::test_support::capture_warnings;

    fn sectioned_view() -> ConfigNode {
        let xml = r#"<hudson.plugins.sectioned__view.SectionedView>
            <sections>
                <hudson.plugins.sectioned__view.TextSection><name>Intro</name></hudson.plugins.sectioned__view.TextSection>
                <hudson.acme.FooSection/>
                <hudson.plugins.sectioned__view.ListViewSection><name>Jobs</name></hudson.plugins.sectioned__view.ListViewSection>
            </sections>
        </hudson.plugins.sectioned__view.SectionedView>"#;
        ConfigNode::new(XmlElement::parse(xml).unwrap(), Resolver::shared())
    }

    #[test]
    fn test_items_keep_order_and_skip_unknown() {
        let node = sectioned_view();
        let (items, warnings) = capture_warnings(|| items(&node, "sections").unwrap());

        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Plugin::TextSection(_)));
        assert!(matches!(items[1], Plugin::ListViewSection(_)));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("hudson.acme.FooSection"));
    }

    #[test]
    fn test_items_missing_container() {
        let node = ConfigNode::new(XmlElement::new("x"), Resolver::shared());
        assert!(matches!(
            items(&node, "sections"),
            Err(ConfError::MissingElement { .. })
        ));
    }

    #[test]
    fn test_add_and_remove_item() {
        let node = sectioned_view();
        let item = ConfigNode::new(
            XmlElement::new("hudson.plugins.sectioned__view.TextSection"),
            node.resolver().clone(),
        );

        add_item(&node, "sections", &item).unwrap();
        assert!(item.is_attached());
        let sections = node.required_path("sections").unwrap().children();
        assert!(sections.last().unwrap().ptr_eq(item.element()));

        let err = add_item(&node, "sections", &item).unwrap_err();
        assert!(matches!(err, ConfError::AlreadyAttached { .. }));

        assert!(remove_item(&node, "sections", &item).unwrap());
        assert!(!item.is_attached());
        assert!(!remove_item(&node, "sections", &item).unwrap());
    }

    #[test]
    fn test_set_slot_replaces_and_stays_bound() {
        let resolver = Resolver::shared();
        let job = ConfigNode::new(
            XmlElement::parse(r#"<project><scm class="hudson.scm.NullSCM"/><builders/></project>"#).unwrap(),
            resolver.clone(),
        );
        let git = ConfigNode::new(
            XmlElement::parse("<hudson.plugins.git.GitSCM><configVersion>2</configVersion></hudson.plugins.git.GitSCM>").unwrap(),
            resolver,
        );

        set_slot(&job, "scm", &git).unwrap();
        let scm = job.element().find_child("scm").unwrap();
        assert_eq!(scm.attribute("class").as_deref(), Some("hudson.plugins.git.GitSCM"));
        assert_eq!(job.element().find_children("scm").len(), 1);
        assert!(git.is_transcoded());

        git.set_child_text("configVersion", "3").unwrap();
        assert_eq!(scm.child_text("configVersion").as_deref(), Some("3"));
        assert!(matches!(slot(&job, "scm").unwrap(), Some(Plugin::GitScm(_))));
    }
}
