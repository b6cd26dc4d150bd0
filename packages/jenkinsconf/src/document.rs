//! The root-owning, persisting side of a configuration tree.
//!
//! A [`ConfigDocument`] owns the XML of one job or view. It fetches the text on
//! first access, keeps the parsed tree for its lifetime and is the only place
//! that writes the whole document back.
//!
//! # Writes are not batched
//!
//! Every mutating call anywhere in the tree ends in [`ConfigDocument::update`],
//! and every update posts the complete document. Three setters in a row cost
//! three uploads. To change several values with one upload, make the changes
//! on a detached fragment and add it in one call, or edit the elements
//! directly through [`ConfigNode::element`] and call `update` once.
//!
//! # No concurrency control
//!
//! Two documents for the same entity are independent caches. Whichever writes
//! last wins, and nothing detects that the other copy was stale. No version
//! token is sent with the upload.
//!
//! [`ConfigNode::element`]: crate::registry::ConfigNode::element

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::join_url;
use crate::error::{ConfError, Result};
use crate::registry::{ConfigNode, Owner, Plugin, Resolver};
use crate::transport::{Payload, Transport};
use crate::xml::{split_declaration, XmlElement};

struct LoadedConfig {
    root: XmlElement,
    declaration: Option<String>,
    dirty: bool,
}

impl LoadedConfig {
    fn parse(text: &str, context: &str) -> Result<Self> {
        let (declaration, body) = split_declaration(text);
        let root = XmlElement::parse(body).map_err(|e| ConfError::MalformedDocument {
            context: context.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            root,
            declaration: declaration.map(String::from),
            dirty: false,
        })
    }

    fn serialize(&self) -> Result<String> {
        let body = self.root.to_xml_string()?;
        Ok(match &self.declaration {
            Some(declaration) => format!("{declaration}\n{body}"),
            None => body,
        })
    }
}

struct DocumentState {
    transport: Rc<dyn Transport>,
    path: String,
    resolver: Resolver,
    loaded: RefCell<Option<LoadedConfig>>,
}

/// Configuration XML of one remote entity.
///
/// Clones share the same cached tree.
#[derive(Clone)]
pub struct ConfigDocument {
    state: Rc<DocumentState>,
}

/// Non-owning link from a root node to its document.
#[derive(Clone)]
pub struct DocumentLink {
    state: Weak<DocumentState>,
}

impl DocumentLink {
    pub(crate) fn update(&self) -> Result<()> {
        let state = self.state.upgrade().ok_or(ConfError::DocumentClosed)?;
        ConfigDocument { state }.update()
    }
}

impl ConfigDocument {
    /// Create an unloaded document at `path` relative to the transport's URL.
    #[must_use]
    pub fn new(transport: Rc<dyn Transport>, path: impl Into<String>, resolver: Resolver) -> Self {
        Self {
            state: Rc::new(DocumentState {
                transport,
                path: path.into(),
                resolver,
                loaded: RefCell::new(None),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.state.path
    }

    /// Absolute URL of the document.
    #[must_use]
    pub fn url(&self) -> String {
        join_url(self.state.transport.url(), &self.state.path)
    }

    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.state.resolver
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state.loaded.borrow().is_some()
    }

    /// Whether the cached tree has changes that were not written.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state
            .loaded
            .borrow()
            .as_ref()
            .is_some_and(|loaded| loaded.dirty)
    }

    /// Root element, fetching the document on first access.
    ///
    /// # Errors
    /// Returns the transport's error if the fetch fails, or
    /// `MalformedDocument` if the text is not XML. The document stays unloaded
    /// in both cases.
    pub fn root(&self) -> Result<XmlElement> {
        if let Some(loaded) = self.state.loaded.borrow().as_ref() {
            return Ok(loaded.root.clone());
        }
        let loaded = self.fetch()?;
        let root = loaded.root.clone();
        *self.state.loaded.borrow_mut() = Some(loaded);
        Ok(root)
    }

    fn fetch(&self) -> Result<LoadedConfig> {
        let url = self.url();
        tracing::debug!(url = %url, "Fetching configuration");
        let text = self.state.transport.get_text(&self.state.path)?;
        LoadedConfig::parse(&text, &url)
    }

    fn link(&self) -> DocumentLink {
        DocumentLink {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Untyped node for the root element, reporting to this document.
    pub fn root_node(&self) -> Result<ConfigNode> {
        Ok(ConfigNode::with_owner(
            self.root()?,
            self.state.resolver.clone(),
            Owner::Document(self.link()),
        ))
    }

    /// Typed plugin for the root element.
    ///
    /// # Errors
    /// Returns `UnsupportedPlugin` if no handler matches the root.
    pub fn plugin(&self) -> Result<Plugin> {
        let root = self.root()?;
        self.state
            .resolver
            .resolve_strict(root, &Owner::Document(self.link()))
    }

    /// Typed plugin for the root element, resolved under an identifier known
    /// from elsewhere, such as the `_class` of the entity's status.
    pub fn plugin_as(&self, identifier: &str) -> Result<Plugin> {
        let root = self.root()?;
        self.state
            .resolver
            .resolve_as(identifier, root, &Owner::Document(self.link()))
    }

    /// Serialized document, including its XML declaration.
    pub fn xml(&self) -> Result<String> {
        self.root()?;
        match self.state.loaded.borrow().as_ref() {
            Some(loaded) => loaded.serialize(),
            None => Err(ConfError::DocumentClosed),
        }
    }

    /// Replace the whole document and write it.
    ///
    /// Nodes obtained before the call keep pointing at the old tree.
    ///
    /// # Errors
    /// Returns `MalformedDocument` without changing anything if `text` is not
    /// XML.
    pub fn set_xml(&self, text: &str) -> Result<()> {
        let mut loaded = LoadedConfig::parse(text, &self.url())?;
        loaded.dirty = true;
        *self.state.loaded.borrow_mut() = Some(loaded);
        self.save()
    }

    /// Record a mutation of the tree and write the document.
    ///
    /// Called by every node in the tree after it changed. Each call issues one
    /// upload; see the module documentation.
    pub fn update(&self) -> Result<()> {
        match self.state.loaded.borrow_mut().as_mut() {
            Some(loaded) => loaded.dirty = true,
            None => return Ok(()),
        }
        self.save()
    }

    /// Write the document if it has unsaved changes.
    ///
    /// A failed write leaves the document dirty so it can be retried.
    pub fn save(&self) -> Result<()> {
        let xml = match self.state.loaded.borrow().as_ref() {
            Some(loaded) if loaded.dirty => loaded.serialize()?,
            _ => return Ok(()),
        };
        tracing::debug!(url = %self.url(), bytes = xml.len(), "Writing configuration");
        let response = self.state.transport.post(&self.state.path, &Payload::xml(xml))?;
        tracing::trace!(status = response.status, "Configuration written");
        if let Some(loaded) = self.state.loaded.borrow_mut().as_mut() {
            loaded.dirty = false;
        }
        Ok(())
    }

    /// Drop the cached tree and fetch it again.
    ///
    /// Unsaved changes are discarded. On failure the previous tree is kept.
    pub fn reload(&self) -> Result<()> {
        let loaded = self.fetch()?;
        *self.state.loaded.borrow_mut() = Some(loaded);
        Ok(())
    }
}

impl fmt::Debug for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDocument")
            .field("url", &self.url())
            .field("loaded", &self.is_loaded())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

impl fmt::Debug for DocumentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentLink")
            .field("open", &(self.state.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FreestyleJob, SectionedView, ShellBuilder, TextSection};
    use crate::transport::MockTransport;
    use pretty_assertions::assert_eq;

    const JOB: &str = "<?xml version='1.1' encoding='UTF-8'?>\n<project>\n  <description>demo</description>\n  <scm class=\"hudson.scm.NullSCM\"/>\n  <builders>\n    <hudson.tasks.Shell>\n      <command>make</command>\n    </hudson.tasks.Shell>\n  </builders>\n  <publishers/>\n</project>";

    fn document(mock: &MockTransport) -> ConfigDocument {
        ConfigDocument::new(Rc::new(mock.clone()), "config.xml", Resolver::shared())
    }

    fn mock() -> MockTransport {
        MockTransport::new("http://ci/job/demo/").with_document("config.xml", JOB)
    }

    #[test]
    fn test_lazy_single_fetch() {
        let mock = mock();
        let doc = document(&mock);
        assert!(!doc.is_loaded());
        assert_eq!(mock.get_count(), 0);

        doc.root().unwrap();
        doc.plugin().unwrap();
        doc.xml().unwrap();
        assert!(doc.is_loaded());
        assert_eq!(mock.get_count(), 1);
    }

    #[test]
    fn test_unmodified_round_trip() {
        let mock = mock();
        let doc = document(&mock);
        assert_eq!(doc.xml().unwrap(), JOB);
    }

    #[test]
    fn test_nested_setter_writes_once() {
        let mock = mock();
        let doc = document(&mock);
        let job = FreestyleJob::try_from(doc.plugin().unwrap()).unwrap();
        let shell = ShellBuilder::try_from(job.builders().unwrap().remove(0)).unwrap();

        shell.set_script("make all").unwrap();

        assert_eq!(mock.post_count(), 1);
        let posted = &mock.posts()[0];
        assert_eq!(posted.url, "http://ci/job/demo/config.xml");
        assert_eq!(posted.payload.header("Content-Type"), Some("text/xml"));
        assert!(posted.payload.data.starts_with("<?xml version='1.1' encoding='UTF-8'?>\n<project>"));
        assert!(posted.payload.data.contains("<command>make all</command>"));
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_each_setter_writes() {
        let mock = mock();
        let doc = document(&mock);
        let job = FreestyleJob::try_from(doc.plugin().unwrap()).unwrap();

        job.set_description("one").unwrap();
        job.set_description("two").unwrap();
        job.set_disabled(true).unwrap();
        assert_eq!(mock.post_count(), 3);
    }

    #[test]
    fn test_failed_write_keeps_dirty() {
        let mock = mock();
        let doc = document(&mock);
        let job = FreestyleJob::try_from(doc.plugin().unwrap()).unwrap();

        mock.fail_posts(true);
        assert!(job.set_description("new").is_err());
        assert!(doc.is_dirty());

        mock.fail_posts(false);
        doc.save().unwrap();
        assert!(!doc.is_dirty());
        assert!(mock.document("config.xml").unwrap().contains("<description>new</description>"));
    }

    #[test]
    fn test_malformed_document() {
        let mock = MockTransport::new("http://ci/job/x/").with_document("config.xml", "<project><oops></project>");
        let doc = document(&mock);
        let err = doc.root().unwrap_err();
        assert!(matches!(err, ConfError::MalformedDocument { ref context, .. } if context.contains("/job/x/config.xml")));
        assert!(!doc.is_loaded());
    }

    #[test]
    fn test_set_xml_and_reload() {
        let mock = mock();
        let doc = document(&mock);
        assert!(doc.set_xml("<project><broken>").is_err());
        assert_eq!(mock.post_count(), 0);

        doc.set_xml("<project><description>replaced</description></project>").unwrap();
        assert_eq!(mock.post_count(), 1);

        mock.insert("config.xml", "<project><description>remote</description></project>");
        doc.reload().unwrap();
        let job = FreestyleJob::try_from(doc.plugin().unwrap()).unwrap();
        assert_eq!(job.description(), "remote");
    }

    #[test]
    fn test_dropped_document_reports_closed() {
        let mock = MockTransport::new("http://ci/view/v/").with_document(
            "config.xml",
            "<hudson.plugins.sectioned__view.SectionedView><sections/></hudson.plugins.sectioned__view.SectionedView>",
        );
        let doc = document(&mock);
        let view = SectionedView::try_from(doc.plugin().unwrap()).unwrap();
        drop(doc);

        let section = TextSection::create(&Resolver::shared(), "a", "b").unwrap();
        let err = view.add_section(&section).unwrap_err();
        assert!(matches!(err, ConfError::DocumentClosed));
    }
}
