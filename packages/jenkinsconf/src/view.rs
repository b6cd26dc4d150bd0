//! Views: a status snapshot plus a configuration document.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::config::{view_url, API_JSON_PATH, CONFIG_XML_PATH};
use crate::document::ConfigDocument;
use crate::error::Result;
use crate::registry::{Plugin, Resolver};
use crate::status::{entries, string_field, supported_entries};
use crate::transport::Transport;

/// A view on the server or in a folder.
pub struct View {
    transport: Rc<dyn Transport>,
    resolver: Resolver,
    config: ConfigDocument,
    status: RefCell<Option<Value>>,
}

impl View {
    #[must_use]
    pub fn new(transport: Rc<dyn Transport>, resolver: Resolver) -> Self {
        let config = ConfigDocument::new(Rc::clone(&transport), CONFIG_XML_PATH, resolver.clone());
        Self {
            transport,
            resolver,
            config,
            status: RefCell::new(None),
        }
    }

    /// Open the view `name` below `parent`.
    pub fn open(parent: &dyn Transport, name: &str, resolver: Resolver) -> Result<Self> {
        let url = view_url(parent.url(), name)?;
        Ok(Self::new(parent.scoped(&url), resolver))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        self.transport.url()
    }

    pub fn status(&self) -> Result<Value> {
        if let Some(status) = self.status.borrow().as_ref() {
            return Ok(status.clone());
        }
        tracing::debug!(url = %self.url(), "Fetching view status");
        let status = self.transport.get_json(API_JSON_PATH)?;
        *self.status.borrow_mut() = Some(status.clone());
        Ok(status)
    }

    pub fn refresh(&self) {
        self.status.borrow_mut().take();
    }

    pub fn name(&self) -> Result<String> {
        string_field(&self.status()?, "name", self.url())
    }

    pub fn type_id(&self) -> Result<String> {
        string_field(&self.status()?, "_class", self.url())
    }

    #[must_use]
    pub fn config(&self) -> &ConfigDocument {
        &self.config
    }

    /// Typed handler for the view configuration.
    pub fn plugin(&self) -> Result<Plugin> {
        let type_id = self.type_id()?;
        self.config.plugin_as(&type_id)
    }

    /// Names of the jobs the view currently shows.
    pub fn jobs(&self) -> Result<Vec<String>> {
        Ok(entries(&self.status()?, "jobs")?
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }

    /// Sub-views of a nested view. Views of unsupported types are left out
    /// with a warning.
    pub fn views(&self) -> Result<Vec<View>> {
        let listed = entries(&self.status()?, "views")?;
        Ok(supported_entries(listed, &self.resolver, self.url())
            .into_iter()
            .map(|entry| View::new(self.transport.scoped(&entry.url), self.resolver.clone()))
            .collect())
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View").field("url", &self.url()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SectionedView;
    use crate::transport::MockTransport;

    #[test]
    fn test_view_status_and_config() {
        let mock = MockTransport::new("http://ci/");
        mock.insert(
            "view/Dash/api/json",
            r#"{"_class": "hudson.plugins.sectioned_view.SectionedView", "name": "Dash",
                "jobs": [{"name": "a", "url": "http://ci/job/a/"}, {"name": "b", "url": "http://ci/job/b/"}]}"#,
        );
        mock.insert(
            "view/Dash/config.xml",
            "<hudson.plugins.sectioned__view.SectionedView><name>Dash</name><sections/></hudson.plugins.sectioned__view.SectionedView>",
        );

        let view = View::open(&mock, "Dash", Resolver::shared()).unwrap();
        assert_eq!(view.url(), "http://ci/view/Dash/");
        assert_eq!(view.name().unwrap(), "Dash");
        assert_eq!(view.jobs().unwrap(), vec!["a", "b"]);
        let sectioned = SectionedView::try_from(view.plugin().unwrap()).unwrap();
        assert_eq!(sectioned.name(), "Dash");
        assert!(view.views().unwrap().is_empty());
    }
}
