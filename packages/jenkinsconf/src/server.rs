//! Entry point for a whole Jenkins instance.

use std::fmt;
use std::rc::Rc;

use crate::config::API_JSON_PATH;
use crate::error::Result;
use crate::http::{HttpOptions, HttpTransport};
use crate::job::Job;
use crate::registry::Resolver;
use crate::status::{entries, supported_entries};
use crate::transport::Transport;
use crate::view::View;

/// A Jenkins server: the root of the job and view hierarchy.
pub struct Server {
    transport: Rc<dyn Transport>,
    resolver: Resolver,
}

impl Server {
    #[must_use]
    pub fn new(transport: Rc<dyn Transport>, resolver: Resolver) -> Self {
        Self {
            transport,
            resolver,
        }
    }

    /// Connect over HTTP using the built-in handlers.
    pub fn connect(url: &str, options: HttpOptions) -> Result<Self> {
        let transport = HttpTransport::new(url, options)?;
        Ok(Self::new(Rc::new(transport), Resolver::shared()))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        self.transport.url()
    }

    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn job(&self, name: &str) -> Result<Job> {
        Job::open(self.transport.as_ref(), name, self.resolver.clone())
    }

    pub fn view(&self, name: &str) -> Result<View> {
        View::open(self.transport.as_ref(), name, self.resolver.clone())
    }

    /// Top-level jobs. Jobs of unsupported types are left out with a warning.
    pub fn jobs(&self) -> Result<Vec<Job>> {
        let status = self.transport.get_json(API_JSON_PATH)?;
        let listed = supported_entries(entries(&status, "jobs")?, &self.resolver, self.url());
        Ok(listed
            .into_iter()
            .map(|entry| Job::new(self.transport.scoped(&entry.url), self.resolver.clone()))
            .collect())
    }

    /// Top-level views. Views of unsupported types are left out with a warning.
    pub fn views(&self) -> Result<Vec<View>> {
        let status = self.transport.get_json(API_JSON_PATH)?;
        let listed = supported_entries(entries(&status, "views")?, &self.resolver, self.url());
        Ok(listed
            .into_iter()
            .map(|entry| View::new(self.transport.scoped(&entry.url), self.resolver.clone()))
            .collect())
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("url", &self.url()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_top_level_listing() {
        let mock = MockTransport::new("http://ci/").with_document(
            "api/json",
            r#"{"jobs": [
                    {"_class": "hudson.model.FreeStyleProject", "name": "a", "url": "http://ci/job/a/"},
                    {"_class": "hudson.maven.MavenModuleSet", "name": "mvn", "url": "http://ci/job/mvn/"}
                ],
                "views": [
                    {"_class": "hudson.model.AllView", "name": "all", "url": "http://ci/"},
                    {"_class": "hudson.plugins.nested_view.NestedView", "name": "n", "url": "http://ci/view/n/"}
                ]}"#,
        );
        let server = Server::new(Rc::new(mock), Resolver::shared());

        let jobs = server.jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].url(), "http://ci/job/a/");
        assert_eq!(server.views().unwrap().len(), 2);
        assert_eq!(server.job("x y").unwrap().url(), "http://ci/job/x%20y/");
        assert!(server.view("").is_err());
    }
}
