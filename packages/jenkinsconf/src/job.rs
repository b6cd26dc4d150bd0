//! Jobs: a status snapshot plus a configuration document.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::config::{job_url, API_JSON_PATH, CONFIG_XML_PATH};
use crate::document::ConfigDocument;
use crate::error::Result;
use crate::registry::{Plugin, Resolver};
use crate::status::{entries, string_field, supported_entries};
use crate::transport::Transport;

/// A job on the server, addressed by URL.
///
/// Both the status snapshot and the configuration are fetched on first use
/// and cached.
pub struct Job {
    transport: Rc<dyn Transport>,
    resolver: Resolver,
    config: ConfigDocument,
    status: RefCell<Option<Value>>,
}

impl Job {
    /// Wrap the job the transport is bound to.
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

    /// Open the job `name` below `parent` (the server or a folder).
    ///
    /// # Errors
    /// Returns `InvalidName` or `InvalidUrl` if no job URL can be built.
    pub fn open(parent: &dyn Transport, name: &str, resolver: Resolver) -> Result<Self> {
        let url = job_url(parent.url(), name)?;
        Ok(Self::new(parent.scoped(&url), resolver))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        self.transport.url()
    }

    /// Status snapshot (`api/json`).
    pub fn status(&self) -> Result<Value> {
        if let Some(status) = self.status.borrow().as_ref() {
            return Ok(status.clone());
        }
        tracing::debug!(url = %self.url(), "Fetching job status");
        let status = self.transport.get_json(API_JSON_PATH)?;
        *self.status.borrow_mut() = Some(status.clone());
        Ok(status)
    }

    /// Forget the cached status snapshot.
    pub fn refresh(&self) {
        self.status.borrow_mut().take();
    }

    pub fn name(&self) -> Result<String> {
        string_field(&self.status()?, "name", self.url())
    }

    /// Jenkins class of the job, from the status `_class`.
    pub fn type_id(&self) -> Result<String> {
        string_field(&self.status()?, "_class", self.url())
    }

    #[must_use]
    pub fn config(&self) -> &ConfigDocument {
        &self.config
    }

    /// Typed handler for the job configuration.
    ///
    /// # Errors
    /// Returns `UnsupportedPlugin` if the job's class has no handler.
    pub fn plugin(&self) -> Result<Plugin> {
        let type_id = self.type_id()?;
        self.config.plugin_as(&type_id)
    }

    /// Direct children of a folder. Jobs of unsupported types are left out
    /// with a warning.
    pub fn jobs(&self) -> Result<Vec<Job>> {
        let listed = entries(&self.status()?, "jobs")?;
        Ok(supported_entries(listed, &self.resolver, self.url())
            .into_iter()
            .map(|entry| Job::new(self.transport.scoped(&entry.url), self.resolver.clone()))
            .collect())
    }

    /// Every job below this folder, depth first.
    pub fn all_jobs(&self) -> Result<Vec<Job>> {
        let mut result = Vec::new();
        let mut pending = self.jobs()?;
        pending.reverse();
        while let Some(job) = pending.pop() {
            let mut children = job.jobs()?;
            children.reverse();
            pending.extend(children);
            result.push(job);
        }
        Ok(result)
    }

    /// A direct child of this folder by name.
    pub fn job(&self, name: &str) -> Result<Job> {
        Job::open(self.transport.as_ref(), name, self.resolver.clone())
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("url", &self.url()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FreestyleJob;
    use crate::transport::MockTransport;

    fn server() -> MockTransport {
        let mock = MockTransport::new("http://ci/");
        mock.insert(
            "job/build/api/json",
            r#"{"_class": "hudson.model.FreeStyleProject", "name": "build"}"#,
        );
        mock.insert(
            "job/build/config.xml",
            "<project><description>compile</description><builders/><publishers/></project>",
        );
        mock
    }

    #[test]
    fn test_open_job() {
        let mock = server();
        let job = Job::open(&mock, "build", Resolver::shared()).unwrap();

        assert_eq!(job.url(), "http://ci/job/build/");
        assert_eq!(job.name().unwrap(), "build");
        assert_eq!(job.type_id().unwrap(), "hudson.model.FreeStyleProject");
        let freestyle = FreestyleJob::try_from(job.plugin().unwrap()).unwrap();
        assert_eq!(freestyle.description(), "compile");

        job.name().unwrap();
        assert_eq!(mock.get_count(), 2);
    }

    #[test]
    fn test_unsupported_job_class() {
        let mock = MockTransport::new("http://ci/");
        mock.insert("job/m/api/json", r#"{"_class": "hudson.matrix.MatrixProject", "name": "m"}"#);
        mock.insert("job/m/config.xml", "<matrix-project/>");
        let job = Job::open(&mock, "m", Resolver::shared()).unwrap();

        let err = job.plugin().unwrap_err();
        assert!(err.is_unsupported_plugin());
        assert!(err.to_string().contains("hudson.matrix.MatrixProject"));
    }

    #[test]
    fn test_folder_children() {
        let mock = MockTransport::new("http://ci/");
        mock.insert(
            "job/team/api/json",
            r#"{"_class": "com.cloudbees.hudson.plugins.folder.Folder", "name": "team", "jobs": [
                {"_class": "com.cloudbees.hudson.plugins.folder.Folder", "name": "sub", "url": "http://ci/job/team/job/sub/"},
                {"_class": "hudson.matrix.MatrixProject", "name": "m", "url": "http://ci/job/team/job/m/"},
                {"_class": "hudson.model.FreeStyleProject", "name": "b", "url": "http://ci/job/team/job/b/"}
            ]}"#,
        );
        mock.insert(
            "job/team/job/sub/api/json",
            r#"{"_class": "com.cloudbees.hudson.plugins.folder.Folder", "name": "sub", "jobs": [
                {"_class": "org.jenkinsci.plugins.workflow.job.WorkflowJob", "name": "p", "url": "http://ci/job/team/job/sub/job/p/"}
            ]}"#,
        );
        mock.insert("job/team/job/b/api/json", r#"{"name": "b"}"#);
        mock.insert("job/team/job/sub/job/p/api/json", r#"{"name": "p"}"#);

        let folder = Job::open(&mock, "team", Resolver::shared()).unwrap();
        assert_eq!(folder.jobs().unwrap().len(), 2);

        let urls: Vec<String> = folder
            .all_jobs()
            .unwrap()
            .iter()
            .map(|j| j.url().to_string())
            .collect();
        assert_eq!(
            urls,
            vec![
                "http://ci/job/team/job/sub/",
                "http://ci/job/team/job/sub/job/p/",
                "http://ci/job/team/job/b/",
            ]
        );
        assert_eq!(folder.job("b").unwrap().url(), "http://ci/job/team/job/b/");
    }
}
