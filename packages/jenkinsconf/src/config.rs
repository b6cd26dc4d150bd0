//! Configuration constants and URL helpers for the Jenkins REST API.

use url::Url;

use crate::error::{ConfError, Result};

/// HTTP request timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
pub const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Configuration document of a job or view, relative to its URL.
pub const CONFIG_XML_PATH: &str = "config.xml";

/// Status snapshot of any entity, relative to its URL.
pub const API_JSON_PATH: &str = "api/json";

/// Content type Jenkins expects for configuration uploads.
pub const XML_CONTENT_TYPE: &str = "text/xml";

/// Validate a job or view name.
///
/// Names become a single URL path segment, so they must be non-empty and
/// must not contain `/`.
///
/// # Examples
/// ```
/// use jenkinsconf::config::validate_name;
///
/// assert!(validate_name("nightly build").is_ok());
/// assert!(validate_name("a/b").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains('/') {
        return Err(ConfError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Join a relative path onto an entity URL.
///
/// ```
/// use jenkinsconf::config::join_url;
///
/// assert_eq!(join_url("http://ci/job/a/", "/config.xml"), "http://ci/job/a/config.xml");
/// ```
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// URL of a job below `base` (the server or a folder).
pub fn job_url(base: &str, name: &str) -> Result<String> {
    entity_url(base, "job", name)
}

/// URL of a view below `base` (the server, a folder or a nested view).
pub fn view_url(base: &str, name: &str) -> Result<String> {
    entity_url(base, "view", name)
}

fn entity_url(base: &str, collection: &str, name: &str) -> Result<String> {
    validate_name(name)?;
    let mut url = Url::parse(base).map_err(|e| ConfError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|()| ConfError::InvalidUrl {
            url: base.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .push(collection)
        .push(name)
        .push("");
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("build").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(matches!(
            validate_name("a/b"),
            Err(ConfError::InvalidName(ref n)) if n == "a/b"
        ));
    }

    #[test]
    fn test_job_url() {
        assert_eq!(
            job_url("http://ci.example.com", "build").unwrap(),
            "http://ci.example.com/job/build/"
        );
        assert_eq!(
            job_url("http://ci.example.com/job/folder/", "nightly build").unwrap(),
            "http://ci.example.com/job/folder/job/nightly%20build/"
        );
    }

    #[test]
    fn test_view_url() {
        assert_eq!(
            view_url("http://ci.example.com/jenkins/", "All").unwrap(),
            "http://ci.example.com/jenkins/view/All/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            job_url("not a url", "build"),
            Err(ConfError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://ci/job/a", "config.xml"), "http://ci/job/a/config.xml");
        assert_eq!(join_url("http://ci/job/a/", ""), "http://ci/job/a/");
    }
}
