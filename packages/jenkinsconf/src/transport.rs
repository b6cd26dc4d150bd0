//! The request interface configuration documents and entities talk through.
//!
//! A transport is bound to one entity URL; paths passed to it are relative to
//! that URL. [`HttpTransport`](crate::http::HttpTransport) talks to a real
//! server, [`MockTransport`] serves documents from memory and records every
//! request.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::{join_url, XML_CONTENT_TYPE};
use crate::error::{ConfError, Result};

/// Body and headers of a write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub headers: Vec<(String, String)>,
    pub data: String,
}

impl Payload {
    /// Payload carrying a configuration document.
    #[must_use]
    pub fn xml(data: impl Into<String>) -> Self {
        Self {
            headers: vec![("Content-Type".to_string(), XML_CONTENT_TYPE.to_string())],
            data: data.into(),
        }
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Answer to a write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking request interface scoped to one entity URL.
pub trait Transport {
    /// URL of the entity this transport is bound to.
    fn url(&self) -> &str;

    /// Fetch a document as text.
    fn get_text(&self, path: &str) -> Result<String>;

    /// Fetch and decode a JSON document.
    fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let text = self.get_text(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send a write request.
    fn post(&self, path: &str, payload: &Payload) -> Result<TransportResponse>;

    /// The same transport bound to another entity URL.
    fn scoped(&self, url: &str) -> Rc<dyn Transport>;
}

/// A write observed by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPost {
    pub url: String,
    pub payload: Payload,
}

#[derive(Debug, Default)]
struct MockState {
    documents: HashMap<String, String>,
    gets: Vec<String>,
    posts: Vec<RecordedPost>,
    fail_posts: bool,
}

/// In-memory transport keyed by absolute URL.
///
/// Scoped copies share the same documents and request log, so one mock can
/// stand in for a whole server. A successful post replaces the stored
/// document, which makes read-after-write behave like Jenkins.
#[derive(Debug, Clone)]
pub struct MockTransport {
    url: String,
    state: Rc<RefCell<MockState>>,
}

impl MockTransport {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: Rc::new(RefCell::new(MockState::default())),
        }
    }

    /// Serve `text` at `path` relative to this transport's URL.
    #[must_use]
    pub fn with_document(self, path: &str, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&self, path: &str, text: impl Into<String>) {
        let url = join_url(&self.url, path);
        self.state.borrow_mut().documents.insert(url, text.into());
    }

    /// Document currently stored at `path`.
    #[must_use]
    pub fn document(&self, path: &str) -> Option<String> {
        let url = join_url(&self.url, path);
        self.state.borrow().documents.get(&url).cloned()
    }

    /// Make every following post fail with HTTP 500.
    pub fn fail_posts(&self, fail: bool) {
        self.state.borrow_mut().fail_posts = fail;
    }

    #[must_use]
    pub fn get_count(&self) -> usize {
        self.state.borrow().gets.len()
    }

    #[must_use]
    pub fn post_count(&self) -> usize {
        self.state.borrow().posts.len()
    }

    #[must_use]
    pub fn posts(&self) -> Vec<RecordedPost> {
        self.state.borrow().posts.clone()
    }
}

impl Transport for MockTransport {
    fn url(&self) -> &str {
        &self.url
    }

    fn get_text(&self, path: &str) -> Result<String> {
        let url = join_url(&self.url, path);
        let mut state = self.state.borrow_mut();
        state.gets.push(url.clone());
        state
            .documents
            .get(&url)
            .cloned()
            .ok_or(ConfError::HttpStatus { status: 404, url })
    }

    fn post(&self, path: &str, payload: &Payload) -> Result<TransportResponse> {
        let url = join_url(&self.url, path);
        let mut state = self.state.borrow_mut();
        if state.fail_posts {
            return Err(ConfError::HttpStatus { status: 500, url });
        }
        state.posts.push(RecordedPost {
            url: url.clone(),
            payload: payload.clone(),
        });
        state.documents.insert(url, payload.data.clone());
        Ok(TransportResponse {
            status: 200,
            body: String::new(),
        })
    }

    fn scoped(&self, url: &str) -> Rc<dyn Transport> {
        Rc::new(Self {
            url: url.to_string(),
            state: Rc::clone(&self.state),
        })
    }
}
