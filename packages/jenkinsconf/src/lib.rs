//! jenkinsconf - typed, plugin-aware access to Jenkins configuration XML.
//!
//! Jenkins stores every job and view as one XML document in which each
//! plugin's settings are an opaque fragment. This crate identifies the type
//! of each fragment, resolves it against a registry of handlers and exposes
//! the result as a tree of typed plugins. Changes made anywhere in the tree
//! are written back through the document that owns it.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use jenkinsconf::registry::{FreestyleJob, ShellBuilder};
//! use jenkinsconf::{ConfigDocument, MockTransport, Resolver};
//!
//! let mock = MockTransport::new("http://ci/job/demo/").with_document(
//!     "config.xml",
//!     "<project><builders><hudson.tasks.Shell><command>make</command></hudson.tasks.Shell></builders></project>",
//! );
//! let doc = ConfigDocument::new(Rc::new(mock.clone()), "config.xml", Resolver::shared());
//!
//! let job = FreestyleJob::try_from(doc.plugin()?)?;
//! let shell = ShellBuilder::try_from(job.builders()?.remove(0))?;
//! shell.set_script("make test")?;
//!
//! assert_eq!(mock.post_count(), 1);
//! # Ok::<(), jenkinsconf::ConfError>(())
//! ```
//!
//! # Architecture
//!
//! - [`xml`]: Shared, mutable XML element tree
//! - [`registry`]: Type identifiers, plugin registry, resolver and handlers
//! - [`document`]: Configuration documents and write-back
//! - [`transport`]: Request interface and in-memory transport
//! - [`http`]: HTTP transport
//! - [`job`], [`view`], [`server`]: Entities combining status and configuration
//! - [`config`]: Constants and URL helpers
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod http;
pub mod job;
pub mod registry;
pub mod server;
pub mod status;
pub mod transport;
pub mod view;
pub mod xml;

pub use document::ConfigDocument;
pub use error::{ConfError, Result};
pub use http::{Credentials, HttpOptions, HttpTransport};
pub use job::Job;
pub use registry::{Plugin, PluginHandler, PluginKind, PluginRegistry, Resolver};
pub use server::Server;
pub use transport::{MockTransport, Payload, Transport, TransportResponse};
pub use view::View;

#[cfg(test)]
pub(crate) mod test_support;
