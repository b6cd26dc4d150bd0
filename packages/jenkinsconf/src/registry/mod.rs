//! Plugin resolution and the typed configuration tree.
//!
//! Jenkins stores each plugin's settings as an XML fragment inside the job or
//! view configuration. This module identifies a fragment's type, looks the
//! type up in a [`PluginRegistry`] and wraps the fragment in a typed handler
//! that can hold further, independently typed fragments.

mod config;
pub mod container;
mod core;
mod handler;
pub mod handlers;
mod identifier;
mod node;
mod plugin;
mod resolver;
pub mod transcode;

pub use config::create_builtin_registry;
pub use core::{PluginConstructor, PluginDescriptor, PluginKind, PluginRegistry};
pub use handler::PluginHandler;
pub use handlers::*;
pub use identifier::{
    escape_identifier, extract_identifier, normalize_identifier, plugin_provenance, unescape_tag,
    PluginProvenance, CLASS_ATTRIBUTE, PLUGIN_ATTRIBUTE,
};
pub use node::{ConfigNode, Owner};
pub use plugin::{Plugin, UnrecognizedPlugin};
pub use resolver::Resolver;
