//! Mutable XML tree used for configuration documents.

mod tree;
mod utils;

pub use tree::{XmlAttribute, XmlChild, XmlElement};
pub use utils::{get_bool, get_text, join_names, set_bool, split_declaration, split_names};
