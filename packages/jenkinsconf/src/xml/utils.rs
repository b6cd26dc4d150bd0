//! Helpers for reading and writing the small value conventions used in
//! Jenkins configuration XML.

use super::tree::XmlElement;

/// Split a leading XML declaration from the document body.
///
/// The declaration is returned verbatim so it can be written back unchanged.
///
/// # Examples
/// ```
/// use jenkinsconf::xml::split_declaration;
///
/// let (decl, body) = split_declaration("<?xml version='1.1' encoding='UTF-8'?>\n<project/>");
/// assert_eq!(decl, Some("<?xml version='1.1' encoding='UTF-8'?>"));
/// assert_eq!(body, "<project/>");
/// ```
pub fn split_declaration(text: &str) -> (Option<&str>, &str) {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            let (decl, rest) = trimmed.split_at(end + 2);
            return (Some(decl), rest.trim_start());
        }
    }
    (None, trimmed)
}

/// Trimmed text content of an element, or an empty string.
pub fn get_text(element: &XmlElement) -> String {
    element
        .text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Read a `true`/`false` child value. Missing children read as `false`.
pub fn get_bool(element: &XmlElement, tag: &str) -> bool {
    element
        .child_text(tag)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Write a `true`/`false` child value.
pub fn set_bool(element: &XmlElement, tag: &str, value: bool) {
    element.set_child_text(tag, if value { "true" } else { "false" });
}

/// Split a comma-separated list of names, dropping empty entries.
///
/// # Examples
/// ```
/// use jenkinsconf::xml::split_names;
///
/// assert_eq!(split_names("a, b,,c"), vec!["a", "b", "c"]);
/// ```
pub fn split_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Join names into the comma-separated form Jenkins stores.
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}
