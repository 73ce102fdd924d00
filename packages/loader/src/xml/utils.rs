//! Helpers for reading tags, namespaces, attributes and positions from roxmltree nodes.

use roxmltree::Node;

use crate::config::DEFAULT_NAMESPACE;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use wiring_loader::xml::get_tag_name;
///
/// let xml = r#"<components xmlns:x="urn:x"><x:cache/></components>"#;
/// let doc = Document::parse(xml).unwrap();
/// let cache = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(cache), "cache");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Get the namespace URI of an element, if it has one.
pub fn namespace_of<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.tag_name().namespace()
}

/// Check whether a namespace URI denotes the built-in vocabulary.
///
/// An absent or empty namespace counts as the built-in one.
pub fn is_default_namespace_uri(namespace: Option<&str>) -> bool {
    match namespace {
        None => true,
        Some(uri) => uri.is_empty() || uri == DEFAULT_NAMESPACE,
    }
}

/// Check whether an element belongs to the built-in vocabulary.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use wiring_loader::xml::is_default_namespace;
///
/// let xml = r#"<components><x:cache xmlns:x="urn:x"/></components>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
/// assert!(is_default_namespace(root));
/// assert!(!is_default_namespace(root.first_element_child().unwrap()));
/// ```
pub fn is_default_namespace(node: Node<'_, '_>) -> bool {
    is_default_namespace_uri(namespace_of(node))
}

/// Check if a node is an element with the given local name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Get an un-namespaced attribute value from a node.
///
/// Prefixed attributes such as `p:name` belong to another vocabulary and never match.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use wiring_loader::xml::get_attribute;
///
/// let xml = r#"<component xmlns:p="urn:p" p:id="other" class="a.B"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_attribute(doc.root_element(), "id"), None);
/// assert_eq!(get_attribute(doc.root_element(), "class"), Some("a.B"));
/// ```
pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attr| attr.namespace().is_none() && attr.name() == name)
        .map(|attr| attr.value())
}

/// Get an attribute value only if it contains non-whitespace text.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use wiring_loader::xml::get_text_attribute;
///
/// let doc = Document::parse(r#"<alias name="a" alias="  "/>"#).unwrap();
/// let root = doc.root_element();
/// assert_eq!(get_text_attribute(root, "name"), Some("a"));
/// assert_eq!(get_text_attribute(root, "alias"), None);
/// assert_eq!(get_text_attribute(root, "missing"), None);
/// ```
pub fn get_text_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    get_attribute(node, name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Get the trimmed text content of a node, or an empty string.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Get all element children of a node, in document order.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Find the first child element with the given local name in the default namespace.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    element_children(node).find(|child| get_tag_name(*child) == tag && is_default_namespace(*child))
}

/// Find all child elements with the given local name in the default namespace.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    element_children(node)
        .filter(move |child| get_tag_name(*child) == tag && is_default_namespace(*child))
}

/// One-based line and column of the start of a node.
pub fn node_position(node: Node<'_, '_>) -> (u32, u32) {
    let pos = node.document().text_pos_at(node.range().start);
    (pos.row, pos.col)
}

/// Render a short human-readable description of an element, e.g. `<alias name="a">`.
///
/// Only the identifying attributes `id`, `name` and `resource` are included.
pub fn describe_element(node: Node<'_, '_>) -> String {
    let mut description = format!("<{}", get_tag_name(node));
    for key in ["id", "name", "resource"] {
        if let Some(value) = get_attribute(node, key) {
            description.push_str(&format!(" {key}=\"{value}\""));
        }
    }
    description.push('>');
    description
}
