//! Walks the top-level nodes of a definition document.

use roxmltree::Node;

use super::context::ParsingContext;
use super::import::resolve_import;
use super::registration::{register_alias, register_component};
use crate::config::{
    tokenize, ALIAS_ELEMENT, COMPONENTS_ELEMENT, COMPONENT_ELEMENT, IMPORT_ELEMENT,
    PROFILE_ATTRIBUTE,
};
use crate::parser::ParserDelegate;
use crate::xml::{element_children, get_tag_name, get_text_attribute, is_default_namespace};

/// Extension points called around the walk of each `<components>` block.
pub trait DocumentHooks: Send + Sync {
    /// Called before the children of `root` are processed.
    fn pre_process(&self, _root: Node<'_, '_>, _context: &mut ParsingContext<'_>) {}

    /// Called after the children of `root` are processed.
    fn post_process(&self, _root: Node<'_, '_>, _context: &mut ParsingContext<'_>) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl DocumentHooks for NoopHooks {}

/// Register every definition found under `root`.
///
/// A default-vocabulary root with a `profile` attribute the environment does
/// not accept is skipped without events or problems. Each problem found on a
/// child is reported and the walk continues with the next sibling.
pub fn register_definitions(
    root: Node<'_, '_>,
    context: &mut ParsingContext<'_>,
    parent: Option<&ParserDelegate>,
) {
    let mut delegate = ParserDelegate::new(root, parent, context);
    let default_root = is_default_namespace(root);

    if default_root {
        if let Some(profile) = get_text_attribute(root, PROFILE_ATTRIBUTE) {
            let profiles = tokenize(profile);
            if !context.environment().accepts_profiles(&profiles) {
                tracing::debug!(
                    profiles = ?profiles,
                    resource = %context.resource().description(),
                    "Skipped definitions: profile not accepted by the environment"
                );
                return;
            }
        }
    }

    let hooks = context.reader().hooks();
    let handlers = context.namespace_handlers();
    hooks.pre_process(root, context);

    if default_root {
        for child in element_children(root) {
            if is_default_namespace(child) {
                process_default_element(child, context, &mut delegate);
            } else {
                handlers.parse_custom_element(child, context);
            }
        }
    } else {
        handlers.parse_custom_element(root, context);
    }

    hooks.post_process(root, context);
}

fn process_default_element(
    node: Node<'_, '_>,
    context: &mut ParsingContext<'_>,
    delegate: &mut ParserDelegate,
) {
    match get_tag_name(node) {
        IMPORT_ELEMENT => resolve_import(node, context),
        ALIAS_ELEMENT => register_alias(node, context),
        COMPONENT_ELEMENT => register_component(node, context, delegate),
        COMPONENTS_ELEMENT => register_definitions(node, context, Some(&*delegate)),
        other => {
            tracing::trace!(tag = %other, "Ignoring unrecognised element");
        }
    }
}
