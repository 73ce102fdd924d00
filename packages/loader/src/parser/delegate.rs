//! Per-block parser state: inherited defaults and names used in the block.

use std::collections::HashSet;

use roxmltree::Node;
use serde::Serialize;

use crate::config::{
    COMPONENTS_ELEMENT, DEFAULT_AUTOWIRE_ATTRIBUTE, DEFAULT_DESTROY_METHOD_ATTRIBUTE,
    DEFAULT_INIT_METHOD_ATTRIBUTE, DEFAULT_LAZY_INIT_ATTRIBUTE, DEFAULT_VALUE,
};
use crate::definition::AutowireMode;
use crate::error::ProblemKind;
use crate::reader::ParsingContext;
use crate::xml::{get_attribute, has_tag, is_default_namespace};

/// Defaults declared on a `<components>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentDefaults {
    pub lazy_init: bool,
    pub autowire: AutowireMode,
    pub init_method: Option<String>,
    pub destroy_method: Option<String>,
}

/// Parser state for one `<components>` block.
///
/// Created when a block is entered and dropped when it is left, so nested
/// blocks see their parent's defaults and siblings never see each other's.
#[derive(Debug, Clone, Default)]
pub struct ParserDelegate {
    defaults: DocumentDefaults,
    used_names: HashSet<String>,
}

impl ParserDelegate {
    /// Delegate for `root`, inheriting unset or `default` values from `parent`.
    pub fn new(
        root: Node<'_, '_>,
        parent: Option<&ParserDelegate>,
        context: &mut ParsingContext<'_>,
    ) -> Self {
        let inherited = parent.map(|p| p.defaults.clone()).unwrap_or_default();
        let defaults = if is_default_namespace(root) && has_tag(root, COMPONENTS_ELEMENT) {
            populate_defaults(root, inherited, context)
        } else {
            inherited
        };
        Self {
            defaults,
            used_names: HashSet::new(),
        }
    }

    /// Delegate with explicit defaults, for callers parsing outside a document walk.
    #[must_use]
    pub fn with_defaults(defaults: DocumentDefaults) -> Self {
        Self {
            defaults,
            used_names: HashSet::new(),
        }
    }

    #[must_use]
    pub fn defaults(&self) -> &DocumentDefaults {
        &self.defaults
    }

    /// Return the first of `name` and `aliases` already used in this block.
    #[must_use]
    pub fn find_used_name<'n>(&self, name: &'n str, aliases: &'n [String]) -> Option<&'n str> {
        std::iter::once(name)
            .chain(aliases.iter().map(String::as_str))
            .find(|candidate| self.used_names.contains(*candidate))
    }

    /// Record names as used in this block.
    pub fn mark_used(&mut self, name: &str, aliases: &[String]) {
        self.used_names.insert(name.to_string());
        self.used_names.extend(aliases.iter().cloned());
    }
}

/// Attribute value unless absent or `default`.
fn explicit_value<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    get_attribute(node, name)
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != DEFAULT_VALUE)
}

fn populate_defaults(
    root: Node<'_, '_>,
    inherited: DocumentDefaults,
    context: &mut ParsingContext<'_>,
) -> DocumentDefaults {
    let mut defaults = inherited;

    if let Some(value) = explicit_value(root, DEFAULT_LAZY_INIT_ATTRIBUTE) {
        match parse_bool(value) {
            Some(lazy_init) => defaults.lazy_init = lazy_init,
            None => context.error(
                ProblemKind::Validation,
                format!(
                    "Invalid value '{value}' for attribute '{DEFAULT_LAZY_INIT_ATTRIBUTE}': \
                     expected 'true' or 'false'"
                ),
                root,
            ),
        }
    }

    if let Some(value) = explicit_value(root, DEFAULT_AUTOWIRE_ATTRIBUTE) {
        match AutowireMode::parse(value) {
            Some(autowire) => defaults.autowire = autowire,
            None => context.error(
                ProblemKind::Validation,
                format!("Invalid value '{value}' for attribute '{DEFAULT_AUTOWIRE_ATTRIBUTE}'"),
                root,
            ),
        }
    }

    if let Some(value) = explicit_value(root, DEFAULT_INIT_METHOD_ATTRIBUTE) {
        defaults.init_method = Some(value.to_string());
    }
    if let Some(value) = explicit_value(root, DEFAULT_DESTROY_METHOD_ATTRIBUTE) {
        defaults.destroy_method = Some(value.to_string());
    }

    defaults
}

/// Parse `true` or `false`.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
