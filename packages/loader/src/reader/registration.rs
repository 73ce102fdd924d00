//! Registration of `<alias>` and `<component>` elements.

use roxmltree::Node;

use super::context::ParsingContext;
use crate::config::{ALIAS_ATTRIBUTE, NAME_ATTRIBUTE};
use crate::definition::DefinitionHolder;
use crate::error::ProblemKind;
use crate::parser::ParserDelegate;
use crate::xml::get_text_attribute;

/// Register the alias declared by an `<alias name="..." alias="..."/>` element.
///
/// Both attributes are validated before anything is written, so a broken
/// element reports every missing attribute and leaves the registry untouched.
pub fn register_alias(node: Node<'_, '_>, context: &mut ParsingContext<'_>) {
    let name = get_text_attribute(node, NAME_ATTRIBUTE);
    let alias = get_text_attribute(node, ALIAS_ATTRIBUTE);

    if name.is_none() {
        context.error(ProblemKind::Validation, "Name must not be empty", node);
    }
    if alias.is_none() {
        context.error(ProblemKind::Validation, "Alias must not be empty", node);
    }
    let (Some(name), Some(alias)) = (name, alias) else {
        return;
    };

    match context.registry_mut().register_alias(name, alias) {
        Ok(()) => context.fire_alias_registered(name, alias),
        Err(e) => context.error_with_cause(
            ProblemKind::Registry,
            format!("Failed to register alias '{alias}' for component with name '{name}'"),
            node,
            &e,
        ),
    }
}

/// Parse, decorate and register one `<component>` element.
pub fn register_component(
    node: Node<'_, '_>,
    context: &mut ParsingContext<'_>,
    delegate: &mut ParserDelegate,
) {
    let parser = context.reader().parser();
    let Some(holder) = parser.parse_component(node, context, delegate) else {
        return;
    };

    let holder = decorate(node, holder, context);

    if let Err(e) = context.register_holder(&holder) {
        let name = holder.name();
        context.error_with_cause(
            ProblemKind::Registry,
            format!("Failed to register component definition with name '{name}'"),
            node,
            &e,
        );
    }
}

/// Apply namespace decorations; a decorator may not rename the component.
fn decorate(
    node: Node<'_, '_>,
    holder: DefinitionHolder,
    context: &mut ParsingContext<'_>,
) -> DefinitionHolder {
    let handlers = context.namespace_handlers();
    let decorated = handlers.decorate_if_required(node, holder.clone(), context);

    if decorated.name() != holder.name() {
        context.error(
            ProblemKind::Vocabulary,
            format!(
                "Decoration renamed component '{}' to '{}'; the decoration is discarded",
                holder.name(),
                decorated.name()
            ),
            node,
        );
        return holder;
    }
    decorated
}
