//! Handler for the `p:` property shortcut vocabulary.
//!
//! ```xml
//! <component id="cache" class="com.example.Cache" p:size="10" p:store-ref="store"/>
//! ```
//! is equivalent to two nested `<property>` elements.

use std::sync::Arc;

use roxmltree::{Attribute, Node};

use super::handler::NamespaceHandler;
use crate::definition::{ComponentDefinition, DefinitionHolder, PropertyValue, Value};
use crate::error::ProblemKind;
use crate::reader::ParsingContext;
use crate::xml::get_tag_name;

/// Attribute suffix marking a reference instead of a literal.
const REF_SUFFIX: &str = "-ref";

/// Decorates components with properties given as attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyNamespaceHandler;

impl NamespaceHandler for PropertyNamespaceHandler {
    fn parse(
        &self,
        node: Node<'_, '_>,
        context: &mut ParsingContext<'_>,
    ) -> Option<Arc<ComponentDefinition>> {
        context.error(
            ProblemKind::Vocabulary,
            format!(
                "Element <{}> is not supported; the property namespace only provides attributes",
                get_tag_name(node)
            ),
            node,
        );
        None
    }

    fn decorate_attribute(
        &self,
        attribute: Attribute<'_, '_>,
        owner: Node<'_, '_>,
        holder: DefinitionHolder,
        context: &mut ParsingContext<'_>,
    ) -> DefinitionHolder {
        let local_name = attribute.name();
        let (property_name, value) = match local_name.strip_suffix(REF_SUFFIX) {
            Some(name) => (name, Value::Reference(attribute.value().to_string())),
            None => (local_name, Value::Literal(attribute.value().to_string())),
        };

        if property_name.is_empty() {
            context.error(
                ProblemKind::Validation,
                format!("Attribute 'p:{local_name}' does not name a property"),
                owner,
            );
            return holder;
        }

        if holder.definition().has_property(property_name) {
            context.error(
                ProblemKind::Validation,
                format!(
                    "Property '{property_name}' is already defined using both <property> \
                     and inline syntax. Only one approach may be used per property."
                ),
                owner,
            );
            return holder;
        }

        let mut definition = holder.definition().as_ref().clone();
        definition
            .properties
            .push(PropertyValue::new(property_name, value));
        holder.with_definition(definition)
    }
}
