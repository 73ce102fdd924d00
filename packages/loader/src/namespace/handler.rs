//! Namespace handler trait definition.

use std::sync::Arc;

use roxmltree::{Attribute, Node};

use crate::definition::{ComponentDefinition, DefinitionHolder};
use crate::reader::ParsingContext;

/// Trait for handlers of a third-party element vocabulary.
///
/// A handler is registered for one namespace URI. It parses top-level
/// elements of that namespace and may decorate `<component>` elements that
/// carry its attributes or child elements.
pub trait NamespaceHandler: Send + Sync {
    /// Parse a top-level custom element.
    ///
    /// Handlers register what they produce themselves through
    /// [`ParsingContext::register_holder`]; the returned definition is
    /// informational. Problems are reported through the context and yield `None`.
    fn parse(
        &self,
        node: Node<'_, '_>,
        context: &mut ParsingContext<'_>,
    ) -> Option<Arc<ComponentDefinition>>;

    /// Decorate a component using a nested custom element.
    ///
    /// Default implementation returns the holder unchanged.
    fn decorate(
        &self,
        _node: Node<'_, '_>,
        holder: DefinitionHolder,
        _context: &mut ParsingContext<'_>,
    ) -> DefinitionHolder {
        holder
    }

    /// Decorate a component using a custom attribute on its element.
    ///
    /// Default implementation returns the holder unchanged.
    fn decorate_attribute(
        &self,
        _attribute: Attribute<'_, '_>,
        _owner: Node<'_, '_>,
        holder: DefinitionHolder,
        _context: &mut ParsingContext<'_>,
    ) -> DefinitionHolder {
        holder
    }
}
