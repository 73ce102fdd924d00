//! Handler registry mapping namespace URIs to handlers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use roxmltree::Node;

use super::handler::NamespaceHandler;
use crate::config::XSI_NAMESPACE;
use crate::definition::{ComponentDefinition, DefinitionHolder};
use crate::error::ProblemKind;
use crate::reader::ParsingContext;
use crate::xml::{element_children, get_tag_name, is_default_namespace_uri, namespace_of};

/// Registry mapping namespace URIs to handlers.
///
/// Routes custom elements to the handler of their namespace and applies
/// decorations to `<component>` elements.
pub struct NamespaceHandlerRegistry {
    handlers: HashMap<String, Box<dyn NamespaceHandler>>,
}

impl NamespaceHandlerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a namespace URI, replacing any previous one.
    pub fn register(
        &mut self,
        namespace_uri: impl Into<String>,
        handler: impl NamespaceHandler + 'static,
    ) {
        let handler: Box<dyn NamespaceHandler> = Box::new(handler);
        self.handlers.insert(namespace_uri.into(), handler);
    }

    /// Check if a handler is registered for a namespace.
    #[must_use]
    pub fn has_handler(&self, namespace_uri: &str) -> bool {
        self.handlers.contains_key(namespace_uri)
    }

    /// Return set of all registered namespace URIs.
    #[must_use]
    pub fn registered_namespaces(&self) -> HashSet<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }

    fn handler_for(
        &self,
        namespace_uri: &str,
        node: Node<'_, '_>,
        context: &mut ParsingContext<'_>,
    ) -> Option<&dyn NamespaceHandler> {
        let handler = self.handlers.get(namespace_uri).map(|h| h.as_ref());
        if handler.is_none() {
            context.error(
                ProblemKind::Vocabulary,
                format!("Unable to locate handler for XML schema namespace [{namespace_uri}]"),
                node,
            );
        }
        handler
    }

    /// Parse a custom element with the handler for its namespace.
    pub fn parse_custom_element(
        &self,
        node: Node<'_, '_>,
        context: &mut ParsingContext<'_>,
    ) -> Option<Arc<ComponentDefinition>> {
        let namespace_uri = namespace_of(node).unwrap_or_default();
        let handler = self.handler_for(namespace_uri, node, context)?;
        tracing::trace!(
            namespace = %namespace_uri,
            tag = %get_tag_name(node),
            "Parsing custom element"
        );
        handler.parse(node, context)
    }

    /// Apply decorations from custom attributes and custom child elements.
    ///
    /// Attributes go first, then child elements, both in document order.
    /// Without a handler the holder is passed on unchanged.
    pub fn decorate_if_required(
        &self,
        node: Node<'_, '_>,
        holder: DefinitionHolder,
        context: &mut ParsingContext<'_>,
    ) -> DefinitionHolder {
        let mut decorated = holder;

        for attribute in node.attributes() {
            let namespace_uri = attribute.namespace();
            if is_default_namespace_uri(namespace_uri) || namespace_uri == Some(XSI_NAMESPACE) {
                continue;
            }
            let namespace_uri = namespace_uri.unwrap_or_default();
            if let Some(handler) = self.handler_for(namespace_uri, node, context) {
                decorated = handler.decorate_attribute(attribute, node, decorated, context);
            }
        }

        for child in element_children(node) {
            let namespace_uri = namespace_of(child);
            if is_default_namespace_uri(namespace_uri) {
                continue;
            }
            let namespace_uri = namespace_uri.unwrap_or_default();
            if let Some(handler) = self.handler_for(namespace_uri, child, context) {
                decorated = handler.decorate(child, decorated, context);
            }
        }

        decorated
    }
}

impl Default for NamespaceHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyHandler;

    impl NamespaceHandler for DummyHandler {
        fn parse(
            &self,
            _node: Node<'_, '_>,
            _context: &mut ParsingContext<'_>,
        ) -> Option<Arc<ComponentDefinition>> {
            None
        }
    }

    #[test]
    fn test_registry_register() {
        let mut registry = NamespaceHandlerRegistry::new();
        registry.register("urn:cache", DummyHandler);

        assert!(registry.has_handler("urn:cache"));
        assert!(!registry.has_handler("urn:other"));
        assert_eq!(
            registry.registered_namespaces(),
            HashSet::from(["urn:cache"])
        );
    }
}
