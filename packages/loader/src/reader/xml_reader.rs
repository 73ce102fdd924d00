//! Loading of definition documents from locations and resources.

use std::sync::Arc;

use roxmltree::Document;

use super::context::ParsingContext;
use super::document::{register_definitions, DocumentHooks, NoopHooks};
use super::events::ReaderEventListener;
use crate::config::PROPERTY_NAMESPACE;
use crate::definition::DefinitionRegistry;
use crate::environment::Environment;
use crate::error::{LoaderError, Result};
use crate::namespace::{NamespaceHandler, NamespaceHandlerRegistry, PropertyNamespaceHandler};
use crate::parser::{DefaultDefinitionParser, DefinitionParser};
use crate::resource::{DefaultResourceLoader, ResolvedResources, Resource, ResourceLoader};

/// Reads XML definition documents into a [`DefinitionRegistry`].
///
/// The reader holds configuration only. Everything that changes during a
/// load lives in the [`ParsingContext`] of that call, so one reader can serve
/// several loads with separate registries.
///
/// # Example
/// ```
/// use wiring_loader::{
///     CollectingListener, DefinitionRegistry, MemoryResourceLoader, SimpleDefinitionRegistry,
///     StandardEnvironment, XmlDefinitionReader,
/// };
///
/// let loader = MemoryResourceLoader::new().with_document(
///     "mem:/app.xml",
///     r#"<components><component id="clock" class="com.example.Clock"/></components>"#,
/// );
/// let reader = XmlDefinitionReader::new(StandardEnvironment::new()).with_resource_loader(loader);
///
/// let mut registry = SimpleDefinitionRegistry::new();
/// let mut listener = CollectingListener::new();
/// let count = reader
///     .load_definitions("mem:/app.xml", &mut registry, &mut listener)
///     .unwrap();
///
/// assert_eq!(count, 1);
/// assert!(registry.contains_definition("clock"));
/// ```
pub struct XmlDefinitionReader {
    environment: Box<dyn Environment>,
    resource_loader: Box<dyn ResourceLoader>,
    namespace_handlers: NamespaceHandlerRegistry,
    parser: Box<dyn DefinitionParser>,
    hooks: Box<dyn DocumentHooks>,
}

impl XmlDefinitionReader {
    /// Create a reader with the default resource loader, parser and the
    /// `p:` property namespace handler.
    #[must_use]
    pub fn new(environment: impl Environment + 'static) -> Self {
        let mut namespace_handlers = NamespaceHandlerRegistry::new();
        namespace_handlers.register(PROPERTY_NAMESPACE, PropertyNamespaceHandler);
        Self {
            environment: Box::new(environment),
            resource_loader: Box::new(DefaultResourceLoader::new()),
            namespace_handlers,
            parser: Box::new(DefaultDefinitionParser),
            hooks: Box::new(NoopHooks),
        }
    }

    #[must_use]
    pub fn with_resource_loader(mut self, resource_loader: impl ResourceLoader + 'static) -> Self {
        self.resource_loader = Box::new(resource_loader);
        self
    }

    /// Register a handler for an extension namespace.
    #[must_use]
    pub fn with_namespace_handler(
        mut self,
        namespace_uri: impl Into<String>,
        handler: impl NamespaceHandler + 'static,
    ) -> Self {
        self.namespace_handlers.register(namespace_uri, handler);
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: impl DefinitionParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: impl DocumentHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    #[must_use]
    pub fn environment(&self) -> &dyn Environment {
        self.environment.as_ref()
    }

    #[must_use]
    pub fn resource_loader(&self) -> &dyn ResourceLoader {
        self.resource_loader.as_ref()
    }

    #[must_use]
    pub fn namespace_handlers(&self) -> &NamespaceHandlerRegistry {
        &self.namespace_handlers
    }

    #[must_use]
    pub fn parser(&self) -> &dyn DefinitionParser {
        self.parser.as_ref()
    }

    #[must_use]
    pub fn hooks(&self) -> &dyn DocumentHooks {
        self.hooks.as_ref()
    }

    /// Load every resource a location denotes.
    ///
    /// Returns the number of definitions added to the registry. Fails only
    /// when the location itself cannot be resolved, read or parsed; problems
    /// inside the documents go to the listener.
    pub fn load_definitions(
        &self,
        location: &str,
        registry: &mut dyn DefinitionRegistry,
        listener: &mut dyn ReaderEventListener,
    ) -> Result<usize> {
        let resources = self.resource_loader.get_resources(location)?;
        if resources.is_empty() {
            tracing::warn!(location = %location, "Location did not match any resource");
        }

        let mut count = 0;
        for resource in resources {
            count += self.load_resource(resource, registry, listener)?;
        }
        Ok(count)
    }

    /// Load one resource and everything it imports.
    pub fn load_resource(
        &self,
        resource: Arc<dyn Resource>,
        registry: &mut dyn DefinitionRegistry,
        listener: &mut dyn ReaderEventListener,
    ) -> Result<usize> {
        let mut in_progress = Vec::new();
        let mut context = ParsingContext::new(
            self,
            Arc::clone(&resource),
            registry,
            listener,
            &mut in_progress,
        );
        self.load_resource_in(resource, &mut context)
    }

    /// Register the definitions of an already parsed document.
    ///
    /// `resource` is the document's origin; relative imports resolve against it.
    pub fn register_document(
        &self,
        document: &Document<'_>,
        resource: Arc<dyn Resource>,
        registry: &mut dyn DefinitionRegistry,
        listener: &mut dyn ReaderEventListener,
    ) -> usize {
        let mut in_progress = vec![resource.identity()];
        let mut context = ParsingContext::new(self, resource, registry, listener, &mut in_progress);
        self.register_in(document, &mut context)
    }

    /// Load a location from within a running load, recording every resource
    /// loaded into `resolved`.
    ///
    /// A resource already in `resolved` is not loaded again.
    pub fn load_location(
        &self,
        location: &str,
        resolved: &mut ResolvedResources,
        context: &mut ParsingContext<'_>,
    ) -> Result<usize> {
        let resources = self.resource_loader.get_resources(location)?;
        let mut count = 0;
        for resource in resources {
            if resolved.contains(resource.as_ref()) {
                tracing::trace!(
                    resource = %resource.description(),
                    "Resource already resolved for this import"
                );
                continue;
            }
            count += self.load_resource_in(Arc::clone(&resource), context)?;
            resolved.insert(resource);
        }
        Ok(count)
    }

    /// Load a resource from within a running load.
    ///
    /// # Errors
    /// `LoaderError::CyclicImport` if the resource is already being loaded
    /// further up, plus any read or XML parse failure.
    pub fn load_resource_in(
        &self,
        resource: Arc<dyn Resource>,
        context: &mut ParsingContext<'_>,
    ) -> Result<usize> {
        context.enter(resource.as_ref())?;
        let result = self.read_and_register(resource, context);
        context.leave();
        result
    }

    fn read_and_register(
        &self,
        resource: Arc<dyn Resource>,
        context: &mut ParsingContext<'_>,
    ) -> Result<usize> {
        tracing::debug!(resource = %resource.description(), "Loading component definitions");
        let text = resource.read_to_string()?;
        let document = Document::parse(&text).map_err(|source| LoaderError::XmlParse {
            resource: resource.description(),
            source,
        })?;
        let mut context = context.for_resource(resource);
        Ok(self.register_in(&document, &mut context))
    }

    fn register_in(&self, document: &Document<'_>, context: &mut ParsingContext<'_>) -> usize {
        let before = context.registry().definition_count();
        register_definitions(document.root_element(), context, None);
        let count = context.registry().definition_count().saturating_sub(before);
        tracing::debug!(
            count,
            resource = %context.resource().description(),
            "Loaded component definitions"
        );
        count
    }
}
