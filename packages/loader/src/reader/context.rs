//! Per-load state shared by everything that walks a document.

use std::error::Error;
use std::sync::Arc;

use roxmltree::Node;

use super::events::{AliasEvent, ImportEvent, Problem, ProblemLocation, ReaderEventListener};
use super::xml_reader::XmlDefinitionReader;
use crate::definition::{register_holder, DefinitionHolder, DefinitionRegistry};
use crate::environment::Environment;
use crate::error::{LoaderError, ProblemKind, RegistryError, Result};
use crate::namespace::NamespaceHandlerRegistry;
use crate::resource::{ResolvedResources, Resource, ResourceLoader};

/// State for one load call: the resource being read, the reader's
/// collaborators, the target registry, the event sink and the stack of
/// resources currently being loaded.
///
/// Nested imports get a child context from [`ParsingContext::for_resource`]
/// that shares everything except the current resource.
pub struct ParsingContext<'a> {
    reader: &'a XmlDefinitionReader,
    resource: Arc<dyn Resource>,
    registry: &'a mut dyn DefinitionRegistry,
    listener: &'a mut dyn ReaderEventListener,
    /// Identities of resources being loaded, outermost first.
    in_progress: &'a mut Vec<String>,
}

impl<'a> ParsingContext<'a> {
    pub(crate) fn new(
        reader: &'a XmlDefinitionReader,
        resource: Arc<dyn Resource>,
        registry: &'a mut dyn DefinitionRegistry,
        listener: &'a mut dyn ReaderEventListener,
        in_progress: &'a mut Vec<String>,
    ) -> Self {
        Self {
            reader,
            resource,
            registry,
            listener,
            in_progress,
        }
    }

    /// Derive a context for another resource sharing registry, sink and load stack.
    pub fn for_resource(&mut self, resource: Arc<dyn Resource>) -> ParsingContext<'_> {
        ParsingContext {
            reader: self.reader,
            resource,
            registry: &mut *self.registry,
            listener: &mut *self.listener,
            in_progress: &mut *self.in_progress,
        }
    }

    #[must_use]
    pub fn reader(&self) -> &'a XmlDefinitionReader {
        self.reader
    }

    /// The resource currently being read.
    #[must_use]
    pub fn resource(&self) -> &Arc<dyn Resource> {
        &self.resource
    }

    #[must_use]
    pub fn environment(&self) -> &'a dyn Environment {
        self.reader.environment()
    }

    #[must_use]
    pub fn resource_loader(&self) -> &'a dyn ResourceLoader {
        self.reader.resource_loader()
    }

    #[must_use]
    pub fn namespace_handlers(&self) -> &'a NamespaceHandlerRegistry {
        self.reader.namespace_handlers()
    }

    #[must_use]
    pub fn registry(&self) -> &dyn DefinitionRegistry {
        &*self.registry
    }

    pub fn registry_mut(&mut self) -> &mut dyn DefinitionRegistry {
        &mut *self.registry
    }

    /// Register a holder under its name and aliases and announce it.
    ///
    /// The event is only fired when every write succeeded.
    pub fn register_holder(
        &mut self,
        holder: &DefinitionHolder,
    ) -> std::result::Result<(), RegistryError> {
        register_holder(holder, &mut *self.registry)?;
        self.listener.component_registered(holder);
        Ok(())
    }

    /// Report a problem at an element.
    pub fn error(&mut self, kind: ProblemKind, message: impl Into<String>, node: Node<'_, '_>) {
        self.report(kind, message.into(), node, None);
    }

    /// Report a problem at an element, with the error that caused it.
    pub fn error_with_cause(
        &mut self,
        kind: ProblemKind,
        message: impl Into<String>,
        node: Node<'_, '_>,
        cause: &dyn Error,
    ) {
        self.report(kind, message.into(), node, Some(cause.to_string()));
    }

    fn report(
        &mut self,
        kind: ProblemKind,
        message: String,
        node: Node<'_, '_>,
        cause: Option<String>,
    ) {
        let problem = Problem {
            kind,
            message,
            location: ProblemLocation::element(self.resource.as_ref(), node),
            cause,
        };
        tracing::debug!(kind = %problem.kind, message = %problem.message, "Problem reported");
        self.listener.error(problem);
    }

    pub(crate) fn fire_import_resolved(&mut self, location: &str, resolved: &ResolvedResources) {
        let event = ImportEvent {
            location: location.to_string(),
            resources: resolved.iter().cloned().collect(),
            source: self.resource.description(),
        };
        self.listener.import_resolved(&event);
    }

    pub(crate) fn fire_alias_registered(&mut self, name: &str, alias: &str) {
        let event = AliasEvent {
            name: name.to_string(),
            alias: alias.to_string(),
            source: self.resource.description(),
        };
        self.listener.alias_registered(&event);
    }

    /// Identities of the resources currently being loaded, outermost first.
    #[must_use]
    pub fn load_stack(&self) -> &[String] {
        self.in_progress
    }

    /// Push a resource onto the load stack, failing if it is already on it.
    pub(crate) fn enter(&mut self, resource: &dyn Resource) -> Result<()> {
        let identity = resource.identity();
        if self.in_progress.contains(&identity) {
            let mut chain = self.in_progress.clone();
            chain.push(identity);
            return Err(LoaderError::CyclicImport {
                location: resource.description(),
                chain,
            });
        }
        self.in_progress.push(identity);
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.in_progress.pop();
    }
}
