//! Reader events and problem reports.

use std::fmt;
use std::sync::Arc;

use roxmltree::Node;
use serde::Serialize;

use crate::definition::DefinitionHolder;
use crate::error::ProblemKind;
use crate::resource::Resource;
use crate::xml::{describe_element, node_position};

/// Where a problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemLocation {
    /// Description of the resource being read.
    pub resource: String,
    /// Short rendering of the offending element, e.g. `<alias name="a">`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ProblemLocation {
    /// Location of a resource as a whole.
    #[must_use]
    pub fn resource(resource: &dyn Resource) -> Self {
        Self {
            resource: resource.description(),
            element: None,
            line: None,
            column: None,
        }
    }

    /// Location of an element inside a resource.
    #[must_use]
    pub fn element(resource: &dyn Resource, node: Node<'_, '_>) -> Self {
        let (line, column) = node_position(node);
        Self {
            resource: resource.description(),
            element: Some(describe_element(node)),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl fmt::Display for ProblemLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(element) = &self.element {
            write!(f, "{element} in ")?;
        }
        write!(f, "{}", self.resource)?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " at line {line}, column {column}")?;
        }
        Ok(())
    }
}

/// A non-fatal problem found while reading a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    #[serde(serialize_with = "serialize_kind")]
    pub kind: ProblemKind,
    pub message: String,
    pub location: ProblemLocation,
    /// Rendered underlying error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

fn serialize_kind<S: serde::Serializer>(
    kind: &ProblemKind,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(kind)
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        write!(f, "\nOffending resource: {}", self.location)?;
        if let Some(cause) = &self.cause {
            write!(f, "\nCaused by: {cause}")?;
        }
        Ok(())
    }
}

/// An `<import>` directive after resolution.
#[derive(Debug, Clone)]
pub struct ImportEvent {
    /// The location expression as written in the document.
    pub location: String,
    /// Resources the expression resolved to, deduplicated, in load order.
    pub resources: Vec<Arc<dyn Resource>>,
    /// Description of the importing resource.
    pub source: String,
}

impl ImportEvent {
    /// Descriptions of the resolved resources.
    #[must_use]
    pub fn resource_descriptions(&self) -> Vec<String> {
        self.resources.iter().map(|r| r.description()).collect()
    }
}

/// A registered `<alias>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasEvent {
    pub name: String,
    pub alias: String,
    pub source: String,
}

/// Receives what the reader did and what went wrong.
pub trait ReaderEventListener {
    fn import_resolved(&mut self, _event: &ImportEvent) {}

    fn alias_registered(&mut self, _event: &AliasEvent) {}

    fn component_registered(&mut self, _holder: &DefinitionHolder) {}

    /// Called for every problem; reading continues afterwards.
    fn error(&mut self, problem: Problem);
}

/// Forward every event to both listeners.
impl<A: ReaderEventListener, B: ReaderEventListener> ReaderEventListener for (A, B) {
    fn import_resolved(&mut self, event: &ImportEvent) {
        self.0.import_resolved(event);
        self.1.import_resolved(event);
    }

    fn alias_registered(&mut self, event: &AliasEvent) {
        self.0.alias_registered(event);
        self.1.alias_registered(event);
    }

    fn component_registered(&mut self, holder: &DefinitionHolder) {
        self.0.component_registered(holder);
        self.1.component_registered(holder);
    }

    fn error(&mut self, problem: Problem) {
        self.0.error(problem.clone());
        self.1.error(problem);
    }
}

/// Listener that keeps every event for later inspection.
#[derive(Debug, Clone, Default)]
pub struct CollectingListener {
    pub imports: Vec<ImportEvent>,
    pub aliases: Vec<AliasEvent>,
    pub components: Vec<DefinitionHolder>,
    pub problems: Vec<Problem>,
}

impl CollectingListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Problems of one kind, in report order.
    pub fn problems_of(&self, kind: ProblemKind) -> impl Iterator<Item = &Problem> {
        self.problems.iter().filter(move |p| p.kind == kind)
    }
}

impl ReaderEventListener for CollectingListener {
    fn import_resolved(&mut self, event: &ImportEvent) {
        self.imports.push(event.clone());
    }

    fn alias_registered(&mut self, event: &AliasEvent) {
        self.aliases.push(event.clone());
    }

    fn component_registered(&mut self, holder: &DefinitionHolder) {
        self.components.push(holder.clone());
    }

    fn error(&mut self, problem: Problem) {
        self.problems.push(problem);
    }
}

/// Listener that writes events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl ReaderEventListener for LoggingListener {
    fn import_resolved(&mut self, event: &ImportEvent) {
        tracing::debug!(
            location = %event.location,
            resolved = event.resources.len(),
            source = %event.source,
            "Import resolved"
        );
    }

    fn alias_registered(&mut self, event: &AliasEvent) {
        tracing::debug!(name = %event.name, alias = %event.alias, "Alias registered");
    }

    fn component_registered(&mut self, holder: &DefinitionHolder) {
        tracing::debug!(name = %holder.name(), aliases = ?holder.aliases(), "Component registered");
    }

    fn error(&mut self, problem: Problem) {
        tracing::warn!(
            kind = %problem.kind,
            location = %problem.location,
            cause = ?problem.cause,
            "{}",
            problem.message
        );
    }
}
