#![allow(dead_code)]

use wiring_loader::resource::MemoryResourceLoader;
use wiring_loader::{
    CollectingListener, DefinitionRegistry, ProblemKind, SimpleDefinitionRegistry,
    StandardEnvironment, Value, XmlDefinitionReader,
};

/// Wrap component declarations in a default-namespace `<components>` root.
pub fn components(body: &str) -> String {
    format!(
        r#"<components xmlns="urn:wiring:components" xmlns:p="urn:wiring:p">{body}</components>"#
    )
}

/// In-memory loader holding the given documents.
pub fn memory_loader(documents: &[(&str, &str)]) -> MemoryResourceLoader {
    documents
        .iter()
        .fold(MemoryResourceLoader::new(), |loader, (location, content)| {
            loader.with_document(location, *content)
        })
}

/// Environment that ignores process environment variables.
pub fn isolated_environment() -> StandardEnvironment {
    StandardEnvironment::new().with_process_environment(false)
}

/// Reader over in-memory documents with an isolated environment.
pub fn memory_reader(documents: &[(&str, &str)]) -> XmlDefinitionReader {
    memory_reader_with(documents, isolated_environment())
}

pub fn memory_reader_with(
    documents: &[(&str, &str)],
    environment: StandardEnvironment,
) -> XmlDefinitionReader {
    XmlDefinitionReader::new(environment).with_resource_loader(memory_loader(documents))
}

/// Everything a load produced.
pub struct LoadOutcome {
    pub registry: SimpleDefinitionRegistry,
    pub listener: CollectingListener,
    pub count: usize,
}

/// Load a location into a fresh registry.
pub fn load(reader: &XmlDefinitionReader, location: &str) -> LoadOutcome {
    load_into(reader, location, SimpleDefinitionRegistry::new())
}

/// Load a location into the given registry.
pub fn load_into(
    reader: &XmlDefinitionReader,
    location: &str,
    mut registry: SimpleDefinitionRegistry,
) -> LoadOutcome {
    let mut listener = CollectingListener::new();
    let count = reader
        .load_definitions(location, &mut registry, &mut listener)
        .unwrap_or_else(|e| panic!("Failed to load {location}: {e}"));
    LoadOutcome {
        registry,
        listener,
        count,
    }
}

/// Messages of all reported problems.
pub fn messages(listener: &CollectingListener) -> Vec<String> {
    listener
        .problems
        .iter()
        .map(|p| p.message.clone())
        .collect()
}

pub fn literal(value: &str) -> Value {
    Value::Literal(value.to_string())
}

pub fn reference(name: &str) -> Value {
    Value::Reference(name.to_string())
}

/// Number of reported problems of one kind.
pub fn problem_count(listener: &CollectingListener, kind: ProblemKind) -> usize {
    listener.problems_of(kind).count()
}

/// Class name of the definition a name or alias resolves to.
pub fn class_of(registry: &SimpleDefinitionRegistry, name: &str) -> Option<String> {
    registry.get_definition(name)?.class_name.clone()
}
