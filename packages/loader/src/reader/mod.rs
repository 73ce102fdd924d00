//! Document reading: the walk over a definition document, import resolution,
//! alias and component registration, and the load entry points.

mod context;
mod document;
mod events;
mod import;
mod registration;
mod xml_reader;

pub use context::ParsingContext;
pub use document::{register_definitions, DocumentHooks, NoopHooks};
pub use events::{
    AliasEvent, CollectingListener, ImportEvent, LoggingListener, Problem, ProblemLocation,
    ReaderEventListener,
};
pub use import::resolve_import;
pub use registration::{register_alias, register_component};
pub use xml_reader::XmlDefinitionReader;
