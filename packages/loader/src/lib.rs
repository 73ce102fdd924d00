//! Wiring Loader - Read XML component definitions into a registry.
//!
//! This crate reads documents describing named components (construction
//! metadata, a primary name and aliases), follows `<import>` directives across
//! documents, skips blocks whose profile the environment does not accept, and
//! registers the resulting definitions. Elements in other XML namespaces are
//! handed to pluggable namespace handlers.
//!
//! # Example
//!
//! ```
//! use wiring_loader::{
//!     CollectingListener, DefinitionRegistry, MemoryResourceLoader, SimpleDefinitionRegistry,
//!     StandardEnvironment, XmlDefinitionReader,
//! };
//!
//! let loader = MemoryResourceLoader::new()
//!     .with_document(
//!         "mem:/conf/app.xml",
//!         r#"<components>
//!              <import resource="db.xml"/>
//!              <component id="service" class="com.example.Service">
//!                <property name="store" ref="store"/>
//!              </component>
//!            </components>"#,
//!     )
//!     .with_document(
//!         "mem:/conf/db.xml",
//!         r#"<components><component id="store" class="com.example.Store"/></components>"#,
//!     );
//!
//! let reader = XmlDefinitionReader::new(StandardEnvironment::new()).with_resource_loader(loader);
//! let mut registry = SimpleDefinitionRegistry::new();
//! let mut listener = CollectingListener::new();
//!
//! let count = reader
//!     .load_definitions("mem:/conf/app.xml", &mut registry, &mut listener)
//!     .unwrap();
//! assert_eq!(count, 2);
//! assert!(registry.contains_definition("store"));
//! assert!(!listener.has_problems());
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Vocabulary constants and runtime configuration
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML utilities
//! - [`resource`]: Document sources (files, URLs, memory) and loaders
//! - [`environment`]: Profile matching and `${...}` placeholders
//! - [`definition`]: Component definitions and the registry
//! - [`parser`]: Parsing of `<component>` elements
//! - [`namespace`]: Extension vocabularies keyed by namespace
//! - [`reader`]: Document walk, imports, aliases and load entry points
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod definition;
pub mod environment;
pub mod error;
pub mod namespace;
pub mod parser;
pub mod reader;
pub mod resource;
pub mod xml;

// Re-export commonly used items
pub use config::LoaderConfig;
pub use definition::{
    ComponentDefinition, DefinitionHolder, DefinitionRegistry, SimpleDefinitionRegistry, Value,
};
pub use environment::{Environment, StandardEnvironment};
pub use error::{LoaderError, ProblemKind, RegistryError, Result};
pub use namespace::{NamespaceHandler, NamespaceHandlerRegistry};
pub use reader::{
    CollectingListener, LoggingListener, ParsingContext, Problem, ReaderEventListener,
    XmlDefinitionReader,
};
pub use resource::{
    DefaultResourceLoader, FileResource, MemoryResourceLoader, Resource, ResourceLoader,
    UrlResource,
};
