//! Extension vocabularies keyed by XML namespace.
//!
//! Elements and attributes outside the built-in component vocabulary are
//! routed to the [`NamespaceHandler`] registered for their namespace URI.

mod core;
mod handler;
mod property;

pub use core::NamespaceHandlerRegistry;
pub use handler::NamespaceHandler;
pub use property::PropertyNamespaceHandler;
