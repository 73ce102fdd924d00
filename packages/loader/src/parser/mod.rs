//! Parsing of the built-in component vocabulary.

mod component;
mod delegate;

pub use component::{DefaultDefinitionParser, DefinitionParser};
pub use delegate::{DocumentDefaults, ParserDelegate};
