//! Component definitions and the registry they are stored in.

mod registry;
mod types;

pub use registry::{register_holder, DefinitionRegistry, SimpleDefinitionRegistry};
pub use types::{
    AutowireMode, ComponentDefinition, ConstructorArg, DefinitionHolder, PropertyValue, Value,
};
