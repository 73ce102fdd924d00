//! Component definition metadata produced by parsing.
//!
//! The loader only carries these values from document to registry; it never
//! instantiates anything from them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::DEFAULT_SCOPE;

/// How collaborators of a component are to be located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutowireMode {
    /// Explicit wiring only.
    #[default]
    No,
    /// Match properties by component name.
    ByName,
    /// Match properties by type.
    ByType,
    /// Match constructor arguments by type.
    Constructor,
}

impl AutowireMode {
    /// Parse the attribute spelling (`no`, `byName`, `byType`, `constructor`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "no" => Some(Self::No),
            "byName" => Some(Self::ByName),
            "byType" => Some(Self::ByType),
            "constructor" => Some(Self::Constructor),
            _ => None,
        }
    }

    /// Attribute spelling of this mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "no",
            Self::ByName => "byName",
            Self::ByType => "byType",
            Self::Constructor => "constructor",
        }
    }
}

/// A value given to a property or constructor argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Literal text, converted by whoever instantiates the component.
    Literal(String),
    /// Reference to another component by name.
    Reference(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "\"{text}\""),
            Self::Reference(name) => write!(f, "ref({name})"),
        }
    }
}

/// A named property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyValue {
    pub name: String,
    pub value: Value,
}

impl PropertyValue {
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A constructor argument, optionally pinned by index or name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorArg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Value,
}

/// Metadata describing how to build one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    pub scope: String,
    pub is_abstract: bool,
    pub lazy_init: bool,
    pub primary: bool,
    pub autowire: AutowireMode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destroy_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constructor_args: Vec<ConstructorArg>,
    /// Free-form metadata attached by extension vocabularies.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Description of the resource the definition was read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Default for ComponentDefinition {
    fn default() -> Self {
        Self {
            class_name: None,
            parent_name: None,
            scope: DEFAULT_SCOPE.to_string(),
            is_abstract: false,
            lazy_init: false,
            primary: false,
            autowire: AutowireMode::No,
            depends_on: Vec::new(),
            init_method: None,
            destroy_method: None,
            description: None,
            properties: Vec::new(),
            constructor_args: Vec::new(),
            attributes: BTreeMap::new(),
            source: None,
        }
    }
}

impl ComponentDefinition {
    /// Create a definition for the given class.
    #[must_use]
    pub fn for_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Self::default()
        }
    }

    /// Look up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Check whether a property with this name is set.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }
}

/// A definition bundled with its primary name and aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionHolder {
    name: String,
    aliases: Vec<String>,
    definition: Arc<ComponentDefinition>,
}

impl DefinitionHolder {
    /// Create a holder without aliases.
    #[must_use]
    pub fn new(name: impl Into<String>, definition: Arc<ComponentDefinition>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            definition,
        }
    }

    /// Set the aliases.
    #[must_use]
    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Primary name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alias names, in declaration order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The shared definition.
    #[must_use]
    pub fn definition(&self) -> &Arc<ComponentDefinition> {
        &self.definition
    }

    /// Return a holder with the same names around another definition.
    #[must_use]
    pub fn with_definition(&self, definition: ComponentDefinition) -> Self {
        Self {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            definition: Arc::new(definition),
        }
    }

    /// Check whether a name is the primary name or one of the aliases.
    #[must_use]
    pub fn matches_name(&self, candidate: &str) -> bool {
        self.name == candidate || self.aliases.iter().any(|a| a == candidate)
    }
}

impl fmt::Display for DefinitionHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component definition with name '{}'", self.name)?;
        if !self.aliases.is_empty() {
            write!(f, " and aliases [{}]", self.aliases.join(", "))?;
        }
        if let Some(class_name) = &self.definition.class_name {
            write!(f, ": class [{class_name}]")?;
        }
        Ok(())
    }
}
