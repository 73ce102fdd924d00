//! Configuration constants and runtime configuration for the loader.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::definition::SimpleDefinitionRegistry;
use crate::environment::StandardEnvironment;
use crate::error::{LoaderError, Result};

/// Namespace URI of the built-in component vocabulary.
///
/// Elements without a namespace are treated as belonging to it as well.
pub const DEFAULT_NAMESPACE: &str = "urn:wiring:components";

/// Namespace URI of the property shortcut vocabulary (`p:name="value"`).
pub const PROPERTY_NAMESPACE: &str = "urn:wiring:p";

/// XML Schema instance namespace; its attributes are never decorations.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub const COMPONENTS_ELEMENT: &str = "components";
pub const COMPONENT_ELEMENT: &str = "component";
pub const IMPORT_ELEMENT: &str = "import";
pub const ALIAS_ELEMENT: &str = "alias";
pub const PROPERTY_ELEMENT: &str = "property";
pub const CONSTRUCTOR_ARG_ELEMENT: &str = "constructor-arg";
pub const DESCRIPTION_ELEMENT: &str = "description";
pub const VALUE_ELEMENT: &str = "value";
pub const REF_ELEMENT: &str = "ref";

pub const PROFILE_ATTRIBUTE: &str = "profile";
pub const RESOURCE_ATTRIBUTE: &str = "resource";
pub const NAME_ATTRIBUTE: &str = "name";
pub const ALIAS_ATTRIBUTE: &str = "alias";
pub const ID_ATTRIBUTE: &str = "id";
pub const CLASS_ATTRIBUTE: &str = "class";
pub const PARENT_ATTRIBUTE: &str = "parent";
pub const SCOPE_ATTRIBUTE: &str = "scope";
pub const ABSTRACT_ATTRIBUTE: &str = "abstract";
pub const LAZY_INIT_ATTRIBUTE: &str = "lazy-init";
pub const PRIMARY_ATTRIBUTE: &str = "primary";
pub const AUTOWIRE_ATTRIBUTE: &str = "autowire";
pub const DEPENDS_ON_ATTRIBUTE: &str = "depends-on";
pub const INIT_METHOD_ATTRIBUTE: &str = "init-method";
pub const DESTROY_METHOD_ATTRIBUTE: &str = "destroy-method";
pub const VALUE_ATTRIBUTE: &str = "value";
pub const REF_ATTRIBUTE: &str = "ref";
pub const INDEX_ATTRIBUTE: &str = "index";
pub const COMPONENT_REF_ATTRIBUTE: &str = "component";

pub const DEFAULT_LAZY_INIT_ATTRIBUTE: &str = "default-lazy-init";
pub const DEFAULT_AUTOWIRE_ATTRIBUTE: &str = "default-autowire";
pub const DEFAULT_INIT_METHOD_ATTRIBUTE: &str = "default-init-method";
pub const DEFAULT_DESTROY_METHOD_ATTRIBUTE: &str = "default-destroy-method";

/// Attribute value meaning "inherit from the enclosing block".
pub const DEFAULT_VALUE: &str = "default";

/// Scope assigned when a component declares none.
pub const DEFAULT_SCOPE: &str = "singleton";

/// Profile that is active when no other profile is.
pub const RESERVED_DEFAULT_PROFILE: &str = "default";

/// Separators for multi-value attributes such as `profile` or `name`.
pub const MULTI_VALUE_DELIMITERS: &[char] = &[',', ';', ' ', '\t', '\n', '\r'];

/// Separator between a generated name and its counter (`com.example.Foo#0`).
pub const GENERATED_NAME_SEPARATOR: char = '#';

/// HTTP timeout in seconds for remote resources.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the active profiles (comma-separated).
pub const PROFILES_ENV_VAR: &str = "WIRING_PROFILES";

/// Split a multi-value attribute into trimmed, non-empty tokens.
///
/// # Examples
/// ```
/// use wiring_loader::config::tokenize;
///
/// assert_eq!(tokenize("dev, test;prod"), vec!["dev", "test", "prod"]);
/// assert!(tokenize("  ").is_empty());
/// ```
pub fn tokenize(value: &str) -> Vec<String> {
    value
        .split(MULTI_VALUE_DELIMITERS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

/// Runtime configuration, usually read from a YAML file.
///
/// ```yaml
/// active_profiles: [dev]
/// properties:
///   config.dir: conf
/// allow_definition_overriding: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Profiles that are active for this load.
    pub active_profiles: Vec<String>,
    /// Profiles that count as active when none are.
    pub default_profiles: Vec<String>,
    /// Values for `${...}` placeholders.
    pub properties: BTreeMap<String, String>,
    /// Whether a later definition may replace an earlier one with the same name.
    pub allow_definition_overriding: bool,
    /// Whether an alias may be re-pointed to another name.
    pub allow_alias_overriding: bool,
    /// Whether placeholders fall back to process environment variables.
    pub include_process_environment: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            active_profiles: Vec::new(),
            default_profiles: vec![RESERVED_DEFAULT_PROFILE.to_string()],
            properties: BTreeMap::new(),
            allow_definition_overriding: true,
            allow_alias_overriding: true,
            include_process_environment: true,
        }
    }
}

impl LoaderConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply the `WIRING_PROFILES` environment variable, if set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(profiles) = std::env::var(PROFILES_ENV_VAR) {
            self.active_profiles = tokenize(&profiles);
        }
        self
    }

    /// Add active profiles.
    #[must_use]
    pub fn with_active_profiles(
        mut self,
        profiles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.active_profiles
            .extend(profiles.into_iter().map(Into::into));
        self
    }

    /// Set a placeholder property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Check that profile names are usable.
    pub fn validate(&self) -> Result<()> {
        for profile in self.active_profiles.iter().chain(&self.default_profiles) {
            validate_profile_name(profile)?;
        }
        Ok(())
    }

    /// Build the environment described by this configuration.
    #[must_use]
    pub fn environment(&self) -> StandardEnvironment {
        let mut environment = StandardEnvironment::new()
            .with_default_profiles(self.default_profiles.iter().cloned())
            .with_active_profiles(self.active_profiles.iter().cloned())
            .with_process_environment(self.include_process_environment);
        for (key, value) in &self.properties {
            environment.set_property(key, value);
        }
        environment
    }

    /// Build an empty registry using this configuration's override policy.
    #[must_use]
    pub fn registry(&self) -> SimpleDefinitionRegistry {
        SimpleDefinitionRegistry::new()
            .with_definition_overriding(self.allow_definition_overriding)
            .with_alias_overriding(self.allow_alias_overriding)
    }
}

/// Validate a profile name used in configuration.
///
/// Profile names must be non-empty and must not start with `!`, which is
/// reserved for negation inside documents.
///
/// # Examples
/// ```
/// use wiring_loader::config::validate_profile_name;
///
/// assert!(validate_profile_name("dev").is_ok());
/// assert!(validate_profile_name("!dev").is_err());
/// assert!(validate_profile_name(" ").is_err());
/// ```
pub fn validate_profile_name(profile: &str) -> Result<()> {
    let trimmed = profile.trim();
    if trimmed.is_empty() {
        return Err(LoaderError::InvalidProfile(
            "profile name must contain text".to_string(),
        ));
    }
    if trimmed.starts_with('!') {
        return Err(LoaderError::InvalidProfile(format!(
            "profile name '{trimmed}' must not begin with the '!' operator"
        )));
    }
    Ok(())
}
