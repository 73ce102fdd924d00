//! Registry mapping component names to definitions, plus aliases.

use std::sync::Arc;

use indexmap::IndexMap;

use super::types::{ComponentDefinition, DefinitionHolder};
use crate::error::RegistryError;

/// Storage contract the reader writes definitions and aliases into.
///
/// Collision handling (reject vs. override) is decided by the implementation.
pub trait DefinitionRegistry {
    /// Register a definition under a name.
    fn register_definition(
        &mut self,
        name: &str,
        definition: Arc<ComponentDefinition>,
    ) -> Result<(), RegistryError>;

    /// Register an alias for a name.
    fn register_alias(&mut self, name: &str, alias: &str) -> Result<(), RegistryError>;

    /// Check for a definition registered under exactly this name.
    fn contains_definition(&self, name: &str) -> bool;

    /// Check whether a name is registered as an alias.
    fn is_alias(&self, name: &str) -> bool;

    /// Look up a definition by name or alias.
    fn get_definition(&self, name: &str) -> Option<Arc<ComponentDefinition>>;

    /// Number of registered definitions.
    fn definition_count(&self) -> usize;

    /// Check whether a name is taken by a definition or an alias.
    fn is_name_in_use(&self, name: &str) -> bool {
        self.contains_definition(name) || self.is_alias(name)
    }
}

/// Register a holder's definition under its primary name and all aliases.
///
/// Stops at the first failure; the definition stays registered if only an
/// alias fails.
pub fn register_holder(
    holder: &DefinitionHolder,
    registry: &mut dyn DefinitionRegistry,
) -> Result<(), RegistryError> {
    registry.register_definition(holder.name(), Arc::clone(holder.definition()))?;
    for alias in holder.aliases() {
        registry.register_alias(holder.name(), alias)?;
    }
    Ok(())
}

/// In-memory registry preserving registration order.
#[derive(Debug, Clone)]
pub struct SimpleDefinitionRegistry {
    definitions: IndexMap<String, Arc<ComponentDefinition>>,
    /// alias -> name it points to (which may itself be an alias)
    aliases: IndexMap<String, String>,
    allow_definition_overriding: bool,
    allow_alias_overriding: bool,
}

impl Default for SimpleDefinitionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleDefinitionRegistry {
    /// Create an empty registry that allows overriding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: IndexMap::new(),
            aliases: IndexMap::new(),
            allow_definition_overriding: true,
            allow_alias_overriding: true,
        }
    }

    /// Set whether definitions may be replaced.
    #[must_use]
    pub fn with_definition_overriding(mut self, allow: bool) -> Self {
        self.allow_definition_overriding = allow;
        self
    }

    /// Set whether aliases may be re-pointed.
    #[must_use]
    pub fn with_alias_overriding(mut self, allow: bool) -> Self {
        self.allow_alias_overriding = allow;
        self
    }

    #[must_use]
    pub fn allows_definition_overriding(&self) -> bool {
        self.allow_definition_overriding
    }

    /// Follow the alias chain to the name a definition is registered under.
    #[must_use]
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        let mut current = name;
        // Bounded walk; register_alias keeps the chain acyclic.
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(next) => current = next.as_str(),
                None => break,
            }
        }
        current
    }

    /// All aliases that resolve to the given name, directly or transitively.
    #[must_use]
    pub fn aliases_of(&self, name: &str) -> Vec<String> {
        self.aliases
            .keys()
            .filter(|alias| alias.as_str() != name && self.canonical_name(alias) == name)
            .cloned()
            .collect()
    }

    /// Registered definition names, in registration order.
    pub fn definition_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Registered definitions, in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &Arc<ComponentDefinition>)> {
        self.definitions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of registered aliases.
    #[must_use]
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Check whether `name` already leads to `target` through aliases.
    fn resolves_through_aliases(&self, name: &str, target: &str) -> bool {
        let mut current = name;
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(next) if next == target => return true,
                Some(next) => current = next.as_str(),
                None => return false,
            }
        }
        false
    }
}

impl DefinitionRegistry for SimpleDefinitionRegistry {
    fn register_definition(
        &mut self,
        name: &str,
        definition: Arc<ComponentDefinition>,
    ) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }

        if let Some(existing) = self.definitions.get(name) {
            if !self.allow_definition_overriding {
                return Err(RegistryError::DefinitionOverride(name.to_string()));
            }
            if existing.as_ref() == definition.as_ref() {
                tracing::trace!(
                    name = %name,
                    "Overriding component definition with an equivalent one"
                );
            } else {
                tracing::debug!(
                    name = %name,
                    previous = ?existing.source,
                    replacement = ?definition.source,
                    "Overriding component definition"
                );
            }
        } else if self.aliases.contains_key(name) {
            if !self.allow_definition_overriding {
                return Err(RegistryError::DefinitionOverride(name.to_string()));
            }
            tracing::debug!(name = %name, "Removing alias replaced by component definition");
            self.aliases.shift_remove(name);
        }

        self.definitions.insert(name.to_string(), definition);
        tracing::debug!(
            name = %name,
            total = self.definitions.len(),
            "Component definition registered"
        );
        Ok(())
    }

    fn register_alias(&mut self, name: &str, alias: &str) -> Result<(), RegistryError> {
        if name.trim().is_empty() || alias.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }

        if alias == name {
            if self.aliases.shift_remove(alias).is_some() {
                tracing::debug!(alias = %alias, "Alias equals name, removed");
            }
            return Ok(());
        }

        if let Some(existing) = self.aliases.get(alias) {
            if existing == name {
                return Ok(());
            }
            if !self.allow_alias_overriding {
                return Err(RegistryError::AliasOverride {
                    alias: alias.to_string(),
                    name: name.to_string(),
                    existing: existing.clone(),
                });
            }
            tracing::debug!(alias = %alias, previous = %existing, name = %name, "Overriding alias");
        }

        if self.definitions.contains_key(alias) {
            return Err(RegistryError::AliasShadowsDefinition(alias.to_string()));
        }

        if self.resolves_through_aliases(name, alias) {
            return Err(RegistryError::CircularAlias {
                alias: alias.to_string(),
                name: name.to_string(),
            });
        }

        self.aliases.insert(alias.to_string(), name.to_string());
        tracing::debug!(alias = %alias, name = %name, "Alias registered");
        Ok(())
    }

    fn contains_definition(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    fn get_definition(&self, name: &str) -> Option<Arc<ComponentDefinition>> {
        self.definitions.get(self.canonical_name(name)).cloned()
    }

    fn definition_count(&self) -> usize {
        self.definitions.len()
    }
}
