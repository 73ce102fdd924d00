//! Execution environment: profile matching and placeholder resolution.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::RESERVED_DEFAULT_PROFILE;
use crate::error::{LoaderError, Result};

/// Innermost `${...}` placeholder (no braces inside), so nested keys resolve first.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^{}]*)\}").expect("valid regex"));

/// Separator between a placeholder key and its default value.
const VALUE_SEPARATOR: char = ':';

/// The environment a document is loaded in.
pub trait Environment: Send + Sync {
    /// Check whether any of the given profile tags is accepted.
    ///
    /// A tag prefixed with `!` is accepted when the named profile is not active.
    fn accepts_profiles(&self, profiles: &[String]) -> bool;

    /// Replace `${key}` and `${key:default}` placeholders.
    ///
    /// # Errors
    /// Fails if a placeholder without default cannot be resolved.
    fn resolve_required_placeholders(&self, text: &str) -> Result<String>;
}

/// Environment backed by profile lists and a property map.
#[derive(Debug, Clone)]
pub struct StandardEnvironment {
    active_profiles: Vec<String>,
    default_profiles: Vec<String>,
    properties: HashMap<String, String>,
    include_process_environment: bool,
}

impl Default for StandardEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardEnvironment {
    /// Create an environment with no active profiles, the `default` default
    /// profile, and process environment fallback enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active_profiles: Vec::new(),
            default_profiles: vec![RESERVED_DEFAULT_PROFILE.to_string()],
            properties: HashMap::new(),
            include_process_environment: true,
        }
    }

    /// Add active profiles.
    #[must_use]
    pub fn with_active_profiles(
        mut self,
        profiles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        for profile in profiles {
            self.add_active_profile(profile);
        }
        self
    }

    /// Replace the default profiles.
    #[must_use]
    pub fn with_default_profiles(
        mut self,
        profiles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.default_profiles = profiles.into_iter().map(Into::into).collect();
        self
    }

    /// Set a placeholder property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Enable or disable the process environment fallback for placeholders.
    #[must_use]
    pub fn with_process_environment(mut self, include: bool) -> Self {
        self.include_process_environment = include;
        self
    }

    /// Activate one more profile.
    pub fn add_active_profile(&mut self, profile: impl Into<String>) {
        let profile = profile.into();
        if !self.active_profiles.contains(&profile) {
            self.active_profiles.push(profile);
        }
    }

    /// Set a placeholder property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn active_profiles(&self) -> &[String] {
        &self.active_profiles
    }

    #[must_use]
    pub fn default_profiles(&self) -> &[String] {
        &self.default_profiles
    }

    /// Look up a property, falling back to the process environment.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<String> {
        if let Some(value) = self.properties.get(key) {
            return Some(value.clone());
        }
        if self.include_process_environment {
            return std::env::var(key).ok();
        }
        None
    }

    fn is_profile_active(&self, profile: &str) -> bool {
        if self.active_profiles.is_empty() {
            self.default_profiles.iter().any(|p| p == profile)
        } else {
            self.active_profiles.iter().any(|p| p == profile)
        }
    }

    fn accepts_profile(&self, profile: &str) -> bool {
        let profile = profile.trim();
        let (negated, name) = match profile.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, profile),
        };
        if name.is_empty() {
            tracing::warn!(profile = %profile, "Invalid profile tag, treating as not accepted");
            return false;
        }
        self.is_profile_active(name) != negated
    }

    fn resolve_text(&self, text: &str, visiting: &mut Vec<String>) -> Result<String> {
        let mut result = text.to_string();

        loop {
            let (range, expression) = match PLACEHOLDER_PATTERN.captures(&result) {
                Some(caps) => match (caps.get(0), caps.get(1)) {
                    (Some(whole), Some(inner)) => (whole.range(), inner.as_str().to_string()),
                    _ => break,
                },
                None => break,
            };

            let (key, default) = match expression.split_once(VALUE_SEPARATOR) {
                Some((key, default)) => (key.trim().to_string(), Some(default.to_string())),
                None => (expression.trim().to_string(), None),
            };

            if visiting.contains(&key) {
                return Err(LoaderError::CircularPlaceholder(key));
            }

            let replacement = match (self.property(&key), default) {
                (Some(value), _) => {
                    visiting.push(key);
                    let resolved = self.resolve_text(&value, visiting);
                    visiting.pop();
                    resolved?
                }
                (None, Some(default)) => self.resolve_text(&default, visiting)?,
                (None, None) => {
                    return Err(LoaderError::UnresolvablePlaceholder {
                        placeholder: key,
                        value: text.to_string(),
                    })
                }
            };

            result.replace_range(range, &replacement);
        }

        Ok(result)
    }
}

impl Environment for StandardEnvironment {
    fn accepts_profiles(&self, profiles: &[String]) -> bool {
        if profiles.is_empty() {
            return true;
        }
        profiles.iter().any(|profile| self.accepts_profile(profile))
    }

    fn resolve_required_placeholders(&self, text: &str) -> Result<String> {
        self.resolve_text(text, &mut Vec::new())
    }
}
