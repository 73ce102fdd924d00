//! In-memory documents addressed by `mem:` locations.

use std::collections::HashMap;
use std::sync::Arc;

use super::{apply_relative_path, clean_path, Resource, ResourceLoader};
use crate::error::{LoaderError, Result};

/// Scheme of in-memory locations, e.g. `mem:/conf/main.xml`.
pub const MEMORY_SCHEME: &str = "mem";

type Documents = Arc<HashMap<String, String>>;

/// Resource loader serving documents from a map of location to content.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceLoader {
    documents: Documents,
}

impl MemoryResourceLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. The location is normalised.
    #[must_use]
    pub fn with_document(mut self, location: &str, content: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.documents).insert(clean_path(location), content.into());
        self
    }

    /// Get the resource for a location, whether or not a document exists there.
    #[must_use]
    pub fn resource(&self, location: &str) -> Arc<dyn Resource> {
        Arc::new(MemoryResource::new(location, Arc::clone(&self.documents)))
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn is_memory_location(location: &str) -> bool {
    location
        .strip_prefix(MEMORY_SCHEME)
        .is_some_and(|rest| rest.starts_with(':'))
}

impl ResourceLoader for MemoryResourceLoader {
    fn is_url(&self, location: &str) -> bool {
        is_memory_location(location)
    }

    fn get_resources(&self, location: &str) -> Result<Vec<Arc<dyn Resource>>> {
        if location.trim().is_empty() {
            return Err(LoaderError::EmptyLocation);
        }
        if !is_memory_location(location) {
            return Err(LoaderError::UnsupportedLocation(location.to_string()));
        }
        Ok(vec![self.resource(location)])
    }
}

/// A document held by a [`MemoryResourceLoader`].
#[derive(Debug, Clone)]
pub struct MemoryResource {
    location: String,
    documents: Documents,
}

impl MemoryResource {
    fn new(location: &str, documents: Documents) -> Self {
        Self {
            location: clean_path(location),
            documents,
        }
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl Resource for MemoryResource {
    fn exists(&self) -> bool {
        self.documents.contains_key(&self.location)
    }

    fn absolute_location(&self) -> Result<String> {
        Ok(self.location.clone())
    }

    fn create_relative(&self, relative_path: &str) -> Result<Arc<dyn Resource>> {
        let relative = relative_path.strip_prefix('/').unwrap_or(relative_path);
        let location = apply_relative_path(&self.location, relative);
        Ok(Arc::new(Self::new(&location, Arc::clone(&self.documents))))
    }

    fn read_to_string(&self) -> Result<String> {
        self.documents
            .get(&self.location)
            .cloned()
            .ok_or_else(|| LoaderError::ResourceNotFound(self.description()))
    }

    fn description(&self) -> String {
        format!("memory [{}]", self.location)
    }
}
