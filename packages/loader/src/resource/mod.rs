//! Locatable document sources and the loaders that find them.
//!
//! A [`Resource`] is anything the reader can read a definition document from
//! and resolve relative imports against. A [`ResourceLoader`] turns a location
//! expression into zero or more resources.

mod file;
mod http;
mod loader;
mod memory;
mod remote;

use std::fmt;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use regex::Regex;

use crate::error::Result;

pub use self::file::FileResource;
pub use self::http::{create_client, download_text};
pub use self::loader::DefaultResourceLoader;
pub use self::memory::{MemoryResource, MemoryResourceLoader, MEMORY_SCHEME};
pub use self::remote::UrlResource;

/// URI scheme prefix, e.g. `http:` in `http://host/a.xml`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SCHEME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").expect("valid regex"));

/// A source of definition documents.
pub trait Resource: fmt::Debug + Send + Sync {
    /// Check whether the resource physically exists.
    fn exists(&self) -> bool;

    /// Absolute location of this resource, as a URL string.
    ///
    /// # Errors
    /// Fails if the location cannot be determined.
    fn absolute_location(&self) -> Result<String>;

    /// Create a resource relative to this one.
    ///
    /// # Errors
    /// Fails if this backend cannot derive relative resources.
    fn create_relative(&self, relative_path: &str) -> Result<Arc<dyn Resource>>;

    /// Read the whole document as text.
    fn read_to_string(&self) -> Result<String>;

    /// Human-readable description for logs and problem reports.
    fn description(&self) -> String;

    /// Identity used to recognise the same physical resource.
    ///
    /// Defaults to the absolute location, or the description if that fails.
    fn identity(&self) -> String {
        self.absolute_location()
            .unwrap_or_else(|_| self.description())
    }
}

/// Turns location expressions into resources.
pub trait ResourceLoader: Send + Sync {
    /// Check whether the location uses a scheme this loader understands.
    fn is_url(&self, location: &str) -> bool;

    /// Resolve a location to the resources it denotes (a pattern may match several).
    ///
    /// # Errors
    /// Fails for unsupported or malformed locations.
    fn get_resources(&self, location: &str) -> Result<Vec<Arc<dyn Resource>>>;
}

/// Ordered set of resources, deduplicated by [`Resource::identity`].
#[derive(Debug, Clone, Default)]
pub struct ResolvedResources {
    entries: IndexMap<String, Arc<dyn Resource>>,
}

impl ResolvedResources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource; returns `false` if one with the same identity is present.
    pub fn insert(&mut self, resource: Arc<dyn Resource>) -> bool {
        let identity = resource.identity();
        if self.entries.contains_key(&identity) {
            return false;
        }
        self.entries.insert(identity, resource);
        true
    }

    #[must_use]
    pub fn contains(&self, resource: &dyn Resource) -> bool {
        self.entries.contains_key(&resource.identity())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resources in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Resource>> {
        self.entries.values()
    }

    /// Identities in insertion order.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Arc<dyn Resource>> {
        self.entries.into_values().collect()
    }
}

/// Get the URI scheme of a location, if it has one.
///
/// Single-letter schemes are treated as Windows drive letters and ignored.
///
/// # Examples
/// ```
/// use wiring_loader::resource::location_scheme;
///
/// assert_eq!(location_scheme("https://host/a.xml"), Some("https"));
/// assert_eq!(location_scheme("conf/a.xml"), None);
/// assert_eq!(location_scheme("C:/conf/a.xml"), None);
/// ```
pub fn location_scheme(location: &str) -> Option<&str> {
    SCHEME_PATTERN
        .captures(location)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|scheme| scheme.len() > 1)
}

/// Strictly check whether a location is a syntactically absolute URI.
///
/// Anything that does not parse as an absolute URI, including strings with
/// whitespace or backslashes, counts as not absolute.
///
/// # Examples
/// ```
/// use wiring_loader::resource::is_absolute_uri;
///
/// assert!(is_absolute_uri("urn:isbn:0451450523"));
/// assert!(!is_absolute_uri("conf/a.xml"));
/// assert!(!is_absolute_uri("C:\\conf\\a.xml"));
/// ```
pub fn is_absolute_uri(location: &str) -> bool {
    if location.chars().any(|c| c.is_whitespace() || c == '\\') {
        return false;
    }
    location_scheme(location).is_some() && url::Url::parse(location).is_ok()
}

/// Apply a relative path to a base path, replacing the base's last segment.
///
/// # Examples
/// ```
/// use wiring_loader::resource::apply_relative_path;
///
/// assert_eq!(apply_relative_path("file:/app/conf/main.xml", "db.xml"), "file:/app/conf/db.xml");
/// assert_eq!(apply_relative_path("file:/app/conf/main.xml", "/db.xml"), "file:/app/conf/db.xml");
/// assert_eq!(apply_relative_path("main.xml", "db.xml"), "db.xml");
/// ```
pub fn apply_relative_path(path: &str, relative_path: &str) -> String {
    match path.rfind('/') {
        Some(separator) => {
            let mut new_path = path[..separator].to_string();
            if !relative_path.starts_with('/') {
                new_path.push('/');
            }
            new_path.push_str(relative_path);
            new_path
        }
        None => relative_path.to_string(),
    }
}

/// Normalise `.` and `..` segments in a slash-separated path.
///
/// A `scheme:` prefix is kept as-is; `..` at the top is dropped.
///
/// # Examples
/// ```
/// use wiring_loader::resource::clean_path;
///
/// assert_eq!(clean_path("mem:/app/conf/../db.xml"), "mem:/app/db.xml");
/// assert_eq!(clean_path("a/./b//c.xml"), "a/b/c.xml");
/// ```
pub fn clean_path(path: &str) -> String {
    let (prefix, rest) = match location_scheme(path) {
        Some(scheme) => path.split_at(scheme.len() + 1),
        None => ("", path),
    };
    let leading = if rest.starts_with("//") {
        "//"
    } else if rest.starts_with('/') {
        "/"
    } else {
        ""
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut cleaned = format!("{prefix}{leading}");
    cleaned.push_str(&segments.join("/"));
    cleaned
}
