//! Default resource loader for file system and HTTP(S) locations.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use reqwest::blocking::Client;
use url::Url;

use super::{create_client, location_scheme, FileResource, Resource, ResourceLoader, UrlResource};
use crate::error::{LoaderError, Result};

const FILE_SCHEME: &str = "file";
const HTTP_SCHEMES: &[&str] = &["http", "https"];

/// Resolves `file:` URLs, plain paths and `http(s):` URLs.
///
/// A `*` or `?` in the last path segment of a file location matches every file
/// in that directory whose name fits the pattern; matches are returned sorted.
#[derive(Debug, Default)]
pub struct DefaultResourceLoader {
    client: OnceLock<Client>,
}

impl DefaultResourceLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client: OnceLock::from(client),
        }
    }

    fn client(&self) -> Result<Client> {
        if let Some(client) = self.client.get() {
            return Ok(client.clone());
        }
        let client = create_client()?;
        Ok(self.client.get_or_init(|| client).clone())
    }

    fn file_resources(&self, path: PathBuf) -> Result<Vec<Arc<dyn Resource>>> {
        let pattern = path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| name.contains(['*', '?']))
            .map(String::from);

        let Some(pattern) = pattern else {
            return Ok(vec![Arc::new(FileResource::new(path))]);
        };

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        expand_pattern(&directory, &pattern)
    }
}

impl ResourceLoader for DefaultResourceLoader {
    fn is_url(&self, location: &str) -> bool {
        matches!(
            location_scheme(location),
            Some(scheme) if scheme == FILE_SCHEME || HTTP_SCHEMES.contains(&scheme)
        )
    }

    fn get_resources(&self, location: &str) -> Result<Vec<Arc<dyn Resource>>> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LoaderError::EmptyLocation);
        }

        match location_scheme(location) {
            None => self.file_resources(PathBuf::from(location)),
            Some(FILE_SCHEME) => {
                let url = Url::parse(location)?;
                let path = url
                    .to_file_path()
                    .map_err(|()| LoaderError::UnsupportedLocation(location.to_string()))?;
                self.file_resources(path)
            }
            Some(scheme) if HTTP_SCHEMES.contains(&scheme) => {
                let resource = UrlResource::parse(location, self.client()?)?;
                Ok(vec![Arc::new(resource)])
            }
            Some(_) => Err(LoaderError::UnsupportedLocation(location.to_string())),
        }
    }
}

/// Turn a file name pattern into an anchored regex (`*` any run, `?` one char).
fn pattern_regex(pattern: &str) -> Result<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    Regex::new(&format!("^{escaped}$"))
        .map_err(|e| LoaderError::UnsupportedLocation(format!("{pattern}: {e}")))
}

fn expand_pattern(directory: &Path, pattern: &str) -> Result<Vec<Arc<dyn Resource>>> {
    let regex = pattern_regex(pattern)?;

    if !directory.is_dir() {
        tracing::debug!(
            directory = %directory.display(),
            pattern = %pattern,
            "Pattern directory does not exist, no matches"
        );
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| regex.is_match(name))
        })
        .collect();
    paths.sort();

    tracing::debug!(pattern = %pattern, matches = paths.len(), "Expanded location pattern");
    Ok(paths
        .into_iter()
        .map(|path| Arc::new(FileResource::new(path)) as Arc<dyn Resource>)
        .collect())
}
