//! Text fetching for template documents

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use thiserror::Error;

/// Errors raised while fetching a resource
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("resource not found: {location}")]
    NotFound { location: String },

    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },
}

/// Retrieves the text of a location
pub trait Fetcher {
    fn fetch_text<'a>(&'a self, location: &'a str) -> LocalBoxFuture<'a, Result<String, FetchError>>;
}

/// Fetches from the local filesystem, optionally below a root directory
#[derive(Debug, Clone, Default)]
pub struct FsFetcher {
    root: Option<PathBuf>,
}

impl FsFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve locations relative to `root` instead of the working directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn path_for(&self, location: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(location),
            None => PathBuf::from(location),
        }
    }
}

impl Fetcher for FsFetcher {
    fn fetch_text<'a>(&'a self, location: &'a str) -> LocalBoxFuture<'a, Result<String, FetchError>> {
        async move {
            let path = self.path_for(location);
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| match source.kind() {
                    io::ErrorKind::NotFound => FetchError::NotFound {
                        location: location.to_string(),
                    },
                    _ => FetchError::Io {
                        location: location.to_string(),
                        source,
                    },
                })
        }
        .boxed_local()
    }
}

/// Serves resources from memory; clones share the same contents
#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    resources: Rc<RefCell<HashMap<String, String>>>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(self, location: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(location, text);
        self
    }

    pub fn insert(&self, location: impl Into<String>, text: impl Into<String>) {
        self.resources.borrow_mut().insert(location.into(), text.into());
    }
}

impl Fetcher for InMemoryFetcher {
    fn fetch_text<'a>(&'a self, location: &'a str) -> LocalBoxFuture<'a, Result<String, FetchError>> {
        let found = self.resources.borrow().get(location).cloned();
        async move {
            found.ok_or_else(|| FetchError::NotFound {
                location: location.to_string(),
            })
        }
        .boxed_local()
    }
}
