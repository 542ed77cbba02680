//! The import pipeline: fetch, parse, register, include resources

use futures::future::join_all;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SnippetsConfig;
use crate::document::TemplateDocument;
use crate::error::ParseError;
use crate::output::Element;
use crate::template::{Owner, SnippetRegistry};

use super::environment::Environment;
use super::fetch::{FetchError, Fetcher};
use super::path::resolve_path;

/// Errors that abort an import; nothing is registered when one occurs
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Importing snippets from \"{location}\" failed: {source}")]
    Load {
        location: String,
        #[source]
        source: FetchError,
    },

    #[error("Template \"{location}\" is not well-formed: {source}")]
    Parse {
        location: String,
        #[source]
        source: ParseError,
    },
}

impl ImportError {
    pub fn location(&self) -> &str {
        match self {
            ImportError::Load { location, .. } | ImportError::Parse { location, .. } => location,
        }
    }
}

/// What one import did, with resource paths already resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Snippet names registered, in document order
    pub snippets: Vec<String>,
    pub stylesheets_inserted: Vec<String>,
    /// Stylesheets that were already linked
    pub stylesheets_skipped: Vec<String>,
    pub scripts_loaded: Vec<String>,
    /// Scripts that were already present and were not reloaded
    pub scripts_skipped: Vec<String>,
    pub scripts_failed: Vec<String>,
}

impl ImportReport {
    /// Whether every newly inserted script loaded
    pub fn scripts_ok(&self) -> bool {
        self.scripts_failed.is_empty()
    }
}

/// Imports template documents into a [`SnippetRegistry`]
///
/// Generic over the collaborators that fetch text and receive resources,
/// so the same pipeline runs against the filesystem or in-memory doubles.
#[derive(Debug)]
pub struct Importer<F, E> {
    fetcher: F,
    environment: E,
    config: SnippetsConfig,
}

impl<F: Fetcher, E: Environment> Importer<F, E> {
    pub fn new(fetcher: F, environment: E) -> Self {
        Self {
            fetcher,
            environment,
            config: SnippetsConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SnippetsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SnippetsConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Import the template at `location`
    ///
    /// Completes once every newly inserted script has loaded or failed.
    /// Script failures are logged and reported, never returned as errors.
    pub async fn import_template(
        &self,
        registry: &mut SnippetRegistry,
        location: &str,
    ) -> Result<ImportReport, ImportError> {
        self.import(registry, location, None).await
    }

    /// Like [`Importer::import_template`], also running the `onloadend`
    /// function of each script once it has loaded
    pub async fn import_template_with_owner(
        &self,
        registry: &mut SnippetRegistry,
        location: &str,
        owner: &Owner,
    ) -> Result<ImportReport, ImportError> {
        self.import(registry, location, Some(owner)).await
    }

    async fn import(
        &self,
        registry: &mut SnippetRegistry,
        location: &str,
        owner: Option<&Owner>,
    ) -> Result<ImportReport, ImportError> {
        debug!(location, "fetching template");
        let text = self
            .fetcher
            .fetch_text(location)
            .await
            .map_err(|source| ImportError::Load {
                location: location.to_string(),
                source,
            })?;

        let document = TemplateDocument::parse(&text, &self.config.vocabulary()).map_err(
            |source| ImportError::Parse {
                location: location.to_string(),
                source,
            },
        )?;

        let mut report = ImportReport {
            snippets: registry.collect_from_document(&document, location),
            ..ImportReport::default()
        };
        self.include_stylesheets(&document, location, &mut report);
        self.include_scripts(&document, location, owner, &mut report)
            .await;

        info!(
            location,
            snippets = report.snippets.len(),
            scripts = report.scripts_loaded.len(),
            "imported template"
        );
        Ok(report)
    }

    fn include_stylesheets(
        &self,
        document: &TemplateDocument,
        location: &str,
        report: &mut ImportReport,
    ) {
        for stylesheet in &document.stylesheets {
            let href = resolve_path(location, &stylesheet.src);
            if self.environment.has_stylesheet(&href) {
                debug!(stylesheet = %href, "stylesheet already linked");
                report.stylesheets_skipped.push(href);
            } else {
                debug!(stylesheet = %href, "linking stylesheet");
                self.environment.insert_stylesheet(&href);
                report.stylesheets_inserted.push(href);
            }
        }
    }

    async fn include_scripts(
        &self,
        document: &TemplateDocument,
        location: &str,
        owner: Option<&Owner>,
        report: &mut ImportReport,
    ) {
        let mut loads = Vec::new();

        for script in &document.scripts {
            let src = resolve_path(location, &script.src);
            if self.environment.has_script(&src) {
                debug!(script = %src, "script already present");
                report.scripts_skipped.push(src);
                continue;
            }

            debug!(script = %src, "inserting script");
            let load = self.environment.insert_script(&src);
            let hook = script.on_loadend.as_deref();
            loads.push(async move {
                let result = load.await;
                if let (Ok(()), Some(function)) = (&result, hook) {
                    run_loadend_hook(owner, function, &src);
                }
                (src, result)
            });
        }

        for (src, result) in join_all(loads).await {
            match result {
                Ok(()) => report.scripts_loaded.push(src),
                Err(err) => {
                    warn!(script = %src, "{}", err);
                    report.scripts_failed.push(src);
                }
            }
        }
    }
}

/// Call the `onloadend` owner function with the loaded script element
fn run_loadend_hook(owner: Option<&Owner>, function: &str, src: &str) {
    let Some(owner) = owner else {
        debug!(script = src, "no owner given, onloadend \"{}\" not run", function);
        return;
    };
    let mut element = Element::new("script").with_attribute("src", src);
    if !owner.call(function, &mut element, &Value::String(src.to_string())) {
        warn!(
            script = src,
            "onloadend function \"{}\" is not defined by the owner",
            function
        );
    }
}
