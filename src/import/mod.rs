//! Import pipeline for template documents
//!
//! An import fetches a template document, registers its snippets, links its
//! stylesheets and inserts its scripts. Resource paths are resolved relative
//! to the template location, and resources already present in the
//! environment are never inserted twice, so importing the same document
//! again is harmless.
//!
//! ```no_run
//! # async fn run() -> Result<(), pagesnippets::import::ImportError> {
//! use pagesnippets::import::{FsFetcher, Importer, InMemoryEnvironment};
//! use pagesnippets::template::SnippetRegistry;
//!
//! let importer = Importer::new(FsFetcher::new(), InMemoryEnvironment::new());
//! let mut registry = SnippetRegistry::new();
//! let report = importer.import_template(&mut registry, "templates/menu.xml").await?;
//! println!("registered {:?}", report.snippets);
//! # Ok(())
//! # }
//! ```

mod environment;
mod fetch;
mod importer;
mod path;

pub use environment::{Environment, InMemoryEnvironment, ScriptLoadError};
pub use fetch::{FetchError, Fetcher, FsFetcher, InMemoryFetcher};
pub use importer::{ImportError, ImportReport, Importer};
pub use path::{resolve_path, template_root};
