//! pagesnippets - declarative templating and transclusion
//!
//! Template documents bundle named snippets with the stylesheets and
//! scripts they need. The [`import`] pipeline loads documents into a
//! [`SnippetRegistry`], and a [`Producer`] turns registered snippets into
//! output trees by substituting `{{variables}}` and running directives.
//!
//! # Example
//!
//! ```rust
//! use pagesnippets::render;
//! use serde_json::json;
//!
//! let html = render(
//!     r#"<dht:snippet name="greeting"><div>Hello, {{name}}!</div></dht:snippet>"#,
//!     "greeting",
//!     &json!({"name": "World"}),
//! ).unwrap();
//! assert_eq!(html, "<div>Hello, World!</div>");
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod expr;
pub mod import;
pub mod output;
pub mod template;

pub use config::{ConfigError, Namespace, SnippetsConfig};
pub use document::TemplateDocument;
pub use error::{ExpressionError, ParseError};
pub use import::{ImportError, ImportReport, Importer};
pub use output::Element;
pub use template::{Owner, ProduceError, Producer, SnippetRegistry};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error while parsing the template document
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error while producing the snippet
    #[error("production error: {0}")]
    Produce(#[from] ProduceError),
}

/// Produce `snippet` from template source and serialize it as HTML
///
/// Stylesheet and script references are ignored; use an [`Importer`] when
/// they matter. No owner functions are available.
pub fn render(source: &str, snippet: &str, variables: &Value) -> Result<String, RenderError> {
    render_with_config(source, snippet, variables, &SnippetsConfig::default())
}

/// Render with custom configuration
///
/// # Example
///
/// ```rust
/// use pagesnippets::{render_with_config, SnippetsConfig};
/// use serde_json::json;
///
/// let config = SnippetsConfig::new().with_namespace("tpl");
/// let html = render_with_config(
///     r#"<tpl:snippet name="x"><p>{{v}}</p></tpl:snippet>"#,
///     "x",
///     &json!({"v": 1}),
///     &config,
/// ).unwrap();
/// assert_eq!(html, "<p>1</p>");
/// ```
pub fn render_with_config(
    source: &str,
    snippet: &str,
    variables: &Value,
    config: &SnippetsConfig,
) -> Result<String, RenderError> {
    let document = TemplateDocument::parse(source, &config.vocabulary())?;

    let mut registry = SnippetRegistry::new();
    registry.collect_from_document(&document, "<inline>");

    let element = Producer::with_config(&registry, config).produce(
        snippet,
        &Owner::new(),
        variables,
    )?;

    Ok(if config.pretty_print {
        element.to_html_pretty()
    } else {
        element.to_html()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MENU: &str = r#"<dht:template>
        <dht:snippet name="menu">
            <ul><dht:for-each list="items"><li>{{}}</li></dht:for-each></ul>
        </dht:snippet>
    </dht:template>"#;

    #[test]
    fn test_render_for_each() {
        let html = render(MENU, "menu", &json!({"items": ["a", "b"]})).unwrap();
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_render_pretty() {
        let config = SnippetsConfig::new().with_pretty_print(true);
        let html = render_with_config(MENU, "menu", &json!({"items": ["a"]}), &config).unwrap();
        assert_eq!(html, "<ul>\n  <li>a</li>\n</ul>\n");
    }

    #[test]
    fn test_render_parse_error() {
        let result = render("<a><b></a>", "x", &json!({}));
        assert!(matches!(result, Err(RenderError::Parse(_))));
    }

    #[test]
    fn test_render_unknown_snippet() {
        let err = render(MENU, "nav", &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "production error: unknown snippet: nav");
    }
}
