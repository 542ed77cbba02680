//! Template documents
//!
//! A template document is an XML file that bundles snippet definitions with
//! the stylesheets and scripts they rely on:
//!
//! ```xml
//! <dht:template>
//!     <dht:stylesheet src="menu.css"/>
//!     <dht:script src="menu.js"/>
//!     <dht:snippet name="greeting">
//!         <div class="greeting">Hello, {{name}}!</div>
//!     </dht:snippet>
//! </dht:template>
//! ```

mod node;
mod parser;

pub use node::{XmlElement, XmlNode};
pub use parser::parse_xml;

use tracing::warn;

use crate::config::Namespace;
use crate::error::ParseError;

/// A `snippet` element found in a template document
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetDefinition {
    pub name: String,
    /// First child element, the fragment that gets registered
    pub fragment: Option<XmlElement>,
    /// Number of child elements the definition had
    pub child_count: usize,
}

/// A `stylesheet` or `script` reference, with its path as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub src: String,
    /// Owner function to run once a script has loaded
    pub on_loadend: Option<String>,
}

/// Everything the import pipeline needs from one parsed document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDocument {
    pub snippets: Vec<SnippetDefinition>,
    pub stylesheets: Vec<ResourceRef>,
    pub scripts: Vec<ResourceRef>,
}

impl TemplateDocument {
    /// Parse XML source and collect its definitions and references
    pub fn parse(source: &str, namespace: &Namespace) -> Result<Self, ParseError> {
        let root = parse_xml(source)?;
        Ok(Self::from_root(&root, namespace))
    }

    /// Collect definitions and references anywhere below (or at) `root`
    pub fn from_root(root: &XmlElement, namespace: &Namespace) -> Self {
        let snippet_tag = namespace.qualify("snippet");
        let stylesheet_tag = namespace.qualify("stylesheet");
        let script_tag = namespace.qualify("script");

        let snippets = elements_named(root, &snippet_tag)
            .into_iter()
            .filter_map(|el| match el.attribute("name") {
                Some(name) => Some(SnippetDefinition {
                    name: name.to_string(),
                    fragment: el.first_child_element().cloned(),
                    child_count: el.child_element_count(),
                }),
                None => {
                    warn!("<{}> without a name attribute is ignored", snippet_tag);
                    None
                }
            })
            .collect();

        Self {
            snippets,
            stylesheets: resources(root, &stylesheet_tag),
            scripts: resources(root, &script_tag),
        }
    }
}

/// Elements named `tag`, including `root` itself, in document order
fn elements_named<'a>(root: &'a XmlElement, tag: &str) -> Vec<&'a XmlElement> {
    let mut found = Vec::new();
    if root.name == tag {
        found.push(root);
    }
    found.extend(root.descendants_named(tag));
    found
}

fn resources(root: &XmlElement, tag: &str) -> Vec<ResourceRef> {
    elements_named(root, tag)
        .into_iter()
        .filter_map(|el| match el.attribute("src") {
            Some(src) => Some(ResourceRef {
                src: src.to_string(),
                on_loadend: el.attribute("onloadend").map(str::to_string),
            }),
            None => {
                warn!("<{}> without a src attribute is ignored", tag);
                None
            }
        })
        .collect()
}
