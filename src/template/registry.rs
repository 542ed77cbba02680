//! Snippet registry for storing and retrieving named fragments

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::document::{SnippetDefinition, TemplateDocument, XmlElement};

/// Registry mapping snippet names to their fragments
///
/// One registry is created per application and shared by the importer
/// (which fills it) and producers (which read it). Registering an existing
/// name replaces the previous fragment.
#[derive(Debug, Default, Clone)]
pub struct SnippetRegistry {
    snippets: HashMap<String, XmlElement>,
}

impl SnippetRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment, returning the one it replaced
    pub fn register(&mut self, name: impl Into<String>, fragment: XmlElement) -> Option<XmlElement> {
        self.snippets.insert(name.into(), fragment)
    }

    /// Register a parsed snippet definition
    ///
    /// Returns whether anything was registered. A definition with several
    /// child elements registers the first one and logs a warning; one with
    /// no child element is skipped.
    pub fn register_definition(&mut self, def: &SnippetDefinition, origin: &str) -> bool {
        if def.child_count > 1 {
            warn!(
                snippet = %def.name,
                "Importing snippets from \"{}\": snippet \"{}\" has {} child elements, only the first is used",
                origin,
                def.name,
                def.child_count
            );
        }
        match &def.fragment {
            Some(fragment) => {
                if self.register(def.name.clone(), fragment.clone()).is_some() {
                    debug!(snippet = %def.name, "replaced existing snippet");
                }
                true
            }
            None => {
                warn!(
                    snippet = %def.name,
                    "Importing snippets from \"{}\": snippet \"{}\" has no child element",
                    origin,
                    def.name
                );
                false
            }
        }
    }

    /// Register every snippet of a document, returning the registered names
    pub fn collect_from_document(&mut self, doc: &TemplateDocument, origin: &str) -> Vec<String> {
        doc.snippets
            .iter()
            .filter(|def| self.register_definition(def, origin))
            .map(|def| def.name.clone())
            .collect()
    }

    /// Get a fragment by name
    pub fn get(&self, name: &str) -> Option<&XmlElement> {
        self.snippets.get(name)
    }

    /// Check if a snippet exists
    pub fn contains(&self, name: &str) -> bool {
        self.snippets.contains_key(name)
    }

    /// Get all snippet names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.snippets.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}
