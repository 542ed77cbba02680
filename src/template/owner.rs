//! Owner: the named callbacks a template may refer to

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::output::{Callback, Element};

/// Capability map from function name to callback
///
/// Templates refer to owner functions from event bindings
/// (`dht:onclick="select"`), `call-function` directives and post-production
/// hooks. Only functions registered here can be reached.
#[derive(Clone, Default)]
pub struct Owner {
    functions: HashMap<String, Callback>,
}

impl Owner {
    /// Create an owner without functions
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function, builder style
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&mut Element, &Value) + 'static,
    {
        self.insert(name, function);
        self
    }

    /// Register a function, replacing any previous one with the same name
    pub fn insert<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&mut Element, &Value) + 'static,
    {
        self.functions.insert(name.into(), Rc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<Callback> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Call a function if it exists, returning whether it was found
    pub fn call(&self, name: &str, element: &mut Element, variables: &Value) -> bool {
        match self.get(name) {
            Some(function) => {
                function(element, variables);
                true
            }
            None => false,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(|s| s.as_str())
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Owner").field("functions", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_registered_function() {
        let owner = Owner::new().with_function("mark", |el: &mut Element, vars: &Value| {
            el.set_attribute("data-id", vars["id"].to_string());
        });
        let mut el = Element::new("li");
        assert!(owner.call("mark", &mut el, &json!({"id": 5})));
        assert_eq!(el.attribute("data-id"), Some("5"));
    }

    #[test]
    fn test_call_missing_function() {
        let owner = Owner::new();
        let mut el = Element::new("li");
        assert!(!owner.call("mark", &mut el, &json!({})));
        assert!(!owner.contains("mark"));
    }

    #[test]
    fn test_insert_replaces() {
        let mut owner = Owner::new();
        owner.insert("f", |el: &mut Element, _: &Value| el.set_attribute("v", "1"));
        owner.insert("f", |el: &mut Element, _: &Value| el.set_attribute("v", "2"));
        let mut el = Element::new("x");
        owner.call("f", &mut el, &Value::Null);
        assert_eq!(el.attribute("v"), Some("2"));
    }

    #[test]
    fn test_debug_lists_names_sorted() {
        let owner = Owner::new()
            .with_function("b", |_: &mut Element, _: &Value| {})
            .with_function("a", |_: &mut Element, _: &Value| {});
        assert_eq!(format!("{:?}", owner), r#"Owner { functions: ["a", "b"] }"#);
    }
}
