//! Production - materializes registered snippets into output trees

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Namespace, SnippetsConfig, DEFAULT_MAX_DEPTH};
use crate::document::{XmlElement, XmlNode};
use crate::error::ExpressionError;
use crate::expr;
use crate::output::Element;

use super::interpolate::{interpolate, interpolate_for_expression, lookup};
use super::owner::Owner;
use super::registry::SnippetRegistry;

/// Errors that abort a production call
#[derive(Debug, Error)]
pub enum ProduceError {
    /// No snippet registered under this name
    #[error("unknown snippet: {name}")]
    UnknownSnippet { name: String },

    /// A conditional test could not be evaluated
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// Snippet insertions nested deeper than the configured limit
    #[error("snippet insertion nested too deeply: {name} at depth {depth}")]
    RecursionLimit { name: String, depth: usize },
}

/// Template directives recognized inside fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    If,
    ForEach,
    CallFunction,
    InsertSnippet,
}

/// Builds output elements from the fragments of a registry
///
/// A producer only reads the registry, so any number of production calls
/// can run against a registry that was populated once.
#[derive(Debug, Clone)]
pub struct Producer<'r> {
    registry: &'r SnippetRegistry,
    namespace: Namespace,
    max_depth: usize,
}

impl<'r> Producer<'r> {
    /// Create a producer with the default namespace and depth limit
    pub fn new(registry: &'r SnippetRegistry) -> Self {
        Self {
            registry,
            namespace: Namespace::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_config(registry: &'r SnippetRegistry, config: &SnippetsConfig) -> Self {
        Self {
            registry,
            namespace: config.vocabulary(),
            max_depth: config.max_depth,
        }
    }

    /// Produce the snippet `name` against `variables`
    ///
    /// The result is detached: it is returned to the caller, who decides
    /// where it goes.
    pub fn produce(
        &self,
        name: &str,
        owner: &Owner,
        variables: &Value,
    ) -> Result<Element, ProduceError> {
        self.produce_at_depth(name, owner, variables, 0)
    }

    fn produce_at_depth(
        &self,
        name: &str,
        owner: &Owner,
        variables: &Value,
        depth: usize,
    ) -> Result<Element, ProduceError> {
        if depth > self.max_depth {
            return Err(ProduceError::RecursionLimit {
                name: name.to_string(),
                depth,
            });
        }

        let fragment = self
            .registry
            .get(name)
            .ok_or_else(|| ProduceError::UnknownSnippet {
                name: name.to_string(),
            })?;

        debug!(snippet = name, depth, "producing snippet");
        self.build_element(fragment, owner, variables, depth)
    }

    /// Build a generic element: attributes, children, then post-production
    fn build_element(
        &self,
        source: &XmlElement,
        owner: &Owner,
        variables: &Value,
        depth: usize,
    ) -> Result<Element, ProduceError> {
        let mut element = Element::new(source.name.clone());
        let postproduction = self.copy_attributes(source, &mut element, owner, variables);

        for child in &source.children {
            self.append_node(child, &mut element, owner, variables, depth)?;
        }

        if let Some(function) = postproduction {
            if !owner.call(&function, &mut element, variables) {
                warn!(
                    element = %source.name,
                    "Post-production function \"{}\" is not defined by the owner",
                    function
                );
            }
        }
        Ok(element)
    }

    /// Copy attributes onto `element`, returning the post-production function
    fn copy_attributes(
        &self,
        source: &XmlElement,
        element: &mut Element,
        owner: &Owner,
        variables: &Value,
    ) -> Option<String> {
        let mut postproduction = None;

        for (name, value) in &source.attributes {
            match self.namespace.local_name(name) {
                Some("postproduction") => postproduction = Some(value.clone()),
                Some(local) if local.len() > 2 && local.starts_with("on") => {
                    let event = &local[2..];
                    match owner.get(value) {
                        Some(callback) => element.bind_handler(event, value.clone(), callback),
                        None => warn!(
                            element = %source.name,
                            "Event handler \"{}\" for \"{}\" is not defined by the owner",
                            value,
                            event
                        ),
                    }
                }
                _ => element.set_attribute(name.clone(), interpolate(value, variables)),
            }
        }

        postproduction
    }

    fn append_node(
        &self,
        node: &XmlNode,
        target: &mut Element,
        owner: &Owner,
        variables: &Value,
        depth: usize,
    ) -> Result<(), ProduceError> {
        match node {
            XmlNode::Text(text) if text.trim().is_empty() => Ok(()),
            XmlNode::Text(text) => {
                target.append_text(interpolate(text, variables));
                Ok(())
            }
            XmlNode::Element(el) => match self.directive(el) {
                Some(Directive::If) => self.apply_if(el, target, owner, variables, depth),
                Some(Directive::ForEach) => self.apply_for_each(el, target, owner, variables, depth),
                Some(Directive::CallFunction) => {
                    self.apply_call_function(el, target, owner, variables);
                    Ok(())
                }
                Some(Directive::InsertSnippet) => {
                    self.apply_insert_snippet(el, target, owner, variables, depth)
                }
                None => {
                    let child = self.build_element(el, owner, variables, depth)?;
                    target.append_element(child);
                    Ok(())
                }
            },
        }
    }

    fn directive(&self, el: &XmlElement) -> Option<Directive> {
        match self.namespace.local_name(&el.name)? {
            "if" => Some(Directive::If),
            "for-each" => Some(Directive::ForEach),
            "call-function" => Some(Directive::CallFunction),
            "insert-snippet" => Some(Directive::InsertSnippet),
            _ => None,
        }
    }

    fn apply_if(
        &self,
        directive: &XmlElement,
        target: &mut Element,
        owner: &Owner,
        variables: &Value,
        depth: usize,
    ) -> Result<(), ProduceError> {
        let test = directive.attribute("test").unwrap_or_default();
        let expression = interpolate_for_expression(test, variables);
        let holds = expr::is_true(&expression, variables)
            .map_err(|cause| ExpressionError::new(&*expression, cause))?;

        let then_tag = self.namespace.qualify("then");
        let else_tag = self.namespace.qualify("else");

        let branch: Vec<&XmlNode> = if holds {
            match directive.child_named(&then_tag) {
                Some(then) => then.children.iter().collect(),
                None => directive
                    .children
                    .iter()
                    .filter(|node| {
                        !matches!(node, XmlNode::Element(el) if self.namespace.is(&el.name, "else"))
                    })
                    .collect(),
            }
        } else {
            directive
                .child_named(&else_tag)
                .map(|otherwise| otherwise.children.iter().collect())
                .unwrap_or_default()
        };

        debug!(test = %expression, holds, "evaluated conditional");
        for node in branch {
            self.append_node(node, target, owner, variables, depth)?;
        }
        Ok(())
    }

    fn apply_for_each(
        &self,
        directive: &XmlElement,
        target: &mut Element,
        owner: &Owner,
        variables: &Value,
        depth: usize,
    ) -> Result<(), ProduceError> {
        let Some(key) = directive.attribute("list") else {
            warn!("<{}> without a list attribute produces nothing", directive.name);
            return Ok(());
        };

        match lookup(variables, key) {
            Some(Value::Array(items)) => {
                for item in items {
                    for node in &directive.children {
                        self.append_node(node, target, owner, item, depth)?;
                    }
                }
            }
            Some(other) => warn!(
                list = key,
                "for-each source \"{}\" is not a list (found {}), nothing produced",
                key,
                kind_of(other)
            ),
            None => warn!(
                list = key,
                "for-each source \"{}\" is not defined, nothing produced",
                key
            ),
        }
        Ok(())
    }

    fn apply_call_function(
        &self,
        directive: &XmlElement,
        target: &mut Element,
        owner: &Owner,
        variables: &Value,
    ) {
        let Some(function) = directive.attribute("name") else {
            warn!("<{}> without a name attribute is ignored", directive.name);
            return;
        };
        if !owner.call(function, target, variables) {
            warn!("Function \"{}\" is not defined by the owner", function);
        }
    }

    fn apply_insert_snippet(
        &self,
        directive: &XmlElement,
        target: &mut Element,
        owner: &Owner,
        variables: &Value,
        depth: usize,
    ) -> Result<(), ProduceError> {
        let Some(name) = directive.attribute("name") else {
            warn!("<{}> without a name attribute is ignored", directive.name);
            return Ok(());
        };
        let name = interpolate(name, variables);
        let inserted = self.produce_at_depth(&name, owner, variables, depth + 1)?;
        target.append_element(inserted);
        Ok(())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TemplateDocument;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry(source: &str) -> SnippetRegistry {
        let doc = TemplateDocument::parse(source, &Namespace::default()).expect("Should parse");
        let mut registry = SnippetRegistry::new();
        registry.collect_from_document(&doc, "test.xml");
        registry
    }

    #[test]
    fn test_produce_literal_snippet() {
        let registry = registry(
            r#"<t><dht:snippet name="card"><div class="card {{kind}}"><h2>{{title}}</h2></div></dht:snippet></t>"#,
        );
        let el = Producer::new(&registry)
            .produce("card", &Owner::new(), &json!({"kind": "wide", "title": "News"}))
            .expect("Should produce");

        let expected = Element::new("div")
            .with_attribute("class", "card wide")
            .with_child(Element::new("h2").with_text("News"));
        assert_eq!(el, expected);
    }

    #[test]
    fn test_unknown_snippet() {
        let registry = SnippetRegistry::new();
        let err = Producer::new(&registry)
            .produce("missing", &Owner::new(), &json!({}))
            .unwrap_err();
        match err {
            ProduceError::UnknownSnippet { name } => assert_eq!(name, "missing"),
            other => panic!("Expected UnknownSnippet, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_then_uses_own_children() {
        let registry = registry(
            r#"<t><dht:snippet name="s"><p><dht:if test="{{n}} > 1"><b/><dht:else><i/></dht:else></dht:if></p></dht:snippet></t>"#,
        );
        let producer = Producer::new(&registry);
        let owner = Owner::new();

        let many = producer.produce("s", &owner, &json!({"n": 2})).expect("Should produce");
        assert_eq!(many.to_html(), "<p><b></b></p>");

        let one = producer.produce("s", &owner, &json!({"n": 1})).expect("Should produce");
        assert_eq!(one.to_html(), "<p><i></i></p>");
    }

    #[test]
    fn test_for_each_non_list_produces_nothing() {
        let registry = registry(
            r#"<t><dht:snippet name="s"><ul><dht:for-each list="items"><li/></dht:for-each></ul></dht:snippet></t>"#,
        );
        let producer = Producer::new(&registry);
        let owner = Owner::new();

        let el = producer.produce("s", &owner, &json!({"items": "nope"})).expect("Should produce");
        assert_eq!(el.to_html(), "<ul></ul>");
        let el = producer.produce("s", &owner, &json!({})).expect("Should produce");
        assert_eq!(el.to_html(), "<ul></ul>");
    }

    #[test]
    fn test_whitespace_text_dropped() {
        let registry = registry("<t><dht:snippet name=\"s\"><p>\n   <b>x</b>\n</p></dht:snippet></t>");
        let el = Producer::new(&registry)
            .produce("s", &Owner::new(), &json!({}))
            .expect("Should produce");
        assert_eq!(el.children().len(), 1);
    }

    #[test]
    fn test_unknown_reserved_element_is_literal() {
        let registry = registry(r#"<t><dht:snippet name="s"><p><dht:then/></p></dht:snippet></t>"#);
        let el = Producer::new(&registry)
            .produce("s", &Owner::new(), &json!({}))
            .expect("Should produce");
        assert_eq!(el.child_elements().next().map(|c| c.tag()), Some("dht:then"));
    }

    #[test]
    fn test_depth_limit_from_config() {
        let registry = registry(
            r#"<t>
                <dht:snippet name="a"><p><dht:insert-snippet name="b"/></p></dht:snippet>
                <dht:snippet name="b"><p><dht:insert-snippet name="c"/></p></dht:snippet>
                <dht:snippet name="c"><p/></dht:snippet>
            </t>"#,
        );
        let owner = Owner::new();

        let shallow = SnippetsConfig::new().with_max_depth(1);
        let err = Producer::with_config(&registry, &shallow)
            .produce("a", &owner, &json!({}))
            .unwrap_err();
        match err {
            ProduceError::RecursionLimit { name, depth } => {
                assert_eq!(name, "c");
                assert_eq!(depth, 2);
            }
            other => panic!("Expected RecursionLimit, got {:?}", other),
        }

        let deep = SnippetsConfig::new().with_max_depth(2);
        assert!(Producer::with_config(&registry, &deep)
            .produce("a", &owner, &json!({}))
            .is_ok());
    }
}
