//! Output trees produced from snippets
//!
//! The engine builds its own lightweight element tree instead of driving a
//! browser DOM. Event handler bindings are kept on the element and can be
//! fired with [`Element::dispatch`].

mod html;

pub use html::HtmlWriter;

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// Callback signature shared by owner functions and event handlers
///
/// Receives the element being built (or the element an event fired on) and
/// the current variable context (or the event payload).
pub type Callback = Rc<dyn Fn(&mut Element, &Value)>;

/// An owner function bound as an event handler
#[derive(Clone)]
pub struct EventBinding {
    /// Event name without the `on` prefix (`click`)
    pub event: String,
    /// Owner function the handler was resolved from
    pub function: String,
    pub callback: Callback,
}

impl fmt::Debug for EventBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("event", &self.event)
            .field("function", &self.function)
            .finish_non_exhaustive()
    }
}

impl PartialEq for EventBinding {
    fn eq(&self, other: &Self) -> bool {
        self.event == other.event && self.function == other.function
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

/// An output element: tag, ordered attributes, children and event handlers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    handlers: Vec<EventBinding>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn append_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn append_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Builder form of [`Element::set_attribute`]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`Element::append_element`]
    pub fn with_child(mut self, child: Element) -> Self {
        self.append_element(child);
        self
    }

    /// Builder form of [`Element::append_text`]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.append_text(text);
        self
    }

    /// Concatenated text of this element and all descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => text.push_str(t),
                Node::Element(el) => text.push_str(&el.text_content()),
            }
        }
        text
    }

    pub fn handlers(&self) -> &[EventBinding] {
        &self.handlers
    }

    /// Bind `callback` as handler for `event`
    pub fn bind_handler(
        &mut self,
        event: impl Into<String>,
        function: impl Into<String>,
        callback: Callback,
    ) {
        self.handlers.push(EventBinding {
            event: event.into(),
            function: function.into(),
            callback,
        });
    }

    /// Fire every handler bound to `event`, returning how many ran
    pub fn dispatch(&mut self, event: &str, payload: &Value) -> usize {
        let callbacks: Vec<Callback> = self
            .handlers
            .iter()
            .filter(|binding| binding.event == event)
            .map(|binding| Rc::clone(&binding.callback))
            .collect();
        for callback in &callbacks {
            callback(self, payload);
        }
        callbacks.len()
    }

    /// Serialize as compact HTML
    pub fn to_html(&self) -> String {
        HtmlWriter::new(false).write(self)
    }

    /// Serialize as indented HTML
    pub fn to_html_pretty(&self) -> String {
        HtmlWriter::new(true).write(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut el = Element::new("a")
            .with_attribute("href", "/")
            .with_attribute("class", "x");
        el.set_attribute("href", "/home");
        assert_eq!(
            el.attributes(),
            &[
                ("href".to_string(), "/home".to_string()),
                ("class".to_string(), "x".to_string())
            ]
        );
    }

    #[test]
    fn test_remove_attribute() {
        let mut el = Element::new("a").with_attribute("id", "1");
        assert_eq!(el.remove_attribute("id"), Some("1".to_string()));
        assert_eq!(el.remove_attribute("id"), None);
    }

    #[test]
    fn test_dispatch_runs_matching_handlers() {
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let mut el = Element::new("button");
        el.bind_handler(
            "click",
            "onButtonClick",
            Rc::new(move |target: &mut Element, payload: &Value| {
                counter.set(counter.get() + 1);
                target.set_attribute("data-last", payload.to_string());
            }),
        );

        assert_eq!(el.dispatch("click", &json!(7)), 1);
        assert_eq!(el.dispatch("keyup", &json!(null)), 0);
        assert_eq!(clicks.get(), 1);
        assert_eq!(el.attribute("data-last"), Some("7"));
    }

    #[test]
    fn test_equality_ignores_callback_identity() {
        let mut a = Element::new("b");
        let mut b = Element::new("b");
        a.bind_handler("click", "go", Rc::new(|_: &mut Element, _: &Value| {}));
        b.bind_handler("click", "go", Rc::new(|_: &mut Element, _: &Value| {}));
        assert_eq!(a, b);
    }
}
