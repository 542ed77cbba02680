//! Parsed template tree

/// A node of a parsed template document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        }
    }
}

/// An element of a parsed template document
///
/// Attribute and child order is preserved from the source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Qualified tag name, including any namespace prefix (`dht:if`)
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Get an attribute value by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over element children, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn first_child_element(&self) -> Option<&XmlElement> {
        self.child_elements().next()
    }

    pub fn child_element_count(&self) -> usize {
        self.child_elements().count()
    }

    /// First direct child element with the given qualified name
    pub fn child_named(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|el| el.name == name)
    }

    /// All descendant elements with the given name, in document order
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        collect_named(self, name, &mut found);
        found
    }

    /// Concatenated text of this element and all descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                XmlNode::Text(t) => text.push_str(t),
                XmlNode::Element(el) => text.push_str(&el.text_content()),
            }
        }
        text
    }
}

fn collect_named<'a>(element: &'a XmlElement, name: &str, found: &mut Vec<&'a XmlElement>) {
    for child in element.child_elements() {
        if child.name == name {
            found.push(child);
        }
        collect_named(child, name, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlElement {
        XmlElement::new("root")
            .with_text("\n  ")
            .with_child(
                XmlElement::new("dht:snippet")
                    .with_attribute("name", "outer")
                    .with_child(XmlElement::new("dht:snippet").with_attribute("name", "inner")),
            )
            .with_child(XmlElement::new("dht:script").with_attribute("src", "a.js"))
    }

    #[test]
    fn test_attribute_lookup() {
        let el = XmlElement::new("a")
            .with_attribute("href", "#")
            .with_attribute("class", "link");
        assert_eq!(el.attribute("class"), Some("link"));
        assert_eq!(el.attribute("id"), None);
    }

    #[test]
    fn test_child_elements_skip_text() {
        let root = sample();
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.child_element_count(), 2);
        assert_eq!(root.first_child_element().map(|e| e.name.as_str()), Some("dht:snippet"));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = sample();
        let names: Vec<_> = root
            .descendants_named("dht:snippet")
            .iter()
            .filter_map(|e| e.attribute("name"))
            .collect();
        assert_eq!(names, vec!["outer", "inner"]);
    }

    #[test]
    fn test_text_content_concatenates() {
        let el = XmlElement::new("p")
            .with_text("Hello, ")
            .with_child(XmlElement::new("b").with_text("World"))
            .with_text("!");
        assert_eq!(el.text_content(), "Hello, World!");
    }
}
