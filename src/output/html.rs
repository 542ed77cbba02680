//! HTML serialization of output trees

use super::{Element, Node};

/// Elements that never have content or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serialize elements incrementally
pub struct HtmlWriter {
    pretty_print: bool,
    out: String,
}

impl HtmlWriter {
    pub fn new(pretty_print: bool) -> Self {
        Self {
            pretty_print,
            out: String::new(),
        }
    }

    /// Serialize `element` and everything below it
    pub fn write(mut self, element: &Element) -> String {
        self.element(element, 0);
        if self.pretty_print {
            self.out.push('\n');
        }
        self.out
    }

    fn indent(&mut self, depth: usize) {
        if self.pretty_print {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            self.out.push_str(&"  ".repeat(depth));
        }
    }

    fn element(&mut self, element: &Element, depth: usize) {
        self.indent(depth);
        self.out.push('<');
        self.out.push_str(element.tag());
        for (name, value) in element.attributes() {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            self.out.push_str(&escape_attribute(value));
            self.out.push('"');
        }
        self.out.push('>');

        if VOID_ELEMENTS.contains(&element.tag()) {
            return;
        }

        // Mixed content stays on one line so whitespace is not altered
        let inline = element
            .children()
            .iter()
            .any(|child| matches!(child, Node::Text(_)));

        for child in element.children() {
            match child {
                Node::Text(text) => self.out.push_str(&escape_text(text)),
                Node::Element(el) if inline => {
                    let nested = HtmlWriter::new(false).write(el);
                    self.out.push_str(&nested);
                }
                Node::Element(el) => self.element(el, depth + 1),
            }
        }

        if !inline && element.child_elements().next().is_some() {
            self.indent(depth);
        }
        self.out.push_str("</");
        self.out.push_str(element.tag());
        self.out.push('>');
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("ul")
            .with_attribute("class", "menu")
            .with_child(Element::new("li").with_text("One"))
            .with_child(Element::new("li").with_text("Two & three"))
    }

    #[test]
    fn test_compact_output() {
        assert_eq!(
            sample().to_html(),
            r#"<ul class="menu"><li>One</li><li>Two &amp; three</li></ul>"#
        );
    }

    #[test]
    fn test_pretty_output() {
        assert_eq!(
            sample().to_html_pretty(),
            "<ul class=\"menu\">\n  <li>One</li>\n  <li>Two &amp; three</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let el = Element::new("p")
            .with_child(Element::new("br"))
            .with_child(Element::new("img").with_attribute("src", "a.png"));
        assert_eq!(el.to_html(), r#"<p><br><img src="a.png"></p>"#);
    }

    #[test]
    fn test_attribute_quotes_escaped() {
        let el = Element::new("div").with_attribute("title", r#"say "hi" <now>"#);
        assert_eq!(
            el.to_html(),
            r#"<div title="say &quot;hi&quot; &lt;now&gt;"></div>"#
        );
    }

    #[test]
    fn test_mixed_content_stays_inline_when_pretty() {
        let el = Element::new("p")
            .with_text("Hello, ")
            .with_child(Element::new("b").with_text("World"));
        assert_eq!(el.to_html_pretty(), "<p>Hello, <b>World</b></p>\n");
    }
}
