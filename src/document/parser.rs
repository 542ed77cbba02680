//! XML reader that builds an [`XmlElement`] tree using quick-xml

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseError;

use super::node::{XmlElement, XmlNode};

/// Parse an XML document and return its root element
///
/// Comments, processing instructions and the XML declaration are dropped.
/// Text (including whitespace) is kept so that the production engine can
/// decide what is significant.
pub fn parse_xml(input: &str) -> Result<XmlElement, ParseError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(ParseError::syntax(
                    reader.error_position() as usize,
                    e.to_string(),
                ))
            }
        };

        match event {
            Event::Start(start) => {
                stack.push(element_from_start(&start, position)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start, position)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::syntax(position, "unexpected end tag"))?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| ParseError::syntax(position, e.to_string()))?;
                push_text(&mut stack, &text, position)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                push_text(&mut stack, &text, position)?;
            }
            Event::Eof => break,
            // Comments, declarations, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::syntax(
            input.len(),
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.ok_or_else(|| ParseError::syntax(0, "document has no root element"))
}

fn element_from_start(start: &BytesStart<'_>, position: usize) -> Result<XmlElement, ParseError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::syntax(position, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::syntax(position, e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    position: usize,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ParseError::syntax(
            position,
            format!("multiple root elements: <{}>", element.name),
        )),
    }
}

fn push_text(stack: &mut [XmlElement], text: &str, position: usize) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            // quick-xml may split text around entity references
            if let Some(XmlNode::Text(previous)) = parent.children.last_mut() {
                previous.push_str(text);
            } else {
                parent.children.push(XmlNode::Text(text.to_string()));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::syntax(position, "text outside of the root element")),
    }
}
