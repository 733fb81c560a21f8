/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;

use std::fmt::Display;

use super::entities::escape;
use super::entities::escape_fmt;
use super::entities::escaped_size;
pub use error::ElementError;

const PRETTY_INDENT: usize = 4;

/// A single XML element with its attributes, children and character data.
///
/// Elements produced by the [StanzaParser](crate::StanzaParser) are
/// complete trees: the parser hands them over only after the matching
/// end tag is seen, and the receiver owns them from then on.
///
/// Character data is collected into a single text value per element
/// regardless of where it appeared between the children. The serializer
/// writes the children first and the text after them.
///
/// # Examples
///
/// ```
/// use jabbot::Element;
///
/// let message = Element::new("message")
///     .with_attribute("to", "juliet@example.com")
///     .with_child(Element::new("body").with_text("Art thou not Romeo?"));
/// assert_eq!(
///     message.to_string(),
///     "<message to=\"juliet@example.com\"><body>Art thou not Romeo?</body></message>"
/// );
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Element {
    name: String,
    namespace: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Creates an element with the given qualified tag name.
    pub fn new(name: &str) -> Element {
        Element {
            name: name.to_string(),
            ..Default::default()
        }
    }

    //
    // Builder methods
    //

    pub fn with_namespace(mut self, namespace: &str) -> Element {
        self.namespace = namespace.to_string();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Element {
        self.set_attribute(name, Some(value));
        self
    }

    pub fn with_child(mut self, child: Element) -> Element {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: &str) -> Element {
        self.text.push_str(text);
        self
    }

    //
    // Edit methods
    //

    pub(crate) fn set_namespace(&mut self, namespace: String) {
        self.namespace = namespace;
    }

    /// Adds a new attribute, failing if the name is already used.
    pub fn insert_attribute(&mut self, name: &str, value: &str) -> Result<(), ElementError> {
        if self.attribute(name).is_some() {
            return Err(ElementError::DuplicateAttribute(name.to_string()));
        }
        self.attributes.push((name.to_string(), value.to_string()));
        Ok(())
    }

    /// Changes, adds, or with `None` removes an attribute.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) {
        let pos = self.attributes.iter().position(|(n, _)| n == name);
        match (pos, value) {
            (Some(pos), Some(value)) => self.attributes[pos].1 = value.to_string(),
            (Some(pos), None) => {
                self.attributes.remove(pos);
            }
            (None, Some(value)) => self.attributes.push((name.to_string(), value.to_string())),
            (None, None) => (),
        }
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    //
    // Property methods
    //

    /// Qualified tag name as it appears on the wire, e.g. `stream:features`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local part of the tag name, e.g. `features` for `stream:features`.
    pub fn tag(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Namespace URI the tag was resolved to, empty if none is in scope.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in their source order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn into_children(self) -> Vec<Element> {
        self.children
    }

    /// First child with the given local tag name.
    pub fn find_child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.tag() == tag)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn is_empty_tag(&self) -> bool {
        self.children.is_empty() && self.text.is_empty()
    }

    /// Exact byte length of the compact serialization.
    pub fn str_size(&self) -> usize {
        let mut size = 1 + self.name.len(); // '<' and name
        for (name, value) in &self.attributes {
            size += 1; // space
            size += name.len();
            size += 2; // =" characters
            size += escaped_size(value);
            size += 1; // " character
        }
        if self.is_empty_tag() {
            return size + 2; // Standalone tag closing '/>'
        }
        size += 1;
        for child in &self.children {
            size += child.str_size();
        }
        size += escaped_size(&self.text);
        size + 2 + self.name.len() + 1 // '</' name '>'
    }

    #[allow(
        clippy::inherent_to_string_shadow_display,
        reason = "prereserving exact capacity makes this function significantly faster"
    )]
    pub fn to_string(&self) -> String {
        let mut buf = String::with_capacity(self.str_size());
        self.push_to(&mut buf);
        buf
    }

    fn push_to(&self, buf: &mut String) {
        buf.push('<');
        buf.push_str(&self.name);
        for (name, value) in &self.attributes {
            buf.push(' ');
            buf.push_str(name);
            buf.push_str("=\"");
            escape(value, buf);
            buf.push('"');
        }
        if self.is_empty_tag() {
            buf.push_str("/>");
            return;
        }
        buf.push('>');
        for child in &self.children {
            child.push_to(buf);
        }
        escape(&self.text, buf);
        buf.push_str("</");
        buf.push_str(&self.name);
        buf.push('>');
    }

    /// Returns a displayable wrapper which indents the tree for logging.
    pub fn pretty(&self) -> Pretty<'_> {
        Pretty {
            element: self,
            depth: 0,
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<")?;
        f.write_str(&self.name)?;
        for (name, value) in &self.attributes {
            f.write_str(" ")?;
            f.write_str(name)?;
            f.write_str("=\"")?;
            escape_fmt(value, f)?;
            f.write_str("\"")?;
        }
        if self.is_empty_tag() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for child in &self.children {
            Display::fmt(child, f)?;
        }
        escape_fmt(&self.text, f)?;
        f.write_str("</")?;
        f.write_str(&self.name)?;
        f.write_str(">")
    }
}

/// Indented rendering of an [Element], one tag or text run per line.
pub struct Pretty<'a> {
    element: &'a Element,
    depth: usize,
}

impl Display for Pretty<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let element = self.element;
        let indent = self.depth * PRETTY_INDENT;
        write!(f, "{:indent$}<{}", "", element.name)?;
        for (name, value) in &element.attributes {
            write!(f, " {name}=\"")?;
            escape_fmt(value, f)?;
            f.write_str("\"")?;
        }
        if element.is_empty_tag() {
            return f.write_str("/>\n");
        }
        f.write_str(">\n")?;
        for child in &element.children {
            let pretty = Pretty {
                element: child,
                depth: self.depth + 1,
            };
            Display::fmt(&pretty, f)?;
        }
        if !element.text.is_empty() {
            write!(f, "{:width$}", "", width = indent + PRETTY_INDENT)?;
            escape_fmt(&element.text, f)?;
            f.write_str("\n")?;
        }
        writeln!(f, "{:indent$}</{}>", "", element.name)
    }
}

#[cfg(test)]
mod tests;
