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
mod location;
mod tokenizer;

use std::borrow::Cow;
use std::collections::VecDeque;

use log::trace;

use crate::Element;
use error::description;
pub use error::ParseError;
pub use location::Location;
use tokenizer::Token;
use tokenizer::TokenError;
use tokenizer::Tokenizer;

/// Local name of the stream framing tag.
const STREAM_TAG: &str = "stream";

const XML_PREFIX: &str = "xml";

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// An item produced by the [StanzaParser].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StreamElement {
    /// A completed top-level element.
    ///
    /// The stream framing tag is returned this way too as soon as its
    /// start tag is parsed. It has no children since it stays open until
    /// the end of the stream.
    Element(Element),

    /// The closing tag of the stream framing element.
    End,
}

type NodeId = usize;

struct Node {
    element: Element,
    namespaces: Vec<(String, String)>,
    parent: Option<NodeId>,
}

/// Incremental parser turning stream text into completed stanzas.
///
/// Input can be split anywhere, including the middle of a tag name or a
/// multi-byte character. Completed stanzas are queued and taken with
/// [pop()](StanzaParser::pop) in their arrival order.
///
/// The element under construction lives in an arena indexed by node ids.
/// A saved cursor marks how much of the input has been turned into queued
/// stanzas; when a call ends before the current stanza is complete, the
/// arena is dropped and the text after the cursor is kept for the next
/// call. This makes feeding `a` then `b` equivalent to feeding `a + b`.
///
/// # Examples
///
/// ```
/// use jabbot::{StanzaParser, StreamElement};
///
/// let mut parser = StanzaParser::new();
/// parser.feed("<message><bo").unwrap();
/// assert!(parser.pop().is_none());
/// parser.feed("dy>hello</body></message>").unwrap();
/// match parser.pop() {
///     Some(StreamElement::Element(message)) => {
///         assert_eq!(message.find_child("body").unwrap().text(), "hello");
///     }
///     _ => panic!("message expected"),
/// }
/// ```
pub struct StanzaParser {
    nodes: Vec<Node>,
    stack: Vec<Option<NodeId>>,
    current: Option<NodeId>,
    queue: VecDeque<StreamElement>,
    leftover: String,
    utf8_carry: Vec<u8>,
    stream_namespaces: Vec<(String, String)>,
    location: Location,
    failed: bool,
}

fn local_name(name: &str) -> &str {
    match name.split_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

fn namespace_declarations(attributes: &[(&str, Cow<'_, str>)]) -> Vec<(String, String)> {
    attributes
        .iter()
        .filter_map(|(name, value)| {
            if *name == "xmlns" {
                Some((String::new(), value.to_string()))
            } else {
                name.strip_prefix("xmlns:")
                    .map(|prefix| (prefix.to_string(), value.to_string()))
            }
        })
        .collect()
}

fn find_declaration<'a>(namespaces: &'a [(String, String)], prefix: &str) -> Option<&'a str> {
    namespaces
        .iter()
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.as_str())
}

impl StanzaParser {
    pub fn new() -> StanzaParser {
        StanzaParser {
            nodes: Vec::new(),
            stack: Vec::new(),
            current: None,
            queue: VecDeque::new(),
            leftover: String::new(),
            utf8_carry: Vec::new(),
            stream_namespaces: Vec::new(),
            location: Location::new(),
            failed: false,
        }
    }

    /// Parses the next chunk of stream text.
    ///
    /// Feeding an empty chunk does nothing and never fails. After an
    /// error every further non-empty chunk is rejected with
    /// [ParseError::NeedsReset].
    pub fn feed(&mut self, chunk: &str) -> Result<(), ParseError> {
        if chunk.is_empty() {
            return Ok(());
        }
        if self.failed {
            return Err(ParseError::NeedsReset);
        }

        let mut input = std::mem::take(&mut self.leftover);
        input.push_str(chunk);

        let mut tokenizer = Tokenizer::new(&input);
        let mut committed = 0;
        let result = loop {
            match tokenizer.next_token() {
                Ok(None) | Err(TokenError::Truncated) => break Ok(()),
                Ok(Some(token)) => {
                    if let Err(err) = self.handle_token(token) {
                        break Err(err);
                    }
                    if self.is_idle() {
                        committed = tokenizer.position();
                    }
                }
                Err(TokenError::BadXml(desc)) => break Err(ParseError::BadXml(desc)),
            }
        };
        let position = tokenizer.position();

        self.rollback();
        match result {
            Ok(()) => {
                self.location.advance(&input[..committed]);
                self.leftover = input.split_off(committed);
                trace!("{} bytes kept for the next chunk", self.leftover.len());
                Ok(())
            }
            Err(err) => {
                self.location.advance(&input[..position]);
                self.failed = true;
                Err(err)
            }
        }
    }

    /// Parses raw transport bytes.
    ///
    /// An incomplete UTF-8 sequence at the end is kept until the next call.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        if bytes.is_empty() {
            return Ok(());
        }
        if self.failed {
            return Err(ParseError::NeedsReset);
        }
        self.utf8_carry.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.utf8_carry) {
            Ok(s) => s.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(_) => {
                self.failed = true;
                return Err(ParseError::BadXml(description::UTF8_INVALID));
            }
        };
        let rest = self.utf8_carry.split_off(valid);
        let bytes = std::mem::replace(&mut self.utf8_carry, rest);
        let text =
            String::from_utf8(bytes).map_err(|_| ParseError::BadXml(description::UTF8_INVALID))?;
        self.feed(&text)
    }

    /// Takes the oldest completed item from the queue.
    pub fn pop(&mut self) -> Option<StreamElement> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns the parser to a clean state, dropping queued items too.
    pub fn reset(&mut self) {
        *self = StanzaParser::new();
    }

    fn is_idle(&self) -> bool {
        self.current.is_none() && self.stack.is_empty()
    }

    fn rollback(&mut self) {
        self.nodes.clear();
        self.stack.clear();
        self.current = None;
    }

    fn resolve(&self, mut node: Option<NodeId>, prefix: &str) -> String {
        while let Some(id) = node {
            if let Some(uri) = find_declaration(&self.nodes[id].namespaces, prefix) {
                return uri.to_string();
            }
            node = self.nodes[id].parent;
        }
        if let Some(uri) = find_declaration(&self.stream_namespaces, prefix) {
            return uri.to_string();
        }
        match prefix {
            XML_PREFIX => XML_NS.to_string(),
            // Undeclared prefixes stand for themselves
            _ => prefix.to_string(),
        }
    }

    fn build_element(
        name: &str,
        attributes: &[(&str, Cow<'_, str>)],
    ) -> Result<Element, ParseError> {
        let mut element = Element::new(name);
        for (attr_name, value) in attributes {
            element
                .insert_attribute(attr_name, value)
                .map_err(|_| ParseError::BadXml(description::TAG_DUPLICATE_ATTRIBUTE))?;
        }
        Ok(element)
    }

    fn handle_token(&mut self, token: Token) -> Result<(), ParseError> {
        match token {
            Token::StartTag {
                name,
                attributes,
                empty,
            } => {
                let mut element = Self::build_element(name, &attributes)?;
                let namespaces = namespace_declarations(&attributes);
                let prefix = element.prefix().unwrap_or("").to_string();

                if self.is_idle() && !empty && local_name(name) == STREAM_TAG {
                    // Stays open for the whole session, never pushed
                    self.stream_namespaces = namespaces;
                    element.set_namespace(self.resolve(None, &prefix));
                    self.queue.push_back(StreamElement::Element(element));
                    return Ok(());
                }

                let id = self.nodes.len();
                self.nodes.push(Node {
                    element,
                    namespaces,
                    parent: self.current,
                });
                let namespace = self.resolve(Some(id), &prefix);
                self.nodes[id].element.set_namespace(namespace);
                self.stack.push(self.current);
                self.current = Some(id);

                if empty {
                    self.handle_end_tag(name)?;
                }
                Ok(())
            }
            Token::EndTag(name) => self.handle_end_tag(name),
            Token::CharData(text) => {
                // Text between top-level stanzas has no owner
                if let Some(id) = self.current {
                    self.nodes[id].element.append_text(&text);
                }
                Ok(())
            }
            Token::Skipped => Ok(()),
        }
    }

    fn handle_end_tag(&mut self, name: &str) -> Result<(), ParseError> {
        let Some(id) = self.current else {
            if self.stack.is_empty() && local_name(name) == STREAM_TAG {
                self.queue.push_back(StreamElement::End);
                return Ok(());
            }
            return Err(ParseError::BadXml(description::TAG_UNEXPECTED_END));
        };
        if self.nodes[id].element.name() != name {
            return Err(ParseError::BadXml(description::TAG_MISMATCH));
        }

        let element = std::mem::take(&mut self.nodes[id].element);
        let parent = self.stack.pop().flatten();
        self.current = parent;
        match parent {
            Some(parent) => self.nodes[parent].element.push_child(element),
            None => {
                self.queue.push_back(StreamElement::Element(element));
                self.nodes.clear();
            }
        }
        Ok(())
    }
}

impl Default for StanzaParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
