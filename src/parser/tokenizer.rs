/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::borrow::Cow;

use crate::entities::predefined_entity;

use super::error::description;

/// A lexical unit of the stream.
#[derive(Debug, Eq, PartialEq)]
pub(super) enum Token<'a> {
    /// A start tag or empty element tag with its attributes in source order.
    StartTag {
        name: &'a str,
        attributes: Vec<(&'a str, Cow<'a, str>)>,
        empty: bool,
    },

    EndTag(&'a str),

    /// Character data with references already substituted.
    CharData(Cow<'a, str>),

    /// Processing instruction, XML declaration or comment.
    Skipped,
}

#[derive(Debug, Eq, PartialEq)]
pub(super) enum TokenError {
    /// Input ended in the middle of a token. Not fatal, more input is needed.
    Truncated,
    BadXml(&'static str),
}

macro_rules! whitespace {
    () => {
        b' ' | b'\t' | b'\r' | b'\n'
    };
}

macro_rules! xml_error {
    ($a:ident) => {
        return Err(TokenError::BadXml(description::$a))
    };
}

const COMMENT_START: &str = "<!--";
const CDATA_SECTION_START: &str = "<![CDATA[";
const DOCTYPE_START: &str = "<!DOCTYPE";

fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0a | 0x0d | 0x20..=0xd7ff | 0xe000..=0xfffd | 0x10000..=0x10ffff
    )
}

fn check_chars(s: &str) -> Result<(), TokenError> {
    if s.chars().all(is_valid_xml_char) {
        Ok(())
    } else {
        xml_error!(CHAR_INVALID);
    }
}

fn decode_char_reference(body: &str) -> Result<char, TokenError> {
    let value = match body.strip_prefix('x') {
        Some(hex) => {
            if hex.is_empty() || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
                xml_error!(REFERENCE_INVALID_HEX);
            }
            u32::from_str_radix(hex, 16)
                .map_err(|_| TokenError::BadXml(description::REFERENCE_INVALID_HEX))?
        }
        None => {
            if body.is_empty() || !body.bytes().all(|c| c.is_ascii_digit()) {
                xml_error!(REFERENCE_INVALID_DECIMAL);
            }
            body.parse::<u32>()
                .map_err(|_| TokenError::BadXml(description::REFERENCE_INVALID_DECIMAL))?
        }
    };
    match char::from_u32(value) {
        Some(c) if is_valid_xml_char(c) => Ok(c),
        _ => xml_error!(CHAR_INVALID),
    }
}

/// Replaces entity and character references in `raw`.
///
/// When `at_input_end` is set, a reference without its closing ';'
/// means the input was cut and more of it is needed.
fn decode(raw: &str, at_input_end: bool) -> Result<Cow<'_, str>, TokenError> {
    check_chars(raw)?;
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }
    let mut buf = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        buf.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let Some(semicolon) = after.find(';') else {
            if at_input_end {
                return Err(TokenError::Truncated);
            }
            xml_error!(REFERENCE_MISSING_END);
        };
        let name = &after[..semicolon];
        match name.strip_prefix('#') {
            Some(body) => buf.push(decode_char_reference(body)?),
            None => match predefined_entity(name) {
                Some(c) => buf.push(c),
                None => xml_error!(REFERENCE_CUSTOM_ENTITY),
            },
        }
        rest = &after[semicolon + 1..];
    }
    buf.push_str(rest);
    Ok(Cow::Owned(buf))
}

/// Pull tokenizer over a complete text buffer.
///
/// Unlike a push parser it keeps no state between buffers: when the
/// text ends inside a token, [TokenError::Truncated] is returned and the
/// caller retries later with the same text plus whatever arrived since.
/// [position()](Tokenizer::position) tells how much of the buffer the
/// returned tokens covered.
pub(super) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Tokenizer { input, pos: 0 }
    }

    /// Byte offset just after the last returned token.
    pub(super) fn position(&self) -> usize {
        self.pos
    }

    pub(super) fn next_token(&mut self) -> Result<Option<Token<'a>>, TokenError> {
        let bytes = self.input.as_bytes();
        if self.pos >= bytes.len() {
            return Ok(None);
        }
        let (token, end) = if bytes[self.pos] == b'<' {
            self.markup()?
        } else {
            self.char_data()?
        };
        self.pos = end;
        Ok(Some(token))
    }

    fn find_from(&self, start: usize, pattern: &str) -> Option<usize> {
        self.input[start..].find(pattern).map(|offset| start + offset)
    }

    fn char_data(&self) -> Result<(Token<'a>, usize), TokenError> {
        match self.find_from(self.pos, "<") {
            Some(end) => {
                let text = decode(&self.input[self.pos..end], false)?;
                Ok((Token::CharData(text), end))
            }
            None => {
                let end = self.input.len();
                let text = decode(&self.input[self.pos..end], true)?;
                Ok((Token::CharData(text), end))
            }
        }
    }

    fn markup(&self) -> Result<(Token<'a>, usize), TokenError> {
        let rest = &self.input[self.pos..];
        let bytes = rest.as_bytes();
        if bytes.len() < 2 {
            return Err(TokenError::Truncated);
        }
        match bytes[1] {
            b'?' => match self.find_from(self.pos + 2, "?>") {
                Some(end) => Ok((Token::Skipped, end + 2)),
                None => Err(TokenError::Truncated),
            },
            b'!' => self.special_markup(rest),
            b'/' => self.end_tag(),
            whitespace!() => xml_error!(TAG_WHITESPACE_START),
            b'>' => xml_error!(TAG_EMPTY_NAME),
            _ => self.start_tag(),
        }
    }

    fn special_markup(&self, rest: &'a str) -> Result<(Token<'a>, usize), TokenError> {
        if rest.starts_with(COMMENT_START) {
            return match self.find_from(self.pos + COMMENT_START.len(), "-->") {
                Some(end) => Ok((Token::Skipped, end + 3)),
                None => Err(TokenError::Truncated),
            };
        }
        if rest.starts_with(CDATA_SECTION_START) {
            let start = self.pos + CDATA_SECTION_START.len();
            return match self.find_from(start, "]]>") {
                Some(end) => {
                    let text = &self.input[start..end];
                    check_chars(text)?;
                    Ok((Token::CharData(Cow::Borrowed(text)), end + 3))
                }
                None => Err(TokenError::Truncated),
            };
        }
        if rest.starts_with(DOCTYPE_START) {
            xml_error!(MARKUP_DOCTYPE_NOT_ALLOWED);
        }
        if COMMENT_START.starts_with(rest)
            || CDATA_SECTION_START.starts_with(rest)
            || DOCTYPE_START.starts_with(rest)
        {
            return Err(TokenError::Truncated);
        }
        xml_error!(MARKUP_UNRECOGNIZED);
    }

    fn end_tag(&self) -> Result<(Token<'a>, usize), TokenError> {
        let start = self.pos + 2;
        let Some(end) = self.find_from(start, ">") else {
            return Err(TokenError::Truncated);
        };
        let body = &self.input[start..end];
        let name_end = body
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(body.len());
        let name = &body[..name_end];
        if name.is_empty() {
            xml_error!(TAG_EMPTY_NAME);
        }
        if name.contains(['<', '/', '=', '"', '\'']) {
            xml_error!(TAG_BAD_NAME);
        }
        if !body[name_end..].trim_ascii().is_empty() {
            xml_error!(TAG_END_TAG_ATTRIBUTES);
        }
        check_chars(name)?;
        Ok((Token::EndTag(name), end + 1))
    }

    fn skip_whitespace(&self, mut i: usize) -> Result<usize, TokenError> {
        let bytes = self.input.as_bytes();
        while i < bytes.len() && matches!(bytes[i], whitespace!()) {
            i += 1;
        }
        if i >= bytes.len() {
            return Err(TokenError::Truncated);
        }
        Ok(i)
    }

    fn start_tag(&self) -> Result<(Token<'a>, usize), TokenError> {
        let input = self.input;
        let bytes = input.as_bytes();
        let mut i = self.pos + 1;
        while i < bytes.len() && !matches!(bytes[i], whitespace!() | b'>' | b'/') {
            if matches!(bytes[i], b'<' | b'=' | b'"' | b'\'') {
                xml_error!(TAG_BAD_NAME);
            }
            i += 1;
        }
        if i >= bytes.len() {
            return Err(TokenError::Truncated);
        }
        let name = &input[self.pos + 1..i];
        check_chars(name)?;

        let mut attributes = Vec::new();
        loop {
            i = self.skip_whitespace(i)?;
            match bytes[i] {
                b'>' => {
                    let token = Token::StartTag {
                        name,
                        attributes,
                        empty: false,
                    };
                    return Ok((token, i + 1));
                }
                b'/' => {
                    if i + 1 >= bytes.len() {
                        return Err(TokenError::Truncated);
                    }
                    if bytes[i + 1] != b'>' {
                        xml_error!(TAG_EMPTY_TAG_MISSING_END);
                    }
                    let token = Token::StartTag {
                        name,
                        attributes,
                        empty: true,
                    };
                    return Ok((token, i + 2));
                }
                _ => {
                    let name_start = i;
                    while i < bytes.len() && !matches!(bytes[i], whitespace!() | b'=') {
                        if matches!(bytes[i], b'/' | b'>' | b'<') {
                            xml_error!(TAG_ATTRIBUTE_BAD_NAME);
                        }
                        i += 1;
                    }
                    if i >= bytes.len() {
                        return Err(TokenError::Truncated);
                    }
                    let attribute_name = &input[name_start..i];
                    check_chars(attribute_name)?;

                    i = self.skip_whitespace(i)?;
                    if bytes[i] != b'=' {
                        xml_error!(TAG_ATTRIBUTE_WITHOUT_EQUAL);
                    }
                    i = self.skip_whitespace(i + 1)?;
                    let quote = match bytes[i] {
                        b'"' => "\"",
                        b'\'' => "'",
                        _ => xml_error!(TAG_ATTRIBUTE_WITHOUT_QUOTE),
                    };
                    let value_start = i + 1;
                    let Some(value_end) = self.find_from(value_start, quote) else {
                        return Err(TokenError::Truncated);
                    };
                    let raw = &input[value_start..value_end];
                    if raw.contains('<') {
                        xml_error!(TAG_ATTRIBUTE_BAD_VALUE);
                    }
                    attributes.push((attribute_name, decode(raw, false)?));
                    i = value_end + 1;
                }
            }
        }
    }
}
