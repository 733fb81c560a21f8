/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use thiserror::Error;

/// Fatal error returned from the [StanzaParser](super::StanzaParser).
///
/// Input which simply ends in the middle of a tag is not an error, the
/// parser keeps it until the rest arrives. Anything reported here means
/// the stream cannot be parsed any further: the parser refuses more
/// input and the session on top of it has to be restarted.
///
/// Position of the problem is available via the
/// [location()](super::StanzaParser::location) method.
#[derive(Debug, Error, Eq, PartialEq, Copy, Clone)]
pub enum ParseError {
    /// A syntax or well-formedness error is encountered in the input.
    #[error("invalid XML syntax: {0}")]
    BadXml(&'static str),

    /// Input was given after a previous error.
    #[error("cannot continue after an error without a reset")]
    NeedsReset,
}

pub(super) mod description {
    pub(in super::super) const UTF8_INVALID: &str = "Invalid UTF8 sequence";
    pub(in super::super) const CHAR_INVALID: &str = "Invalid XML character";
    pub(in super::super) const TAG_WHITESPACE_START: &str = "Tag cannot start with whitespace";
    pub(in super::super) const TAG_EMPTY_NAME: &str = "Tag has no name";
    pub(in super::super) const TAG_BAD_NAME: &str = "Tag names cannot have '<', quotes or '='";
    pub(in super::super) const TAG_END_TAG_ATTRIBUTES: &str = "End tag cannot have attributes";
    pub(in super::super) const TAG_EMPTY_TAG_MISSING_END: &str =
        "Empty element tags must end after the '/'";
    pub(in super::super) const TAG_ATTRIBUTE_WITHOUT_EQUAL: &str =
        "Tag attributes must have '=' before the value";
    pub(in super::super) const TAG_ATTRIBUTE_WITHOUT_QUOTE: &str =
        "Tag attribute value must be double or single quotes";
    pub(in super::super) const TAG_ATTRIBUTE_BAD_NAME: &str =
        "Tag attribute names cannot have '/', '<' or '>'";
    pub(in super::super) const TAG_ATTRIBUTE_BAD_VALUE: &str =
        "Tag value cannot have '<' character without a reference";
    pub(in super::super) const TAG_DUPLICATE_ATTRIBUTE: &str =
        "Attribute name already used in this tag";
    pub(in super::super) const TAG_MISMATCH: &str = "Start and end tags have different names";
    pub(in super::super) const TAG_UNEXPECTED_END: &str = "Unexpected end tag";
    pub(in super::super) const REFERENCE_INVALID_DECIMAL: &str =
        "Non digit in decimal character reference";
    pub(in super::super) const REFERENCE_INVALID_HEX: &str =
        "Non hex digit in hexadecimal character reference";
    pub(in super::super) const REFERENCE_CUSTOM_ENTITY: &str =
        "Non-predefined entity references are not supported";
    pub(in super::super) const REFERENCE_MISSING_END: &str = "Reference must end with ';'";
    pub(in super::super) const MARKUP_DOCTYPE_NOT_ALLOWED: &str =
        "Document type declarations are not allowed in a stream";
    pub(in super::super) const MARKUP_UNRECOGNIZED: &str =
        "Markup is not a comment or character data section";
}
