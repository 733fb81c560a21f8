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

/// Error type for element edits which would break the tree invariants.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum ElementError {
    /// Attribute names must be unique within an element.
    #[error("attribute name already used in this tag: '{0}'")]
    DuplicateAttribute(String),
}
