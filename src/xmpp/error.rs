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

use super::jid::BadJid;
use crate::Location;
use crate::ParseError;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Connecting, reading or writing the transport failed.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// The server sent text which is not a valid XML stream.
    #[error("{error} at {location}")]
    Parse {
        error: ParseError,
        location: Location,
    },

    #[error(transparent)]
    BadJid(#[from] BadJid),

    /// The account JID has no local part to authenticate with.
    #[error("JabberID has no username: '{0}'")]
    NoUsername(String),

    /// The server name did not resolve to any address.
    #[error("no address found for server '{0}'")]
    NoAddress(String),
}
