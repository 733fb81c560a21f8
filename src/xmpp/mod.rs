/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod client;
pub(crate) mod constants;
mod error;
mod frames;
mod jid;
mod requests;
mod session;

pub use client::SessionBuilder;
pub use client::Transport;
pub use constants::CLIENT_PORT as XMPP_CLIENT_PORT;
pub use error::SessionError;
pub use jid::BadJid;
pub use jid::Jid;
pub use session::Dispatcher;
pub use session::Session;
pub use session::SessionHandler;
pub use session::SessionState;
