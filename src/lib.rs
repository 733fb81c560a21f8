/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod element;
mod entities;
mod parser;
#[cfg(feature = "xmpp")]
mod xmpp;

pub use element::Element;
pub use element::ElementError;
pub use element::Pretty;

pub use parser::Location;
pub use parser::ParseError;
pub use parser::StanzaParser;
pub use parser::StreamElement;

#[cfg(feature = "xmpp")]
pub use xmpp::BadJid;
#[cfg(feature = "xmpp")]
pub use xmpp::Dispatcher;
#[cfg(feature = "xmpp")]
pub use xmpp::Jid;
#[cfg(feature = "xmpp")]
pub use xmpp::Session;
#[cfg(feature = "xmpp")]
pub use xmpp::SessionBuilder;
#[cfg(feature = "xmpp")]
pub use xmpp::SessionError;
#[cfg(feature = "xmpp")]
pub use xmpp::SessionHandler;
#[cfg(feature = "xmpp")]
pub use xmpp::SessionState;
#[cfg(feature = "xmpp")]
pub use xmpp::Transport;
#[cfg(feature = "xmpp")]
pub use xmpp::XMPP_CLIENT_PORT;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
