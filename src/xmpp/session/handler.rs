/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::Session;
use crate::Element;

/// Application hooks called from the receive path.
///
/// All methods have empty default implementations, so a bot only
/// implements what it cares about. They run on the receive thread and
/// block further stanza processing until they return. The session handle
/// can be used freely inside them to send replies.
pub trait SessionHandler {
    /// A chat message arrived after the session became ready.
    ///
    /// `body` is empty if the message has no body, e.g. a chat state
    /// notification.
    fn handle_message(&mut self, _session: &Session, _from: &str, _body: &str) {}

    /// A presence stanza arrived after the session became ready.
    fn handle_presence(&mut self, _session: &Session, _presence: &Element) {}

    /// Resource is bound, the session is established and initial presence
    /// is sent.
    fn handle_logged_in(&mut self, _session: &Session) {}

    /// The server rejected the credentials. The session stays in the
    /// failed state; retrying is up to the application.
    fn handle_auth_failed(&mut self, _session: &Session, _failure: &Element) {}

    /// The server reported a stream level error. It normally closes the
    /// stream right after.
    fn handle_stream_error(&mut self, _session: &Session, _error: &Element) {}

    /// The stream is over, nothing more will be received.
    fn handle_closed(&mut self, _session: &Session) {}
}
