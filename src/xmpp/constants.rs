/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

pub const CLIENT_PORT: u16 = 5222;

pub const CLIENT_NS: &str = "jabber:client";

pub const STREAM_NS: &str = "http://etherx.jabber.org/streams";

pub const SASL_NS: &str = "urn:ietf:params:xml:ns:xmpp-sasl";

pub const BIND_NS: &str = "urn:ietf:params:xml:ns:xmpp-bind";

pub const SESSION_NS: &str = "urn:ietf:params:xml:ns:xmpp-session";

pub const MUC_NS: &str = "http://jabber.org/protocol/muc";

pub const DEFAULT_RESOURCE: &str = "bot";

//
// Local names of the stanzas driving the session
//

pub const STREAM_TAG: &str = "stream";

pub const FEATURES_TAG: &str = "features";

pub const SUCCESS_TAG: &str = "success";

pub const FAILURE_TAG: &str = "failure";

pub const ERROR_TAG: &str = "error";

pub const IQ_TAG: &str = "iq";

pub const MESSAGE_TAG: &str = "message";

pub const PRESENCE_TAG: &str = "presence";

pub const BIND_TAG: &str = "bind";

pub const JID_TAG: &str = "jid";

pub const BODY_TAG: &str = "body";

pub const RESULT_TYPE: &str = "result";
