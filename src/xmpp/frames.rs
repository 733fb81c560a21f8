/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Outbound wire frames.
//!
//! Servers in the wild are picky about these, so they are written out as
//! literal text rather than serialized from element trees. Every value
//! substituted into a frame is escaped.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as Base64;

use super::constants::BIND_NS;
use super::constants::CLIENT_NS;
use super::constants::MUC_NS;
use super::constants::SASL_NS;
use super::constants::SESSION_NS;
use super::constants::STREAM_NS;
use crate::entities::escaped;

pub(super) fn stream_open(host: &str) -> String {
    format!(
        "<?xml version='1.0'?><stream:stream to='{}' version='1.0' xmlns='{CLIENT_NS}' xmlns:stream='{STREAM_NS}'>",
        escaped(host)
    )
}

pub(super) fn stream_close() -> &'static str {
    "</stream:stream>"
}

/// SASL PLAIN credentials as described in RFC 4616, without an
/// authorization identity.
pub(super) fn auth(username: &str, password: &str) -> String {
    let key = format!("\0{username}\0{password}");
    format!(
        "<auth xmlns='{SASL_NS}' mechanism='PLAIN'>{}</auth>",
        Base64.encode(key)
    )
}

pub(super) fn iq(id: &str, kind: &str, from: &str, to: Option<&str>, body: &str) -> String {
    let to_clause = match to {
        Some(to) if !to.is_empty() => format!(" to='{}'", escaped(to)),
        _ => String::new(),
    };
    format!(
        "<iq id='{}' type='{}' from='{}'{to_clause}>{body}</iq>",
        escaped(id),
        escaped(kind),
        escaped(from),
    )
}

pub(super) fn bind(resource: &str) -> String {
    format!(
        "<bind xmlns='{BIND_NS}'><resource>{}</resource></bind>",
        escaped(resource)
    )
}

pub(super) fn session() -> String {
    format!("<session xmlns='{SESSION_NS}'/>")
}

pub(super) fn presence() -> &'static str {
    "<presence><show/></presence>"
}

pub(super) fn message(from: &str, to: &str, text: &str) -> String {
    format!(
        "<message from='{}' to='{}' xml:lang='en'><body>{}</body></message>",
        escaped(from),
        escaped(to),
        escaped(text)
    )
}

pub(super) fn group_chat(from: &str, to: &str, text: &str) -> String {
    format!(
        "<message from='{}' to='{}' type='groupchat' xml:lang='en'><body>{}</body></message>",
        escaped(from),
        escaped(to),
        escaped(text)
    )
}

pub(super) fn subject(from: &str, room: &str, text: &str) -> String {
    format!(
        "<message from='{}' to='{}' type='groupchat' xml:lang='en'><subject>{}</subject></message>",
        escaped(from),
        escaped(room),
        escaped(text)
    )
}

pub(super) fn join_room(
    jid: &str,
    id: &str,
    room: &str,
    nick: &str,
    password: Option<&str>,
) -> String {
    let x = match password {
        Some(password) => format!(
            "<x xmlns='{MUC_NS}'><password>{}</password></x>",
            escaped(password)
        ),
        None => format!("<x xmlns='{MUC_NS}'/>"),
    };
    format!(
        "<presence from='{}' id='{}' to='{}/{}'>{x}</presence>",
        escaped(jid),
        escaped(id),
        escaped(room),
        escaped(nick)
    )
}

pub(super) fn leave_room(jid: &str, id: &str, room: &str, nick: &str) -> String {
    format!(
        "<presence from='{}' id='{}' to='{}/{}' type='unavailable'/>",
        escaped(jid),
        escaped(id),
        escaped(room),
        escaped(nick)
    )
}
