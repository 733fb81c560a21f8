/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

pub mod predefined {
    pub const LT: &str = "&lt;";
    pub const GT: &str = "&gt;";
    pub const AMP: &str = "&amp;";
    pub const APOS: &str = "&apos;";
    pub const QUOT: &str = "&quot;";
}

fn replacement(c: char) -> Option<&'static str> {
    match c {
        '<' => Some(predefined::LT),
        '>' => Some(predefined::GT),
        '&' => Some(predefined::AMP),
        '\'' => Some(predefined::APOS),
        '"' => Some(predefined::QUOT),
        _ => None,
    }
}

/// Resolves a predefined entity name (without the `&` and `;`).
pub fn predefined_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

pub fn escaped_size(s: &str) -> usize {
    s.chars()
        .map(|c| replacement(c).map_or(c.len_utf8(), str::len))
        .sum()
}

pub fn escape(s: &str, buf: &mut String) {
    let mut back = 0;
    for (pos, c) in s.char_indices() {
        if let Some(rep) = replacement(c) {
            buf.push_str(&s[back..pos]);
            buf.push_str(rep);
            back = pos + 1;
        }
    }
    buf.push_str(&s[back..]);
}

pub fn escape_fmt(s: &str, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut back = 0;
    for (pos, c) in s.char_indices() {
        if let Some(rep) = replacement(c) {
            f.write_str(&s[back..pos])?;
            f.write_str(rep)?;
            back = pos + 1;
        }
    }
    f.write_str(&s[back..])
}

/// Returns an escaped copy, for substituting values into frame templates.
pub fn escaped(s: &str) -> String {
    let mut buf = String::with_capacity(escaped_size(s));
    escape(s, &mut buf);
    buf
}
