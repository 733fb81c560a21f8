/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;

use std::fmt::Display;
use std::str::FromStr;

pub use error::BadJid;
use error::description;

const MAX_PART_SIZE: usize = 1023;

fn check_part(
    part: &str,
    empty: &'static str,
    too_long: &'static str,
) -> Result<(), BadJid> {
    if part.is_empty() {
        return Err(BadJid(empty));
    }
    if part.len() > MAX_PART_SIZE {
        return Err(BadJid(too_long));
    }
    Ok(())
}

fn check_resource(resource: &str) -> Result<(), BadJid> {
    check_part(
        resource,
        description::RESOURCE_EMPTY,
        description::RESOURCE_TOO_LONG,
    )
}

/// The address of an entity in the XMPP protocol.
///
/// Each JID has three parts:
/// - Local part: Optionally identifies an account on the domain.
/// - Domain part: Identifies an XMPP server.
/// - Resource part: Optionally identifies a connected client of the account.
///
/// More details can be found in [RFC7622](https://datatracker.ietf.org/doc/rfc7622/)
///
/// # Examples
///
/// ```
/// use jabbot::Jid;
///
/// let jid = Jid::new("echobot@example.com/bot").unwrap();
/// assert_eq!(jid.localpart(), Some("echobot"));
/// assert_eq!(jid.domainpart(), "example.com");
/// assert_eq!(jid.bare(), "echobot@example.com");
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Jid {
    local: Option<String>,
    domain: String,
    resource: Option<String>,
}

impl Jid {
    /// Parses and validates a JID text.
    pub fn new(jid: &str) -> Result<Jid, BadJid> {
        // Resource may contain '@' and '/', so it is split off first
        let (bare, resource) = match jid.split_once('/') {
            Some((bare, resource)) => (bare, Some(resource)),
            None => (jid, None),
        };
        let (local, domain) = match bare.split_once('@') {
            Some((local, domain)) => (Some(local), domain),
            None => (None, bare),
        };

        check_part(
            domain,
            description::DOMAIN_EMPTY,
            description::DOMAIN_TOO_LONG,
        )?;
        // Final dot is removed as per RFC 7622 section 3.2
        let domain = domain.strip_suffix('.').unwrap_or(domain);
        if let Some(local) = local {
            check_part(local, description::LOCAL_EMPTY, description::LOCAL_TOO_LONG)?;
        }
        if bare.chars().any(char::is_whitespace) {
            return Err(BadJid(description::WHITESPACE));
        }
        if let Some(resource) = resource {
            check_resource(resource)?;
        }

        Ok(Jid {
            local: local.map(str::to_string),
            domain: domain.to_string(),
            resource: resource.map(str::to_string),
        })
    }

    pub fn localpart(&self) -> Option<&str> {
        self.local.as_deref()
    }

    pub fn domainpart(&self) -> &str {
        &self.domain
    }

    pub fn resourcepart(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// True if the JID does not contain a resource part.
    pub fn is_bare(&self) -> bool {
        self.resource.is_none()
    }

    /// Bare form of the JID without the resource part.
    pub fn bare(&self) -> String {
        match &self.local {
            Some(local) => format!("{}@{}", local, self.domain),
            None => self.domain.clone(),
        }
    }

    /// Full form of the JID with all the parts.
    pub fn full(&self) -> String {
        self.to_string()
    }

    /// Creates another JID by overriding the resource part.
    pub fn with_resource(self, resource: &str) -> Result<Jid, BadJid> {
        check_resource(resource)?;
        Ok(Jid {
            resource: Some(resource.to_string()),
            ..self
        })
    }
}

impl Display for Jid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(local) = &self.local {
            write!(f, "{local}@")?;
        }
        f.write_str(&self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}

impl FromStr for Jid {
    type Err = BadJid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Jid::new(s)
    }
}
