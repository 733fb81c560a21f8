/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::io::ErrorKind;
use std::io::Write;
use std::net::Shutdown;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::thread;
use std::time::Duration;

use log::debug;
use log::info;

use super::constants::CLIENT_PORT;
use super::constants::DEFAULT_RESOURCE;
use super::session::Identity;
use crate::Dispatcher;
use crate::Jid;
use crate::Session;
use crate::SessionError;
use crate::SessionHandler;
use crate::SessionState;

/// Outbound half of a connection to the server.
pub trait Transport: Write + Send {
    /// Closes the connection in both directions, which also ends the
    /// receive loop reading the other half.
    fn shutdown(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Transport for TcpStream {
    fn shutdown(&mut self) -> std::io::Result<()> {
        match TcpStream::shutdown(&*self, Shutdown::Both) {
            Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
            result => result,
        }
    }
}

fn needs_port(host: &str) -> bool {
    // IPv6 literals have colons inside the brackets
    match (host.rfind(':'), host.rfind(']')) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(colon), Some(bracket)) => colon < bracket,
    }
}

/// Configures and opens a [Session].
///
/// # Examples
///
/// ```no_run
/// use jabbot::{Jid, SessionBuilder, SessionHandler};
///
/// struct Quiet;
/// impl SessionHandler for Quiet {}
///
/// let jid = Jid::new("echobot@localhost").unwrap();
/// let session = SessionBuilder::new(jid)
///     .password("echobot")
///     .connect(Quiet)
///     .unwrap();
/// session.message("juliet@localhost", "hello").unwrap();
/// ```
pub struct SessionBuilder {
    jid: Jid,
    server: Option<String>,
    password: String,
    resource: Option<String>,
    nick: Option<String>,
    connection_timeout: Duration,
    request_timeout: Option<Duration>,
}

impl SessionBuilder {
    pub fn new(jid: Jid) -> Self {
        SessionBuilder {
            jid,
            server: None,
            password: String::new(),
            resource: None,
            nick: None,
            connection_timeout: Duration::from_secs(30),
            request_timeout: Some(Duration::from_secs(300)),
        }
    }

    /// Server address to connect, `host` or `host:port`. The domain of
    /// the account JID is used if not given.
    pub fn server(mut self, server: Option<String>) -> Self {
        self.server = server;
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    /// Resource to bind, overriding the one in the account JID.
    pub fn resource(mut self, resource: &str) -> Self {
        self.resource = Some(resource.to_string());
        self
    }

    /// Nickname in the chat rooms, defaults to the username.
    pub fn nick(mut self, nick: &str) -> Self {
        self.nick = Some(nick.to_string());
        self
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// How long request callbacks wait for a response. `None` keeps them
    /// until the session ends.
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn identity(&self) -> Result<Identity, SessionError> {
        let Some(username) = self.jid.localpart() else {
            return Err(SessionError::NoUsername(self.jid.full()));
        };
        let resource = match (&self.resource, self.jid.resourcepart()) {
            (Some(resource), _) => resource.as_str(),
            (None, Some(resource)) => resource,
            (None, None) => DEFAULT_RESOURCE,
        };
        Ok(Identity {
            host: self.jid.domainpart().to_string(),
            username: username.to_string(),
            password: self.password.clone(),
            resource: resource.to_string(),
            nick: self.nick.as_deref().unwrap_or(username).to_string(),
        })
    }

    /// Starts a session over an already established transport.
    ///
    /// The stream header is sent right away. Everything read from the
    /// transport has to be given to the returned dispatcher.
    pub fn attach<W, H>(self, writer: W, handler: H) -> Result<(Session, Dispatcher<H>), SessionError>
    where
        W: Transport + 'static,
        H: SessionHandler,
    {
        let identity = self.identity()?;
        let session = Session::new(
            identity,
            self.jid.full(),
            Box::new(writer),
            self.request_timeout,
        );
        session.open_stream(SessionState::WaitingForStream)?;
        let dispatcher = Dispatcher::new(session.clone(), handler);
        Ok((session, dispatcher))
    }

    /// Connects to the server and starts the session.
    ///
    /// Stanzas are received and dispatched on a background thread until
    /// the stream ends. The call returns as soon as the stream header is
    /// sent; use [Session::wait_for_state()] to wait for the login.
    pub fn connect<H>(self, handler: H) -> Result<Session, SessionError>
    where
        H: SessionHandler + Send + 'static,
    {
        let host = match &self.server {
            Some(server) => server.clone(),
            None => self.jid.domainpart().to_string(),
        };
        // Resolver requires a port but has no way to give a default one
        let mut addresses = if needs_port(&host) {
            (host.as_str(), CLIENT_PORT).to_socket_addrs()
        } else {
            host.to_socket_addrs()
        }?;
        let address = addresses
            .next()
            .ok_or_else(|| SessionError::NoAddress(host.clone()))?;
        info!("connecting to {host} ({address})");
        let stream = TcpStream::connect_timeout(&address, self.connection_timeout)?;
        let reader = stream.try_clone()?;

        let (session, dispatcher) = self.attach(stream, handler)?;
        thread::Builder::new()
            .name("jabbot-receive".to_string())
            .spawn(move || {
                dispatcher.run(reader);
                debug!("receive thread finished");
            })?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_detection() {
        assert!(needs_port("localhost"));
        assert!(needs_port("192.168.1.2"));
        assert!(needs_port("[::1]"));
        assert!(!needs_port("localhost:5223"));
        assert!(!needs_port("[::1]:5222"));
    }

    #[test]
    fn identity_defaults() {
        let builder = SessionBuilder::new(Jid::new("echobot@localhost").unwrap());
        let identity = builder.identity().unwrap();
        assert_eq!(identity.host, "localhost");
        assert_eq!(identity.username, "echobot");
        assert_eq!(identity.resource, "bot");
        assert_eq!(identity.nick, "echobot");

        let builder = SessionBuilder::new(Jid::new("echobot@localhost/desk").unwrap())
            .password("secret")
            .nick("Echo");
        let identity = builder.identity().unwrap();
        assert_eq!(identity.resource, "desk");
        assert_eq!(identity.password, "secret");
        assert_eq!(identity.nick, "Echo");

        let builder = SessionBuilder::new(Jid::new("echobot@localhost/desk").unwrap())
            .resource("lab");
        assert_eq!(builder.identity().unwrap().resource, "lab");
    }

    #[test]
    fn no_username() {
        let builder = SessionBuilder::new(Jid::new("localhost").unwrap());
        assert!(matches!(
            builder.identity(),
            Err(SessionError::NoUsername(jid)) if jid == "localhost"
        ));
    }
}
