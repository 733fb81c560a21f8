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
use std::io::Read;

use log::debug;
use log::error;
use log::info;
use log::trace;
use log::warn;

use super::Session;
use super::SessionHandler;
use super::SessionState;
use crate::Element;
use crate::Jid;
use crate::ParseError;
use crate::SessionError;
use crate::StanzaParser;
use crate::StreamElement;
use crate::xmpp::constants::BIND_TAG;
use crate::xmpp::constants::BODY_TAG;
use crate::xmpp::constants::ERROR_TAG;
use crate::xmpp::constants::FAILURE_TAG;
use crate::xmpp::constants::FEATURES_TAG;
use crate::xmpp::constants::IQ_TAG;
use crate::xmpp::constants::JID_TAG;
use crate::xmpp::constants::MESSAGE_TAG;
use crate::xmpp::constants::PRESENCE_TAG;
use crate::xmpp::constants::RESULT_TYPE;
use crate::xmpp::constants::STREAM_NS;
use crate::xmpp::constants::STREAM_TAG;
use crate::xmpp::constants::SUCCESS_TAG;
use crate::xmpp::requests::Pending;

const READ_BUFFER_SIZE: usize = 4096;

enum Flow {
    Continue,
    /// The stream was restarted, the rest of the old stream is stale.
    Restart,
    Stop,
}

fn report(result: Result<(), SessionError>) {
    if let Err(err) = result {
        error!("cannot write to the server: {err}");
    }
}

/// Receive side of a session.
///
/// Owns the stanza parser and the application handler. Incoming text is
/// parsed, and every completed stanza either advances the handshake,
/// completes a pending request or is passed to the handler.
///
/// [SessionBuilder::connect()](crate::SessionBuilder::connect) runs a
/// dispatcher on its own thread. A dispatcher from
/// [SessionBuilder::attach()](crate::SessionBuilder::attach) can be fed
/// directly for custom transports.
pub struct Dispatcher<H: SessionHandler> {
    session: Session,
    handler: H,
    parser: StanzaParser,
    closed: bool,
}

impl<H: SessionHandler> Dispatcher<H> {
    pub(crate) fn new(session: Session, handler: H) -> Dispatcher<H> {
        Dispatcher {
            session,
            handler,
            parser: StanzaParser::new(),
            closed: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// True after the stream ended, nothing is processed anymore.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Processes the next piece of stream text.
    ///
    /// A parse error closes the session and is returned.
    pub fn receive(&mut self, text: &str) -> Result<(), SessionError> {
        self.receive_with(|parser| parser.feed(text))
    }

    /// Processes raw transport bytes, see [receive()](Dispatcher::receive).
    pub fn receive_bytes(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        self.receive_with(|parser| parser.feed_bytes(bytes))
    }

    /// Reads the transport until the stream ends, then returns the
    /// handler.
    pub fn run<R: Read>(mut self, mut reader: R) -> H {
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        while !self.closed {
            match reader.read(&mut buffer) {
                Ok(0) => {
                    info!("connection closed by the server");
                    break;
                }
                Ok(n) => {
                    trace!("RECV: {}", String::from_utf8_lossy(&buffer[..n]));
                    if self.receive_bytes(&buffer[..n]).is_err() {
                        break;
                    }
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    warn!("read error: {err}");
                }
                Err(err) => {
                    warn!("read error: {err}");
                    break;
                }
            }
        }
        self.finish();
        self.handler
    }

    fn receive_with<F>(&mut self, feed: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut StanzaParser) -> Result<(), ParseError>,
    {
        if self.closed {
            debug!("session is closed, input ignored");
            return Ok(());
        }
        let fed = feed(&mut self.parser).map_err(|error| SessionError::Parse {
            error,
            location: self.parser.location(),
        });
        match self.drain() {
            Flow::Continue => (),
            Flow::Restart | Flow::Stop => return Ok(()),
        }
        if let Err(err) = fed {
            error!("closing the session: {err}");
            self.finish();
            return Err(err);
        }
        Ok(())
    }

    fn drain(&mut self) -> Flow {
        while let Some(item) = self.parser.pop() {
            let flow = match item {
                StreamElement::Element(stanza) => self.dispatch(stanza),
                StreamElement::End => {
                    info!("stream closed by the server");
                    self.finish();
                    Flow::Stop
                }
            };
            match flow {
                Flow::Continue => (),
                Flow::Restart => {
                    let stale = self.parser.len();
                    if stale > 0 {
                        debug!("dropping {stale} stanzas of the previous stream");
                    }
                    self.parser = StanzaParser::new();
                    return Flow::Restart;
                }
                Flow::Stop => return Flow::Stop,
            }
        }
        Flow::Continue
    }

    fn dispatch(&mut self, stanza: Element) -> Flow {
        debug!("received:\n{}", stanza.pretty());
        if stanza.tag() == IQ_TAG {
            self.handle_iq(stanza);
            return Flow::Continue;
        }

        let state = self.session.state();
        match (state, stanza.tag()) {
            (SessionState::WaitingForStream, STREAM_TAG) => {
                self.session.set_state(SessionState::WaitingForFeatures);
            }
            (SessionState::WaitingForFeatures, FEATURES_TAG) => {
                report(self.session.authenticate());
            }
            (SessionState::Authenticating, SUCCESS_TAG) => {
                info!("authenticated as {}", self.session.username());
                report(
                    self.session
                        .open_stream(SessionState::AuthenticatedWaitingForStream),
                );
                return Flow::Restart;
            }
            (SessionState::Authenticating, FAILURE_TAG) => {
                let reason = stanza.children().first().map_or("unknown", |c| c.tag());
                warn!("authentication failed: {reason}");
                self.session.set_state(SessionState::AuthFailed);
                self.handler.handle_auth_failed(&self.session, &stanza);
            }
            (SessionState::AuthenticatedWaitingForStream, STREAM_TAG) => {
                self.session
                    .set_state(SessionState::AuthenticatedWaitingForFeatures);
            }
            (SessionState::AuthenticatedWaitingForFeatures, FEATURES_TAG) => {
                report(self.session.request_bind());
            }
            (SessionState::Ready, MESSAGE_TAG) => {
                let from = stanza.attribute("from").unwrap_or("");
                let body = stanza.find_child(BODY_TAG).map_or("", |body| body.text());
                self.handler.handle_message(&self.session, from, body);
            }
            (SessionState::Ready, PRESENCE_TAG) => {
                self.handler.handle_presence(&self.session, &stanza);
            }
            (_, ERROR_TAG) if stanza.namespace() == STREAM_NS => {
                let condition = stanza.children().first().map_or("unknown", |c| c.tag());
                warn!("stream error: {condition}");
                self.handler.handle_stream_error(&self.session, &stanza);
            }
            (state, tag) => {
                warn!("ignoring <{tag}> in state {state}");
            }
        }
        Flow::Continue
    }

    fn handle_iq(&mut self, stanza: Element) {
        let Some(id) = stanza.attribute("id").map(str::to_string) else {
            warn!("dropping iq without an id");
            return;
        };
        match self.session.take_request(&id) {
            Some(Pending::Bind) => self.handle_bind(&stanza),
            Some(Pending::Session) => self.handle_session(&stanza),
            Some(Pending::User(callback)) => callback(stanza),
            None => warn!("dropping iq with unknown id '{id}'"),
        }
    }

    fn handle_bind(&mut self, response: &Element) {
        if response.attribute("type") != Some(RESULT_TYPE) {
            warn!("resource binding failed");
            return;
        }
        let jid = response
            .find_child(BIND_TAG)
            .and_then(|bind| bind.find_child(JID_TAG))
            .map(|jid| jid.text());
        match jid.map(Jid::new) {
            Some(Ok(jid)) => {
                info!("bound to {jid}");
                self.session.set_jid(&jid.full());
            }
            Some(Err(err)) => warn!("ignoring bound jid: {err}"),
            None => warn!("no jid in the bind result"),
        }
        report(self.session.request_session());
    }

    fn handle_session(&mut self, response: &Element) {
        if response.attribute("type") != Some(RESULT_TYPE) {
            warn!("session establishment failed");
            return;
        }
        match self.session.send_initial_presence() {
            Ok(()) => {
                info!("logged in as {}", self.session.jid());
                self.handler.handle_logged_in(&self.session);
            }
            Err(err) => report(Err(err)),
        }
    }

    fn finish(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.session.mark_closed();
        self.handler.handle_closed(&self.session);
    }
}
