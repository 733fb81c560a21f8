/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod dispatcher;
mod handler;

use std::fmt::Display;
use std::io::Write;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use log::debug;
use log::trace;
use log::warn;

use super::frames;
use super::requests::Pending;
use super::requests::PendingRequests;
use crate::Element;
use crate::SessionError;
use crate::Transport;
pub use dispatcher::Dispatcher;
pub use handler::SessionHandler;

/// Protocol state of a [Session].
///
/// The handshake moves through the states in declaration order, except
/// that authentication ends either in `AuthFailed` or continues with
/// `AuthenticatedWaitingForStream`. `Closed` can be entered from any
/// state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SessionState {
    Initial,
    WaitingForStream,
    WaitingForFeatures,
    Authenticating,
    AuthFailed,
    AuthenticatedWaitingForStream,
    AuthenticatedWaitingForFeatures,
    Ready,
    Closed,
}

impl SessionState {
    /// True for the states which are never left without a new session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::AuthFailed | SessionState::Closed)
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Initial => "initial",
            SessionState::WaitingForStream => "waiting_for_stream",
            SessionState::WaitingForFeatures => "waiting_for_features",
            SessionState::Authenticating => "authenticating",
            SessionState::AuthFailed => "auth_failed",
            SessionState::AuthenticatedWaitingForStream => "authenticated_waiting_for_stream",
            SessionState::AuthenticatedWaitingForFeatures => "authenticated_waiting_for_features",
            SessionState::Ready => "ready",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Account details fixed for the lifetime of a session.
pub(crate) struct Identity {
    pub(crate) host: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) resource: String,
    pub(crate) nick: String,
}

struct Shared {
    writer: Box<dyn Transport>,
    state: SessionState,
    jid: String,
    requests: PendingRequests,
}

impl Shared {
    fn write(&mut self, frame: &str) -> Result<(), SessionError> {
        trace!("SEND: {frame}");
        self.writer.write_all(frame.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!("state {} -> {}", self.state, state);
            self.state = state;
        }
    }
}

struct Inner {
    identity: Identity,
    shared: Mutex<Shared>,
    state_changed: Condvar,
}

/// Handle of a client session.
///
/// Handles are cheap to clone and can be used from any thread. Frames
/// are written synchronously by the calling thread; the transport and
/// the pending request map are guarded by a single lock which is never
/// held while application callbacks run.
///
/// Sessions are created with the [SessionBuilder](crate::SessionBuilder).
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    pub(crate) fn new(
        identity: Identity,
        jid: String,
        writer: Box<dyn Transport>,
        request_timeout: Option<Duration>,
    ) -> Session {
        Session {
            inner: Arc::new(Inner {
                identity,
                shared: Mutex::new(Shared {
                    writer,
                    state: SessionState::Initial,
                    jid,
                    requests: PendingRequests::new(request_timeout),
                }),
                state_changed: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // Callbacks never run under the lock, the data stays consistent
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn update_state(&self, shared: &mut Shared, state: SessionState) {
        shared.set_state(state);
        self.inner.state_changed.notify_all();
    }

    //
    // Observers
    //

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// The full JID assigned by the server, or the account JID before
    /// the resource is bound.
    pub fn jid(&self) -> String {
        self.lock().jid.clone()
    }

    pub fn username(&self) -> &str {
        &self.inner.identity.username
    }

    /// Nickname used in the chat rooms.
    pub fn nick(&self) -> &str {
        &self.inner.identity.nick
    }

    /// Blocks until the session enters `state`, a terminal state or the
    /// timeout passes. Returns true if `state` is reached.
    pub fn wait_for_state(&self, state: SessionState, timeout: Duration) -> bool {
        let shared = self.lock();
        let (shared, _) = self
            .inner
            .state_changed
            .wait_timeout_while(shared, timeout, |shared| {
                shared.state != state && !shared.state.is_terminal()
            })
            .unwrap_or_else(PoisonError::into_inner);
        shared.state == state
    }

    //
    // Outbound operations
    //

    /// Sends an `iq` request and registers a callback for its response.
    ///
    /// Returns the request id. The callback runs on the receive thread,
    /// at most once, when an `iq` with the same id arrives. It is dropped
    /// without being called if the request times out.
    pub fn issue_request<F>(
        &self,
        body: &str,
        kind: &str,
        to: Option<&str>,
        callback: F,
    ) -> Result<String, SessionError>
    where
        F: FnOnce(Element) + Send + 'static,
    {
        self.request(body, kind, to, Pending::User(Box::new(callback)))
    }

    fn request(
        &self,
        body: &str,
        kind: &str,
        to: Option<&str>,
        pending: Pending,
    ) -> Result<String, SessionError> {
        let mut shared = self.lock();
        let id = shared.requests.next_id();
        let frame = frames::iq(&id, kind, &self.inner.identity.username, to, body);
        shared.requests.insert(id.clone(), pending);
        if let Err(err) = shared.write(&frame) {
            shared.requests.take(&id);
            return Err(err);
        }
        Ok(id)
    }

    /// Sends a chat message.
    pub fn message(&self, to: &str, text: &str) -> Result<(), SessionError> {
        self.send(&frames::message(&self.inner.identity.username, to, text))
    }

    /// Sends a message to a chat room.
    pub fn group_chat(&self, room: &str, text: &str) -> Result<(), SessionError> {
        self.send(&frames::group_chat(&self.inner.identity.username, room, text))
    }

    /// Changes the subject of a chat room.
    pub fn subject(&self, room: &str, text: &str) -> Result<(), SessionError> {
        self.send(&frames::subject(&self.inner.identity.username, room, text))
    }

    /// Enters a chat room with the session nickname.
    ///
    /// Returns the id of the presence stanza. No callback is registered,
    /// correlating the server's answer is up to the caller.
    pub fn join_room(&self, room: &str, password: Option<&str>) -> Result<String, SessionError> {
        let mut shared = self.lock();
        let id = shared.requests.next_id();
        let frame = frames::join_room(
            &shared.jid,
            &id,
            room,
            &self.inner.identity.nick,
            password,
        );
        shared.write(&frame)?;
        Ok(id)
    }

    /// Leaves a chat room, returning the id of the presence stanza.
    pub fn leave_room(&self, room: &str) -> Result<String, SessionError> {
        let mut shared = self.lock();
        let id = shared.requests.next_id();
        let frame = frames::leave_room(&shared.jid, &id, room, &self.inner.identity.nick);
        shared.write(&frame)?;
        Ok(id)
    }

    /// Writes a raw frame as is.
    pub fn send(&self, frame: &str) -> Result<(), SessionError> {
        self.lock().write(frame)
    }

    /// Ends the stream and shuts the transport down.
    ///
    /// Closing an already closed session does nothing.
    pub fn close(&self) -> Result<(), SessionError> {
        let mut shared = self.lock();
        if shared.state == SessionState::Closed {
            return Ok(());
        }
        self.update_state(&mut shared, SessionState::Closed);
        let result = shared.write(frames::stream_close());
        shared.writer.shutdown()?;
        result
    }

    //
    // Handshake steps, driven by the dispatcher
    //

    /// Sends the stream header and waits for the server's one.
    pub(super) fn open_stream(&self, next: SessionState) -> Result<(), SessionError> {
        let mut shared = self.lock();
        shared.write(&frames::stream_open(&self.inner.identity.host))?;
        self.update_state(&mut shared, next);
        Ok(())
    }

    pub(super) fn set_state(&self, state: SessionState) {
        let mut shared = self.lock();
        self.update_state(&mut shared, state);
    }

    pub(super) fn set_jid(&self, jid: &str) {
        self.lock().jid = jid.to_string();
    }

    pub(super) fn authenticate(&self) -> Result<(), SessionError> {
        let identity = &self.inner.identity;
        let mut shared = self.lock();
        shared.write(&frames::auth(&identity.username, &identity.password))?;
        self.update_state(&mut shared, SessionState::Authenticating);
        Ok(())
    }

    pub(super) fn request_bind(&self) -> Result<(), SessionError> {
        let body = frames::bind(&self.inner.identity.resource);
        self.request(&body, "set", None, Pending::Bind)?;
        Ok(())
    }

    pub(super) fn request_session(&self) -> Result<(), SessionError> {
        self.request(&frames::session(), "set", None, Pending::Session)?;
        Ok(())
    }

    pub(super) fn send_initial_presence(&self) -> Result<(), SessionError> {
        let mut shared = self.lock();
        shared.write(frames::presence())?;
        self.update_state(&mut shared, SessionState::Ready);
        Ok(())
    }

    pub(super) fn take_request(&self, id: &str) -> Option<Pending> {
        self.lock().requests.take(id)
    }

    /// Enters the closed state after the receive side ended.
    pub(super) fn mark_closed(&self) {
        let mut shared = self.lock();
        if shared.state != SessionState::Closed {
            self.update_state(&mut shared, SessionState::Closed);
            if let Err(err) = shared.writer.shutdown() {
                warn!("cannot shut the transport down: {err}");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_requests(&self) -> usize {
        self.lock().requests.len()
    }
}
