/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

use log::warn;

use crate::Element;

/// One-shot callback for the response of an `iq` request.
pub type ResponseCallback = Box<dyn FnOnce(Element) + Send + 'static>;

/// What to do when the response of a request arrives.
pub(super) enum Pending {
    /// Resource binding issued by the session itself.
    Bind,
    /// Session establishment issued by the session itself.
    Session,
    User(ResponseCallback),
}

struct Entry {
    pending: Pending,
    issued: Instant,
}

/// Request ids waiting for their responses.
///
/// Ids are `id0`, `id1`, ... and never reused. Entries older than the
/// timeout are dropped whenever the map is touched.
pub(super) struct PendingRequests {
    counter: u64,
    entries: HashMap<String, Entry>,
    timeout: Option<Duration>,
}

impl PendingRequests {
    pub(super) fn new(timeout: Option<Duration>) -> PendingRequests {
        PendingRequests {
            counter: 0,
            entries: HashMap::new(),
            timeout,
        }
    }

    pub(super) fn next_id(&mut self) -> String {
        let id = format!("id{}", self.counter);
        self.counter += 1;
        id
    }

    pub(super) fn insert(&mut self, id: String, pending: Pending) {
        self.expire(Instant::now());
        self.entries.insert(
            id,
            Entry {
                pending,
                issued: Instant::now(),
            },
        );
    }

    /// Removes and returns the entry waiting for `id`.
    pub(super) fn take(&mut self, id: &str) -> Option<Pending> {
        self.expire(Instant::now());
        self.entries.remove(id).map(|entry| entry.pending)
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    fn expire(&mut self, now: Instant) {
        let Some(timeout) = self.timeout else {
            return;
        };
        self.entries.retain(|id, entry| {
            let alive = now.duration_since(entry.issued) < timeout;
            if !alive {
                warn!("request {id} expired without a response");
            }
            alive
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;

    #[test]
    fn ids() {
        let mut requests = PendingRequests::new(None);
        assert_eq!(requests.next_id(), "id0");
        assert_eq!(requests.next_id(), "id1");
        assert_eq!(requests.next_id(), "id2");
        assert_eq!(requests.len(), 0);
    }

    #[test]
    fn take_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut requests = PendingRequests::new(None);
        let id = requests.next_id();
        let counter = calls.clone();
        requests.insert(
            id.clone(),
            Pending::User(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );
        let bind_id = requests.next_id();
        requests.insert(bind_id, Pending::Bind);
        assert_eq!(requests.len(), 2);

        assert!(requests.take("id9").is_none());
        match requests.take(&id) {
            Some(Pending::User(callback)) => callback(Element::new("iq")),
            _ => panic!("user callback expected"),
        }
        assert!(requests.take(&id).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(requests.take("id1"), Some(Pending::Bind)));
        assert_eq!(requests.len(), 0);
    }

    #[test]
    fn expiry() {
        let mut requests = PendingRequests::new(Some(Duration::ZERO));
        let id = requests.next_id();
        requests.insert(id.clone(), Pending::Session);
        assert!(requests.take(&id).is_none());
        assert_eq!(requests.len(), 0);

        let mut requests = PendingRequests::new(Some(Duration::from_secs(3600)));
        let id = requests.next_id();
        requests.insert(id.clone(), Pending::Session);
        assert!(matches!(requests.take(&id), Some(Pending::Session)));
    }
}
