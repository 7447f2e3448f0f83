use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use protocol::{EventType, Request, Response, ServerError, ServerVersion, WatchEvent};

static NEXT_CALLBACK_ID: AtomicU64 = AtomicU64::new(1);

/// A watch callback registered with a session.
///
/// Closures have no identity of their own, so each callback carries an id
///  assigned at construction. Clones share the id and compare equal, which
///  is what lets a callback deregister exactly itself.
#[derive(Clone)]
pub struct WatchCallback {
    id: u64,
    f: Arc<dyn Fn(&WatchEvent) + Send + Sync>,
}

impl WatchCallback {
    pub fn new(f: impl Fn(&WatchEvent) + Send + Sync + 'static) -> Self {
        Self {
            id: NEXT_CALLBACK_ID.fetch_add(1, Ordering::Relaxed),
            f: Arc::new(f),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn call(&self, event: &WatchEvent) {
        (self.f)(event)
    }
}

impl WatchCallback {
    /// A handle that doesn't keep the callback alive, for callbacks that
    ///  need to refer to themselves
    pub fn downgrade(&self) -> WeakWatchCallback {
        WeakWatchCallback {
            id: self.id,
            f: Arc::downgrade(&self.f),
        }
    }
}

#[derive(Clone)]
pub struct WeakWatchCallback {
    id: u64,
    f: Weak<dyn Fn(&WatchEvent) + Send + Sync>,
}

impl WeakWatchCallback {
    pub fn upgrade(&self) -> Option<WatchCallback> {
        self.f.upgrade().map(|f| WatchCallback { id: self.id, f })
    }
}

impl PartialEq for WatchCallback {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WatchCallback {}

impl fmt::Debug for WatchCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchCallback").field("id", &self.id).finish()
    }
}

/// A live, already-configured session with the coordination service.
///
/// Implementations own connection management, framing, retries and
///  re-registering watches after reconnects. The client only forwards typed
///  requests and callback registrations through this trait.
#[async_trait]
pub trait Session: Send + Sync + 'static {
    async fn start(&self) -> Result<(), ServerError>;

    async fn close(&self) -> Result<(), ServerError>;

    /// Send a request and wait for its response.
    ///
    /// Server rejections and connection failures come back as typed
    ///  [`ServerError`]s.
    async fn send(&self, request: Request) -> Result<Response, ServerError>;

    /// Version of the server behind the live connection, `None` while
    ///  disconnected
    fn connected_version(&self) -> Option<ServerVersion>;

    /// Register a callback for every `event_type` event on `path`.
    ///
    /// Callbacks stay registered until removed and may fire any number of
    ///  times. Implementations must not hold internal locks while invoking
    ///  them, since a callback is allowed to call back into the session.
    fn add_watch_callback(&self, event_type: EventType, path: &str, callback: WatchCallback);

    fn remove_watch_callback(&self, event_type: EventType, path: &str, callback: &WatchCallback);
}
