use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use protocol::{
    EventType, Request, Response, ServerError, ServerVersion, Stat, WatchEvent,
};

use super::tree::Tree;
use crate::session::{Session, WatchCallback};

/// Server version a [`MemorySession`] reports unless told otherwise
pub const DEFAULT_SERVER_VERSION: ServerVersion = ServerVersion(3, 8, 4);

const SESSION_ID: i64 = 0x1000_0000_0000_0001;

#[derive(Debug, Default)]
struct MemorySessionInner {
    tree: Tree,
    /// version of the simulated server, `None` for a session that never connects
    server_version: Option<ServerVersion>,
    closed: bool,
    starts: usize,
    /// every request handed to `send`, in order, including failed ones
    requests: Vec<Request>,
    /// failures to return instead of executing, keyed by server path
    failures: HashMap<String, VecDeque<ServerError>>,
}

#[derive(Default)]
struct WatchRegistry {
    callbacks: HashMap<(EventType, String), Vec<WatchCallback>>,
    added: usize,
    removed: usize,
}

/// In-memory [`Session`] backed by a single simulated server.
///
/// Implements node semantics faithfully enough to exercise the client:
///  versions and ACL versions, parent/child rules, ephemeral, sequential and
///  container nodes, and atomic multi-ops. Every mutation delivers events to
///  matching watch callbacks whether or not the request set a watch.
///
/// Also records what the client did, for assertions: sent requests,
///  callback registrations and removals. Clones share all state.
#[derive(Clone, Default)]
pub struct MemorySession {
    inner: Arc<Mutex<MemorySessionInner>>,
    watches: Arc<Mutex<WatchRegistry>>,
}

impl std::fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemorySession")
            .field("server_version", &inner.server_version)
            .field("closed", &inner.closed)
            .field("requests", &inner.requests.len())
            .finish()
    }
}

impl MemorySession {
    pub fn new() -> Self {
        Self::with_version(DEFAULT_SERVER_VERSION)
    }

    pub fn with_version(version: impl Into<ServerVersion>) -> Self {
        let session = Self::default();
        session.set_server_version(Some(version.into()));
        session
    }

    /// A session whose connection never comes up
    pub fn unconnected() -> Self {
        Self::default()
    }

    /// Simulate reconnecting to a server running different software
    pub fn set_server_version(&self, version: Option<ServerVersion>) {
        self.inner.lock().server_version = version;
    }

    /// Make the next request for `path` (server-visible) fail with `error`
    ///  instead of executing. Queued failures are consumed in order.
    pub fn fail_next(&self, path: &str, error: ServerError) {
        self.inner
            .lock()
            .failures
            .entry(path.to_string())
            .or_default()
            .push_back(error);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.inner.lock().requests.clone()
    }

    pub fn send_count(&self) -> usize {
        self.inner.lock().requests.len()
    }

    pub fn clear_requests(&self) {
        self.inner.lock().requests.clear();
    }

    pub fn start_count(&self) -> usize {
        self.inner.lock().starts
    }

    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().tree.get(path).is_some()
    }

    pub fn node_stat(&self, path: &str) -> Option<Stat> {
        self.inner.lock().tree.get(path).map(|node| node.stat)
    }

    pub fn node_data(&self, path: &str) -> Option<Vec<u8>> {
        self.inner.lock().tree.get(path).map(|node| node.data.clone())
    }

    pub fn is_container(&self, path: &str) -> bool {
        self.inner
            .lock()
            .tree
            .get(path)
            .map(|node| node.container)
            .unwrap_or(false)
    }

    pub fn watch_callbacks_added(&self) -> usize {
        self.watches.lock().added
    }

    pub fn watch_callbacks_removed(&self) -> usize {
        self.watches.lock().removed
    }

    /// Callbacks currently registered for `(event_type, path)`
    pub fn watch_callback_count(&self, event_type: EventType, path: &str) -> usize {
        self.watches
            .lock()
            .callbacks
            .get(&(event_type, path.to_string()))
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Drop every registration without firing it, like a session that gave
    ///  up on its watches
    pub fn clear_watch_callbacks(&self) {
        self.watches.lock().callbacks.clear();
    }

    /// Deliver an event as if the server had sent it, invoking every callback
    ///  registered for its type and path
    pub fn trigger(&self, event_type: EventType, path: &str) {
        self.fire(&WatchEvent::new(event_type, path));
    }

    fn fire(&self, event: &WatchEvent) {
        // snapshot so callbacks can add or remove registrations while running
        let callbacks = self
            .watches
            .lock()
            .callbacks
            .get(&(event.event_type, event.path.clone()))
            .cloned()
            .unwrap_or_default();

        for callback in callbacks {
            callback.call(event);
        }
    }

    fn execute(&self, request: Request) -> (Result<Response, ServerError>, Vec<WatchEvent>) {
        let mut inner = self.inner.lock();
        inner.requests.push(request.clone());

        if inner.closed {
            return (Err(ServerError::SessionClosed), Vec::new());
        }
        if inner.server_version.is_none() {
            return (Err(ServerError::ConnectionLoss), Vec::new());
        }
        if let Some(path) = request.path() {
            if let Some(error) = inner.failures.get_mut(path).and_then(VecDeque::pop_front) {
                return (Err(error), Vec::new());
            }
        }

        let mut events = Vec::new();
        let tree = &mut inner.tree;
        let result = match request {
            Request::Exists(req) => tree.stat(&req.path).map(|stat| Response::Exists { stat }),
            Request::Create(req) => tree
                .create(&req, SESSION_ID, &mut events)
                .map(|(path, _)| Response::Create { path }),
            Request::Create2(req) => tree
                .create(&req, SESSION_ID, &mut events)
                .map(|(path, stat)| Response::Create2 { path, stat }),
            Request::Delete(req) => tree
                .delete(&req.path, req.version, &mut events)
                .map(|_| Response::Delete),
            Request::GetData(req) => tree
                .data(&req.path)
                .map(|(data, stat)| Response::GetData { data, stat }),
            Request::SetData(req) => tree
                .set_data(&req.path, &req.data, req.version, &mut events)
                .map(|stat| Response::SetData { stat }),
            Request::GetChildren2(req) => tree
                .children(&req.path)
                .map(|(children, stat)| Response::GetChildren2 { children, stat }),
            Request::GetAcl(req) => tree
                .acl(&req.path)
                .map(|(acl, stat)| Response::GetAcl { acl, stat }),
            Request::SetAcl(req) => tree
                .set_acl(&req.path, &req.acl, req.version)
                .map(|stat| Response::SetAcl { stat }),
            Request::Check(req) => tree.check(&req.path, req.version).map(|_| Response::Check),
            Request::Multi(req) => Ok(Response::Multi {
                results: tree.multi(&req.ops, SESSION_ID, &mut events),
            }),
        };

        (result, events)
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn start(&self) -> Result<(), ServerError> {
        let mut inner = self.inner.lock();
        inner.starts += 1;
        inner.closed = false;
        Ok(())
    }

    async fn close(&self) -> Result<(), ServerError> {
        let events = {
            let mut inner = self.inner.lock();
            inner.closed = true;

            let mut events = Vec::new();
            for path in inner.tree.ephemerals(SESSION_ID) {
                let _ = inner.tree.delete(&path, protocol::ANY_VERSION, &mut events);
            }
            events
        };

        for event in &events {
            self.fire(event);
        }
        Ok(())
    }

    async fn send(&self, request: Request) -> Result<Response, ServerError> {
        let (result, events) = self.execute(request);
        for event in &events {
            self.fire(event);
        }
        result
    }

    fn connected_version(&self) -> Option<ServerVersion> {
        let inner = self.inner.lock();
        if inner.closed {
            None
        } else {
            inner.server_version
        }
    }

    fn add_watch_callback(&self, event_type: EventType, path: &str, callback: WatchCallback) {
        let mut watches = self.watches.lock();
        watches.added += 1;
        watches
            .callbacks
            .entry((event_type, path.to_string()))
            .or_default()
            .push(callback);
    }

    fn remove_watch_callback(&self, event_type: EventType, path: &str, callback: &WatchCallback) {
        let mut watches = self.watches.lock();
        watches.removed += 1;

        let key = (event_type, path.to_string());
        if let Some(callbacks) = watches.callbacks.get_mut(&key) {
            callbacks.retain(|registered| registered != callback);
            if callbacks.is_empty() {
                watches.callbacks.remove(&key);
            }
        }
    }
}
