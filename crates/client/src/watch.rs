//! One-shot waits on top of the session's repeatable watch callbacks.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

use parking_lot::Mutex;
use protocol::{EventType, WatchEvent};
use tokio::sync::oneshot;

use crate::client::Client;
use crate::error::ClientError;
use crate::session::{Session, WatchCallback, WeakWatchCallback};

/// Resolves with the first matching event after registration.
///
/// Dropping the signal unawaited is fine: the underlying callback still
///  deregisters itself the first time it fires.
#[derive(Debug)]
pub struct WatchSignal {
    event_type: EventType,
    path: String,
    rx: oneshot::Receiver<WatchEvent>,
}

impl WatchSignal {
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Caller-visible path the signal is waiting on
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Future for WatchSignal {
    type Output = Result<WatchEvent, ClientError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(event)) => Poll::Ready(Ok(event)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(ClientError::WatchCancelled(this.path.clone()))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S: Session> Client<S> {
    /// Wait for the next `event_type` event on `path`.
    ///
    /// Registers with the session and returns straight away; only awaiting
    ///  the signal suspends. The callback resolves the signal on its first
    ///  invocation and removes itself from the session in the same step, so
    ///  repeated or concurrent deliveries are no-ops.
    ///
    /// The resolved event carries the caller-visible path.
    pub fn wait_for_event(&self, event_type: EventType, path: &str) -> WatchSignal {
        let server_path = self.normalize_path(path);
        let path = self.denormalize_path(&server_path);
        let (tx, rx) = oneshot::channel();

        let sender = Mutex::new(Some(tx));
        let session = Arc::downgrade(self.session());
        let this: Arc<OnceLock<WeakWatchCallback>> = Arc::new(OnceLock::new());

        let callback = {
            let this = this.clone();
            let chroot = self.path_chroot().clone();
            let server_path = server_path.clone();
            WatchCallback::new(move |event: &WatchEvent| {
                // whoever takes the sender owns resolution and cleanup
                let Some(tx) = sender.lock().take() else {
                    return;
                };

                tracing::debug!("{} event on '{}' resolved watch", event_type, server_path);
                let event = WatchEvent {
                    path: chroot.denormalize(&event.path),
                    ..event.clone()
                };
                // the caller may have dropped the signal already
                let _ = tx.send(event);

                let callback = this.get().and_then(WeakWatchCallback::upgrade);
                if let (Some(session), Some(callback)) = (session.upgrade(), callback) {
                    session.remove_watch_callback(event_type, &server_path, &callback);
                }
            })
        };
        let _ = this.set(callback.downgrade());

        tracing::debug!("Waiting for {} event on '{}'", event_type, server_path);
        self.session()
            .add_watch_callback(event_type, &server_path, callback);

        WatchSignal {
            event_type,
            path,
            rx,
        }
    }
}
