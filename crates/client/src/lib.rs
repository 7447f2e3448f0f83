/**
 * The operation façade callers talk to.
 *  Owns the stat cache and drives the session.
 */
pub mod client;
/**
 * File-backed configuration for building a client
 *  and the session underneath it.
 */
pub mod config;
/**
 * Recursive creation of a path and all of its ancestors.
 */
pub mod ensure_path;
pub mod error;
/**
 * Capability flags derived from the connected
 *  server's version.
 */
pub mod features;
/**
 * Chroot handling: caller paths <-> server paths.
 */
pub mod path;
/**
 * The seam to the session that owns the connection,
 *  the wire protocol and watch delivery.
 */
pub mod session;
/**
 * Last-seen node stats, used to fill in expected
 *  versions for compare-and-swap mutations.
 */
pub mod stat_cache;
/**
 * In-memory session for tests.
 */
pub mod testkit;
/**
 * Atomic multi-op builder handed out by the client.
 */
pub mod transaction;
/**
 * One-shot watch signals.
 */
pub mod watch;

pub use client::{Client, ClientBuilder, CreateOptions};
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use features::Features;
pub use path::Chroot;
pub use session::{Session, WatchCallback};
pub use stat_cache::{ExpectedVersion, StatCache, VersionCounter};
pub use transaction::{Transaction, TransactionResult};
pub use watch::WatchSignal;

pub mod prelude {
    pub use crate::client::{Client, CreateOptions};
    pub use crate::error::ClientError;
    pub use crate::session::Session;
    pub use protocol::prelude::*;
}
