/**
 * Access control lists attached to every node.
 *  - Permission bits
 *  - Scheme / identity pairs
 */
pub mod acl;
/**
 * Server error taxonomy. The client only ever
 *  special-cases `NoNode` and `NodeExists`, the
 *  rest are surfaced to callers as-is.
 */
pub mod error;
/**
 * Watch events delivered by the session.
 */
pub mod event;
/**
 * Typed requests, one per operation the client
 *  knows how to send, plus multi-op records.
 */
pub mod request;
/**
 * Typed responses matching the requests above.
 */
pub mod response;
/**
 * Per-node metadata returned by the server.
 */
pub mod stat;
/**
 * Version tuple reported by a connected server.
 */
pub mod version;

pub use acl::{Acl, Id, Perms};
pub use error::ServerError;
pub use event::{EventType, KeeperState, WatchEvent};
pub use request::{
    CheckVersionRequest, CreateFlags, CreateRequest, DeleteRequest, ExistsRequest, GetAclRequest,
    GetChildrenRequest, GetDataRequest, MultiOp, MultiRequest, OpCode, Request, SetAclRequest,
    SetDataRequest,
};
pub use response::{MultiResult, Response};
pub use stat::Stat;
pub use version::{ServerVersion, VersionParseError};

/// Expected-version sentinel that matches any node version
pub const ANY_VERSION: i32 = -1;

pub mod prelude {
    pub use crate::acl::{Acl, Perms};
    pub use crate::error::ServerError;
    pub use crate::event::{EventType, WatchEvent};
    pub use crate::request::Request;
    pub use crate::response::Response;
    pub use crate::stat::Stat;
    pub use crate::version::ServerVersion;
    pub use crate::ANY_VERSION;
}
