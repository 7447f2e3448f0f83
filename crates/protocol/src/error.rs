use serde::{Deserialize, Serialize};

/// Failures reported by the server, or by the session on its behalf.
///
/// Only [`ServerError::NoNode`] and [`ServerError::NodeExists`] carry meaning
///  for the client façade; every other kind is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ServerError {
    #[error("no node at {0}")]
    NoNode(String),
    #[error("node already exists at {0}")]
    NodeExists(String),
    #[error("version mismatch at {0}")]
    BadVersion(String),
    #[error("node at {0} still has children")]
    NotEmpty(String),
    #[error("ephemeral node at {0} cannot have children")]
    NoChildrenForEphemerals(String),
    #[error("invalid acl")]
    InvalidAcl,
    #[error("not authorized")]
    NoAuth,
    /// A sibling operation in the same multi-op failed, so this one was undone
    #[error("operation rolled back")]
    RolledBack,
    #[error("connection to the server was lost")]
    ConnectionLoss,
    #[error("session expired")]
    SessionExpired,
    #[error("session is closed")]
    SessionClosed,
    #[error("operation not implemented by the server")]
    Unimplemented,
    #[error("server error {code}: {message}")]
    Other { code: i32, message: String },
}

impl ServerError {
    pub fn is_no_node(&self) -> bool {
        matches!(self, ServerError::NoNode(_))
    }

    pub fn is_node_exists(&self) -> bool {
        matches!(self, ServerError::NodeExists(_))
    }
}
