use serde::{Deserialize, Serialize};

/// Metadata the server keeps for every node.
///
/// `version` counts data changes and `aversion` counts ACL changes; the
///  client submits them back as optimistic-concurrency tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// zxid of the change that created the node
    pub czxid: i64,
    /// zxid of the last data change
    pub mzxid: i64,
    /// creation time, in epoch millis
    pub ctime: i64,
    /// last modification time, in epoch millis
    pub mtime: i64,
    pub version: i32,
    /// number of changes to the node's children
    pub cversion: i32,
    pub aversion: i32,
    /// session id of the owner if ephemeral, zero otherwise
    pub ephemeral_owner: i64,
    pub data_length: i32,
    pub num_children: i32,
    /// zxid of the last change to the node's children
    pub pzxid: i64,
}

impl Stat {
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral_owner != 0
    }
}
