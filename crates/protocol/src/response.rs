use serde::{Deserialize, Serialize};

use crate::acl::Acl;
use crate::error::ServerError;
use crate::stat::Stat;

/// Outcome of one step of a multi-op, in request order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiResult {
    Check,
    Create { path: String },
    SetData { stat: Stat },
    Delete,
    Error(ServerError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Exists { stat: Stat },
    Create { path: String },
    Create2 { path: String, stat: Stat },
    Delete,
    GetData { data: Vec<u8>, stat: Stat },
    SetData { stat: Stat },
    GetChildren2 { children: Vec<String>, stat: Stat },
    GetAcl { acl: Vec<Acl>, stat: Stat },
    SetAcl { stat: Stat },
    Check,
    Multi { results: Vec<MultiResult> },
}

impl Response {
    /// Node metadata carried by the response, if any
    pub fn stat(&self) -> Option<&Stat> {
        match self {
            Response::Exists { stat }
            | Response::Create2 { stat, .. }
            | Response::GetData { stat, .. }
            | Response::SetData { stat }
            | Response::GetChildren2 { stat, .. }
            | Response::GetAcl { stat, .. }
            | Response::SetAcl { stat } => Some(stat),
            Response::Create { .. } | Response::Delete | Response::Check | Response::Multi { .. } => {
                None
            }
        }
    }

    /// Short name used in logs and unexpected-response errors
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Exists { .. } => "exists",
            Response::Create { .. } => "create",
            Response::Create2 { .. } => "create2",
            Response::Delete => "delete",
            Response::GetData { .. } => "get_data",
            Response::SetData { .. } => "set_data",
            Response::GetChildren2 { .. } => "get_children2",
            Response::GetAcl { .. } => "get_acl",
            Response::SetAcl { .. } => "set_acl",
            Response::Check => "check",
            Response::Multi { .. } => "multi",
        }
    }
}
