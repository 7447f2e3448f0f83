use std::fmt;

use serde::{Deserialize, Serialize};

use crate::acl::Acl;
use crate::ANY_VERSION;

/// Wire opcodes for the operations the client issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCode {
    Create = 1,
    Delete = 2,
    Exists = 3,
    GetData = 4,
    SetData = 5,
    GetAcl = 6,
    SetAcl = 7,
    GetChildren2 = 12,
    Check = 13,
    Multi = 14,
    Create2 = 15,
    CreateContainer = 19,
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Mode bits for a create request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreateFlags {
    pub ephemeral: bool,
    pub sequential: bool,
    pub container: bool,
}

impl CreateFlags {
    pub fn new(ephemeral: bool, sequential: bool, container: bool) -> Self {
        Self {
            ephemeral,
            sequential,
            container,
        }
    }

    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.ephemeral {
            bits |= 1;
        }
        if self.sequential {
            bits |= 2;
        }
        if self.container {
            bits |= 4;
        }
        bits
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistsRequest {
    pub path: String,
    pub watch: bool,
}

/// Shared by the legacy create and the stat-returning create;
///  [`Request::Create`] vs [`Request::Create2`] picks the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub path: String,
    pub data: Vec<u8>,
    pub acl: Vec<Acl>,
    pub flags: CreateFlags,
}

impl CreateRequest {
    pub fn new(path: impl Into<String>, data: Vec<u8>, acl: Vec<Acl>) -> Self {
        Self {
            path: path.into(),
            data,
            acl,
            flags: CreateFlags::default(),
        }
    }

    pub fn set_flags(&mut self, ephemeral: bool, sequential: bool, container: bool) {
        self.flags = CreateFlags::new(ephemeral, sequential, container);
    }

    pub fn with_flags(mut self, flags: CreateFlags) -> Self {
        self.flags = flags;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub path: String,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDataRequest {
    pub path: String,
    pub watch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDataRequest {
    pub path: String,
    pub data: Vec<u8>,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetChildrenRequest {
    pub path: String,
    pub watch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAclRequest {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAclRequest {
    pub path: String,
    pub acl: Vec<Acl>,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckVersionRequest {
    pub path: String,
    pub version: i32,
}

/// One step of an atomic multi-op
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiOp {
    Check(CheckVersionRequest),
    Create(CreateRequest),
    SetData(SetDataRequest),
    Delete(DeleteRequest),
}

impl MultiOp {
    pub fn path(&self) -> &str {
        match self {
            MultiOp::Check(req) => &req.path,
            MultiOp::Create(req) => &req.path,
            MultiOp::SetData(req) => &req.path,
            MultiOp::Delete(req) => &req.path,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiRequest {
    pub ops: Vec<MultiOp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    Exists(ExistsRequest),
    /// Legacy create, the response carries only the created path
    Create(CreateRequest),
    /// Create that also returns the new node's stat
    Create2(CreateRequest),
    Delete(DeleteRequest),
    GetData(GetDataRequest),
    SetData(SetDataRequest),
    GetChildren2(GetChildrenRequest),
    GetAcl(GetAclRequest),
    SetAcl(SetAclRequest),
    Check(CheckVersionRequest),
    Multi(MultiRequest),
}

impl Request {
    pub fn exists(path: impl Into<String>, watch: bool) -> Self {
        Request::Exists(ExistsRequest {
            path: path.into(),
            watch,
        })
    }

    pub fn delete(path: impl Into<String>, version: i32) -> Self {
        Request::Delete(DeleteRequest {
            path: path.into(),
            version,
        })
    }

    pub fn get_data(path: impl Into<String>, watch: bool) -> Self {
        Request::GetData(GetDataRequest {
            path: path.into(),
            watch,
        })
    }

    pub fn set_data(path: impl Into<String>, data: Vec<u8>, version: i32) -> Self {
        Request::SetData(SetDataRequest {
            path: path.into(),
            data,
            version,
        })
    }

    pub fn get_children(path: impl Into<String>, watch: bool) -> Self {
        Request::GetChildren2(GetChildrenRequest {
            path: path.into(),
            watch,
        })
    }

    pub fn get_acl(path: impl Into<String>) -> Self {
        Request::GetAcl(GetAclRequest { path: path.into() })
    }

    pub fn set_acl(path: impl Into<String>, acl: Vec<Acl>, version: i32) -> Self {
        Request::SetAcl(SetAclRequest {
            path: path.into(),
            acl,
            version,
        })
    }

    pub fn check(path: impl Into<String>, version: i32) -> Self {
        Request::Check(CheckVersionRequest {
            path: path.into(),
            version,
        })
    }

    pub fn op_code(&self) -> OpCode {
        match self {
            Request::Exists(_) => OpCode::Exists,
            Request::Create(_) => OpCode::Create,
            Request::Create2(req) if req.flags.container => OpCode::CreateContainer,
            Request::Create2(_) => OpCode::Create2,
            Request::Delete(_) => OpCode::Delete,
            Request::GetData(_) => OpCode::GetData,
            Request::SetData(_) => OpCode::SetData,
            Request::GetChildren2(_) => OpCode::GetChildren2,
            Request::GetAcl(_) => OpCode::GetAcl,
            Request::SetAcl(_) => OpCode::SetAcl,
            Request::Check(_) => OpCode::Check,
            Request::Multi(_) => OpCode::Multi,
        }
    }

    /// The single node this request targets, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            Request::Exists(req) => Some(&req.path),
            Request::Create(req) | Request::Create2(req) => Some(&req.path),
            Request::Delete(req) => Some(&req.path),
            Request::GetData(req) => Some(&req.path),
            Request::SetData(req) => Some(&req.path),
            Request::GetChildren2(req) => Some(&req.path),
            Request::GetAcl(req) => Some(&req.path),
            Request::SetAcl(req) => Some(&req.path),
            Request::Check(req) => Some(&req.path),
            Request::Multi(_) => None,
        }
    }

    /// The expected version submitted with a mutation, if the request carries one
    pub fn version(&self) -> Option<i32> {
        match self {
            Request::Delete(req) => Some(req.version),
            Request::SetData(req) => Some(req.version),
            Request::SetAcl(req) => Some(req.version),
            Request::Check(req) => Some(req.version),
            _ => None,
        }
    }

    pub fn is_unconditional(&self) -> bool {
        self.version() == Some(ANY_VERSION)
    }
}
