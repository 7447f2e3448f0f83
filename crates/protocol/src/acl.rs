use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Permission bits granted by an ACL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Perms(pub u32);

impl Perms {
    pub const READ: Perms = Perms(1);
    pub const WRITE: Perms = Perms(2);
    pub const CREATE: Perms = Perms(4);
    pub const DELETE: Perms = Perms(8);
    pub const ADMIN: Perms = Perms(16);
    pub const ALL: Perms = Perms(31);

    pub fn contains(&self, other: Perms) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl BitOr for Perms {
    type Output = Perms;

    fn bitor(self, rhs: Perms) -> Perms {
        Perms(self.0 | rhs.0)
    }
}

/// An identity within an authentication scheme,
///  e.g. `world:anyone` or `digest:user:hash`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id {
    pub scheme: String,
    pub id: String,
}

impl Id {
    pub fn new(scheme: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            id: id.into(),
        }
    }

    pub fn anyone() -> Self {
        Self::new("world", "anyone")
    }

    /// Stands in for whichever identities the session authenticated with
    pub fn creator() -> Self {
        Self::new("auth", "")
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Acl {
    pub perms: Perms,
    pub id: Id,
}

impl Acl {
    pub fn new(perms: Perms, id: Id) -> Self {
        Self { perms, id }
    }

    /// Anyone may do anything
    pub fn unrestricted() -> Self {
        Self::new(Perms::ALL, Id::anyone())
    }

    /// Anyone may read, nobody may write
    pub fn read_only() -> Self {
        Self::new(Perms::READ, Id::anyone())
    }

    /// Full access for the identities the session authenticated as
    pub fn creator_all() -> Self {
        Self::new(Perms::ALL, Id::creator())
    }
}
