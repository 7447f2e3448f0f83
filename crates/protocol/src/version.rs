use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// `major.minor.patch` version of the software a server runs.
///
/// Ordering is lexicographic over the tuple, which is what feature
///  gating needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerVersion(pub u32, pub u32, pub u32);

impl ServerVersion {
    /// Reported when the session has no live connection
    pub const UNCONNECTED: ServerVersion = ServerVersion(0, 0, 0);

    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self(major, minor, patch)
    }

    pub fn major(&self) -> u32 {
        self.0
    }

    pub fn minor(&self) -> u32 {
        self.1
    }

    pub fn patch(&self) -> u32 {
        self.2
    }
}

impl From<(u32, u32, u32)> for ServerVersion {
    fn from((major, minor, patch): (u32, u32, u32)) -> Self {
        Self(major, minor, patch)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid server version: {0}")]
pub struct VersionParseError(pub String);

impl FromStr for ServerVersion {
    type Err = VersionParseError;

    /// Accepts `3.5.1` as well as suffixed release strings such as
    ///  `3.5.1-alpha` or `3.4.6-1569965, built on ...`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let release = s
            .trim()
            .split(|c: char| c == '-' || c == ',' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        let parts = release
            .split('.')
            .map(|part| part.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionParseError(s.to_string()))?;

        match parts.as_slice() {
            [major, minor, patch] => Ok(Self(*major, *minor, *patch)),
            _ => Err(VersionParseError(s.to_string())),
        }
    }
}
