use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use protocol::{Stat, ANY_VERSION};

/// Which counter of a cached stat guards a mutation.
///
/// Data writes and deletes are checked against `version`, ACL writes
///  against `aversion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCounter {
    Data,
    /// ACL writes get their own counter rather than sharing the data
    ///  version, since the server checks `aversion` for them
    Acl,
}

impl VersionCounter {
    fn read(&self, stat: &Stat) -> i32 {
        match self {
            VersionCounter::Data => stat.version,
            VersionCounter::Acl => stat.aversion,
        }
    }
}

/// The version a mutation is submitted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Apply regardless of the node's current version
    Unconditional,
    /// Apply only if the node is still at this version
    Compare(i32),
}

impl ExpectedVersion {
    pub fn as_wire(&self) -> i32 {
        match self {
            ExpectedVersion::Unconditional => ANY_VERSION,
            ExpectedVersion::Compare(version) => *version,
        }
    }
}

/// Last observed stat per caller-visible path.
///
/// Only ever a hint: entries may be stale or missing, and the server is the
///  one that accepts or rejects a compare-and-swap. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct StatCache {
    inner: Arc<RwLock<HashMap<String, Stat>>>,
}

impl StatCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Stat> {
        self.inner.read().get(path).copied()
    }

    /// Last writer wins, there is no ordering check against the prior entry
    pub fn put(&self, path: impl Into<String>, stat: Stat) {
        self.inner.write().insert(path.into(), stat);
    }

    pub fn remove(&self, path: &str) -> Option<Stat> {
        self.inner.write().remove(path)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Compare against the cached counter unless forced or nothing is cached
    pub fn expected_version(
        &self,
        path: &str,
        force: bool,
        counter: VersionCounter,
    ) -> ExpectedVersion {
        if force {
            return ExpectedVersion::Unconditional;
        }
        match self.get(path) {
            Some(stat) => ExpectedVersion::Compare(counter.read(&stat)),
            None => ExpectedVersion::Unconditional,
        }
    }
}
