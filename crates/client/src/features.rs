use protocol::ServerVersion;

const CREATE_WITH_STAT: ServerVersion = ServerVersion(3, 5, 0);
const CONTAINERS: ServerVersion = ServerVersion(3, 5, 1);
const RECONFIGURE: ServerVersion = ServerVersion(3, 5, 0);

/// Capabilities of the server the session is currently connected to.
///
/// Derived from the server's version tuple and never updated in place;
///  build a fresh one after every reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    version: ServerVersion,
    /// create requests may ask for the new node's stat back
    pub create_with_stat: bool,
    /// container nodes are supported
    pub containers: bool,
    /// dynamic ensemble reconfiguration is supported
    pub reconfigure: bool,
}

impl Features {
    pub fn new(version: ServerVersion) -> Self {
        Self {
            version,
            create_with_stat: version >= CREATE_WITH_STAT,
            containers: version >= CONTAINERS,
            reconfigure: version >= RECONFIGURE,
        }
    }

    /// The conservative set used while no connection is live
    pub fn unconnected() -> Self {
        Self::new(ServerVersion::UNCONNECTED)
    }

    pub fn version(&self) -> ServerVersion {
        self.version
    }
}

impl From<Option<ServerVersion>> for Features {
    fn from(version: Option<ServerVersion>) -> Self {
        Self::new(version.unwrap_or(ServerVersion::UNCONNECTED))
    }
}
