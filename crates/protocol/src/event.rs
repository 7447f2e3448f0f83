use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of change a watch fires for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Created,
    Deleted,
    DataChanged,
    ChildrenChanged,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::Created => "created",
            EventType::Deleted => "deleted",
            EventType::DataChanged => "data_changed",
            EventType::ChildrenChanged => "children_changed",
        };
        write!(f, "{}", name)
    }
}

/// Connection state at the time an event was delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeeperState {
    #[default]
    Connected,
    ConnectedReadOnly,
    Disconnected,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEvent {
    pub event_type: EventType,
    pub state: KeeperState,
    /// path the event fired on
    pub path: String,
}

impl WatchEvent {
    pub fn new(event_type: EventType, path: impl Into<String>) -> Self {
        Self {
            event_type,
            state: KeeperState::Connected,
            path: path.into(),
        }
    }
}
