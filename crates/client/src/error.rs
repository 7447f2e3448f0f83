use protocol::ServerError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Anything the server or session reported, passed through verbatim
    #[error("server error: {0}")]
    Server(#[from] ServerError),
    /// The request needs a capability the connected server lacks.
    ///  Raised before anything is sent.
    #[error("cannot {operation}: {feature} unavailable on the connected server")]
    FeatureUnavailable {
        operation: &'static str,
        feature: &'static str,
    },
    #[error("unexpected response to {request}: {response}")]
    UnexpectedResponse {
        request: &'static str,
        response: &'static str,
    },
    /// The session dropped a watch callback without ever firing it
    #[error("watch on {0} was cancelled before it fired")]
    WatchCancelled(String),
    #[error("transaction failed at operation {index} ({path}): {source}")]
    TransactionFailed {
        index: usize,
        path: String,
        #[source]
        source: ServerError,
    },
}

impl ClientError {
    pub fn server(&self) -> Option<&ServerError> {
        match self {
            ClientError::Server(err) => Some(err),
            ClientError::TransactionFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_no_node(&self) -> bool {
        matches!(self, ClientError::Server(ServerError::NoNode(_)))
    }

    pub fn is_node_exists(&self) -> bool {
        matches!(self, ClientError::Server(ServerError::NodeExists(_)))
    }
}
