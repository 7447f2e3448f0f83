//! Recursive path creation, `mkdir -p` style.

use protocol::{Acl, CreateRequest, Request, ServerError};

use crate::client::Client;
use crate::error::ClientError;
use crate::session::Session;

/// Every ancestor of a normalized path, parent first and ending with the
///  path itself. The root is left out; it always exists.
pub fn ancestor_paths(path: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        let next = match paths.last() {
            Some(parent) => format!("{}/{}", parent, segment),
            None => format!("/{}", segment),
        };
        paths.push(next);
    }
    paths
}

impl<S: Session> Client<S> {
    /// Make sure `path` and all of its ancestors exist.
    ///
    /// Ancestors are created strictly parent before child. A node that
    ///  already exists counts as created; any other failure stops the walk
    ///  and is returned as-is. Created nodes are plain persistent nodes, or
    ///  containers when the server supports them.
    pub async fn ensure_path(&self, path: &str, acl: Option<Vec<Acl>>) -> Result<(), ClientError> {
        let path = self.normalize_path(path);
        let acl = acl.unwrap_or_else(|| self.default_acl().to_vec());

        for ancestor in ancestor_paths(&path) {
            let features = self.features();

            let mut request = CreateRequest::new(ancestor.clone(), Vec::new(), acl.clone());
            request.set_flags(false, false, features.containers);
            let request = if features.create_with_stat {
                Request::Create2(request)
            } else {
                Request::Create(request)
            };

            match self.send(request).await {
                Ok(_) => tracing::debug!("Created '{}'", ancestor),
                Err(ClientError::Server(ServerError::NodeExists(_))) => {
                    tracing::trace!("'{}' already exists", ancestor)
                }
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}
