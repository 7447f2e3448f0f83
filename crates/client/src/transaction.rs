use std::collections::BTreeSet;

use protocol::{
    CheckVersionRequest, CreateRequest, DeleteRequest, MultiOp, MultiRequest, MultiResult,
    Request, Response, ServerError, SetDataRequest,
};

use crate::client::{unexpected, Client, CreateOptions};
use crate::error::ClientError;
use crate::session::Session;
use crate::stat_cache::VersionCounter;

/// Caller-visible paths touched by a committed transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionResult {
    pub checked: BTreeSet<String>,
    pub created: BTreeSet<String>,
    pub updated: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
}

/// Builder for an atomic multi-op, bound to the client that created it.
///
/// Paths are resolved and expected versions filled in when each operation
///  is added, the same way the single-node operations do it.
#[derive(Debug)]
pub struct Transaction<'a, S: Session> {
    client: &'a Client<S>,
    ops: Vec<MultiOp>,
    /// first local precondition failure, reported on commit
    rejected: Option<ClientError>,
}

impl<'a, S: Session> Transaction<'a, S> {
    pub(crate) fn new(client: &'a Client<S>) -> Self {
        Self {
            client,
            ops: Vec::new(),
            rejected: None,
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[MultiOp] {
        &self.ops
    }

    /// Fail the whole transaction unless `path` is at exactly `version`
    pub fn check_version(mut self, path: &str, version: i32) -> Self {
        let path = self.client.normalize_path(path);
        self.ops
            .push(MultiOp::Check(CheckVersionRequest { path, version }));
        self
    }

    pub fn create(mut self, path: &str, options: CreateOptions) -> Self {
        if options.container && !self.client.features().containers {
            self.rejected.get_or_insert(ClientError::FeatureUnavailable {
                operation: "create container",
                feature: "containers",
            });
            return self;
        }

        let path = self.client.normalize_path(path);
        let acl = options
            .acl
            .unwrap_or_else(|| self.client.default_acl().to_vec());
        let mut request = CreateRequest::new(path, options.data, acl);
        request.set_flags(options.ephemeral, options.sequential, options.container);

        self.ops.push(MultiOp::Create(request));
        self
    }

    pub fn set_data(mut self, path: &str, data: impl Into<Vec<u8>>, force: bool) -> Self {
        let path = self.client.normalize_path(path);
        let version = self
            .client
            .expected_version(&path, force, VersionCounter::Data);

        self.ops.push(MultiOp::SetData(SetDataRequest {
            path,
            data: data.into(),
            version: version.as_wire(),
        }));
        self
    }

    pub fn delete(mut self, path: &str, force: bool) -> Self {
        let path = self.client.normalize_path(path);
        let version = self
            .client
            .expected_version(&path, force, VersionCounter::Data);

        self.ops.push(MultiOp::Delete(DeleteRequest {
            path,
            version: version.as_wire(),
        }));
        self
    }

    /// Submit every operation as a single atomic request.
    ///
    /// Either all operations apply or none do; in the latter case the first
    ///  operation that actually failed (not merely rolled back) is reported.
    pub async fn commit(self) -> Result<TransactionResult, ClientError> {
        if let Some(err) = self.rejected {
            return Err(err);
        }
        if self.ops.is_empty() {
            return Ok(TransactionResult::default());
        }

        let client = self.client;
        let ops = self.ops;
        tracing::debug!("Committing transaction with {} operations", ops.len());

        let response = client
            .send(Request::Multi(MultiRequest { ops: ops.clone() }))
            .await?;
        let results = match response {
            Response::Multi { results } => results,
            other => return Err(unexpected("multi", &other)),
        };

        if let Some((index, err)) = first_failure(&results) {
            let path = ops
                .get(index)
                .map(|op| client.denormalize_path(op.path()))
                .unwrap_or_default();
            tracing::warn!("Transaction failed at operation {} ({}): {}", index, path, err);
            return Err(ClientError::TransactionFailed {
                index,
                path,
                source: err.clone(),
            });
        }

        let mut result = TransactionResult::default();
        for (op, outcome) in ops.iter().zip(results) {
            let path = client.denormalize_path(op.path());
            match outcome {
                MultiResult::Check => {
                    result.checked.insert(path);
                }
                MultiResult::Create { path: created } => {
                    result.created.insert(client.denormalize_path(&created));
                }
                MultiResult::SetData { stat } => {
                    client.stat_cache().put(path.clone(), stat);
                    result.updated.insert(path);
                }
                MultiResult::Delete => {
                    result.deleted.insert(path);
                }
                MultiResult::Error(_) => {}
            }
        }

        Ok(result)
    }
}

fn first_failure(results: &[MultiResult]) -> Option<(usize, &ServerError)> {
    let errors = results
        .iter()
        .enumerate()
        .filter_map(|(index, outcome)| match outcome {
            MultiResult::Error(err) => Some((index, err)),
            _ => None,
        });

    let mut rolled_back = None;
    for (index, err) in errors {
        if !matches!(err, ServerError::RolledBack) {
            return Some((index, err));
        }
        rolled_back.get_or_insert((index, err));
    }
    rolled_back
}
