use std::sync::Arc;

use protocol::{Acl, CreateRequest, Request, Response, ServerError};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::features::Features;
use crate::path::Chroot;
use crate::session::Session;
use crate::stat_cache::{ExpectedVersion, StatCache, VersionCounter};
use crate::transaction::Transaction;

/// Options for [`Client::create`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub data: Vec<u8>,
    /// falls back to the client's default ACL when unset
    pub acl: Option<Vec<Acl>>,
    pub ephemeral: bool,
    pub sequential: bool,
    pub container: bool,
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    pub fn acl(mut self, acl: Vec<Acl>) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.sequential = true;
        self
    }

    pub fn container(mut self) -> Self {
        self.container = true;
        self
    }
}

pub struct ClientBuilder<S: Session> {
    session: S,
    /// root prefix every caller path is resolved under
    chroot: Option<String>,
    /// ACL applied when a caller doesn't pass one
    default_acl: Option<Vec<Acl>>,
    /// pre-populated or shared stat cache, a fresh one otherwise
    stat_cache: Option<StatCache>,
}

impl<S: Session> ClientBuilder<S> {
    pub fn new(session: S) -> Self {
        ClientBuilder {
            session,
            chroot: None,
            default_acl: None,
            stat_cache: None,
        }
    }

    pub fn chroot(mut self, chroot: impl Into<String>) -> Self {
        self.chroot = Some(chroot.into());
        self
    }

    pub fn default_acl(mut self, acl: Vec<Acl>) -> Self {
        self.default_acl = Some(acl);
        self
    }

    pub fn stat_cache(mut self, stat_cache: StatCache) -> Self {
        self.stat_cache = Some(stat_cache);
        self
    }

    pub fn build(self) -> Client<S> {
        let chroot = Chroot::new(self.chroot.as_deref());
        if let Some(root) = chroot.as_deref() {
            tracing::info!("Using chroot '{}'", root);
        }

        let default_acl = match self.default_acl {
            Some(acl) if !acl.is_empty() => acl,
            _ => vec![Acl::unrestricted()],
        };

        Client {
            session: Arc::new(self.session),
            chroot,
            default_acl,
            stat_cache: self.stat_cache.unwrap_or_default(),
        }
    }
}

/// Caller-facing operations over a [`Session`].
///
/// Every operation runs the same pipeline: resolve the path under the
///  chroot, pick the request shape the connected server supports, fill in
///  the expected version from the stat cache, send, record any returned
///  stat, and hand paths back relative to the chroot.
///
/// Clones share the session and the stat cache.
pub struct Client<S: Session> {
    session: Arc<S>,
    chroot: Chroot,
    default_acl: Vec<Acl>,
    stat_cache: StatCache,
}

impl<S: Session> Clone for Client<S> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            chroot: self.chroot.clone(),
            default_acl: self.default_acl.clone(),
            stat_cache: self.stat_cache.clone(),
        }
    }
}

impl<S: Session> std::fmt::Debug for Client<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("chroot", &self.chroot)
            .field("default_acl", &self.default_acl)
            .field("cached_stats", &self.stat_cache.len())
            .finish()
    }
}

impl<S: Session> Client<S> {
    pub fn builder(session: S) -> ClientBuilder<S> {
        ClientBuilder::new(session)
    }

    pub fn new(session: S) -> Self {
        ClientBuilder::new(session).build()
    }

    /// Build a client from the façade half of a [`ClientConfig`].
    ///  The session half (servers, timeouts) is for whoever built `session`.
    pub fn from_config(session: S, config: &ClientConfig) -> Self {
        let mut builder = ClientBuilder::new(session).default_acl(config.default_acl.clone());
        if let Some(chroot) = &config.chroot {
            builder = builder.chroot(chroot.clone());
        }
        builder.build()
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    pub fn chroot(&self) -> Option<&str> {
        self.chroot.as_deref()
    }

    pub(crate) fn path_chroot(&self) -> &Chroot {
        &self.chroot
    }

    pub fn default_acl(&self) -> &[Acl] {
        &self.default_acl
    }

    pub fn stat_cache(&self) -> &StatCache {
        &self.stat_cache
    }

    pub fn normalize_path(&self, path: &str) -> String {
        self.chroot.normalize(path)
    }

    pub fn denormalize_path(&self, path: &str) -> String {
        self.chroot.denormalize(path)
    }

    /// Capabilities of whatever server the session is connected to right
    ///  now. Recomputed on every call since a reconnect may land elsewhere.
    pub fn features(&self) -> Features {
        Features::from(self.session.connected_version())
    }

    /// Start the session, then make sure the chroot node exists
    pub async fn start(&self) -> Result<(), ClientError> {
        self.session.start().await?;

        if let Some(root) = self.chroot.as_deref() {
            tracing::debug!("Ensuring chroot '{}' exists", root);
            self.ensure_path("/", None).await?;
        }

        tracing::info!("Client started");
        Ok(())
    }

    pub async fn close(&self) -> Result<(), ClientError> {
        self.session.close().await?;
        tracing::info!("Client closed");
        Ok(())
    }

    /// Send an already-normalized request.
    ///
    /// When the response carries a stat for a single node it is recorded in
    ///  the stat cache under that node's caller-visible path. Transaction
    ///  builders and recipes go through here to get the same bookkeeping.
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        let op = request.op_code();
        let request_path = request.path().map(str::to_string);
        tracing::debug!("Sending {} request for {:?}", op, request_path);

        let response = self.session.send(request).await.map_err(|e| {
            tracing::debug!("{} request for {:?} failed: {}", op, request_path, e);
            e
        })?;

        if let (Some(request_path), Some(stat)) = (request_path.as_deref(), response.stat()) {
            // created sequential nodes live under the path the server chose
            let path = match &response {
                Response::Create2 { path, .. } => path.as_str(),
                _ => request_path,
            };
            self.stat_cache.put(self.denormalize_path(path), *stat);
        }

        Ok(response)
    }

    /// Whether a node exists at `path`. A missing node is `Ok(false)`, not
    ///  an error.
    pub async fn exists(&self, path: &str, watch: bool) -> Result<bool, ClientError> {
        let path = self.normalize_path(path);

        match self.send(Request::exists(path, watch)).await {
            Ok(_) => Ok(true),
            Err(ClientError::Server(ServerError::NoNode(_))) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Create a node, returning its caller-visible path. For sequential
    ///  nodes this includes the suffix the server appended.
    pub async fn create(&self, path: &str, options: CreateOptions) -> Result<String, ClientError> {
        let features = self.features();
        if options.container && !features.containers {
            return Err(ClientError::FeatureUnavailable {
                operation: "create container",
                feature: "containers",
            });
        }

        let path = self.normalize_path(path);
        let acl = options.acl.unwrap_or_else(|| self.default_acl.clone());

        let mut request = CreateRequest::new(path, options.data, acl);
        request.set_flags(options.ephemeral, options.sequential, options.container);
        let request = if features.create_with_stat {
            Request::Create2(request)
        } else {
            Request::Create(request)
        };

        match self.send(request).await? {
            Response::Create { path } | Response::Create2 { path, .. } => {
                Ok(self.denormalize_path(&path))
            }
            other => Err(unexpected("create", &other)),
        }
    }

    pub async fn delete(&self, path: &str, force: bool) -> Result<(), ClientError> {
        let path = self.normalize_path(path);
        let version = self.expected_version(&path, force, VersionCounter::Data);

        self.send(Request::delete(path, version.as_wire())).await?;
        Ok(())
    }

    pub async fn get_data(&self, path: &str, watch: bool) -> Result<Vec<u8>, ClientError> {
        let path = self.normalize_path(path);

        match self.send(Request::get_data(path, watch)).await? {
            Response::GetData { data, .. } => Ok(data),
            other => Err(unexpected("get_data", &other)),
        }
    }

    pub async fn set_data(
        &self,
        path: &str,
        data: impl Into<Vec<u8>>,
        force: bool,
    ) -> Result<(), ClientError> {
        let path = self.normalize_path(path);
        let version = self.expected_version(&path, force, VersionCounter::Data);

        self.send(Request::set_data(path, data.into(), version.as_wire()))
            .await?;
        Ok(())
    }

    /// Child names in whatever order the server reported them
    pub async fn get_children(&self, path: &str, watch: bool) -> Result<Vec<String>, ClientError> {
        let path = self.normalize_path(path);

        match self.send(Request::get_children(path, watch)).await? {
            Response::GetChildren2 { children, .. } => Ok(children),
            other => Err(unexpected("get_children", &other)),
        }
    }

    pub async fn get_acl(&self, path: &str) -> Result<Vec<Acl>, ClientError> {
        let path = self.normalize_path(path);

        match self.send(Request::get_acl(path)).await? {
            Response::GetAcl { acl, .. } => Ok(acl),
            other => Err(unexpected("get_acl", &other)),
        }
    }

    pub async fn set_acl(&self, path: &str, acl: Vec<Acl>, force: bool) -> Result<(), ClientError> {
        let path = self.normalize_path(path);
        let version = self.expected_version(&path, force, VersionCounter::Acl);

        self.send(Request::set_acl(path, acl, version.as_wire()))
            .await?;
        Ok(())
    }

    pub fn begin_transaction(&self) -> Transaction<'_, S> {
        Transaction::new(self)
    }

    /// Expected version for a mutation of an already-normalized path
    pub(crate) fn expected_version(
        &self,
        server_path: &str,
        force: bool,
        counter: VersionCounter,
    ) -> ExpectedVersion {
        self.stat_cache
            .expected_version(&self.denormalize_path(server_path), force, counter)
    }
}

pub(crate) fn unexpected(request: &'static str, response: &Response) -> ClientError {
    tracing::warn!("Unexpected {} response to {} request", response.kind(), request);
    ClientError::UnexpectedResponse {
        request,
        response: response.kind(),
    }
}
