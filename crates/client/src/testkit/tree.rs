use std::collections::BTreeMap;

use protocol::{
    Acl, CreateRequest, EventType, MultiOp, MultiResult, ServerError, Stat, WatchEvent,
    ANY_VERSION,
};

#[derive(Debug, Clone)]
pub(crate) struct MemoryNode {
    pub data: Vec<u8>,
    pub acl: Vec<Acl>,
    pub stat: Stat,
    pub container: bool,
}

/// The node tree behind a [`MemorySession`](super::MemorySession).
///
/// Mutations queue the watch events they would trigger; the session fires
///  them once its locks are released.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: BTreeMap<String, MemoryNode>,
    zxid: i64,
}

impl Default for Tree {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "/".to_string(),
            MemoryNode {
                data: Vec::new(),
                acl: vec![Acl::unrestricted()],
                stat: Stat::default(),
                container: false,
            },
        );
        Self { nodes, zxid: 0 }
    }
}

pub(crate) fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(index) => &path[..index],
    }
}

fn child_prefix(path: &str) -> String {
    if path == "/" {
        "/".to_string()
    } else {
        format!("{}/", path)
    }
}

fn check_version(path: &str, expected: i32, actual: i32) -> Result<(), ServerError> {
    if expected != ANY_VERSION && expected != actual {
        return Err(ServerError::BadVersion(path.to_string()));
    }
    Ok(())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl Tree {
    pub fn get(&self, path: &str) -> Option<&MemoryNode> {
        self.nodes.get(path)
    }

    fn node(&self, path: &str) -> Result<&MemoryNode, ServerError> {
        self.nodes
            .get(path)
            .ok_or_else(|| ServerError::NoNode(path.to_string()))
    }

    fn node_mut(&mut self, path: &str) -> Result<&mut MemoryNode, ServerError> {
        self.nodes
            .get_mut(path)
            .ok_or_else(|| ServerError::NoNode(path.to_string()))
    }

    fn next_zxid(&mut self) -> i64 {
        self.zxid += 1;
        self.zxid
    }

    pub fn create(
        &mut self,
        request: &CreateRequest,
        session_id: i64,
        events: &mut Vec<WatchEvent>,
    ) -> Result<(String, Stat), ServerError> {
        if request.path == "/" {
            return Err(ServerError::NodeExists(request.path.clone()));
        }
        if request.acl.is_empty() {
            return Err(ServerError::InvalidAcl);
        }

        let parent_path = parent_of(&request.path).to_string();
        let parent = self
            .nodes
            .get(&parent_path)
            .ok_or_else(|| ServerError::NoNode(request.path.clone()))?;
        if parent.stat.is_ephemeral() {
            return Err(ServerError::NoChildrenForEphemerals(parent_path));
        }

        let path = if request.flags.sequential {
            format!("{}{:010}", request.path, parent.stat.cversion)
        } else {
            request.path.clone()
        };
        if self.nodes.contains_key(&path) {
            return Err(ServerError::NodeExists(path));
        }

        let zxid = self.next_zxid();
        let now = now_millis();
        let stat = Stat {
            czxid: zxid,
            mzxid: zxid,
            ctime: now,
            mtime: now,
            ephemeral_owner: if request.flags.ephemeral { session_id } else { 0 },
            data_length: request.data.len() as i32,
            pzxid: zxid,
            ..Stat::default()
        };
        self.nodes.insert(
            path.clone(),
            MemoryNode {
                data: request.data.clone(),
                acl: request.acl.clone(),
                stat,
                container: request.flags.container,
            },
        );

        let parent = self.node_mut(&parent_path)?;
        parent.stat.cversion += 1;
        parent.stat.num_children += 1;
        parent.stat.pzxid = zxid;

        events.push(WatchEvent::new(EventType::Created, path.clone()));
        events.push(WatchEvent::new(EventType::ChildrenChanged, parent_path));
        Ok((path, stat))
    }

    pub fn delete(
        &mut self,
        path: &str,
        version: i32,
        events: &mut Vec<WatchEvent>,
    ) -> Result<(), ServerError> {
        if path == "/" {
            return Err(ServerError::Other {
                code: -8,
                message: "cannot delete the root node".to_string(),
            });
        }
        let node = self.node(path)?;
        check_version(path, version, node.stat.version)?;
        if node.stat.num_children > 0 {
            return Err(ServerError::NotEmpty(path.to_string()));
        }

        self.nodes.remove(path);
        let zxid = self.next_zxid();
        let parent_path = parent_of(path).to_string();
        let parent = self.node_mut(&parent_path)?;
        parent.stat.cversion += 1;
        parent.stat.num_children -= 1;
        parent.stat.pzxid = zxid;

        events.push(WatchEvent::new(EventType::Deleted, path));
        events.push(WatchEvent::new(EventType::ChildrenChanged, parent_path));
        Ok(())
    }

    pub fn set_data(
        &mut self,
        path: &str,
        data: &[u8],
        version: i32,
        events: &mut Vec<WatchEvent>,
    ) -> Result<Stat, ServerError> {
        let current = self.node(path)?.stat.version;
        check_version(path, version, current)?;

        let zxid = self.next_zxid();
        let node = self.node_mut(path)?;
        node.data = data.to_vec();
        node.stat.version += 1;
        node.stat.mzxid = zxid;
        node.stat.mtime = now_millis();
        node.stat.data_length = data.len() as i32;

        let stat = node.stat;
        events.push(WatchEvent::new(EventType::DataChanged, path));
        Ok(stat)
    }

    pub fn set_acl(&mut self, path: &str, acl: &[Acl], version: i32) -> Result<Stat, ServerError> {
        if acl.is_empty() {
            return Err(ServerError::InvalidAcl);
        }
        let node = self.node_mut(path)?;
        check_version(path, version, node.stat.aversion)?;

        node.acl = acl.to_vec();
        node.stat.aversion += 1;
        Ok(node.stat)
    }

    pub fn check(&self, path: &str, version: i32) -> Result<(), ServerError> {
        let node = self.node(path)?;
        check_version(path, version, node.stat.version)
    }

    pub fn stat(&self, path: &str) -> Result<Stat, ServerError> {
        Ok(self.node(path)?.stat)
    }

    pub fn data(&self, path: &str) -> Result<(Vec<u8>, Stat), ServerError> {
        let node = self.node(path)?;
        Ok((node.data.clone(), node.stat))
    }

    pub fn acl(&self, path: &str) -> Result<(Vec<Acl>, Stat), ServerError> {
        let node = self.node(path)?;
        Ok((node.acl.clone(), node.stat))
    }

    pub fn children(&self, path: &str) -> Result<(Vec<String>, Stat), ServerError> {
        let stat = self.node(path)?.stat;
        let prefix = child_prefix(path);
        let children = self
            .nodes
            .range(prefix.clone()..)
            .take_while(|(child, _)| child.starts_with(&prefix))
            .filter_map(|(child, _)| {
                let name = &child[prefix.len()..];
                (!name.is_empty() && !name.contains('/')).then(|| name.to_string())
            })
            .collect();
        Ok((children, stat))
    }

    /// Paths of every ephemeral node owned by `session_id`
    pub fn ephemerals(&self, session_id: i64) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.stat.ephemeral_owner == session_id)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Apply every op or none of them. On failure the tree is untouched, the
    ///  failing op reports its error and every other op reports `RolledBack`.
    pub fn multi(
        &mut self,
        ops: &[MultiOp],
        session_id: i64,
        events: &mut Vec<WatchEvent>,
    ) -> Vec<MultiResult> {
        let mut staged = self.clone();
        let mut staged_events = Vec::new();
        let mut results = Vec::with_capacity(ops.len());

        for (index, op) in ops.iter().enumerate() {
            let outcome = match op {
                MultiOp::Check(req) => staged.check(&req.path, req.version).map(|_| MultiResult::Check),
                MultiOp::Create(req) => staged
                    .create(req, session_id, &mut staged_events)
                    .map(|(path, _)| MultiResult::Create { path }),
                MultiOp::SetData(req) => staged
                    .set_data(&req.path, &req.data, req.version, &mut staged_events)
                    .map(|stat| MultiResult::SetData { stat }),
                MultiOp::Delete(req) => staged
                    .delete(&req.path, req.version, &mut staged_events)
                    .map(|_| MultiResult::Delete),
            };

            match outcome {
                Ok(result) => results.push(result),
                Err(err) => {
                    let mut failed = vec![MultiResult::Error(ServerError::RolledBack); ops.len()];
                    failed[index] = MultiResult::Error(err);
                    return failed;
                }
            }
        }

        *self = staged;
        events.extend(staged_events);
        results
    }
}
