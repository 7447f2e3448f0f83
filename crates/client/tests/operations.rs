//! Integration tests for the single-node client operations

mod common;

use client::testkit::MemorySession;
use client::{ClientError, CreateOptions};
use protocol::{Acl, Perms, Request, ServerError, ServerVersion};

#[tokio::test]
async fn test_exists() {
    let (client, _session) = common::setup_client().await;

    assert!(!client.exists("/missing", false).await.unwrap());

    client.create("/present", CreateOptions::new()).await.unwrap();
    assert!(client.exists("/present", false).await.unwrap());
}

#[tokio::test]
async fn test_exists_propagates_other_errors() {
    let (client, session) = common::setup_client().await;

    session.fail_next("/flaky", ServerError::ConnectionLoss);
    let result = client.exists("/flaky", false).await;
    assert!(matches!(
        result,
        Err(ClientError::Server(ServerError::ConnectionLoss))
    ));

    session.fail_next("/locked", ServerError::NoAuth);
    let result = client.exists("/locked", true).await;
    assert!(matches!(result, Err(ClientError::Server(ServerError::NoAuth))));
}

#[tokio::test]
async fn test_create_returns_path() {
    let (client, session) = common::setup_client().await;

    let path = client
        .create("/node", CreateOptions::new().data("hello"))
        .await
        .unwrap();
    assert_eq!(path, "/node");
    assert_eq!(session.node_data("/node").unwrap(), b"hello");
}

#[tokio::test]
async fn test_create_sequential_returns_suffixed_path() {
    let (client, _session) = common::setup_client().await;
    client.create("/queue", CreateOptions::new()).await.unwrap();

    let first = client
        .create("/queue/item-", CreateOptions::new().sequential())
        .await
        .unwrap();
    let second = client
        .create("/queue/item-", CreateOptions::new().sequential())
        .await
        .unwrap();

    assert_eq!(first, "/queue/item-0000000000");
    assert_eq!(second, "/queue/item-0000000001");
    assert!(client.exists(&second, false).await.unwrap());
}

#[tokio::test]
async fn test_create_uses_stat_variant_on_modern_server() {
    let (client, session) = common::setup_client_on(ServerVersion(3, 5, 0)).await;

    client.create("/node", CreateOptions::new()).await.unwrap();

    let requests = session.requests();
    assert_eq!(requests.len(), 1);
    assert!(matches!(requests[0], Request::Create2(_)));
    // the stat came back with the create, so it is already cached
    assert_eq!(
        client.stat_cache().get("/node"),
        session.node_stat("/node")
    );
}

#[tokio::test]
async fn test_create_uses_legacy_variant_on_old_server() {
    let (client, session) = common::setup_client_on(ServerVersion(3, 4, 14)).await;

    client.create("/node", CreateOptions::new()).await.unwrap();

    let requests = session.requests();
    assert!(matches!(requests[0], Request::Create(_)));
    assert!(client.stat_cache().get("/node").is_none());
}

#[tokio::test]
async fn test_create_container_unsupported_sends_nothing() {
    let (client, session) = common::setup_client_on(ServerVersion(3, 5, 0)).await;

    let result = client
        .create("/container", CreateOptions::new().container())
        .await;

    assert!(matches!(
        result,
        Err(ClientError::FeatureUnavailable {
            feature: "containers",
            ..
        })
    ));
    assert_eq!(session.send_count(), 0);
    assert!(!session.contains("/container"));
}

#[tokio::test]
async fn test_create_container_unconnected_sends_nothing() {
    let session = MemorySession::unconnected();
    let client = client::Client::new(session.clone());

    let result = client
        .create("/container", CreateOptions::new().container())
        .await;

    assert!(matches!(
        result,
        Err(ClientError::FeatureUnavailable { .. })
    ));
    assert_eq!(session.send_count(), 0);
}

#[tokio::test]
async fn test_create_container_supported() {
    let (client, session) = common::setup_client_on(ServerVersion(3, 5, 1)).await;

    client
        .create("/container", CreateOptions::new().container())
        .await
        .unwrap();

    assert!(session.is_container("/container"));
}

#[tokio::test]
async fn test_create_existing_node_propagates() {
    let (client, _session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();

    let result = client.create("/node", CreateOptions::new()).await;
    assert!(matches!(
        result,
        Err(ClientError::Server(ServerError::NodeExists(_)))
    ));
}

#[tokio::test]
async fn test_create_without_parent_propagates() {
    let (client, _session) = common::setup_client().await;

    let result = client.create("/a/b", CreateOptions::new()).await;
    assert!(result.unwrap_err().is_no_node());
}

#[tokio::test]
async fn test_create_uses_default_acl() {
    let session = MemorySession::new();
    let client = client::Client::builder(session.clone())
        .default_acl(vec![Acl::read_only()])
        .build();
    client.start().await.unwrap();

    client.create("/guarded", CreateOptions::new()).await.unwrap();
    client
        .create(
            "/open",
            CreateOptions::new().acl(vec![Acl::unrestricted()]),
        )
        .await
        .unwrap();

    assert_eq!(client.get_acl("/guarded").await.unwrap(), vec![Acl::read_only()]);
    assert_eq!(client.get_acl("/open").await.unwrap(), vec![Acl::unrestricted()]);
}

#[tokio::test]
async fn test_get_and_set_data() {
    let (client, _session) = common::setup_client().await;
    client
        .create("/config", CreateOptions::new().data("v1"))
        .await
        .unwrap();

    assert_eq!(client.get_data("/config", false).await.unwrap(), b"v1");

    client.set_data("/config", "v2", false).await.unwrap();
    assert_eq!(client.get_data("/config", true).await.unwrap(), b"v2");
}

#[tokio::test]
async fn test_get_data_missing_node_propagates() {
    let (client, _session) = common::setup_client().await;

    let result = client.get_data("/missing", false).await;
    assert!(result.unwrap_err().is_no_node());
}

#[tokio::test]
async fn test_get_children() {
    let (client, _session) = common::setup_client().await;
    client.create("/parent", CreateOptions::new()).await.unwrap();
    for name in ["b", "a", "c"] {
        client
            .create(&format!("/parent/{}", name), CreateOptions::new())
            .await
            .unwrap();
    }

    let mut children = client.get_children("/parent", false).await.unwrap();
    children.sort();
    assert_eq!(children, vec!["a", "b", "c"]);

    assert!(client
        .get_children("/parent/a", false)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_set_acl() {
    let (client, session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();

    let acl = vec![Acl::new(Perms::READ | Perms::WRITE, protocol::Id::anyone())];
    client.set_acl("/node", acl.clone(), false).await.unwrap();

    assert_eq!(client.get_acl("/node").await.unwrap(), acl);
    assert_eq!(session.node_stat("/node").unwrap().aversion, 1);
}

#[tokio::test]
async fn test_delete() {
    let (client, _session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();

    client.delete("/node", false).await.unwrap();
    assert!(!client.exists("/node", false).await.unwrap());

    let result = client.delete("/node", false).await;
    assert!(result.unwrap_err().is_no_node());
}

#[tokio::test]
async fn test_delete_non_empty_propagates() {
    let (client, _session) = common::setup_client().await;
    client.ensure_path("/a/b", None).await.unwrap();

    let result = client.delete("/a", true).await;
    assert!(matches!(
        result,
        Err(ClientError::Server(ServerError::NotEmpty(_)))
    ));
}

#[tokio::test]
async fn test_ephemeral_nodes_removed_on_close() {
    let (client, session) = common::setup_client().await;
    client
        .create("/lease", CreateOptions::new().ephemeral())
        .await
        .unwrap();
    client.create("/durable", CreateOptions::new()).await.unwrap();

    client.close().await.unwrap();

    assert!(!session.contains("/lease"));
    assert!(session.contains("/durable"));
}

#[tokio::test]
async fn test_operations_after_close_fail() {
    let (client, _session) = common::setup_client().await;
    client.close().await.unwrap();

    let result = client.get_data("/", false).await;
    assert!(matches!(
        result,
        Err(ClientError::Server(ServerError::SessionClosed))
    ));
}

#[tokio::test]
async fn test_features_follow_reconnects() {
    let (client, session) = common::setup_client_on(ServerVersion(3, 8, 0)).await;
    assert!(client.features().containers);

    session.set_server_version(Some(ServerVersion(3, 4, 10)));
    assert!(!client.features().containers);
    assert!(!client.features().create_with_stat);

    client.create("/after", CreateOptions::new()).await.unwrap();
    assert!(matches!(session.requests()[0], Request::Create(_)));
}

fn sent_version(request: &Request) -> i32 {
    request.version().unwrap()
}

#[tokio::test]
async fn test_mutation_without_cached_stat_is_unconditional() {
    let (client, session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();
    client.stat_cache().clear();
    session.clear_requests();

    client.set_data("/node", "x", false).await.unwrap();

    assert_eq!(sent_version(&session.requests()[0]), protocol::ANY_VERSION);
}

#[tokio::test]
async fn test_delete_without_cached_stat_is_unconditional() {
    let (client, session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();
    client.stat_cache().clear();
    session.clear_requests();

    client.delete("/node", false).await.unwrap();

    assert!(matches!(
        &session.requests()[0],
        Request::Delete(req) if req.version == protocol::ANY_VERSION
    ));
}

#[tokio::test]
async fn test_mutation_uses_cached_version() {
    let (client, session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();
    client.set_data("/node", "1", false).await.unwrap();
    client.set_data("/node", "2", false).await.unwrap();
    session.clear_requests();

    client.delete("/node", false).await.unwrap();

    assert_eq!(sent_version(&session.requests()[0]), 2);
}

#[tokio::test]
async fn test_stale_cached_version_fails() {
    let (client, _session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();

    // another writer moves the node on without this client seeing it
    let other = client::Client::new(client.session().as_ref().clone());
    other.set_data("/node", "theirs", true).await.unwrap();

    let result = client.set_data("/node", "mine", false).await;
    assert!(matches!(
        result,
        Err(ClientError::Server(ServerError::BadVersion(_)))
    ));

    client.set_data("/node", "mine", true).await.unwrap();
    assert_eq!(client.get_data("/node", false).await.unwrap(), b"mine");
}

#[tokio::test]
async fn test_force_sends_any_version() {
    let (client, session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();
    client.set_data("/node", "1", false).await.unwrap();
    session.clear_requests();

    client.delete("/node", true).await.unwrap();

    assert!(session.requests()[0].is_unconditional());
}

#[tokio::test]
async fn test_cache_tracks_latest_stat() {
    let (client, session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();

    client.set_data("/node", "payload", false).await.unwrap();

    let cached = client.stat_cache().get("/node").unwrap();
    assert_eq!(Some(cached), session.node_stat("/node"));
    assert_eq!(cached.version, 1);
    assert_eq!(cached.data_length, 7);
}

#[tokio::test]
async fn test_set_acl_compares_acl_version() {
    let (client, session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();
    // bump the data version so it differs from the ACL version
    client.set_data("/node", "1", false).await.unwrap();
    session.clear_requests();

    client
        .set_acl("/node", vec![Acl::read_only()], false)
        .await
        .unwrap();

    assert_eq!(sent_version(&session.requests()[0]), 0);
}
