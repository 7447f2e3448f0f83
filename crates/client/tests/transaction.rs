//! Integration tests for atomic multi-op transactions

mod common;

use client::testkit::MemorySession;
use client::{Client, ClientError, CreateOptions, TransactionResult};
use protocol::{Request, ServerError, ServerVersion};

#[tokio::test]
async fn test_commit_applies_everything() {
    let (client, session) = common::setup_client().await;
    client.create("/existing", CreateOptions::new()).await.unwrap();
    client.create("/doomed", CreateOptions::new()).await.unwrap();
    client.create("/watched", CreateOptions::new()).await.unwrap();

    let result = client
        .begin_transaction()
        .check_version("/watched", 0)
        .create("/fresh", CreateOptions::new().data("new"))
        .set_data("/existing", "updated", false)
        .delete("/doomed", false)
        .commit()
        .await
        .unwrap();

    assert!(result.checked.contains("/watched"));
    assert!(result.created.contains("/fresh"));
    assert!(result.updated.contains("/existing"));
    assert!(result.deleted.contains("/doomed"));

    assert_eq!(session.node_data("/fresh").unwrap(), b"new");
    assert_eq!(session.node_data("/existing").unwrap(), b"updated");
    assert!(!session.contains("/doomed"));
}

#[tokio::test]
async fn test_commit_is_one_round_trip() {
    let (client, session) = common::setup_client().await;
    session.clear_requests();

    client
        .begin_transaction()
        .create("/a", CreateOptions::new())
        .create("/a/b", CreateOptions::new())
        .commit()
        .await
        .unwrap();

    let requests = session.requests();
    assert_eq!(requests.len(), 1);
    assert!(matches!(&requests[0], Request::Multi(multi) if multi.ops.len() == 2));
}

#[tokio::test]
async fn test_sequential_create_reports_server_path() {
    let (client, _session) = common::setup_client().await;
    client.create("/queue", CreateOptions::new()).await.unwrap();

    let result = client
        .begin_transaction()
        .create("/queue/item-", CreateOptions::new().sequential())
        .commit()
        .await
        .unwrap();

    assert!(result.created.contains("/queue/item-0000000000"));
}

#[tokio::test]
async fn test_failure_rolls_back_everything() {
    let (client, session) = common::setup_client().await;
    client.create("/existing", CreateOptions::new()).await.unwrap();

    let result = client
        .begin_transaction()
        .create("/fresh", CreateOptions::new())
        .set_data("/existing", "updated", true)
        .delete("/missing", true)
        .commit()
        .await;

    match result {
        Err(ClientError::TransactionFailed {
            index,
            path,
            source,
        }) => {
            assert_eq!(index, 2);
            assert_eq!(path, "/missing");
            assert!(source.is_no_node());
        }
        other => panic!("expected a transaction failure, got {:?}", other),
    }

    assert!(!session.contains("/fresh"));
    assert!(session.node_data("/existing").unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_check_reports_bad_version() {
    let (client, _session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();

    let result = client
        .begin_transaction()
        .check_version("/node", 7)
        .create("/never", CreateOptions::new())
        .commit()
        .await;

    assert!(matches!(
        result,
        Err(ClientError::TransactionFailed {
            index: 0,
            source: ServerError::BadVersion(_),
            ..
        })
    ));
}

#[tokio::test]
async fn test_commit_refreshes_stat_cache() {
    let (client, session) = common::setup_client().await;
    client.create("/node", CreateOptions::new()).await.unwrap();

    client
        .begin_transaction()
        .set_data("/node", "v1", false)
        .commit()
        .await
        .unwrap();

    assert_eq!(client.stat_cache().get("/node"), session.node_stat("/node"));
    // so the next conditional write lines up
    client.set_data("/node", "v2", false).await.unwrap();
}

#[tokio::test]
async fn test_paths_under_chroot() {
    let (client, session) = common::setup_chrooted_client("/app").await;

    let result = client
        .begin_transaction()
        .create("/x", CreateOptions::new())
        .commit()
        .await
        .unwrap();

    assert!(result.created.contains("/x"));
    assert!(session.contains("/app/x"));
}

#[tokio::test]
async fn test_empty_commit_sends_nothing() {
    let (client, session) = common::setup_client().await;

    let transaction = client.begin_transaction();
    assert!(transaction.is_empty());
    let result = transaction.commit().await.unwrap();

    assert_eq!(result, TransactionResult::default());
    assert_eq!(session.send_count(), 0);
}

#[tokio::test]
async fn test_unsupported_container_rejected_before_sending() {
    common::init_tracing();
    let session = MemorySession::with_version(ServerVersion(3, 5, 0));
    let client = Client::new(session.clone());
    client.start().await.unwrap();

    let result = client
        .begin_transaction()
        .create("/plain", CreateOptions::new())
        .create("/bin", CreateOptions::new().container())
        .commit()
        .await;

    assert!(matches!(result, Err(ClientError::FeatureUnavailable { .. })));
    assert_eq!(session.send_count(), 0);
    assert!(!session.contains("/plain"));
}
