//! Shared test utilities for client integration tests
#![allow(dead_code)]

use client::testkit::MemorySession;
use client::Client;
use protocol::ServerVersion;

/// Install a subscriber once so `RUST_LOG=debug cargo test` shows client logs
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A started client with no chroot, against a modern server
pub async fn setup_client() -> (Client<MemorySession>, MemorySession) {
    setup_client_with(MemorySession::new(), None).await
}

/// A started client rooted at `chroot`, against a modern server
pub async fn setup_chrooted_client(chroot: &str) -> (Client<MemorySession>, MemorySession) {
    setup_client_with(MemorySession::new(), Some(chroot)).await
}

/// A started client against a server running `version`
pub async fn setup_client_on(version: ServerVersion) -> (Client<MemorySession>, MemorySession) {
    setup_client_with(MemorySession::with_version(version), None).await
}

pub async fn setup_client_with(
    session: MemorySession,
    chroot: Option<&str>,
) -> (Client<MemorySession>, MemorySession) {
    init_tracing();

    let mut builder = Client::builder(session.clone());
    if let Some(chroot) = chroot {
        builder = builder.chroot(chroot);
    }
    let client = builder.build();
    client.start().await.unwrap();

    // start() may have bootstrapped the chroot, tests only care about what follows
    session.clear_requests();
    (client, session)
}
