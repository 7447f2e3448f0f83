/// In-process session for exercising the client without a server
///
/// [`MemorySession`] keeps a whole node tree in memory and records every
/// request and watch registration the client makes, so tests can assert on
/// exactly what reached the session.
///
/// # Example
///
/// ```rust,ignore
/// use client::testkit::MemorySession;
/// use client::Client;
///
/// #[tokio::test]
/// async fn test_roundtrip() {
///     let session = MemorySession::new();
///     let client = Client::builder(session.clone()).chroot("/app").build();
///     client.start().await.unwrap();
///
///     client.ensure_path("/config/db", None).await.unwrap();
///     client.set_data("/config/db", "postgres://", false).await.unwrap();
///
///     assert!(session.contains("/app/config/db"));
/// }
/// ```
mod memory_session;
mod tree;

pub use memory_session::{MemorySession, DEFAULT_SERVER_VERSION};
