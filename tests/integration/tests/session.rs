//! Session recovery tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use adc_client::{ClientError, SessionState, UserQuery};
use adc_directory::{DirectoryError, FixtureDirectory};
use crate::common::{company_client, config_builder};
use tokio::sync::Barrier;
use tokio::task::JoinSet;

#[tokio::test]
async fn wrong_credentials_fail_connect() {
    let config = config_builder().bind_password("wrong").build().unwrap();

    let err = adc_client::DirectoryClient::connect(config, FixtureDirectory::company())
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err,
        ClientError::Directory {
            operation: "bind",
            source: DirectoryError::InvalidCredentials(_),
            ..
        }
    ));
}

#[tokio::test]
async fn dropped_connection_is_retried_once() {
    let client = company_client().await;

    let user = client
        .get_user(&UserQuery::by_id("userToReconnect").skip_groups())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.id, "userToReconnect");
    assert_eq!(client.state(), SessionState::Bound);
    assert_eq!(client.session().generation(), 2);

    let calls = client.session().directory().calls();
    assert_eq!(calls.binds, 2);
    assert_eq!(calls.searches, 2);
}

#[tokio::test]
async fn persistent_failure_gives_up_after_retry() {
    let client = company_client().await;

    let err = client
        .get_user(&UserQuery::by_id("userUnreachable"))
        .await
        .unwrap_err();

    assert!(err.is_transient());
    let calls = client.session().directory().calls();
    assert_eq!(calls.searches, 2);
    assert_eq!(calls.binds, 2);
}

#[tokio::test]
async fn concurrent_failures_share_one_rebind() {
    const CALLERS: usize = 4;

    let client = company_client().await;
    let barrier = Arc::new(Barrier::new(CALLERS));
    let mut tasks = JoinSet::new();

    for _ in 0..CALLERS {
        let client = client.clone();
        let barrier = Arc::clone(&barrier);
        let attempts = Arc::new(AtomicUsize::new(0));
        tasks.spawn(async move {
            client
                .session()
                .execute("lookup", |_directory| {
                    let barrier = Arc::clone(&barrier);
                    let attempts = Arc::clone(&attempts);
                    async move {
                        if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                            barrier.wait().await;
                            Err(DirectoryError::connection("reset"))
                        } else {
                            Ok(())
                        }
                    }
                })
                .await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    assert_eq!(client.session().generation(), 2);
    assert_eq!(client.session().directory().calls().binds, 2);
}

#[tokio::test]
async fn closed_client_rejects_calls() {
    let client = company_client().await;
    client.close().await.unwrap();

    let err = client
        .get_user(&UserQuery::by_id("user1"))
        .await
        .unwrap_err();

    assert_eq!(client.state(), SessionState::Unbound);
    assert!(matches!(err.directory_error(), Some(DirectoryError::NotBound)));
    assert_eq!(client.session().directory().calls().searches, 0);
}
