//! Paged listing tests.

use adc_client::{ClientError, ListQuery};
use adc_directory::{DirectoryError, FixtureDirectory};
use crate::common::{company_client, config_builder, connect};

#[tokio::test]
async fn lists_every_page() {
    let client = connect(
        config_builder().page_size(1).build().unwrap(),
        FixtureDirectory::company(),
    )
    .await;
    let before = client.session().directory().calls().searches;

    let users = client.list_users(&ListQuery::default()).await.unwrap();

    let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["user1", "user2", "userToAdd"]);
    assert!(users.iter().all(|u| u.groups.is_empty()));
    assert_eq!(client.session().directory().calls().searches, before + 3);
}

#[tokio::test]
async fn query_page_size_overrides_config() {
    let client = company_client().await;
    let before = client.session().directory().calls().searches;

    let users = client
        .list_users(&ListQuery::default().page_size(2))
        .await
        .unwrap();

    assert_eq!(users.len(), 3);
    assert_eq!(client.session().directory().calls().searches, before + 2);
}

#[tokio::test]
async fn page_ceiling_is_enforced() {
    let client = connect(
        config_builder().page_size(1).max_pages(2).build().unwrap(),
        FixtureDirectory::company(),
    )
    .await;

    let err = client.list_users(&ListQuery::default()).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Directory {
            operation: "list users",
            source: DirectoryError::PageLimitExceeded(2),
            ..
        }
    ));
}

#[tokio::test]
async fn endless_cookie_stops_at_ceiling() {
    let client = connect(
        config_builder().max_pages(5).build().unwrap(),
        FixtureDirectory::company().with_endless_paging(),
    )
    .await;
    let before = client.session().directory().calls().searches;

    let err = client.list_groups(&ListQuery::default()).await.unwrap_err();

    assert!(matches!(
        err.directory_error(),
        Some(DirectoryError::PageLimitExceeded(5))
    ));
    assert_eq!(client.session().directory().calls().searches, before + 5);
}
