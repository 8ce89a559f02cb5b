//! Group lookup and write tests.

use adc_client::{ClientError, GroupQuery, ListQuery};
use adc_directory::{fixture::company_dn, Attribute, DirectoryError};
use crate::common::company_client;

#[tokio::test]
async fn group1_has_user1() {
    let client = company_client().await;

    let group = client
        .get_group(&GroupQuery::by_id("group1"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(group.id, "group1");
    assert_eq!(group.member_ids(), vec!["user1"]);
    assert!(group.has_member_dn("ou=user1,dc=company,dc=com"));
}

#[tokio::test]
async fn missing_group_is_none() {
    let client = company_client().await;

    let group = client.get_group(&GroupQuery::by_id("nope")).await.unwrap();

    assert!(group.is_none());
}

#[tokio::test]
async fn empty_query_makes_no_calls() {
    let client = company_client().await;
    let before = client.session().directory().calls();

    let err = client.get_group(&GroupQuery::default()).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(client.session().directory().calls(), before);
}

#[tokio::test]
async fn member_search_failure_is_reported() {
    let client = company_client().await;

    let err = client
        .get_group(&GroupQuery::by_id("groupWithErrMember"))
        .await
        .unwrap_err();

    assert!(matches!(
        err.directory_error(),
        Some(DirectoryError::Protocol { .. })
    ));
}

#[tokio::test]
async fn list_with_custom_filter() {
    let client = company_client().await;

    let groups = client
        .list_groups(&ListQuery::with_filter("customFilterToSearchGroup"))
        .await
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, "group1");
}

#[tokio::test]
async fn renamed_member_stays_in_group() {
    let client = company_client().await;

    client
        .rename_user(&company_dn("user1"), "OU=user1renamed")
        .await
        .unwrap();

    let group = client
        .get_group(&GroupQuery::by_id("group1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(group.member_dns(), vec![company_dn("user1renamed")]);
    assert_eq!(group.member_ids(), vec!["user1"]);
}

#[tokio::test]
async fn update_group_description() {
    let client = company_client().await;
    let dn = company_dn("group2");

    client
        .update_group(&dn, &[Attribute::single("description", "second group")])
        .await
        .unwrap();

    let group = client
        .get_group(&GroupQuery::by_id("group2").skip_members())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(group.string_attribute("description"), "second group");
}
