//! User lookup and write tests.

use adc_client::{ClientError, UserQuery};
use adc_directory::{fixture::company_dn, Attribute, DirectoryError};
use crate::common::company_client;

#[tokio::test]
async fn get_user_with_groups() {
    let client = company_client().await;

    let user = client
        .get_user(&UserQuery::by_id("user1"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.dn, company_dn("user1"));
    assert_eq!(user.id, "user1");
    assert_eq!(user.string_attribute("displayName"), "user1 display");
    assert_eq!(user.group_ids(), vec!["group1"]);
    assert!(user.is_group_member("group1"));
}

#[tokio::test]
async fn get_user_by_dn() {
    let client = company_client().await;

    let user = client
        .get_user(&UserQuery::by_dn(company_dn("user2")))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.id, "user2");
    assert_eq!(user.group_dns(), vec![company_dn("group2")]);
}

#[tokio::test]
async fn custom_filter_takes_precedence() {
    let client = company_client().await;

    let mut query = UserQuery::by_filter("customFilterToSearchUser");
    query.lookup.id = "user2".to_string();
    query.lookup.dn = company_dn("user2");

    let user = client.get_user(&query).await.unwrap().unwrap();
    assert_eq!(user.id, "user1");
}

#[tokio::test]
async fn skip_groups_makes_one_search() {
    let client = company_client().await;
    let before = client.session().directory().calls().searches;

    let user = client
        .get_user(&UserQuery::by_id("user1").skip_groups())
        .await
        .unwrap()
        .unwrap();

    assert!(user.groups.is_empty());
    assert_eq!(client.session().directory().calls().searches, before + 1);
}

#[tokio::test]
async fn missing_user_is_none() {
    let client = company_client().await;

    let user = client.get_user(&UserQuery::by_id("nobody")).await.unwrap();

    assert!(user.is_none());
}

#[tokio::test]
async fn empty_query_makes_no_calls() {
    let client = company_client().await;
    let before = client.session().directory().calls();

    let err = client.get_user(&UserQuery::default()).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(client.session().directory().calls(), before);
}

#[tokio::test]
async fn first_match_wins_for_duplicate_ids() {
    let client = company_client().await;

    let user = client
        .get_user(&UserQuery::by_id("notUniq"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.dn, "OU=notUniq1,DC=company,DC=com");
}

#[tokio::test]
async fn lookup_failure_is_reported() {
    let client = company_client().await;

    let err = client
        .get_user(&UserQuery::by_id("entryForErr"))
        .await
        .unwrap_err();

    assert!(!err.is_transient());
    assert!(matches!(
        err,
        ClientError::Directory {
            operation: "get user",
            source: DirectoryError::Protocol { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn requested_attributes_only() {
    let client = company_client().await;

    let query = UserQuery::by_id("user1").with_attributes(vec!["sAMAccountName".to_string()]);
    let user = client
        .get_user(&query)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.attributes.len(), 1);
    assert_eq!(user.string_attribute("displayName"), "");
}

#[tokio::test]
async fn user_serializes_with_groups() {
    let client = company_client().await;

    let user = client
        .get_user(&UserQuery::by_id("user2"))
        .await
        .unwrap()
        .unwrap();
    let json = serde_json::to_value(&user).unwrap();

    assert_eq!(json["id"], "user2");
    assert_eq!(json["groups"][0]["id"], "group2");
    assert_eq!(json["attributes"]["sAMAccountName"], "user2");
}

#[tokio::test]
async fn create_update_and_rename() {
    let client = company_client().await;
    let dn = company_dn("user9");

    client
        .create_user(
            &dn,
            &[
                Attribute::new("objectClass", ["top", "person", "user"]),
                Attribute::single("sAMAccountName", "user9"),
                Attribute::single("description", "temp"),
            ],
        )
        .await
        .unwrap();
    client
        .update_user(
            &dn,
            &[
                Attribute::single("displayName", "User Nine"),
                Attribute::new("description", Vec::<String>::new()),
            ],
        )
        .await
        .unwrap();

    let directory = client.session().directory();
    let entry = directory.entry(&dn).unwrap();
    assert_eq!(entry.first_value("displayName"), Some("User Nine"));
    assert!(!entry.has_attribute("description"));

    client.rename_user(&dn, "OU=user10").await.unwrap();
    assert!(directory.entry(&dn).is_none());
    assert!(directory.entry(&company_dn("user10")).is_some());
}

#[tokio::test]
async fn writes_require_a_dn() {
    let client = company_client().await;

    let err = client
        .update_user("", &[Attribute::single("displayName", "x")])
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(client.session().directory().calls().writes(), 0);
}
