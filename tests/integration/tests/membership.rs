//! Batched membership change tests.

use adc_client::{ClientError, DirectoryClient, UserQuery};
use adc_directory::{fixture::company_dn, Attribute, DirectoryError, Entry, FixtureDirectory};

use crate::common::{company_client, config_builder, connect, stored_members};

/// Connects to the sample directory plus a group under `OU=Other` that
/// reuses `id` and lists `members`.
async fn client_with_namesake_group(
    id: &str,
    members: &[&str],
) -> DirectoryClient<FixtureDirectory> {
    let namesake = Entry::new(
        format!("OU={id},OU=Other,DC=company,DC=com"),
        vec![
            Attribute::single("sAMAccountName", id),
            Attribute::new("objectClass", ["top", "group"]),
            Attribute::new("member", members.iter().map(|m| company_dn(m))),
        ],
    );
    connect(
        config_builder().build().unwrap(),
        FixtureDirectory::company().with_entry(namesake, Vec::<String>::new()),
    )
    .await
}

#[tokio::test]
async fn add_member_writes_full_list() {
    let client = company_client().await;

    let added = client
        .add_group_members("group2", ["userToAdd"])
        .await
        .unwrap();

    assert_eq!(added, 1);
    let writes = client.session().directory().modifications();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].dn, company_dn("group2"));
    assert_eq!(writes[0].replacements[0].name, "member");
    assert_eq!(
        writes[0].replacements[0].values,
        vec![company_dn("user2"), "OU=userToAdd,DC=company,DC=com".to_string()]
    );
}

#[tokio::test]
async fn add_is_idempotent() {
    let client = company_client().await;

    let first = client
        .add_group_members("group2", ["userToAdd"])
        .await
        .unwrap();
    let second = client
        .add_group_members("group2", ["userToAdd"])
        .await
        .unwrap();

    assert_eq!((first, second), (1, 0));
    assert_eq!(client.session().directory().calls().modifies, 1);
}

#[tokio::test]
async fn existing_and_unknown_ids_are_skipped() {
    let client = company_client().await;

    let added = client
        .add_group_members("group1", ["user1", "ghost", "user1"])
        .await
        .unwrap();

    assert_eq!(added, 0);
    assert_eq!(client.session().directory().calls().writes(), 0);
}

#[tokio::test]
async fn remove_member() {
    let client = company_client().await;

    let removed = client
        .remove_group_members("group1", ["user1"])
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert!(stored_members(&client, &company_dn("group1")).is_empty());
}

#[tokio::test]
async fn remove_non_member_is_a_no_op() {
    let client = company_client().await;

    let removed = client
        .remove_group_members("group1", ["user2"])
        .await
        .unwrap();

    assert_eq!(removed, 0);
    assert_eq!(client.session().directory().calls().modifies, 0);
    assert_eq!(
        stored_members(&client, &company_dn("group1")),
        vec![company_dn("user1")]
    );
}

#[tokio::test]
async fn one_failed_lookup_aborts_the_change() {
    let client = company_client().await;

    let err = client
        .add_group_members("group2", ["userToAdd", "entryForErr", "user1"])
        .await
        .unwrap_err();

    match err {
        ClientError::MemberResolution { id, source } => {
            assert_eq!(id, "entryForErr");
            assert!(matches!(
                source.directory_error(),
                Some(DirectoryError::Protocol { .. })
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(client.session().directory().calls().modifies, 0);
    assert_eq!(
        stored_members(&client, &company_dn("group2")),
        vec![company_dn("user2")]
    );
}

#[tokio::test]
async fn unknown_group_fails() {
    let client = company_client().await;

    let err = client
        .add_group_members("noSuchGroup", ["user1"])
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::GroupNotFound(ref id) if id == "noSuchGroup"));
}

#[tokio::test]
async fn member_lookup_recovers_from_dropped_connection() {
    let client = company_client().await;

    let added = client
        .add_group_members("group1", ["userToReconnect", "user2"])
        .await
        .unwrap();

    assert_eq!(added, 2);
    assert_eq!(
        stored_members(&client, &company_dn("group1")),
        vec![
            company_dn("user1"),
            company_dn("userToReconnect"),
            company_dn("user2"),
        ]
    );
}

#[tokio::test]
async fn remove_ignores_membership_of_namesake_group() {
    let client = client_with_namesake_group("group1", &["userToAdd"]).await;
    let group_dn = company_dn("group1");
    let before = client.session().directory().entry(&group_dn).unwrap();

    let user = client
        .get_user(&UserQuery::by_id("userToAdd"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.group_ids(), vec!["group1"]);

    let removed = client
        .remove_group_members("group1", ["userToAdd"])
        .await
        .unwrap();

    assert_eq!(removed, 0);
    assert_eq!(client.session().directory().calls().modifies, 0);
    assert_eq!(client.session().directory().entry(&group_dn).unwrap(), before);
}

#[tokio::test]
async fn add_ignores_membership_of_namesake_group() {
    let client = client_with_namesake_group("group2", &["userToAdd"]).await;

    let added = client
        .add_group_members("group2", ["userToAdd"])
        .await
        .unwrap();

    assert_eq!(added, 1);
    assert_eq!(
        stored_members(&client, &company_dn("group2")),
        vec![company_dn("user2"), company_dn("userToAdd")]
    );
}
