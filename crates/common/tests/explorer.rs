//! Integration tests for the authorized folder and object operations

mod common;

use bytes::Bytes;

use crate::common::{
    folder, raw_acl, setup_faulty_env, setup_test_env, user, AuthzError, Download, Explorer,
    ExplorerError, FaultOp, ShareTarget, Storage,
};

fn is_denied(result: &Result<impl std::fmt::Debug, ExplorerError>) -> bool {
    matches!(result, Err(ExplorerError::Authz(AuthzError::Denied { .. })))
}

#[tokio::test]
async fn test_provision_user_is_idempotent() {
    let storage = Storage::memory();
    let explorer = Explorer::new(storage.clone());

    let first = explorer.provision_user(&user("dave")).await.unwrap();
    assert!(first.root_created);
    assert!(first.shared_folders_created);
    assert_eq!(raw_acl(&storage, "dave").await.unwrap(), br#"{"owner":"dave"}"#);
    assert!(raw_acl(&storage, "dave/Shared Folders").await.is_some());

    let second = explorer.provision_user(&user("dave")).await.unwrap();
    assert!(!second.root_created);
    assert!(!second.shared_folders_created);
}

#[tokio::test]
async fn test_create_folder() {
    let (explorer, storage) = setup_test_env().await;

    let created = explorer
        .create_folder(&folder("alice/docs"), "reports", &user("alice"))
        .await
        .unwrap();
    assert_eq!(created.as_str(), "alice/docs/reports");
    assert_eq!(
        raw_acl(&storage, "alice/docs/reports").await.unwrap(),
        br#"{"owner":"alice"}"#
    );

    let again = explorer
        .create_folder(&folder("alice/docs"), "reports", &user("alice"))
        .await;
    assert!(matches!(again, Err(ExplorerError::AlreadyExists(_))));
}

#[tokio::test]
async fn test_create_folder_needs_write_on_parent() {
    let (explorer, _storage) = setup_test_env().await;

    let result = explorer
        .create_folder(&folder("alice/docs"), "mine", &user("bob"))
        .await;
    assert!(is_denied(&result));

    // with a write grant, bob owns the created folder
    explorer
        .share(
            &folder("alice/docs"),
            &user("alice"),
            &[ShareTarget::new(user("bob"), false, true)],
        )
        .await
        .unwrap();
    explorer
        .create_folder(&folder("alice/docs"), "mine", &user("bob"))
        .await
        .unwrap();

    let permissions = common::PermissionStore::new(explorer.storage().clone());
    let doc = permissions.load(&folder("alice/docs/mine")).await.unwrap();
    assert_eq!(doc.owner(), &user("bob"));
}

#[tokio::test]
async fn test_create_folder_rejects_bad_names() {
    let (explorer, _storage) = setup_test_env().await;
    let docs = folder("alice/docs");

    for name in ["", "a/b", "..", ".permissions"] {
        let result = explorer.create_folder(&docs, name, &user("alice")).await;
        assert!(
            matches!(result, Err(ExplorerError::InvalidPath(_))),
            "{name:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_upload_and_list_hides_sidecars() {
    let (explorer, _storage) = setup_test_env().await;
    let docs = folder("alice/docs");

    let key = explorer
        .upload(&docs, "notes.txt", Bytes::from("hello"), &user("alice"))
        .await
        .unwrap();
    assert_eq!(key, "alice/docs/notes.txt");
    explorer
        .create_folder(&docs, "reports", &user("alice"))
        .await
        .unwrap();

    let listing = explorer.list(&docs, &user("alice")).await.unwrap();
    let keys: Vec<_> = listing.files.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["alice/docs/notes.txt"]);
    assert_eq!(listing.files[0].size, 5);
    assert_eq!(listing.folders, vec!["alice/docs/reports".to_string()]);
    assert!(listing.shortcuts.is_empty());
}

#[tokio::test]
async fn test_upload_rejects_sidecar_name() {
    let (explorer, storage) = setup_test_env().await;
    let before = raw_acl(&storage, "alice/docs").await;

    let result = explorer
        .upload(
            &folder("alice/docs"),
            ".permissions",
            Bytes::from(r#"{"owner":"mallory"}"#),
            &user("alice"),
        )
        .await;
    assert!(matches!(result, Err(ExplorerError::ReservedName(_))));
    assert_eq!(raw_acl(&storage, "alice/docs").await, before);
}

#[tokio::test]
async fn test_operations_denied_without_grant() {
    let (explorer, _storage) = setup_test_env().await;
    let docs = folder("alice/docs");
    explorer
        .upload(&docs, "a.txt", Bytes::from("a"), &user("alice"))
        .await
        .unwrap();

    let bob = user("bob");
    assert!(is_denied(&explorer.list(&docs, &bob).await));
    assert!(is_denied(
        &explorer.upload(&docs, "b.txt", Bytes::from("b"), &bob).await
    ));
    assert!(is_denied(&explorer.delete("alice/docs/a.txt", &bob).await));
    assert!(is_denied(&explorer.download("alice/docs/a.txt", &bob).await));
    assert!(is_denied(&explorer.read_object("alice/docs/a.txt", &bob).await));
}

#[tokio::test]
async fn test_read_grant_allows_reads_only() {
    let (explorer, _storage) = setup_test_env().await;
    let docs = folder("alice/docs");
    explorer
        .upload(&docs, "a.txt", Bytes::from("abc"), &user("alice"))
        .await
        .unwrap();
    explorer
        .share(&docs, &user("alice"), &[ShareTarget::new(user("bob"), true, false)])
        .await
        .unwrap();

    let bob = user("bob");
    assert_eq!(explorer.list(&docs, &bob).await.unwrap().files.len(), 1);
    assert_eq!(
        explorer.read_object("alice/docs/a.txt", &bob).await.unwrap(),
        Bytes::from("abc")
    );
    assert!(is_denied(
        &explorer.upload(&docs, "b.txt", Bytes::from("b"), &bob).await
    ));
    assert!(is_denied(&explorer.delete("alice/docs/a.txt", &bob).await));
}

#[tokio::test]
async fn test_list_shared_folders_carries_shortcuts() {
    let (explorer, _storage) = setup_test_env().await;
    explorer
        .share(
            &folder("alice/docs"),
            &user("alice"),
            &[ShareTarget::new(user("bob"), true, false)],
        )
        .await
        .unwrap();

    let listing = explorer
        .list(&folder("bob/Shared Folders/"), &user("bob"))
        .await
        .unwrap();
    assert!(listing.files.is_empty());
    assert_eq!(listing.shortcuts.len(), 1);
    assert_eq!(listing.shortcuts["alice/docs"].owner, user("alice"));
}

#[tokio::test]
async fn test_delete_file() {
    let (explorer, storage) = setup_test_env().await;
    let docs = folder("alice/docs");
    explorer
        .upload(&docs, "a.txt", Bytes::from("a"), &user("alice"))
        .await
        .unwrap();

    let deleted = explorer.delete("alice/docs/a.txt", &user("alice")).await.unwrap();
    assert_eq!(deleted, vec!["alice/docs/a.txt".to_string()]);
    assert!(!storage.exists("alice/docs/a.txt").await.unwrap());

    let again = explorer.delete("alice/docs/a.txt", &user("alice")).await;
    assert!(matches!(again, Err(ExplorerError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_folder_removes_prefix() {
    let (explorer, storage) = setup_test_env().await;
    let docs = folder("alice/docs");
    explorer
        .upload(&docs, "a.txt", Bytes::from("a"), &user("alice"))
        .await
        .unwrap();
    explorer
        .create_folder(&docs, "reports", &user("alice"))
        .await
        .unwrap();

    let mut deleted = explorer.delete("alice/docs/", &user("alice")).await.unwrap();
    deleted.sort();
    assert_eq!(
        deleted,
        vec![
            "alice/docs/.permissions".to_string(),
            "alice/docs/a.txt".to_string(),
            "alice/docs/reports/.permissions".to_string(),
        ]
    );
    assert!(raw_acl(&storage, "alice/docs").await.is_none());

    // without an ACL the folder is gone for everyone
    let result = explorer.list(&docs, &user("alice")).await;
    assert!(is_denied(&result));
}

#[tokio::test]
async fn test_delete_folder_drops_acl_last() {
    let (explorer, _storage) = setup_test_env().await;
    let docs = folder("alice/docs");
    for name in ["a.txt", "b.txt"] {
        explorer
            .upload(&docs, name, Bytes::from("x"), &user("alice"))
            .await
            .unwrap();
    }

    let deleted = explorer.delete("alice/docs/", &user("alice")).await.unwrap();
    assert_eq!(deleted.len(), 3);
    assert_eq!(deleted.last().map(String::as_str), Some("alice/docs/.permissions"));
}

#[tokio::test]
async fn test_interrupted_folder_delete_can_be_retried() {
    let (explorer, storage, faults) = setup_faulty_env().await;
    let docs = folder("alice/docs");
    for name in ["a.txt", "b.txt"] {
        explorer
            .upload(&docs, name, Bytes::from("x"), &user("alice"))
            .await
            .unwrap();
    }

    faults.fail(FaultOp::Delete, "alice/docs/b.txt");
    let result = explorer.delete("alice/docs/", &user("alice")).await;
    assert!(matches!(result, Err(ExplorerError::Store(_))));

    // the ACL survived, so alice still owns what is left
    assert!(raw_acl(&storage, "alice/docs").await.is_some());
    let listing = explorer.list(&docs, &user("alice")).await.unwrap();
    assert_eq!(listing.files.len(), 1);

    faults.heal();
    let deleted = explorer.delete("alice/docs/", &user("alice")).await.unwrap();
    assert_eq!(
        deleted,
        vec![
            "alice/docs/b.txt".to_string(),
            "alice/docs/.permissions".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_unreadable_acl_is_an_error_not_an_allow() {
    let (explorer, _storage, faults) = setup_faulty_env().await;
    let docs = folder("alice/docs");
    faults.fail(FaultOp::Get, "alice/docs/.permissions");

    for who in ["alice", "bob"] {
        let result = explorer.list(&docs, &user(who)).await;
        assert!(matches!(
            result,
            Err(ExplorerError::Authz(AuthzError::Acl(_)))
        ));
    }
    let result = explorer
        .upload(&docs, "a.txt", Bytes::from("a"), &user("alice"))
        .await;
    assert!(matches!(result, Err(ExplorerError::Authz(AuthzError::Acl(_)))));
}

#[tokio::test]
async fn test_delete_rejects_sidecar_keys() {
    let (explorer, storage) = setup_test_env().await;

    let result = explorer
        .delete("alice/docs/.permissions", &user("alice"))
        .await;
    assert!(matches!(result, Err(ExplorerError::ReservedName(_))));
    assert!(raw_acl(&storage, "alice/docs").await.is_some());

    let result = explorer.download("alice/docs/.permissions", &user("alice")).await;
    assert!(matches!(result, Err(ExplorerError::ReservedName(_))));
}

#[tokio::test]
async fn test_download_falls_back_to_proxy() {
    let (explorer, _storage) = setup_test_env().await;
    explorer
        .upload(&folder("alice/docs"), "a.txt", Bytes::from("a"), &user("alice"))
        .await
        .unwrap();

    let download = explorer.download("alice/docs/a.txt", &user("alice")).await.unwrap();
    assert_eq!(download, Download::Proxied("alice/docs/a.txt".to_string()));

    let missing = explorer.download("alice/docs/b.txt", &user("alice")).await;
    assert!(matches!(missing, Err(ExplorerError::NotFound(_))));

    let folder_key = explorer.download("alice/docs/", &user("alice")).await;
    assert!(matches!(folder_key, Err(ExplorerError::InvalidPath(_))));
}
