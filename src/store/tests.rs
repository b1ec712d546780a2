use super::*;
use crate::auth::FirebaseAuth;
use crate::model::{Notification, Resource};
use crate::Error;
use futures::StreamExt;
use httpmock::prelude::*;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use serde_json::json;

fn database(server: &MockServer) -> FirebaseDatabase {
    let client = ClientBuilder::new(Client::new()).build();
    FirebaseDatabase::new_with_client(client, server.base_url())
}

fn store(server: &MockServer) -> Store {
    Store::new(database(server))
}

fn provisioner(server: &MockServer) -> UserProvisioner {
    let client = ClientBuilder::new(Client::new()).build();
    let auth = FirebaseAuth::new_with_client(client, server.url("/v1/projects/test-project"));
    UserProvisioner::new(auth, store(server))
}

#[tokio::test]
async fn test_list_skips_malformed_records() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/generators.json");
        then.status(200).json_body(json!({
            "g1": {"name": "Harbor 60kVA", "serial_no": "SN-1"},
            "g2": "junk",
            "g3": {"name": "Depot 20kVA", "status": "idle"}
        }));
    });

    let generators = store(&server).generators().list().await.unwrap();
    mock.assert();
    assert_eq!(generators.len(), 2);
    assert_eq!(generators[0].id, "g1");
    assert_eq!(generators[0].serial_number.as_deref(), Some("SN-1"));
    assert_eq!(generators[1].id, "g3");
}

#[tokio::test]
async fn test_get_missing_record() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tasks/t9.json");
        then.status(200).body("null");
    });

    assert!(store(&server).tasks().get("t9").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_update_remove() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/tasks.json")
            .json_body(json!({"title": "Replace filter", "status": "pending"}));
        then.status(200).json_body(json!({"name": "-NtAsk01"}));
    });
    let update = server.mock(|when, then| {
        when.method(PATCH)
            .path("/tasks/-NtAsk01.json")
            .query_param("print", "silent")
            .json_body(json!({"status": "in progress"}));
        then.status(204);
    });
    let remove = server.mock(|when, then| {
        when.method(DELETE)
            .path("/tasks/-NtAsk01.json")
            .query_param("print", "silent");
        then.status(204);
    });

    let tasks = store(&server).tasks();
    let task = Task {
        title: Some("Replace filter".into()),
        status: Some("pending".into()),
        ..Default::default()
    };
    let id = tasks.create(&task).await.unwrap();
    assert_eq!(id, "-NtAsk01");
    tasks.update(&id, &json!({"status": "in progress"})).await.unwrap();
    tasks.remove(&id).await.unwrap();

    create.assert();
    update.assert();
    remove.assert();
}

#[tokio::test]
async fn test_blank_ids_never_address_the_collection() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/generators.json");
        then.status(204);
    });
    server.mock(|when, then| {
        when.path("/notifications/admin/u1.json");
        then.status(204);
    });

    let store = store(&server);
    let generators = store.generators();
    let blank = Generator::default();

    assert!(matches!(
        generators.set(&blank.id, &blank).await,
        Err(DatabaseError::InvalidPath(_))
    ));
    assert!(matches!(generators.remove(&blank.id).await, Err(DatabaseError::InvalidPath(_))));
    assert!(matches!(
        generators.update("/", &json!({"status": "idle"})).await,
        Err(DatabaseError::InvalidPath(_))
    ));
    assert!(matches!(generators.get("").await, Err(DatabaseError::InvalidPath(_))));
    assert!(matches!(
        generators.remove("gen-1/status").await,
        Err(DatabaseError::InvalidPath(_))
    ));

    let inbox = store.notifications(Role::Admin, "u1").unwrap();
    assert!(matches!(inbox.remove("").await, Err(DatabaseError::InvalidPath(_))));
    assert!(matches!(inbox.mark_read("").await, Err(DatabaseError::InvalidPath(_))));
    assert!(store.notifications(Role::Admin, "").is_err());
}

#[tokio::test]
async fn test_tasks_for_technician_matches_legacy_keys() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/tasks.json");
        then.status(200).json_body(json!({
            "t1": {"title": "Oil change", "assignedTo": "tech-1"},
            "t2": {"title": "Belt swap", "technicianId": "tech-1"},
            "t3": {"title": "Filter", "assignedTechnician": "tech-2"},
            "t4": {"title": "Unassigned"}
        }));
    });

    let tasks = store(&server).tasks_for("tech-1").await.unwrap();
    mock.assert();
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["t1", "t2"]);
    assert!(tasks.iter().all(|t| t.assigned_to.as_deref() == Some("tech-1")));
}

#[tokio::test]
async fn test_permission_denied_surfaces() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/invoices.json");
        then.status(401).json_body(json!({"error": "Permission denied"}));
    });

    let err = store(&server).invoices().list().await.unwrap_err();
    assert!(matches!(err, DatabaseError::ApiError(ref m) if m == "Get failed: Permission denied"));
}

#[tokio::test]
async fn test_load_fleet() {
    let server = MockServer::start();
    for resource in Resource::ALL {
        if matches!(resource, Resource::Generators | Resource::Notifications) {
            continue;
        }
        let path = format!("/{}.json", resource.path());
        server.mock(move |when, then| {
            when.method(GET).path(path);
            then.status(200).body("null");
        });
    }
    server.mock(|when, then| {
        when.method(GET).path("/generators.json");
        then.status(200).json_body(json!({"g1": {"name": "A"}, "g2": {"name": "B"}}));
    });

    let fleet = store(&server).load_fleet().await.unwrap();
    assert_eq!(fleet.generators.len(), 2);
    assert!(fleet.batteries.is_empty());
    assert!(fleet.invoices.is_empty());
}

#[tokio::test]
async fn test_watch_collection() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/chargers.json")
            .header("accept", "text/event-stream");
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(concat!(
                "event: put\ndata: {\"path\":\"/\",\"data\":{\"c1\":{\"name\":\"Bay 1\"}}}\n\n",
                "event: patch\ndata: {\"path\":\"/c1\",\"data\":{\"isOnline\":false}}\n\n",
            ));
    });

    let updates: Vec<_> = store(&server)
        .chargers()
        .watch()
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(updates.len(), 2);
    let latest = updates[1].as_ref().unwrap();
    assert_eq!(latest[0].id, "c1");
    assert_eq!(latest[0].is_online, Some(false));
}

#[tokio::test]
async fn test_notification_box_lists_newest_first() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/notifications/technician/u1.json");
        then.status(200).json_body(json!({
            "n1": {"title": "Old", "createdAt": "2024-01-01", "read": true},
            "n2": {"title": "New", "createdAt": "2024-03-01"},
            "n3": {"title": "Undated"}
        }));
    });

    let inbox = store(&server).notifications(Role::Technician, "u1").unwrap();
    let ids: Vec<_> = inbox.list().await.unwrap().into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec!["n2", "n1", "n3"]);
    assert_eq!(inbox.unread_count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_mark_all_read_is_one_write() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/notifications/admin/u1.json");
        then.status(200).json_body(json!({
            "n1": {"read": true},
            "n2": {"read": false},
            "n3": {}
        }));
    });
    let patch = server.mock(|when, then| {
        when.method(PATCH)
            .path("/notifications/admin/u1.json")
            .json_body(json!({"n2/read": true, "n3/read": true}));
        then.status(204);
    });

    let inbox = store(&server).notifications(Role::Admin, "u1").unwrap();
    assert_eq!(inbox.mark_all_read().await.unwrap(), 2);
    patch.assert();
}

#[tokio::test]
async fn test_mark_all_read_without_unread_skips_write() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/notifications/admin/u1.json");
        then.status(200).json_body(json!({"n1": {"read": true}}));
    });

    let inbox = store(&server).notifications(Role::Admin, "u1").unwrap();
    assert_eq!(inbox.mark_all_read().await.unwrap(), 0);
}

#[tokio::test]
async fn test_broadcast_single_root_patch() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/.json")
            .query_param("print", "silent")
            .body_includes("notifications/operator/u1/")
            .body_includes("notifications/operator/u2/")
            .body_includes("Generator G-7 is faulty");
        then.status(204);
    });

    let db = database(&server);
    let notification = Notification::new("Fault", "Generator G-7 is faulty").with_kind("alert");
    let ids = broadcast(&db, Role::Operator, &["u1", "u2"], &notification)
        .await
        .unwrap();
    mock.assert();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    assert!(broadcast(&db, Role::Operator, &[], &notification).await.unwrap().is_empty());
    assert!(matches!(
        broadcast(&db, Role::Operator, &["u1/extra"], &notification).await,
        Err(DatabaseError::InvalidPath(_))
    ));
}

#[tokio::test]
async fn test_provision_user() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST).path("/v1/projects/test-project/accounts");
        then.status(200).json_body(json!({"localId": "uid-9", "email": "kofi@example.com"}));
    });
    let claims = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:update")
            .json_body(json!({
                "localId": "uid-9",
                "customAttributes": "{\"role\":\"technician\"}"
            }));
        then.status(200).json_body(json!({"localId": "uid-9"}));
    });
    let profile = server.mock(|when, then| {
        when.method(PUT)
            .path("/users/uid-9.json")
            .body_includes("\"role\":\"technician\"")
            .body_includes("\"shopId\":\"shop-1\"");
        then.status(204);
    });

    let user = provisioner(&server)
        .provision(NewUser {
            email: "kofi@example.com".into(),
            password: "changeme1".into(),
            name: "Kofi".into(),
            role: Role::Technician,
            phone: None,
            shop_id: Some("shop-1".into()),
        })
        .await
        .unwrap();

    create.assert();
    claims.assert();
    profile.assert();
    assert_eq!(user.id, "uid-9");
    assert_eq!(user.role(), Some(Role::Technician));
}

#[tokio::test]
async fn test_provision_rolls_back_account() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/projects/test-project/accounts");
        then.status(200).json_body(json!({"localId": "uid-9"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/projects/test-project/accounts:update");
        then.status(200).json_body(json!({"localId": "uid-9"}));
    });
    server.mock(|when, then| {
        when.method(PUT).path("/users/uid-9.json");
        then.status(401).json_body(json!({"error": "Permission denied"}));
    });
    let cleanup = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:delete")
            .json_body(json!({"localId": "uid-9"}));
        then.status(200).json_body(json!({}));
    });

    let err = provisioner(&server)
        .provision(NewUser {
            email: "kofi@example.com".into(),
            password: "changeme1".into(),
            name: "Kofi".into(),
            role: Role::Inventory,
            phone: None,
            shop_id: None,
        })
        .await
        .unwrap_err();

    cleanup.assert();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::ApiError(ref m)) if m == "Set failed: Permission denied"
    ));
}

#[tokio::test]
async fn test_change_role_keeps_other_claims() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:lookup")
            .json_body(json!({"localId": ["uid-3"]}));
        then.status(200).json_body(json!({
            "users": [{"localId": "uid-3", "customAttributes": "{\"role\":\"operator\",\"shop\":\"s1\"}"}]
        }));
    });
    let claims = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:update")
            .json_body(json!({
                "localId": "uid-3",
                "customAttributes": "{\"role\":\"admin\",\"shop\":\"s1\"}"
            }));
        then.status(200).json_body(json!({"localId": "uid-3"}));
    });
    let profile = server.mock(|when, then| {
        when.method(PATCH)
            .path("/users/uid-3.json")
            .json_body(json!({"role": "admin"}));
        then.status(204);
    });

    provisioner(&server).change_role("uid-3", Role::Admin).await.unwrap();
    claims.assert();
    profile.assert();
}

#[tokio::test]
async fn test_deprovision() {
    let server = MockServer::start();
    let record = server.mock(|when, then| {
        when.method(DELETE).path("/users/uid-3.json");
        then.status(204);
    });
    let account = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:delete")
            .json_body(json!({"localId": "uid-3"}));
        then.status(200).json_body(json!({}));
    });

    provisioner(&server).deprovision("uid-3").await.unwrap();
    record.assert();
    account.assert();
}
