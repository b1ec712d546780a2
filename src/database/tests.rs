use super::listen::StreamEvent;
use super::*;
use futures::StreamExt;
use httpmock::prelude::*;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use serde_json::{json, Value};

fn database(server: &MockServer) -> FirebaseDatabase {
    let client = ClientBuilder::new(Client::new()).build();
    FirebaseDatabase::new_with_client(client, server.base_url())
}

#[tokio::test]
async fn test_get() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/generators/gen-1/status.json");
        then.status(200).json_body(json!("running"));
    });

    let db = database(&server);
    let status: Option<String> = db
        .reference("generators/gen-1/status")
        .unwrap()
        .get()
        .await
        .unwrap();
    mock.assert();
    assert_eq!(status.as_deref(), Some("running"));
}

#[tokio::test]
async fn test_get_null_is_none() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/generators/missing.json");
        then.status(200).body("null");
    });

    let db = database(&server);
    let value: Option<Value> = db.reference("generators/missing").unwrap().get().await.unwrap();
    assert!(value.is_none());
}

#[tokio::test]
async fn test_writes_are_silent() {
    let server = MockServer::start();
    let set = server.mock(|when, then| {
        when.method(PUT)
            .path("/batteries/b1.json")
            .query_param("print", "silent")
            .json_body(json!({"serialNumber": "BT-1", "healthPercent": 90}));
        then.status(204);
    });
    let update = server.mock(|when, then| {
        when.method(PATCH)
            .path("/batteries/b1.json")
            .query_param("print", "silent")
            .json_body(json!({"chargeLevel": 55, "meta/checkedBy": "u1"}));
        then.status(204);
    });
    let remove = server.mock(|when, then| {
        when.method(DELETE)
            .path("/batteries/b1.json")
            .query_param("print", "silent");
        then.status(204);
    });

    let battery = database(&server).reference("batteries/b1").unwrap();
    battery
        .set(&json!({"serialNumber": "BT-1", "healthPercent": 90}))
        .await
        .unwrap();
    battery
        .update(&json!({"chargeLevel": 55, "meta/checkedBy": "u1"}))
        .await
        .unwrap();
    battery.remove().await.unwrap();

    set.assert();
    update.assert();
    remove.assert();
}

#[tokio::test]
async fn test_update_rejects_non_objects_and_bad_keys() {
    let server = MockServer::start();
    let battery = database(&server).reference("batteries/b1").unwrap();

    assert!(matches!(
        battery.update(&json!(42)).await,
        Err(DatabaseError::InvalidValue(_))
    ));
    assert!(matches!(
        battery.update(&json!({"a.b": 1})).await,
        Err(DatabaseError::InvalidPath(_))
    ));
}

#[tokio::test]
async fn test_push_returns_name() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/gatepasses.json")
            .json_body(json!({"issuedTo": "Kwame"}));
        then.status(200).json_body(json!({"name": "-NgatePass1"}));
    });

    let key = database(&server)
        .reference("gatepasses")
        .unwrap()
        .push(&json!({"issuedTo": "Kwame"}))
        .await
        .unwrap();
    mock.assert();
    assert_eq!(key, "-NgatePass1");
}

#[tokio::test]
async fn test_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/services.json")
            .query_param("orderBy", "\"scheduledDate\"")
            .query_param("startAt", "\"2024-06-01\"")
            .query_param("limitToFirst", "5");
        then.status(200).json_body(json!({
            "s2": {"scheduledDate": "2024-06-03"},
            "s1": {"scheduledDate": "2024-06-02"}
        }));
    });

    let snapshot = database(&server)
        .reference("services")
        .unwrap()
        .query()
        .order_by_child("scheduledDate")
        .start_at("2024-06-01")
        .unwrap()
        .limit_to_first(5)
        .get()
        .await
        .unwrap();
    mock.assert();
    assert_eq!(snapshot.key(), Some("services"));
    assert_eq!(snapshot.num_children(), 2);
}

#[tokio::test]
async fn test_shallow_keys() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/notifications/admin.json")
            .query_param("shallow", "true");
        then.status(200).json_body(json!({"uid-1": true, "uid-2": true}));
    });

    let keys = database(&server)
        .reference("notifications/admin")
        .unwrap()
        .shallow_keys()
        .await
        .unwrap();
    assert_eq!(keys, vec!["uid-1", "uid-2"]);
}

#[tokio::test]
async fn test_query_error_names_the_query() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tasks.json");
        then.status(400)
            .json_body(json!({"error": "Index not defined, add \".indexOn\": \"status\""}));
    });

    let err = database(&server)
        .reference("tasks")
        .unwrap()
        .query()
        .order_by_child("status")
        .equal_to("open")
        .unwrap()
        .get()
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::ApiError(ref m) if m.starts_with("Query failed: Index not defined")));
}

#[tokio::test]
async fn test_permission_denied() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(PUT).path("/users/u1.json");
        then.status(401).json_body(json!({"error": "Permission denied"}));
    });

    let err = database(&server)
        .reference("users/u1")
        .unwrap()
        .set(&json!({"role": "admin"}))
        .await
        .unwrap_err();
    match err {
        DatabaseError::ApiError(message) => assert_eq!(message, "Set failed: Permission denied"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_listen() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/tasks.json")
            .header("accept", "text/event-stream");
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(concat!(
                "event: put\ndata: {\"path\":\"/\",\"data\":{\"t1\":{\"title\":\"Oil\"}}}\n\n",
                "event: keep-alive\ndata: null\n\n",
                "event: patch\ndata: {\"path\":\"/t1\",\"data\":{\"status\":\"done\"}}\n\n",
            ));
    });

    let events: Vec<_> = database(&server)
        .reference("tasks")
        .unwrap()
        .listen()
        .await
        .unwrap()
        .collect()
        .await;
    mock.assert();

    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], Ok(StreamEvent::Put(ref d)) if d.path == "/"));
    assert!(matches!(events[1], Ok(StreamEvent::KeepAlive)));
    assert!(matches!(events[2], Ok(StreamEvent::Patch(ref d)) if d.data == json!({"status": "done"})));
}

#[tokio::test]
async fn test_listen_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/invoices.json");
        then.status(401).json_body(json!({"error": "Permission denied"}));
    });

    let result = database(&server).reference("invoices").unwrap().listen().await;
    assert!(matches!(result, Err(DatabaseError::ApiError(ref m)) if m == "Listen failed: Permission denied"));
}
