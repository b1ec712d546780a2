use super::*;
use crate::roles::Role;
use httpmock::prelude::*;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use serde_json::json;

fn auth(server: &MockServer) -> FirebaseAuth {
    let client = ClientBuilder::new(Client::new()).build();
    FirebaseAuth::new_with_client(client, server.url("/v1/projects/test-project"))
}

#[tokio::test]
async fn test_create_user() {
    let server = MockServer::start();
    let auth = auth(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts")
            .header("content-type", "application/json")
            .json_body(json!({
                "email": "tech@example.com",
                "password": "secret123",
                "displayName": "Ama"
            }));
        then.status(200).json_body(json!({
            "localId": "uid-1",
            "email": "tech@example.com",
            "displayName": "Ama"
        }));
    });

    let user = auth
        .create_user(CreateUserRequest {
            email: Some("tech@example.com".into()),
            password: Some("secret123".into()),
            display_name: Some("Ama".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    mock.assert();
    assert_eq!(user.local_id, "uid-1");
    assert!(!user.disabled);
    assert_eq!(user.role(), None);
}

#[tokio::test]
async fn test_create_user_error_message() {
    let server = MockServer::start();
    let auth = auth(&server);

    server.mock(|when, then| {
        when.method(POST).path("/v1/projects/test-project/accounts");
        then.status(400).json_body(json!({
            "error": {"code": 400, "message": "EMAIL_EXISTS", "status": "INVALID_ARGUMENT"}
        }));
    });

    let err = auth.create_user(CreateUserRequest::default()).await.unwrap_err();
    match err {
        AuthError::ApiError(message) => {
            assert_eq!(message, "Create user failed: EMAIL_EXISTS (code: 400)")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_get_user_reads_role_claim() {
    let server = MockServer::start();
    let auth = auth(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:lookup")
            .json_body(json!({"localId": ["uid-1"]}));
        then.status(200).json_body(json!({
            "users": [{
                "localId": "uid-1",
                "email": "ops@example.com",
                "customAttributes": "{\"role\":\"operator\"}"
            }]
        }));
    });

    let user = auth.get_user("uid-1").await.unwrap();
    mock.assert();
    assert_eq!(user.role(), Some(Role::Operator));
}

#[tokio::test]
async fn test_get_user_by_email_not_found() {
    let server = MockServer::start();
    let auth = auth(&server);

    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:lookup")
            .json_body(json!({"email": ["ghost@example.com"]}));
        then.status(200).json_body(json!({}));
    });

    let err = auth.get_user_by_email("ghost@example.com").await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn test_set_custom_user_claims() {
    let server = MockServer::start();
    let auth = auth(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:update")
            .json_body(json!({
                "localId": "uid-1",
                "customAttributes": "{\"role\":\"technician\"}"
            }));
        then.status(200).json_body(json!({"localId": "uid-1"}));
    });

    let mut claims = Map::new();
    claims.insert("role".into(), json!("technician"));
    auth.set_custom_user_claims("uid-1", &claims).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn test_set_custom_user_claims_rejected_locally() {
    let server = MockServer::start();
    let auth = auth(&server);

    let mut claims = Map::new();
    claims.insert("sub".into(), json!("other"));
    assert!(matches!(
        auth.set_custom_user_claims("uid-1", &claims).await,
        Err(AuthError::ReservedClaim(ref c)) if c == "sub"
    ));

    let mut claims = Map::new();
    claims.insert("notes".into(), json!("x".repeat(MAX_CLAIMS_PAYLOAD)));
    assert!(matches!(
        auth.set_custom_user_claims("uid-1", &claims).await,
        Err(AuthError::ClaimsTooLarge(_))
    ));
}

#[tokio::test]
async fn test_delete_user() {
    let server = MockServer::start();
    let auth = auth(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:delete")
            .json_body(json!({"localId": "uid-1"}));
        then.status(200).json_body(json!({"kind": "identitytoolkit#DeleteAccountResponse"}));
    });

    auth.delete_user("uid-1").await.unwrap();
    mock.assert();
}

#[test]
fn test_custom_claims_tolerates_garbage() {
    let user = UserRecord {
        custom_attributes: Some("not json".into()),
        ..Default::default()
    };
    assert!(user.custom_claims().is_empty());
    assert_eq!(user.role(), None);
}
