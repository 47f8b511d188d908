use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use admin_cell::{AdminError, AdminService, CreateAdminRequest};
use shared_database::DbClient;

fn request(username: &str) -> CreateAdminRequest {
    CreateAdminRequest {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: "Adm1n#Pass".to_string(),
        city: None,
    }
}

#[tokio::test]
async fn duplicate_admin_is_already_exists() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admins"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = AdminService::with_client(DbClient::with_base_url(&mock_server.uri(), "key"));
    assert_matches!(service.register(request("root_admin")).await, Err(AdminError::AlreadyExists));
}

#[tokio::test]
async fn invalid_admin_never_reaches_the_database() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = AdminService::with_client(DbClient::with_base_url(&mock_server.uri(), "key"));
    let weak = CreateAdminRequest {
        password: "password".to_string(),
        ..request("root_admin")
    };
    assert_matches!(service.register(weak).await, Err(AdminError::Validation(_)));
}
