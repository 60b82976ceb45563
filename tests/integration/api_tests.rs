//! API client integration tests against an in-process mock server

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

use lending_client::{
    api::ApiClient,
    config::ApiConfig,
    models::{
        auth::LoginRequest,
        user::{Role, User, UserStatus},
    },
    session::{SessionEvent, SessionManager},
    AppError,
};

/// Serve the router on an ephemeral port and return its address
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Mock server failed");
    });
    format!("http://{}", addr)
}

fn client(address: &str) -> ApiClient {
    let config = ApiConfig {
        server_address: address.to_string(),
        ..ApiConfig::default()
    };
    ApiClient::new(&config, SessionManager::new()).expect("Failed to build client")
}

fn alice() -> User {
    User {
        id: "alice".into(),
        name: "Alice".into(),
        contact: "alice@example.org".into(),
        department_id: "A".into(),
        role: Role::Admin,
        status: UserStatus::Active,
        password: None,
        invitation_code: None,
    }
}

fn echo_authorization(headers: &HeaderMap) -> Value {
    json!(headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none"))
}

#[tokio::test]
async fn test_unauthorized_expires_session() {
    let address = serve(Router::new().route(
        "/departments",
        get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"message": "Token expired"}))) }),
    ))
    .await;
    let api = client(&address);
    api.session().start("stale".into(), alice()).await;
    let mut events = api.session().subscribe();

    let err = api.departments_list().await.unwrap_err();
    assert!(err.is_session_expired());
    assert_eq!(err.user_message(), "Session expired, please log in again");
    assert!(!api.session().is_logged_in().await);
    assert_eq!(events.recv().await.expect("No session event"), SessionEvent::Expired);
}

#[tokio::test]
async fn test_error_body_message_is_extracted() {
    let address = serve(
        Router::new()
            .route(
                "/categories",
                get(|| async { (StatusCode::CONFLICT, Json(json!({"error": "Category is in use"}))) }),
            )
            .route(
                "/items",
                get(|| async { (StatusCode::BAD_GATEWAY, "<html><body>Bad gateway</body></html>") }),
            ),
    )
    .await;
    let api = client(&address);

    match api.categories_list().await {
        Err(AppError::Http { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Category is in use");
        }
        other => panic!("unexpected {:?}", other.map(|c| c.len())),
    }

    match api.items_list().await {
        Err(AppError::Http { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("unexpected {:?}", other.map(|i| i.len())),
    }
}

#[tokio::test]
async fn test_bearer_only_on_authenticated_requests() {
    let address = serve(
        Router::new()
            .route(
                "/departments",
                get(|headers: HeaderMap| async move {
                    assert_eq!(echo_authorization(&headers), json!("Bearer t-42"));
                    Json(json!([]))
                }),
            )
            .route(
                "/auth/login",
                post(|headers: HeaderMap| async move {
                    assert_eq!(echo_authorization(&headers), json!("none"));
                    Json(json!({ "token": "t-43", "user": alice() }))
                }),
            ),
    )
    .await;
    let api = client(&address);
    api.session().start("t-42".into(), alice()).await;

    assert_ok!(api.departments_list().await);
    let response = assert_ok!(
        api.auth_login(&LoginRequest {
            contact: "alice@example.org".into(),
            password: "secret".into(),
        })
        .await
    );
    assert_eq!(response.token, "t-43");
}

#[tokio::test]
async fn test_set_server_address_redirects_requests() {
    let first = serve(Router::new().route("/categories", get(|| async { Json(json!([])) }))).await;
    let second = serve(Router::new().route(
        "/categories",
        get(|| async { Json(json!([{"id": "c1", "name": "Optics", "color": "#123456"}])) }),
    ))
    .await;

    let api = client(&first);
    assert!(assert_ok!(api.categories_list().await).is_empty());

    let url = assert_ok!(api.set_server_address(&second));
    assert!(url.as_str().ends_with('/'));
    assert_eq!(assert_ok!(api.categories_list().await).len(), 1);

    assert_err!(api.set_server_address("http://"));
    // A rejected address leaves the current one in place
    assert_eq!(api.base_url(), url);
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let address = format!("http://{}", listener.local_addr().expect("No local address"));
    drop(listener);

    let err = client(&address).departments_list().await.unwrap_err();
    assert!(err.is_network(), "expected a network error, got {:?}", err);
}

#[tokio::test]
async fn test_ids_cannot_escape_their_route() {
    let address = serve(
        Router::new()
            .route(
                "/items/:id",
                get(|Path(id): Path<String>| async move {
                    Json(json!({
                        "id": id,
                        "name": "Scope",
                        "categoryId": "c1",
                        "departmentId": "A",
                        "quantity": 1,
                        "availableQuantity": 1
                    }))
                }),
            )
            .route("/users/:id", delete(|| async { StatusCode::NO_CONTENT }))
            .route("/users", delete(|| async { StatusCode::INTERNAL_SERVER_ERROR })),
    )
    .await;
    let api = client(&address);
    api.session().start("t-42".into(), alice()).await;

    let item = assert_ok!(api.items_get("a/b?c").await);
    assert_eq!(item.id, "a/b?c");

    assert!(matches!(api.users_delete("..").await, Err(AppError::Validation(_))));
    assert_ok!(api.users_delete("x/..").await);
}
