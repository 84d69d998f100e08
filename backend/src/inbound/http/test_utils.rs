//! Shared fixtures for HTTP handler tests.

use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{test as actix_test, web, App};
use serde_json::{json, Value};

use crate::bootstrap;
use crate::inbound::http::state::AppState;

/// Fresh application state over in-memory repositories.
pub fn test_state() -> AppState {
    bootstrap::build_state(b"test-secret".to_vec(), 16)
}

/// Full application with every route registered, ready for
/// `actix_test::init_service`.
pub fn test_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(crate::doc::openapi_json)
        .service(crate::inbound::http::api_scope())
}

/// Register an account and return a bearer token for it.
pub async fn signup_and_signin(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> String {
    let signup = actix_test::TestRequest::post()
        .uri("/api/v1/signup")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let response = actix_test::call_service(app, signup).await;
    assert!(response.status().is_success(), "signup must succeed");

    let signin = actix_test::TestRequest::post()
        .uri("/api/v1/signin")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let response = actix_test::call_service(app, signin).await;
    assert!(response.status().is_success(), "signin must succeed");
    let body: Value = actix_test::read_body_json(response).await;
    body.get("token")
        .and_then(Value::as_str)
        .expect("token present")
        .to_owned()
}
