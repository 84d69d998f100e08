//! Account and user query handlers.
//!
//! ```text
//! POST /api/v1/signup {"email":"ada@example.com","password":"secret"}
//! POST /api/v1/signin {"email":"ada@example.com","password":"secret"}
//! GET  /api/v1/users
//! GET  /api/v1/users/{id}
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{UserId, UserView};
use crate::inbound::http::state::AppState;
use crate::inbound::http::ApiResult;

/// Credentials body shared by `POST /api/v1/signup` and `POST /api/v1/signin`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    /// Account email address.
    pub email: String,
    /// Account password, plaintext on the wire only.
    pub password: String,
}

/// Token body returned by `POST /api/v1/signin`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    /// Signed bearer token for the `Authorization` header.
    pub token: String,
}

/// Create a user account.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = crate::domain::user::UserDto),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 503, description = "Entity store unavailable", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .content
        .signup(&payload.email, &payload.password)
        .await?;
    Ok(HttpResponse::Created().json(user))
}

/// Verify credentials and issue a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/signin",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued", body = SigninResponse),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 401, description = "Incorrect credentials", body = crate::domain::Error),
        (status = 503, description = "Entity store unavailable", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "signin",
    security([])
)]
#[post("/signin")]
pub async fn signin(
    state: web::Data<AppState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let token = state
        .content
        .signin(&payload.email, &payload.password)
        .await?;
    Ok(HttpResponse::Ok().json(SigninResponse {
        token: token.into(),
    }))
}

/// List all users with first-level relationships populated.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserView])
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users")]
pub async fn list_users(state: web::Data<AppState>) -> ApiResult<web::Json<Vec<UserView>>> {
    Ok(web::Json(state.content.users().await))
}

/// Fetch one user by identity.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserView),
        (status = 404, description = "No such user")
    ),
    tags = ["users"],
    operation_id = "getUser",
    security([])
)]
#[get("/users/{id}")]
pub async fn get_user(state: web::Data<AppState>, id: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    match state
        .content
        .user(UserId::from_uuid(id.into_inner()))
        .await
    {
        Some(view) => Ok(HttpResponse::Ok().json(view)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{test_app, test_state};
    use actix_web::{http::StatusCode, test as actix_test};
    use rstest::rstest;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn signup_returns_created_user_without_hash() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({ "email": "ada@example.com", "password": "secret" }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("email").and_then(Value::as_str),
            Some("ada@example.com")
        );
        assert!(body.get("passwordHash").is_none());
        assert!(body.get("id").is_some());
    }

    #[actix_web::test]
    async fn duplicate_signup_is_a_bad_request() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let payload = json!({ "email": "ada@example.com", "password": "secret" });

        let first = actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(&payload)
            .to_request();
        assert!(actix_test::call_service(&app, first).await.status().is_success());

        let second = actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(&payload)
            .to_request();
        let response = actix_test::call_service(&app, second).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("code").and_then(Value::as_str),
            Some("invalid_request")
        );
    }

    #[rstest]
    #[case("ghost@example.com", "secret")]
    #[case("ada@example.com", "wrong")]
    #[actix_web::test]
    async fn signin_failures_share_one_message(#[case] email: &str, #[case] password: &str) {
        let app = actix_test::init_service(test_app(test_state())).await;
        let register = actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({ "email": "ada@example.com", "password": "secret" }))
            .to_request();
        assert!(actix_test::call_service(&app, register).await.status().is_success());

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/signin")
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("incorrect credentials")
        );
    }

    #[actix_web::test]
    async fn signin_issues_a_token() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let register = actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({ "email": "ada@example.com", "password": "secret" }))
            .to_request();
        assert!(actix_test::call_service(&app, register).await.status().is_success());

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/signin")
            .set_json(json!({ "email": "ada@example.com", "password": "secret" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: SigninResponse = actix_test::read_body_json(response).await;
        assert!(body.token.contains('.'));
    }

    #[actix_web::test]
    async fn missing_user_is_a_404_with_empty_body() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users/3fa85f64-5717-4562-b3fc-2c963f66afa6")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = actix_test::read_body(response).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn list_users_is_public_and_camel_case() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let register = actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({ "email": "ada@example.com", "password": "secret" }))
            .to_request();
        assert!(actix_test::call_service(&app, register).await.status().is_success());

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert!(response.status().is_success());
        let body: Value = actix_test::read_body_json(response).await;
        let first = &body.as_array().expect("array")[0];
        assert!(first.get("commentsMade").is_some());
        assert!(first.get("comments_made").is_none());
    }
}
