//! Post mutation and query handlers.
//!
//! ```text
//! GET  /api/v1/posts
//! GET  /api/v1/posts/{id}
//! POST /api/v1/posts {"title":"Hello world"}
//! PUT  /api/v1/posts/{id} {"title":"Renamed"}
//! POST /api/v1/posts/{id}/comments {"text":"First!"}
//! ```
//!
//! Mutations require a bearer credential; the context is rebuilt from the
//! `Authorization` header on every request.

use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{PostId, PostView};
use crate::inbound::http::auth::request_context;
use crate::inbound::http::state::AppState;
use crate::inbound::http::ApiResult;

/// Title body for `POST /api/v1/posts` and `PUT /api/v1/posts/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    /// Post title, unique across the store.
    pub title: String,
}

/// Comment body for `POST /api/v1/posts/{id}/comments`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    /// Comment text.
    pub text: String,
}

/// List all posts with first-level relationships populated.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    responses(
        (status = 200, description = "Posts", body = [PostView])
    ),
    tags = ["posts"],
    operation_id = "listPosts",
    security([])
)]
#[get("/posts")]
pub async fn list_posts(state: web::Data<AppState>) -> ApiResult<web::Json<Vec<PostView>>> {
    Ok(web::Json(state.content.posts().await))
}

/// Fetch one post by identity.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post", body = PostView),
        (status = 404, description = "No such post")
    ),
    tags = ["posts"],
    operation_id = "getPost",
    security([])
)]
#[get("/posts/{id}")]
pub async fn get_post(state: web::Data<AppState>, id: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    match state.content.post(PostId::from_uuid(id.into_inner())).await {
        Some(view) => Ok(HttpResponse::Ok().json(view)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// Create a post authored by the authenticated caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = PostRequest,
    responses(
        (status = 201, description = "Post created", body = crate::domain::Post),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 401, description = "Unauthorised", body = crate::domain::Error),
        (status = 503, description = "Entity store unavailable", body = crate::domain::Error)
    ),
    tags = ["posts"],
    operation_id = "createPost",
    security(("BearerToken" = []))
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<PostRequest>,
) -> ApiResult<HttpResponse> {
    let ctx = request_context(&state.context_builder, &req).await?;
    let post = state.content.create_post(&ctx, &payload.title).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Rename a post.
#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post identifier")),
    request_body = PostRequest,
    responses(
        (status = 200, description = "Post updated", body = crate::domain::Post),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 401, description = "Unauthorised", body = crate::domain::Error),
        (status = 503, description = "Entity store unavailable", body = crate::domain::Error)
    ),
    tags = ["posts"],
    operation_id = "updatePost",
    security(("BearerToken" = []))
)]
#[put("/posts/{id}")]
pub async fn update_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<Uuid>,
    payload: web::Json<PostRequest>,
) -> ApiResult<HttpResponse> {
    let ctx = request_context(&state.context_builder, &req).await?;
    let post = state
        .content
        .update_post(&ctx, PostId::from_uuid(id.into_inner()), &payload.title)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Comment on a post as the authenticated caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/comments",
    params(("id" = Uuid, Path, description = "Post identifier")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = crate::domain::Comment),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 401, description = "Unauthorised", body = crate::domain::Error),
        (status = 503, description = "Entity store unavailable", body = crate::domain::Error)
    ),
    tags = ["posts"],
    operation_id = "createComment",
    security(("BearerToken" = []))
)]
#[post("/posts/{id}/comments")]
pub async fn create_comment(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let ctx = request_context(&state.context_builder, &req).await?;
    let comment = state
        .content
        .create_comment(&ctx, PostId::from_uuid(id.into_inner()), &payload.text)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

#[cfg(test)]
mod tests {
    use crate::inbound::http::test_utils::{signup_and_signin, test_app, test_state};
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn create_post_requires_a_bearer_credential() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/posts")
            .set_json(json!({ "title": "Hello" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_post_round_trips_through_the_query_surface() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let token = signup_and_signin(&app, "ada@example.com", "secret").await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "title": "Hello world" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(response).await;
        let id = created.get("id").and_then(Value::as_str).expect("post id");

        let fetch = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{id}"))
            .to_request();
        let response = actix_test::call_service(&app, fetch).await;
        assert!(response.status().is_success());
        let view: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            view.get("title").and_then(Value::as_str),
            Some("Hello world")
        );
        assert_eq!(
            view.pointer("/postedBy/email").and_then(Value::as_str),
            Some("ada@example.com")
        );
    }

    #[actix_web::test]
    async fn update_post_renames_via_put() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let token = signup_and_signin(&app, "ada@example.com", "secret").await;

        let create = actix_test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "title": "Old" }))
            .to_request();
        let created: Value =
            actix_test::read_body_json(actix_test::call_service(&app, create).await).await;
        let id = created.get("id").and_then(Value::as_str).expect("post id");

        let update = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/posts/{id}"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "title": "New" }))
            .to_request();
        let response = actix_test::call_service(&app, update).await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated: Value = actix_test::read_body_json(response).await;
        assert_eq!(updated.get("title").and_then(Value::as_str), Some("New"));
    }

    #[actix_web::test]
    async fn commenting_on_a_missing_post_is_a_bad_request() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let token = signup_and_signin(&app, "ada@example.com", "secret").await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/posts/3fa85f64-5717-4562-b3fc-2c963f66afa6/comments")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "text": "hello?" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("post not found")
        );
    }

    #[actix_web::test]
    async fn garbage_bearer_tokens_are_rejected() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .set_json(json!({ "title": "Hello" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
