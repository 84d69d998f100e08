//! Comment query handlers.
//!
//! ```text
//! GET /api/v1/comments
//! GET /api/v1/comments/{id}
//! ```
//!
//! Comment creation lives under the post resource
//! (`POST /api/v1/posts/{id}/comments`).

use actix_web::{get, web, HttpResponse};
use uuid::Uuid;

use crate::domain::{CommentId, CommentView};
use crate::inbound::http::state::AppState;
use crate::inbound::http::ApiResult;

/// List all comments with first-level relationships populated.
#[utoipa::path(
    get,
    path = "/api/v1/comments",
    responses(
        (status = 200, description = "Comments", body = [CommentView])
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
#[get("/comments")]
pub async fn list_comments(state: web::Data<AppState>) -> ApiResult<web::Json<Vec<CommentView>>> {
    Ok(web::Json(state.content.comments().await))
}

/// Fetch one comment by identity.
#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment identifier")),
    responses(
        (status = 200, description = "Comment", body = CommentView),
        (status = 404, description = "No such comment")
    ),
    tags = ["comments"],
    operation_id = "getComment",
    security([])
)]
#[get("/comments/{id}")]
pub async fn get_comment(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    match state
        .content
        .comment(CommentId::from_uuid(id.into_inner()))
        .await
    {
        Some(view) => Ok(HttpResponse::Ok().json(view)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

#[cfg(test)]
mod tests {
    use crate::inbound::http::test_utils::{signup_and_signin, test_app, test_state};
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn missing_comment_is_a_404_with_empty_body() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let request = actix_test::TestRequest::get()
            .uri("/api/v1/comments/3fa85f64-5717-4562-b3fc-2c963f66afa6")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(actix_test::read_body(response).await.is_empty());
    }

    #[actix_web::test]
    async fn created_comments_list_with_populated_references() {
        let app = actix_test::init_service(test_app(test_state())).await;
        let token = signup_and_signin(&app, "ada@example.com", "secret").await;

        let create_post = actix_test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "title": "Hello" }))
            .to_request();
        let post: Value =
            actix_test::read_body_json(actix_test::call_service(&app, create_post).await).await;
        let post_id = post.get("id").and_then(Value::as_str).expect("post id");

        let create_comment = actix_test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{post_id}/comments"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "text": "First!" }))
            .to_request();
        let response = actix_test::call_service(&app, create_comment).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let list = actix_test::TestRequest::get()
            .uri("/api/v1/comments")
            .to_request();
        let response = actix_test::call_service(&app, list).await;
        assert!(response.status().is_success());
        let body: Value = actix_test::read_body_json(response).await;
        let first = &body.as_array().expect("array")[0];
        assert_eq!(first.get("text").and_then(Value::as_str), Some("First!"));
        assert_eq!(
            first.pointer("/commenter/email").and_then(Value::as_str),
            Some("ada@example.com")
        );
        assert_eq!(
            first.pointer("/commentFor/title").and_then(Value::as_str),
            Some("Hello")
        );
    }
}
