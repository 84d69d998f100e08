//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], which generates the OpenAPI specification for the
//! REST surface: every handler path, the domain schemas they reference,
//! and the bearer token security scheme. The document is served as JSON at
//! `/api-docs/openapi.json`, outside the versioned API scope.

use actix_web::{get, web};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Comment, CommentView, Error, ErrorCode, Post, PostView, UserView};
use crate::domain::user::UserDto;
use crate::inbound::http::posts::{CommentRequest, PostRequest};
use crate::inbound::http::users::{CredentialsRequest, SigninResponse};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Signed token issued by POST /api/v1/signin."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Social content API",
        description = "HTTP interface for accounts, posts, comments, and live content events."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::signin,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::create_comment,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::get_comment,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserDto,
        Post,
        Comment,
        UserView,
        PostView,
        CommentView,
        CredentialsRequest,
        SigninResponse,
        PostRequest,
        CommentRequest,
    )),
    tags(
        (name = "users", description = "Accounts and user queries"),
        (name = "posts", description = "Post mutations and queries"),
        (name = "comments", description = "Comment queries")
    )
)]
pub struct ApiDoc;

/// Serve the generated document as JSON.
#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> web::Json<utoipa::openapi::OpenApi> {
    web::Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn document_registers_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/signup",
            "/api/v1/signin",
            "/api/v1/users",
            "/api/v1/users/{id}",
            "/api/v1/posts",
            "/api/v1/posts/{id}",
            "/api/v1/posts/{id}/comments",
            "/api/v1/comments",
            "/api/v1/comments/{id}",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path '{path}'"
            );
        }
    }

    #[actix_web::test]
    async fn document_is_served_as_json() {
        use crate::inbound::http::test_utils::{test_app, test_state};
        use actix_web::test as actix_test;

        let app = actix_test::init_service(test_app(test_state())).await;
        let request = actix_test::TestRequest::get()
            .uri("/api-docs/openapi.json")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert!(response.status().is_success());
        let body: serde_json::Value = actix_test::read_body_json(response).await;
        assert!(body.get("openapi").is_some());
        assert!(body.pointer("/paths/~1api~1v1~1signup").is_some());
    }

    #[test]
    fn user_schema_omits_the_credential_hash() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user = schemas.get("User").expect("User schema");
        let rendered = serde_json::to_string(user).expect("schema serializes");
        assert!(rendered.contains("email"));
        assert!(!rendered.contains("passwordHash"));
    }
}
