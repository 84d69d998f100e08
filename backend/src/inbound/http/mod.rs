//! HTTP inbound adapter exposing the REST endpoints.

use actix_web::web;

pub mod auth;
pub mod comments;
pub mod error;
pub mod posts;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// The `/api/v1` scope with every HTTP and WebSocket route registered.
///
/// Shared by the binary and the test harness so both serve the same
/// surface.
pub fn api_scope() -> actix_web::Scope {
    web::scope("/api/v1")
        .service(users::signup)
        .service(users::signin)
        .service(users::list_users)
        .service(users::get_user)
        .service(posts::list_posts)
        .service(posts::create_post)
        .service(posts::get_post)
        .service(posts::update_post)
        .service(posts::create_comment)
        .service(comments::list_comments)
        .service(comments::get_comment)
        .service(crate::inbound::ws::subscriptions)
}
