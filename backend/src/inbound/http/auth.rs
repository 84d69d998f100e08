//! Bearer credential extraction for HTTP handlers.
//!
//! The authentication context is rebuilt once per request from the raw
//! `Authorization` header and never cached across requests. An absent
//! header yields an anonymous context; a present but unverifiable one
//! fails the request before the handler body runs any domain logic.

use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;

use crate::domain::{AuthContext, AuthContextBuilder, Error};

/// Build the caller's [`AuthContext`] from the request's bearer credential.
pub async fn request_context(
    builder: &AuthContextBuilder,
    req: &HttpRequest,
) -> Result<AuthContext, Error> {
    let raw = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| Error::unauthorized("malformed authorization header"))?,
        ),
        None => None,
    };
    builder.build(raw).await
}
