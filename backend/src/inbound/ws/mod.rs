//! WebSocket inbound adapter streaming content events to clients.
//!
//! Responsibilities:
//! - upgrade `GET /api/v1/subscriptions` requests
//! - spawn the long-lived per-connection session task
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::{get, web, HttpRequest, HttpResponse};
use tracing::error;

use crate::inbound::http::state::AppState;

mod session;

pub mod messages;

/// Handle WebSocket upgrade for the subscriptions endpoint.
///
/// The connection lives on its own task after the upgrade; dropping the
/// socket is the only unsubscribe.
#[get("/subscriptions")]
pub async fn subscriptions(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Payload,
) -> actix_web::Result<HttpResponse> {
    let (response, session, stream) = actix_ws::handle(&req, body).inspect_err(|err| {
        error!(error = %err, "WebSocket upgrade failed");
    })?;

    let context_builder = state.context_builder.clone();
    let bus = state.bus.clone();
    actix_web::rt::spawn(async move {
        session::handle_session(context_builder, bus, session, stream).await;
    });

    Ok(response)
}
