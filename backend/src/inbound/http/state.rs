//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain service, the per-request context builder, and the
//! event bus, and remain testable without real I/O.

use crate::domain::{AuthContextBuilder, ContentService, EventBus};

/// Dependency bundle for the HTTP and WebSocket handlers.
#[derive(Clone)]
pub struct AppState {
    /// Mutation pipeline and query surface.
    pub content: ContentService,
    /// Per-request authentication context builder.
    pub context_builder: AuthContextBuilder,
    /// Event bus feeding subscription connections.
    pub bus: EventBus,
}

impl AppState {
    /// Bundle the collaborators handlers need.
    pub fn new(content: ContentService, context_builder: AuthContextBuilder, bus: EventBus) -> Self {
        Self {
            content,
            context_builder,
            bus,
        }
    }
}
