//! Process wiring shared by the binary and the test harness.
//!
//! Builds the full collaborator graph — repositories, hasher, signer,
//! event bus, content service, and context builder — so the binary and the
//! tests serve exactly the same surface.

use std::sync::Arc;

use crate::domain::{
    AuthContextBuilder, ContentService, EventBus, HmacPasswordHasher, TokenSigner,
};
use crate::inbound::http::state::AppState;
use crate::outbound::persistence::{
    InMemoryCommentRepository, InMemoryPostRepository, InMemoryUserRepository,
};

/// Wire application state over in-memory repositories.
///
/// The token secret is read once here and shared read-only by every request
/// for the process lifetime.
pub fn build_state(token_secret: Vec<u8>, event_capacity: usize) -> AppState {
    let users = Arc::new(InMemoryUserRepository::default());
    let posts = Arc::new(InMemoryPostRepository::default());
    let comments = Arc::new(InMemoryCommentRepository::default());

    let signer = Arc::new(TokenSigner::new(token_secret));
    let bus = EventBus::new(event_capacity);
    let content = ContentService::new(
        users.clone(),
        posts,
        comments,
        Arc::new(HmacPasswordHasher::default()),
        signer.clone(),
        bus.clone(),
    );
    let context_builder =
        AuthContextBuilder::new(users, signer, content.populator().clone());

    AppState::new(content, context_builder, bus)
}
