//! Content events published by the mutation pipeline.
//!
//! Payloads are normalized shallow projections: the created or updated
//! entity's immediate fields plus identity references, never the populated
//! subgraph. Inbound adapters forward them as-is.

use serde::{Deserialize, Serialize};

use super::comment::{Comment, CommentId, CommentText};
use super::post::{Post, PostId, Title};
use super::user::UserId;

/// Named event channel of the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Topic {
    /// A post was created.
    PostAdded,
    /// A post's scalar fields changed.
    PostUpdated,
    /// A comment was created.
    CommentAdded,
}

impl Topic {
    /// Every topic the bus carries.
    pub const ALL: [Self; 3] = [Self::PostAdded, Self::PostUpdated, Self::CommentAdded];

    /// Wire name of the topic.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PostAdded => "postAdded",
            Self::PostUpdated => "postUpdated",
            Self::CommentAdded => "commentAdded",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shallow projection of a post carried by `postAdded`/`postUpdated`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostEvent {
    /// Post identity.
    pub id: PostId,
    /// Title at publish time.
    pub title: Title,
    /// Author reference.
    pub posted_by: UserId,
    /// Comment references at publish time.
    pub comments: Vec<CommentId>,
}

impl From<&Post> for PostEvent {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id(),
            title: post.title().clone(),
            posted_by: post.posted_by(),
            comments: post.comments().to_vec(),
        }
    }
}

/// Shallow projection of a comment carried by `commentAdded`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEvent {
    /// Comment identity.
    pub id: CommentId,
    /// Comment body.
    pub text: CommentText,
    /// Commenter reference.
    pub commenter: UserId,
    /// Post reference.
    pub comment_for: PostId,
}

impl From<&Comment> for CommentEvent {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id(),
            text: comment.text().clone(),
            commenter: comment.commenter(),
            comment_for: comment.comment_for(),
        }
    }
}

/// Event published on the bus after a successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ContentEvent {
    /// A post was created.
    PostAdded(PostEvent),
    /// A post's title changed.
    PostUpdated(PostEvent),
    /// A comment was created.
    CommentAdded(CommentEvent),
}

impl ContentEvent {
    /// Topic this event is published on.
    pub const fn topic(&self) -> Topic {
        match self {
            Self::PostAdded(_) => Topic::PostAdded,
            Self::PostUpdated(_) => Topic::PostUpdated,
            Self::CommentAdded(_) => Topic::CommentAdded,
        }
    }
}
