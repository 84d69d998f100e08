//! Post entity and its validated field types.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::comment::CommentId;
use super::user::UserId;

/// Validation errors raised when constructing post field values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// Title was missing or blank once trimmed.
    #[error("title must not be empty")]
    EmptyTitle,
}

/// Stable post identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(Uuid);

impl PostId {
    /// Generate a fresh process-wide-unique identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed, store-unique post title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title(String);

impl Title {
    /// Validate and construct a [`Title`] from raw input.
    pub fn new(value: impl Into<String>) -> Result<Self, PostValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Title> for String {
    fn from(value: Title) -> Self {
        value.0
    }
}

impl TryFrom<String> for Title {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Authored post.
///
/// ## Invariants
/// - `posted_by` names the authenticated author at creation and never
///   changes.
/// - `comments` is an append-only membership list kept consistent with each
///   comment's `comment_for` reference by the mutation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Stable post identifier.
    #[schema(value_type = String)]
    id: PostId,
    /// Store-unique title; the only mutable scalar on a post.
    #[schema(value_type = String, example = "Hello world")]
    title: Title,
    /// Identity of the authoring user.
    #[schema(value_type = String)]
    posted_by: UserId,
    /// Identities of comments made against this post.
    #[schema(value_type = Vec<String>)]
    comments: Vec<CommentId>,
}

impl Post {
    /// Build a new post with an empty comment list.
    pub fn new(id: PostId, title: Title, posted_by: UserId) -> Self {
        Self {
            id,
            title,
            posted_by,
            comments: Vec::new(),
        }
    }

    /// Stable post identifier.
    pub const fn id(&self) -> PostId {
        self.id
    }

    /// Current title.
    pub fn title(&self) -> &Title {
        &self.title
    }

    /// Identity of the authoring user.
    pub const fn posted_by(&self) -> UserId {
        self.posted_by
    }

    /// Identities of comments made against this post.
    pub fn comments(&self) -> &[CommentId] {
        &self.comments
    }

    /// Replace the title; relationships are untouched.
    pub fn set_title(&mut self, title: Title) {
        self.title = title;
    }

    /// Append a comment identity to the membership list, ignoring repeats.
    pub fn record_comment(&mut self, comment: CommentId) {
        if !self.comments.contains(&comment) {
            self.comments.push(comment);
        }
    }
}
