//! Comment entity and its validated field types.
//!
//! Comments are immutable after creation; there is no edit or delete path.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::post::PostId;
use super::user::UserId;

/// Validation errors raised when constructing comment field values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentValidationError {
    /// Text was missing or blank once trimmed.
    #[error("text must not be empty")]
    EmptyText,
}

/// Stable comment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(Uuid);

impl CommentId {
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

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed comment body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentText(String);

impl CommentText {
    /// Validate and construct a [`CommentText`] from raw input.
    pub fn new(value: impl Into<String>) -> Result<Self, CommentValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CommentValidationError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CommentText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CommentText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CommentText> for String {
    fn from(value: CommentText) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommentText {
    type Error = CommentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Comment made by a user against a post.
///
/// ## Invariants
/// - `commenter` and `comment_for` name an existing user and post at
///   creation time; the pipeline validates both before the root write.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Stable comment identifier.
    #[schema(value_type = String)]
    id: CommentId,
    /// Comment body.
    #[schema(value_type = String, example = "Nice post!")]
    text: CommentText,
    /// Identity of the commenting user.
    #[schema(value_type = String)]
    commenter: UserId,
    /// Identity of the post this comment belongs to.
    #[schema(value_type = String)]
    comment_for: PostId,
}

impl Comment {
    /// Build a new comment.
    pub fn new(id: CommentId, text: CommentText, commenter: UserId, comment_for: PostId) -> Self {
        Self {
            id,
            text,
            commenter,
            comment_for,
        }
    }

    /// Stable comment identifier.
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Comment body.
    pub fn text(&self) -> &CommentText {
        &self.text
    }

    /// Identity of the commenting user.
    pub const fn commenter(&self) -> UserId {
        self.commenter
    }

    /// Identity of the post this comment belongs to.
    pub const fn comment_for(&self) -> PostId {
        self.comment_for
    }
}
