//! User entity and its validated field types.
//!
//! The credential hash never leaves the process: serialization goes through
//! [`UserDto`], which carries only the identity, email, and membership lists.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::comment::CommentId;
use super::password::PasswordHash;
use super::post::PostId;

/// Validation errors raised when constructing user field values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email does not look like an address.
    #[error("email must contain '@'")]
    InvalidEmail,
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed, lookup-ready email address.
///
/// ## Invariants
/// - Non-empty after trimming.
/// - Contains an `@` separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`] from raw input.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !trimmed.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// ## Invariants
/// - `posts` and `comments_made` are append-only membership lists written by
///   the mutation pipeline; each identity appears at most once.
/// - `password_hash` is never serialized outward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "UserDto")]
pub struct User {
    id: UserId,
    email: Email,
    password_hash: PasswordHash,
    posts: Vec<PostId>,
    comments_made: Vec<CommentId>,
}

impl User {
    /// Build a new user with empty membership lists.
    pub fn new(id: UserId, email: Email, password_hash: PasswordHash) -> Self {
        Self {
            id,
            email,
            password_hash,
            posts: Vec::new(),
            comments_made: Vec::new(),
        }
    }

    /// Stable user identifier.
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Lookup email address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Stored one-way credential hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Identities of posts authored by this user.
    pub fn posts(&self) -> &[PostId] {
        &self.posts
    }

    /// Identities of comments made by this user.
    pub fn comments_made(&self) -> &[CommentId] {
        &self.comments_made
    }

    /// Append a post identity to the membership list, ignoring repeats.
    pub fn record_post(&mut self, post: PostId) {
        if !self.posts.contains(&post) {
            self.posts.push(post);
        }
    }

    /// Append a comment identity to the membership list, ignoring repeats.
    pub fn record_comment(&mut self, comment: CommentId) {
        if !self.comments_made.contains(&comment) {
            self.comments_made.push(comment);
        }
    }
}

/// Outward-facing user projection; deliberately omits the credential hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = User)]
pub struct UserDto {
    /// Stable user identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// Lookup email address.
    #[schema(value_type = String, example = "ada@example.com")]
    pub email: Email,
    /// Identities of posts authored by this user.
    #[schema(value_type = Vec<String>)]
    pub posts: Vec<PostId>,
    /// Identities of comments made by this user.
    #[schema(value_type = Vec<String>)]
    pub comments_made: Vec<CommentId>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            email,
            posts,
            comments_made,
            password_hash: _,
        } = value;
        Self {
            id,
            email,
            posts,
            comments_made,
        }
    }
}
