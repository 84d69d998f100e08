//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the document store, the credential hasher). Each trait exposes strongly
//! typed errors so adapters map their failures into predictable variants.

use async_trait::async_trait;
use thiserror::Error;

use super::comment::{Comment, CommentId};
use super::password::PasswordHash;
use super::post::{Post, PostId};
use super::user::{User, UserId};

/// Failures surfaced by the document-store adapters.
///
/// The store enforces uniqueness constraints at write time; referential
/// integrity is the mutation pipeline's job, not the store's.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store connectivity failure; fatal to the in-flight operation.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// A unique constraint was violated; the write did not happen.
    #[error("{field} is already taken")]
    Duplicate { field: &'static str },
}

impl StoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for unique-constraint violations on the named field.
    pub const fn duplicate(field: &'static str) -> Self {
        Self::Duplicate { field }
    }
}

/// Persistence port for user documents.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; duplicate email fails the whole write.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Replace an existing user document.
    async fn update(&self, user: &User) -> Result<(), StoreError>;

    /// Fetch a user by identity.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Fetch a user by trimmed email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// List every user document.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

/// Persistence port for post documents.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post; duplicate title fails the whole write.
    async fn insert(&self, post: &Post) -> Result<(), StoreError>;

    /// Replace an existing post document.
    async fn update(&self, post: &Post) -> Result<(), StoreError>;

    /// Fetch a post by identity.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError>;

    /// List every post document.
    async fn list(&self) -> Result<Vec<Post>, StoreError>;
}

/// Persistence port for comment documents.
///
/// Comments are immutable, so there is no update operation.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a new comment.
    async fn insert(&self, comment: &Comment) -> Result<(), StoreError>;

    /// Fetch a comment by identity.
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, StoreError>;

    /// List every comment document.
    async fn list(&self) -> Result<Vec<Comment>, StoreError>;
}

/// One-way credential hashing with a verify contract.
///
/// The pipeline never inspects the hash beyond storing and verifying it.
pub trait PasswordHasher: Send + Sync {
    /// Derive a stored hash from a raw password.
    fn hash(&self, password: &str) -> PasswordHash;

    /// Check a raw password against a stored hash.
    fn verify(&self, password: &str, stored: &PasswordHash) -> bool;
}
