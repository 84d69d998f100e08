//! Relationship population engine.
//!
//! One method per relationship field: the response assembler forces only
//! the fields a view needs, so nothing is fetched eagerly for fields that
//! are not part of the requested shape. Sibling fields on the same parent
//! resolve concurrently and never share a fetch.
//!
//! Population is read-only and lenient: a broken reference resolves to an
//! absent/skipped element, never a fatal error for the whole response.
//! References inside first-level populated entities remain identities,
//! which bounds the recursion.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::comment::{Comment, CommentId, CommentText};
use super::error::Error;
use super::ports::{CommentRepository, PostRepository, StoreError, UserRepository};
use super::post::{Post, PostId, Title};
use super::user::{Email, User, UserId};

/// User with first-level relationships populated.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// Stable user identifier.
    #[schema(value_type = String)]
    pub id: UserId,
    /// Lookup email address.
    #[schema(value_type = String)]
    pub email: Email,
    /// Posts authored by this user.
    pub posts: Vec<Post>,
    /// Comments made by this user.
    pub comments_made: Vec<Comment>,
}

/// Post with first-level relationships populated.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    /// Stable post identifier.
    #[schema(value_type = String)]
    pub id: PostId,
    /// Current title.
    #[schema(value_type = String)]
    pub title: Title,
    /// Authoring user, absent when the reference is broken.
    pub posted_by: Option<UserView>,
    /// Comments made against this post.
    pub comments: Vec<Comment>,
}

/// Comment with first-level relationships populated.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    /// Stable comment identifier.
    #[schema(value_type = String)]
    pub id: CommentId,
    /// Comment body.
    #[schema(value_type = String)]
    pub text: CommentText,
    /// Commenting user, absent when the reference is broken.
    pub commenter: Option<UserView>,
    /// Post this comment belongs to, absent when the reference is broken.
    pub comment_for: Option<PostView>,
}

/// Resolves reference fields against the entity store on demand.
#[derive(Clone)]
pub struct Populator {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl Populator {
    /// Construct an engine over the three repositories.
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
        }
    }

    /// Resolve `User.posts` into post records, skipping broken references.
    pub async fn user_posts(&self, user: &User) -> Vec<Post> {
        let lookups = user.posts().iter().map(|id| self.post_record(*id));
        join_all(lookups).await.into_iter().flatten().collect()
    }

    /// Resolve `User.commentsMade` into comment records.
    pub async fn user_comments_made(&self, user: &User) -> Vec<Comment> {
        let lookups = user
            .comments_made()
            .iter()
            .map(|id| self.comment_record(*id));
        join_all(lookups).await.into_iter().flatten().collect()
    }

    /// Resolve `Post.postedBy` into the authoring user with its own
    /// first-level relationships populated.
    pub async fn post_author(&self, post: &Post) -> Option<UserView> {
        let user = self.user_record(post.posted_by()).await?;
        Some(self.user_view(&user).await)
    }

    /// Resolve `Post.comments` into comment records.
    pub async fn post_comments(&self, post: &Post) -> Vec<Comment> {
        let lookups = post.comments().iter().map(|id| self.comment_record(*id));
        join_all(lookups).await.into_iter().flatten().collect()
    }

    /// Resolve `Comment.commenter` into the commenting user.
    pub async fn comment_author(&self, comment: &Comment) -> Option<UserView> {
        let user = self.user_record(comment.commenter()).await?;
        Some(self.user_view(&user).await)
    }

    /// Resolve `Comment.commentFor` into the populated post.
    pub async fn comment_post(&self, comment: &Comment) -> Option<PostView> {
        let post = self.post_record_by_ref(comment.comment_for()).await?;
        Some(self.post_view(&post).await)
    }

    /// Assemble the full user shape; both sibling fields resolve
    /// concurrently.
    pub async fn user_view(&self, user: &User) -> UserView {
        let (posts, comments_made) =
            futures_util::join!(self.user_posts(user), self.user_comments_made(user));
        UserView {
            id: user.id(),
            email: user.email().clone(),
            posts,
            comments_made,
        }
    }

    /// Assemble the full post shape.
    pub async fn post_view(&self, post: &Post) -> PostView {
        let (posted_by, comments) =
            futures_util::join!(self.post_author(post), self.post_comments(post));
        PostView {
            id: post.id(),
            title: post.title().clone(),
            posted_by,
            comments,
        }
    }

    /// Assemble the full comment shape.
    pub async fn comment_view(&self, comment: &Comment) -> CommentView {
        let (commenter, comment_for) =
            futures_util::join!(self.comment_author(comment), self.comment_post(comment));
        CommentView {
            id: comment.id(),
            text: comment.text().clone(),
            commenter,
            comment_for,
        }
    }

    async fn user_record(&self, id: UserId) -> Option<User> {
        resolve_reference("user", self.users.find_by_id(id).await)
    }

    async fn post_record(&self, id: PostId) -> Option<Post> {
        resolve_reference("post", self.posts.find_by_id(id).await)
    }

    // Same lookup as `post_record`; named separately so traces distinguish
    // membership-list resolution from a comment's back-reference.
    async fn post_record_by_ref(&self, id: PostId) -> Option<Post> {
        resolve_reference("commentFor", self.posts.find_by_id(id).await)
    }

    async fn comment_record(&self, id: CommentId) -> Option<Comment> {
        resolve_reference("comment", self.comments.find_by_id(id).await)
    }
}

/// Collapse a store lookup into the lenient population result.
fn resolve_reference<T>(kind: &'static str, result: Result<Option<T>, StoreError>) -> Option<T> {
    match result {
        Ok(Some(record)) => Some(record),
        Ok(None) => {
            debug!(kind, "broken reference resolved as absent");
            None
        }
        Err(err) => {
            error!(kind, error = %err, "store lookup failed during population");
            None
        }
    }
}

/// Map a store failure to the domain error surfaced by mutations.
///
/// Lives here rather than in the pipeline so every caller translates
/// uniqueness violations and connectivity failures identically.
pub fn map_store_error(err: StoreError) -> Error {
    match err {
        StoreError::Duplicate { field } => {
            Error::invalid_request(format!("{field} is already taken"))
        }
        StoreError::Connection { message } => {
            error!(error = %message, "entity store unreachable");
            Error::service_unavailable("entity store unreachable")
        }
    }
}
