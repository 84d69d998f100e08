//! Content service: the mutation pipeline and the read-only query surface.
//!
//! Every mutation walks validate → authorize → persist root → persist
//! back-references → publish, and any step can reject the operation. Root
//! persistence is never rolled back by a later step: a back-reference
//! failure surfaces to the caller while the root write stands (an
//! acknowledged inconsistency window), and publish failures are invisible.
//!
//! Query operations never mutate and degrade leniently: a store failure is
//! logged and the response collapses to an empty or absent result.

use std::sync::Arc;

use tracing::error;

use super::auth::{AuthContext, Credentials, CredentialsValidationError};
use super::comment::{Comment, CommentId, CommentText, CommentValidationError};
use super::error::Error;
use super::event_bus::EventBus;
use super::events::{CommentEvent, ContentEvent, PostEvent};
use super::population::{map_store_error, CommentView, Populator, PostView, UserView};
use super::ports::{CommentRepository, PasswordHasher, PostRepository, UserRepository};
use super::post::{Post, PostId, PostValidationError, Title};
use super::token::{Claims, SignedToken, TokenSigner};
use super::user::{User, UserId};

/// One undifferentiated signin failure, by design: the service does not
/// distinguish an unknown email from a wrong password.
const INCORRECT_CREDENTIALS: &str = "incorrect credentials";

/// Schema-shaped operations over the entity store and event bus.
#[derive(Clone)]
pub struct ContentService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    hasher: Arc<dyn PasswordHasher>,
    signer: Arc<TokenSigner>,
    bus: EventBus,
    populator: Populator,
}

impl ContentService {
    /// Wire a service from its collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        hasher: Arc<dyn PasswordHasher>,
        signer: Arc<TokenSigner>,
        bus: EventBus,
    ) -> Self {
        let populator = Populator::new(users.clone(), posts.clone(), comments.clone());
        Self {
            users,
            posts,
            comments,
            hasher,
            signer,
            bus,
            populator,
        }
    }

    /// Population engine shared with the context builder and the facade.
    pub fn populator(&self) -> &Populator {
        &self.populator
    }

    // ---- mutations -------------------------------------------------------

    /// Create a user account. Requires no prior authentication.
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, Error> {
        let credentials =
            Credentials::try_from_parts(email, password).map_err(map_credentials_error)?;
        let hash = self.hasher.hash(credentials.password());
        let user = User::new(UserId::random(), credentials.email().clone(), hash);
        self.users.insert(&user).await.map_err(map_store_error)?;
        Ok(user)
    }

    /// Verify credentials and issue a signed bearer token.
    ///
    /// Lookup short-circuits before any hash comparison when the email is
    /// unknown; both miss cases yield the same failure.
    pub async fn signin(&self, email: &str, password: &str) -> Result<SignedToken, Error> {
        let credentials =
            Credentials::try_from_parts(email, password).map_err(map_credentials_error)?;
        let Some(user) = self
            .users
            .find_by_email(credentials.email().as_ref())
            .await
            .map_err(map_store_error)?
        else {
            return Err(Error::unauthorized(INCORRECT_CREDENTIALS));
        };
        if !self
            .hasher
            .verify(credentials.password(), user.password_hash())
        {
            return Err(Error::unauthorized(INCORRECT_CREDENTIALS));
        }
        let claims = Claims::for_subject(user.id(), user.email());
        self.signer
            .issue(&claims)
            .map_err(|err| Error::internal(format!("token issuance failed: {err}")))
    }

    /// Create a post authored by the authenticated caller.
    pub async fn create_post(&self, ctx: &AuthContext, title: &str) -> Result<Post, Error> {
        let caller = ctx.require_user()?;
        let title = Title::new(title).map_err(map_post_validation_error)?;

        let post = Post::new(PostId::random(), title, caller.id());
        self.posts.insert(&post).await.map_err(map_store_error)?;

        // Root write committed; back-reference failures surface without
        // rolling it back.
        self.append_post_to_author(caller.id(), post.id()).await?;

        self.bus
            .publish(ContentEvent::PostAdded(PostEvent::from(&post)));
        Ok(post)
    }

    /// Rename a post. Only the title scalar changes; relationships are
    /// untouched.
    pub async fn update_post(
        &self,
        ctx: &AuthContext,
        post_id: PostId,
        title: &str,
    ) -> Result<Post, Error> {
        ctx.require_user()?;
        let title = Title::new(title).map_err(map_post_validation_error)?;

        let Some(mut post) = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(map_store_error)?
        else {
            return Err(Error::invalid_request("post not found"));
        };
        post.set_title(title);
        self.posts.update(&post).await.map_err(map_store_error)?;

        self.bus
            .publish(ContentEvent::PostUpdated(PostEvent::from(&post)));
        Ok(post)
    }

    /// Create a comment by the authenticated caller against an existing
    /// post.
    pub async fn create_comment(
        &self,
        ctx: &AuthContext,
        post_id: PostId,
        text: &str,
    ) -> Result<Comment, Error> {
        let caller = ctx.require_user()?;
        let text = CommentText::new(text).map_err(map_comment_validation_error)?;

        // Write-time referential check: the pipeline never creates a
        // dangling comment_for reference.
        if self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(map_store_error)?
            .is_none()
        {
            return Err(Error::invalid_request("post not found"));
        }

        let comment = Comment::new(CommentId::random(), text, caller.id(), post_id);
        self.comments
            .insert(&comment)
            .await
            .map_err(map_store_error)?;

        // Both appends re-load the latest document copy; concurrent
        // mutations against the same post may still interleave (no
        // document-level locking in this core).
        self.append_comment_to_author(caller.id(), comment.id())
            .await?;
        self.append_comment_to_post(post_id, comment.id()).await?;

        self.bus
            .publish(ContentEvent::CommentAdded(CommentEvent::from(&comment)));
        Ok(comment)
    }

    // ---- queries ---------------------------------------------------------

    /// All users, populated. Store failures degrade to an empty list.
    pub async fn users(&self) -> Vec<UserView> {
        match self.users.list().await {
            Ok(records) => {
                let views = records.iter().map(|user| self.populator.user_view(user));
                futures_util::future::join_all(views).await
            }
            Err(err) => {
                error!(error = %err, "user listing failed; degrading to empty");
                Vec::new()
            }
        }
    }

    /// One user by identity, populated; absent on miss or store failure.
    pub async fn user(&self, id: UserId) -> Option<UserView> {
        match self.users.find_by_id(id).await {
            Ok(Some(user)) => Some(self.populator.user_view(&user).await),
            Ok(None) => None,
            Err(err) => {
                error!(error = %err, "user lookup failed; degrading to absent");
                None
            }
        }
    }

    /// All posts, populated. Store failures degrade to an empty list.
    pub async fn posts(&self) -> Vec<PostView> {
        match self.posts.list().await {
            Ok(records) => {
                let views = records.iter().map(|post| self.populator.post_view(post));
                futures_util::future::join_all(views).await
            }
            Err(err) => {
                error!(error = %err, "post listing failed; degrading to empty");
                Vec::new()
            }
        }
    }

    /// One post by identity, populated; absent on miss or store failure.
    pub async fn post(&self, id: PostId) -> Option<PostView> {
        match self.posts.find_by_id(id).await {
            Ok(Some(post)) => Some(self.populator.post_view(&post).await),
            Ok(None) => None,
            Err(err) => {
                error!(error = %err, "post lookup failed; degrading to absent");
                None
            }
        }
    }

    /// All comments, populated. Store failures degrade to an empty list.
    pub async fn comments(&self) -> Vec<CommentView> {
        match self.comments.list().await {
            Ok(records) => {
                let views = records
                    .iter()
                    .map(|comment| self.populator.comment_view(comment));
                futures_util::future::join_all(views).await
            }
            Err(err) => {
                error!(error = %err, "comment listing failed; degrading to empty");
                Vec::new()
            }
        }
    }

    /// One comment by identity, populated; absent on miss or store failure.
    pub async fn comment(&self, id: CommentId) -> Option<CommentView> {
        match self.comments.find_by_id(id).await {
            Ok(Some(comment)) => Some(self.populator.comment_view(&comment).await),
            Ok(None) => None,
            Err(err) => {
                error!(error = %err, "comment lookup failed; degrading to absent");
                None
            }
        }
    }

    // ---- back-reference persistence -------------------------------------

    async fn append_post_to_author(&self, author: UserId, post: PostId) -> Result<(), Error> {
        let Some(mut user) = self
            .users
            .find_by_id(author)
            .await
            .map_err(map_store_error)?
        else {
            return Err(Error::internal("author record missing during backref write"));
        };
        user.record_post(post);
        self.users.update(&user).await.map_err(map_store_error)
    }

    async fn append_comment_to_author(
        &self,
        author: UserId,
        comment: CommentId,
    ) -> Result<(), Error> {
        let Some(mut user) = self
            .users
            .find_by_id(author)
            .await
            .map_err(map_store_error)?
        else {
            return Err(Error::internal("author record missing during backref write"));
        };
        user.record_comment(comment);
        self.users.update(&user).await.map_err(map_store_error)
    }

    async fn append_comment_to_post(&self, post: PostId, comment: CommentId) -> Result<(), Error> {
        let Some(mut post) = self.posts.find_by_id(post).await.map_err(map_store_error)? else {
            return Err(Error::internal("post record missing during backref write"));
        };
        post.record_comment(comment);
        self.posts.update(&post).await.map_err(map_store_error)
    }
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn map_post_validation_error(err: PostValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn map_comment_validation_error(err: CommentValidationError) -> Error {
    Error::invalid_request(err.to_string())
}
