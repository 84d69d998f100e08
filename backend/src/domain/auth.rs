//! Authentication primitives and the per-request context builder.
//!
//! The context builder is invoked exactly once per HTTP request and once
//! per subscription connection-init, then injected into every downstream
//! resolution. It is never cached across requests. Verification failure is
//! a hard failure: a bad credential aborts the whole request rather than
//! degrading to an anonymous context, so gated mutations fail auditably.

use std::fmt;
use std::sync::Arc;

use tracing::warn;
use zeroize::Zeroizing;

use super::comment::Comment;
use super::error::Error;
use super::population::Populator;
use super::ports::UserRepository;
use super::post::Post;
use super::token::TokenSigner;
use super::user::{Email, User, UserId, UserValidationError};

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email failed validation.
    #[error(transparent)]
    Email(#[from] UserValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated signup/signin credentials.
///
/// ## Invariants
/// - `email` is trimmed and validated.
/// - `password` is non-empty but keeps caller-provided whitespace to avoid
///   surprising credential comparisons.
#[derive(Clone)]
pub struct Credentials {
    email: Email,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address suitable for user lookups.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"..")
            .finish()
    }
}

/// Authenticated caller with related posts and comments pre-populated.
///
/// The context is attached to every resolution in the request, so the
/// related records are loaded eagerly here rather than lazily per field.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    user: User,
    posts: Vec<Post>,
    comments_made: Vec<Comment>,
}

impl AuthenticatedUser {
    /// Caller identity.
    pub const fn id(&self) -> UserId {
        self.user.id()
    }

    /// Full user record as loaded at context build time.
    pub fn record(&self) -> &User {
        &self.user
    }

    /// Posts authored by the caller at context build time.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Comments made by the caller at context build time.
    pub fn comments_made(&self) -> &[Comment] {
        &self.comments_made
    }
}

/// Per-request/per-connection authentication result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthContext {
    user: Option<AuthenticatedUser>,
}

impl AuthContext {
    /// Context for a request that carried no credential.
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    /// Authenticated caller, when a credential was presented and verified.
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.user.as_ref()
    }

    /// Require an authenticated caller for a gated operation.
    pub fn require_user(&self) -> Result<&AuthenticatedUser, Error> {
        self.user
            .as_ref()
            .ok_or_else(|| Error::unauthorized("user is not authenticated"))
    }
}

/// Builds an [`AuthContext`] from a raw bearer credential.
#[derive(Clone)]
pub struct AuthContextBuilder {
    users: Arc<dyn UserRepository>,
    signer: Arc<TokenSigner>,
    populator: Populator,
}

impl AuthContextBuilder {
    /// Construct a builder over the user store and token verifier.
    pub fn new(
        users: Arc<dyn UserRepository>,
        signer: Arc<TokenSigner>,
        populator: Populator,
    ) -> Self {
        Self {
            users,
            signer,
            populator,
        }
    }

    /// Turn a raw `"<scheme> <token>"` credential into a trusted identity.
    ///
    /// An absent credential yields an anonymous context; a present but
    /// unverifiable one fails the whole request.
    pub async fn build(&self, raw: Option<&str>) -> Result<AuthContext, Error> {
        let Some(header) = raw else {
            return Ok(AuthContext::anonymous());
        };

        // Only the token portion of "<scheme> <token>" is used.
        let token = header
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;

        let claims = self.signer.verify(token).map_err(|err| {
            warn!(error = %err, "bearer token verification failed");
            Error::unauthorized("invalid credentials")
        })?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await
            .map_err(super::population::map_store_error)?
            .ok_or_else(|| {
                warn!(subject = %claims.sub, "verified token names a missing user");
                Error::unauthorized("invalid credentials")
            })?;

        let (posts, comments_made) = futures_util::join!(
            self.populator.user_posts(&user),
            self.populator.user_comments_made(&user)
        );

        Ok(AuthContext {
            user: Some(AuthenticatedUser {
                user,
                posts,
                comments_made,
            }),
        })
    }
}
