//! Domain primitives, services, and ports.
//!
//! Purpose: hold everything with real invariants — entities and their
//! validation, the auth context builder, the relationship population
//! engine, the mutation pipeline, and the event bus. Inbound adapters map
//! this module's types to transports; outbound adapters implement its
//! ports.

pub mod auth;
pub mod comment;
pub mod content;
pub mod error;
pub mod event_bus;
pub mod events;
pub mod password;
pub mod population;
pub mod ports;
pub mod post;
pub mod token;
pub mod user;

pub use self::auth::{AuthContext, AuthContextBuilder, AuthenticatedUser, Credentials};
pub use self::comment::{Comment, CommentId, CommentText};
pub use self::content::ContentService;
pub use self::error::{Error, ErrorCode};
pub use self::event_bus::{EventBus, Subscription, DEFAULT_EVENT_CAPACITY};
pub use self::events::{CommentEvent, ContentEvent, PostEvent, Topic};
pub use self::password::{HmacPasswordHasher, PasswordHash};
pub use self::population::{CommentView, Populator, PostView, UserView};
pub use self::post::{Post, PostId, Title};
pub use self::token::{Claims, SignedToken, TokenSigner};
pub use self::user::{Email, User, UserId};

/// Convenient result alias for fallible domain operations.
pub type ApiResult<T> = Result<T, Error>;
