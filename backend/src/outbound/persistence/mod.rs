//! Persistence adapters for the repository ports.
//!
//! The durable document store (its indexing, replication, durability) is an
//! external collaborator; these in-memory adapters model its contract —
//! identity lookup, whole-document replace, and write-time uniqueness
//! enforcement — for a single process.

mod memory;

pub use memory::{InMemoryCommentRepository, InMemoryPostRepository, InMemoryUserRepository};
