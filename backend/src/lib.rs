//! Resolution layer for a social content API: authentication context
//! building, relationship population, the mutation pipeline, and live
//! content events over an in-process bus.

pub mod bootstrap;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
