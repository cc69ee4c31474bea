//! Hosted backend integration module.
//!
//! Provides clients for the tables and auth endpoints and the snippet
//! data-access seam used by the store.

pub mod auth;
pub mod error;
pub mod models;
pub mod oauth;
pub mod snippets;
pub mod tables;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthClient, SignUpOutcome};
pub use error::BackendError;
pub use models::{Session, User};
pub use snippets::{RemoteSnippets, SnippetBackend};
pub use tables::{Query, TablesClient};
