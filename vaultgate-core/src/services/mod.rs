//! High-level services composing the security components.

pub mod auth;

pub use auth::{AuthService, ClientMeta};
