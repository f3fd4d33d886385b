//! Password security: peppered slow hashing, strength scoring, reuse history,
//! and the breach denylist consulted at registration.

pub mod breach;
pub mod hasher;
pub mod history;
pub mod strength;

pub use breach::BreachList;
pub use hasher::{HasherConfig, PasswordHasher};
pub use history::PasswordHistory;
pub use strength::{score, StrengthReport};
