//! # Vaultgate Axum Integration
//!
//! Axum routes and middleware for the vaultgate account-security core. The
//! router wires every request through a security pipeline (fingerprinting,
//! tiered rate limiting, honeypot inspection) before the authentication
//! handlers run.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vaultgate_axum::{AppState, SecurityState, create_router};
//! use vaultgate_core::{
//!     events::SecurityEventLog,
//!     lockout::LockoutConfig,
//!     password::{HasherConfig, PasswordHasher},
//!     rate_limit::{RateLimitConfig, RateLimiter},
//!     services::AuthService,
//!     session::{SessionConfig, SessionStore},
//!     HoneypotDetector,
//! };
//!
//! # async fn run(repository: Arc<impl vaultgate_core::repositories::AccountRepository>) {
//! let events = Arc::new(SecurityEventLog::default());
//! let auth = Arc::new(AuthService::new(
//!     repository,
//!     Arc::new(PasswordHasher::new("server-pepper", HasherConfig::default())),
//!     LockoutConfig::default(),
//!     Arc::new(SessionStore::new(SessionConfig::default())),
//!     Arc::clone(&events),
//! ));
//! let security = Arc::new(SecurityState {
//!     general_limiter: RateLimiter::new(RateLimitConfig::general()),
//!     auth_limiter: RateLimiter::new(RateLimitConfig::auth()),
//!     honeypot: HoneypotDetector::default(),
//!     events,
//! });
//!
//! let app = create_router(AppState { auth, security });
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(
//!     listener,
//!     app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
//! )
//! .await
//! .unwrap();
//! # }
//! ```

mod error;
mod middleware;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use middleware::{
    auth_rate_limit, general_rate_limit, honeypot_gate, security_context, ClientContext,
    SecurityState,
};
pub use routes::{create_router, AppState};
pub use types::{
    AccountSummary, AuthResponse, ChangePasswordRequest, HealthResponse, LoginRequest,
    MessageResponse, RegisterRequest, SessionResponse,
};
