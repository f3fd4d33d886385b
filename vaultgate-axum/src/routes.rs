use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use vaultgate_core::{
    repositories::AccountRepository,
    services::AuthService,
    session::{Session, SessionToken},
};

use crate::{
    error::{ApiError, Result},
    middleware::{
        auth_rate_limit, general_rate_limit, honeypot_gate, security_context, ClientContext,
        SecurityState,
    },
    types::*,
};

const SESSION_COOKIE: &str = "session_id";

/// Application state shared by all handlers.
pub struct AppState<R: AccountRepository> {
    pub auth: Arc<AuthService<R>>,
    pub security: Arc<SecurityState>,
}

impl<R: AccountRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            security: Arc::clone(&self.security),
        }
    }
}

/// Build the router with the full security pipeline wired in.
///
/// Every request passes fingerprinting and the general rate limiter; the
/// authentication routes additionally pass the stricter auth limiter and the
/// honeypot gate.
pub fn create_router<R>(state: AppState<R>) -> Router
where
    R: AccountRepository,
{
    let auth_routes = Router::new()
        .route("/auth/register", post(register_handler::<R>))
        .route("/auth/login", post(login_handler::<R>))
        .route("/auth/password", put(change_password_handler::<R>))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state.security),
            honeypot_gate,
        ))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state.security),
            auth_rate_limit,
        ));

    let session_routes = Router::new()
        .route("/auth/session", get(session_handler::<R>))
        .route("/auth/logout", post(logout_handler::<R>))
        .route("/health", get(health_handler));

    Router::new()
        .merge(auth_routes)
        .merge(session_routes)
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state.security),
            general_rate_limit,
        ))
        .layer(axum::middleware::from_fn(security_context))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn register_handler<R>(
    State(state): State<AppState<R>>,
    Extension(context): Extension<ClientContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse>
where
    R: AccountRepository,
{
    let account = state
        .auth
        .register(
            &payload.email,
            payload.name,
            &payload.password,
            &context.meta(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountSummary::from(&account)),
    ))
}

async fn login_handler<R>(
    State(state): State<AppState<R>>,
    Extension(context): Extension<ClientContext>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse>
where
    R: AccountRepository,
{
    // Fixation defense: any session presented before authentication is
    // destroyed; the client only ever proceeds with a token issued after
    // this login.
    let jar = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.auth.logout(&SessionToken::new(cookie.value()));
        jar.remove(Cookie::from(SESSION_COOKIE))
    } else {
        jar
    };

    let (account, session) = state
        .auth
        .login(&payload.email, &payload.password, &context.meta())
        .await?;

    let jar = jar.add(session_cookie(&session));
    Ok((
        jar,
        Json(AuthResponse {
            account: AccountSummary::from(&account),
            session_expires_at: session.expires_at,
        }),
    ))
}

async fn change_password_handler<R>(
    State(state): State<AppState<R>>,
    Extension(context): Extension<ClientContext>,
    jar: CookieJar,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse>
where
    R: AccountRepository,
{
    let token = session_token(&jar)?;
    let session = state
        .auth
        .sessions()
        .get(&token)
        .map_err(|_| ApiError::Unauthorized)?;

    state
        .auth
        .change_password(
            &session.account_id,
            &payload.current_password,
            &payload.new_password,
            &context.meta(),
        )
        .await?;

    // Rotate the session after a credential change.
    let fresh = state
        .auth
        .sessions()
        .regenerate(&token)
        .map_err(|_| ApiError::Unauthorized)?;

    let jar = jar.add(session_cookie(&fresh));
    Ok((
        jar,
        Json(MessageResponse {
            message: "Password changed".to_string(),
        }),
    ))
}

async fn session_handler<R>(
    State(state): State<AppState<R>>,
    jar: CookieJar,
) -> Result<impl IntoResponse>
where
    R: AccountRepository,
{
    let token = session_token(&jar)?;
    let session = state
        .auth
        .sessions()
        .get(&token)
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Json(SessionResponse {
        account_id: session.account_id.as_str().to_string(),
        expires_at: session.expires_at,
    }))
}

async fn logout_handler<R>(
    State(state): State<AppState<R>>,
    jar: CookieJar,
) -> Result<impl IntoResponse>
where
    R: AccountRepository,
{
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.auth.logout(&SessionToken::new(cookie.value()));
    }

    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    Ok((
        jar,
        Json(MessageResponse {
            message: "Successfully logged out".to_string(),
        }),
    ))
}

fn session_token(jar: &CookieJar) -> Result<SessionToken> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| SessionToken::new(cookie.value()))
        .ok_or(ApiError::Unauthorized)
}

fn session_cookie(session: &Session) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session.token.as_str().to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
