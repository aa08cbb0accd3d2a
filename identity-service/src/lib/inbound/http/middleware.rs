use auth::Authenticator;
use auth::JwtError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use thiserror::Error;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extension type to store the authenticated caller in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    /// Email as it was when the token was issued
    pub email: String,
}

/// Why a request was turned away. Only ever logged; every variant produces
/// the same unauthorized response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Missing Authorization header")]
    MissingCredential,

    #[error("Authorization header is not of the form `Bearer <token>`")]
    MalformedCredential,

    #[error("Token rejected: {0}")]
    Token(#[from] JwtError),

    #[error("Token subject is not a user id: {0}")]
    InvalidSubject(String),
}

/// Decide whether a raw `Authorization` header value grants access.
///
/// Transport-neutral: callers pass the header as text, or `None` when absent.
pub fn authorize(
    header: Option<&str>,
    authenticator: &Authenticator,
) -> Result<AuthenticatedUser, GateError> {
    let header = header.ok_or(GateError::MissingCredential)?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(GateError::MalformedCredential)?;

    let claims = authenticator.validate_token(token)?;

    let user_id = UserId::from_string(&claims.sub)
        .map_err(|e| GateError::InvalidSubject(e.to_string()))?;

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
    })
}

/// Middleware that validates bearer tokens and adds the caller to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let header = match req.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| {
            reject(GateError::MalformedCredential)
        })?),
    };

    let caller = authorize(header, &state.authenticator).map_err(reject)?;

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

fn reject(reason: GateError) -> Response {
    tracing::warn!(reason = %reason, "Request rejected by authorization gate");
    ApiError::unauthorized().into_response()
}
