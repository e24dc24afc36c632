use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

/// Session identity resolved from the bearer token.
#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;

    let token = bearer_token(auth_header).ok_or(AppError::Unauthenticated)?;

    let claims = state.jwt.verify_token(token).map_err(|err| {
        debug!(error = %err, "session token rejected");
        AppError::Unauthenticated
    })?;

    if claims.sub.trim().is_empty() {
        return Err(AppError::Unauthenticated);
    }

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.sub,
    });

    Ok(next.run(request).await)
}

fn bearer_token(auth_header: &str) -> Option<&str> {
    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::bearer_token;

    #[test]
    fn bearer_token_parses_scheme_case_insensitively() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
    }

    #[test]
    fn bearer_token_rejects_malformed_headers() {
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer a b"), None);
        assert_eq!(bearer_token(""), None);
    }
}
