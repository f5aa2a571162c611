use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::Role;

/// Authenticated caller, resolved from a verified token and a live user record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

/// Verifies a bearer token when one is presented.
///
/// No header leaves the request anonymous. A header that is malformed, a
/// token that fails verification, or a token naming a deleted user ends the
/// request with 401 before any handler runs.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())?;

    if let Some(token) = token {
        let user = resolve(&state, &token).await.map_err(|e| {
            tracing::warn!("Rejected bearer token: {}", e);
            e
        })?;
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

async fn resolve(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let claims = state.tokens.verify(token)?;

    // Role comes from the stored record so demotions apply immediately
    let user = state
        .store
        .users
        .find(claims.sub)
        .await?
        .ok_or(AuthError::UnknownSubject)?;

    Ok(AuthUser {
        id: user.id,
        role: user.role,
    })
}

/// Bearer token from the Authorization header, `None` when the header is absent
pub fn extract_bearer(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        Some(_) => Err(AuthError::MissingToken),
        None => Err(AuthError::MalformedHeader),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| ApiError::from(AuthError::MissingToken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn absent_header_is_anonymous() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Ok(Some("abc.def".to_string())));
    }

    #[test]
    fn other_schemes_are_malformed() {
        assert_eq!(extract_bearer(&headers("Basic dXNlcjpwYXNz")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer(&headers("Bearer ")), Err(AuthError::MissingToken));
    }
}
