use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{Claims, TokenKeys};
use crate::error::ApiError;

/// Verified caller identity, decoded from a bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub issued_at: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            issued_at: claims.iat,
        }
    }
}

/// Per-request authentication outcome, decided once by [`authenticate`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl AuthState {
    /// Decode the Authorization header. Every failure mode means anonymous.
    pub fn from_headers(headers: &HeaderMap, keys: &TokenKeys) -> Self {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return AuthState::Anonymous;
        };

        let Ok(raw) = value.to_str() else {
            tracing::debug!("Ignoring non-ASCII Authorization header");
            return AuthState::Anonymous;
        };

        match keys.verify(strip_bearer(raw)) {
            Ok(claims) => AuthState::Authenticated(claims.into()),
            Err(e) => {
                tracing::debug!("Treating request as anonymous: {}", e);
                AuthState::Anonymous
            }
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            AuthState::Anonymous => None,
        }
    }

    /// Any valid token will do
    pub fn require_authenticated(&self) -> Result<&Identity, ApiError> {
        self.identity()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }

    /// Token must belong to `owner` exactly
    pub fn require_owner(&self, owner: &str) -> Result<&Identity, ApiError> {
        match self.identity() {
            Some(identity) if identity.username == owner => Ok(identity),
            Some(identity) => {
                tracing::debug!("User '{}' denied access to '{}'", identity.username, owner);
                Err(ApiError::unauthorized("Unauthorized"))
            }
            None => Err(ApiError::unauthorized("Unauthorized")),
        }
    }
}

/// Strip an optional case-insensitive "Bearer " prefix and surrounding whitespace
fn strip_bearer(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => trimmed[7..].trim(),
        _ => trimmed,
    }
}

/// Attach an [`AuthState`] to every request. Never rejects.
pub async fn authenticate(
    State(keys): State<Arc<TokenKeys>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth = AuthState::from_headers(request.headers(), &keys);
    request.extensions_mut().insert(auth);

    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Routes mounted without the gate see an anonymous caller
        Ok(parts.extensions.get::<AuthState>().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn keys() -> TokenKeys {
        TokenKeys::new("test-secret", None).unwrap()
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    fn authenticated(username: &str) -> AuthState {
        AuthState::Authenticated(Identity {
            username: username.to_string(),
            issued_at: 0,
        })
    }

    #[test]
    fn strips_bearer_prefix() {
        assert_eq!(strip_bearer("Bearer abc"), "abc");
        assert_eq!(strip_bearer("bearer abc"), "abc");
        assert_eq!(strip_bearer("BEARER   abc  "), "abc");
        assert_eq!(strip_bearer("  Bearer abc"), "abc");
        assert_eq!(strip_bearer("abc"), "abc");
        assert_eq!(strip_bearer("Bearerabc"), "Bearerabc");
    }

    #[test]
    fn valid_token() {
        let keys = keys();
        let token = keys.issue("test").unwrap();

        let auth = AuthState::from_headers(&headers_with(&format!("Bearer {}", token)), &keys);
        assert_eq!(auth.identity().map(|i| i.username.as_str()), Some("test"));
    }

    #[test]
    fn invalid_token() {
        let keys = keys();
        let token = TokenKeys::new("wrongKey", None).unwrap().issue("test").unwrap();

        let auth = AuthState::from_headers(&headers_with(&format!("Bearer {}", token)), &keys);
        assert_eq!(auth, AuthState::Anonymous);

        let auth = AuthState::from_headers(&headers_with("Bearer garbage"), &keys);
        assert_eq!(auth, AuthState::Anonymous);
    }

    #[test]
    fn token_with_only_username() {
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &serde_json::json!({"username": "u1"}),
            &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let auth = AuthState::from_headers(&headers_with(&format!("Bearer {}", token)), &keys());
        assert_eq!(auth.require_owner("u1").unwrap().username, "u1");
    }

    #[test]
    fn no_header() {
        let auth = AuthState::from_headers(&HeaderMap::new(), &keys());
        assert_eq!(auth, AuthState::Anonymous);
        assert!(auth.require_authenticated().is_err());
    }

    #[test]
    fn require_authenticated_works() {
        assert!(authenticated("test").require_authenticated().is_ok());

        let err = AuthState::Anonymous.require_authenticated().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn require_owner_same_user() {
        let auth = authenticated("test");
        assert_eq!(auth.require_owner("test").unwrap().username, "test");
    }

    #[test]
    fn require_owner_different_user() {
        let err = authenticated("test1").require_owner("test").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        // Exact match only
        assert!(authenticated("Test").require_owner("test").is_err());
    }

    #[test]
    fn require_owner_no_user() {
        let err = AuthState::Anonymous.require_owner("test").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    async fn whoami(auth: AuthState) -> String {
        match auth {
            AuthState::Authenticated(identity) => identity.username,
            AuthState::Anonymous => "anonymous".to_string(),
        }
    }

    async fn call(app: Router, authorization: Option<String>) -> (StatusCode, String) {
        let mut request = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn gate_never_rejects() {
        let keys = Arc::new(keys());
        let app = Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(keys.clone(), authenticate));

        let token = keys.issue("u1").unwrap();
        assert_eq!(
            call(app.clone(), Some(format!("bearer {}", token))).await,
            (StatusCode::OK, "u1".to_string())
        );
        assert_eq!(
            call(app.clone(), Some("Bearer nope".to_string())).await,
            (StatusCode::OK, "anonymous".to_string())
        );
        assert_eq!(call(app, None).await, (StatusCode::OK, "anonymous".to_string()));
    }

    #[tokio::test]
    async fn missing_gate_means_anonymous() {
        let app = Router::new().route("/whoami", get(whoami));
        assert_eq!(call(app, None).await, (StatusCode::OK, "anonymous".to_string()));
    }
}
