/// Authentication middleware for Axum
///
/// Derives the caller identity from the `Authorization: Bearer <token>`
/// header, purely as a function of the token; there is no session state
/// between requests. On success a [`CurrentUser`] is inserted into request
/// extensions for handlers to extract.
///
/// Two layers implement the access tiers:
///
/// - [`bearer_auth_middleware`]: anonymous → authenticated. Missing or
///   invalid tokens are rejected with 401 and a `WWW-Authenticate: Bearer`
///   challenge, without revealing which check failed.
/// - [`require_admin`]: authenticated → admin. A valid token without the
///   admin role is rejected with 403, distinct from 401.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use taskhive_shared::auth::middleware::{create_bearer_middleware, CurrentUser};
///
/// async fn whoami(Extension(user): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", user.username)
/// }
///
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(create_bearer_middleware("jwt-secret-at-least-32-bytes-long!!")));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{validate_token, Claims};

/// The authenticated caller, derived from validated token claims
///
/// Handlers extract this with Axum's `Extension` extractor on any route
/// behind the bearer middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User ID
    pub id: Uuid,

    /// Username (the token subject)
    pub username: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Whether the caller holds the admin role
    pub is_admin: bool,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.sub,
            first_name: claims.first_name,
            last_name: claims.last_name,
            is_admin: claims.is_admin,
        }
    }
}

/// Error type for the authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// No Authorization header, or not a Bearer scheme
    MissingCredentials,

    /// Token failed validation (reason deliberately not carried)
    InvalidToken,

    /// Valid token but the admin role is required
    AdminRequired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            // Both 401 causes share one message so clients cannot probe
            // which check rejected them.
            AuthError::MissingCredentials | AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Invalid authentication credentials",
            ),
            AuthError::AdminRequired => {
                (StatusCode::FORBIDDEN, "forbidden", "Admin role required")
            }
        };

        let body = Json(json!({ "error": error, "message": message }));
        let mut response = (status, body).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Bearer token authentication middleware
///
/// Validates the token from the `Authorization: Bearer <token>` header and
/// inserts a [`CurrentUser`] into request extensions.
///
/// # Errors
///
/// Returns 401 Unauthorized (with a `WWW-Authenticate: Bearer` challenge)
/// if the header is missing, malformed, or the token does not validate.
pub async fn bearer_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingCredentials)?;

    let claims = validate_token(token, &secret).map_err(|_| AuthError::InvalidToken)?;

    req.extensions_mut().insert(CurrentUser::from(claims));

    Ok(next.run(req).await)
}

/// Admin tier middleware
///
/// Must be layered inside the bearer middleware; checks the `is_admin`
/// flag on the already-derived [`CurrentUser`].
///
/// # Errors
///
/// Returns 403 Forbidden if the caller is not an admin, or 401 if no
/// identity was derived (route misconfiguration).
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AuthError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::MissingCredentials)?;

    if !user.is_admin {
        return Err(AuthError::AdminRequired);
    }

    Ok(next.run(req).await)
}

/// Creates a bearer authentication middleware closure
///
/// Helper that captures the token secret and returns a function usable with
/// `axum::middleware::from_fn`.
pub fn create_bearer_middleware(
    secret: impl Into<String>,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>
       + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(bearer_auth_middleware(secret, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_current_user_from_claims() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "jdoe", "John", "Doe", true, Duration::minutes(15));

        let user = CurrentUser::from(claims);
        assert_eq!(user.id, id);
        assert_eq!(user.username, "jdoe");
        assert_eq!(user.first_name, "John");
        assert_eq!(user.last_name, "Doe");
        assert!(user.is_admin);
    }

    #[test]
    fn test_unauthorized_responses_carry_challenge() {
        for err in [AuthError::MissingCredentials, AuthError::InvalidToken] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.headers().get(header::WWW_AUTHENTICATE),
                Some(&HeaderValue::from_static("Bearer"))
            );
        }
    }

    #[test]
    fn test_forbidden_response_has_no_challenge() {
        let response = AuthError::AdminRequired.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
