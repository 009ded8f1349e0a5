/// Token issuance endpoint
///
/// Exchanges a username/password pair for a short-lived bearer token. The
/// credentials arrive form-encoded, and every failure (unknown username,
/// wrong password, deactivated account) yields the same 401 so callers
/// cannot probe which check rejected them.
///
/// # Endpoints
///
/// - `POST /auth/token` - Authenticate and get a bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};
use taskhive_shared::auth::{
    jwt::{issue_token, Claims},
    password::verify_password,
};
use taskhive_shared::models::user::User;

/// Login form (form-encoded, not JSON)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username
    pub username: String,

    /// Plaintext password, verified against the stored hash
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed bearer token
    pub access_token: String,

    /// Token scheme, always "bearer"
    pub token_type: String,
}

/// Token issuance handler
///
/// # Endpoint
///
/// ```text
/// POST /auth/token
/// Content-Type: application/x-www-form-urlencoded
///
/// username=jdoe&password=secret
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "token_type": "bearer"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials (single message for all causes)
/// - `500 Internal Server Error`: Server error
pub async fn issue(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = User::find_by_username(&state.db, &form.username)
        .await?
        .ok_or_else(invalid)?;

    let valid = verify_password(&form.password, &user.password_hash)?;
    if !valid || !user.is_active {
        return Err(invalid());
    }

    let claims = Claims::new(
        user.id,
        &user.username,
        &user.first_name,
        &user.last_name,
        user.is_admin,
        state.token_ttl(),
    );
    let access_token = issue_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
