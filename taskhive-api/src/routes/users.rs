/// User management endpoints (admin tier)
///
/// All routes here are nested behind the bearer and admin middleware.
/// Passwords arrive as plaintext in the request body, are hashed here, and
/// only the hash crosses into the model layer. Responses never carry the
/// hash.
///
/// # Endpoints
///
/// - `GET    /users/`    - List users (paginated)
/// - `POST   /users/`    - Create user
/// - `GET    /users/:id` - Get user
/// - `PUT    /users/:id` - Update user
/// - `DELETE /users/:id` - Delete user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{PageQuery, Paginated},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhive_shared::auth::password::hash_password;
use taskhive_shared::models::{
    company::Company,
    user::{CreateUser, UpdateUser, User, UserWithCompany},
};
use uuid::Uuid;
use validator::Validate;

fn default_true() -> bool {
    true
}

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Owning company (optional, must resolve if supplied)
    pub company_id: Option<Uuid>,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Username (the login identity)
    #[validate(length(min = 1, max = 255, message = "Username must be 1 to 255 characters"))]
    pub username: String,

    /// First name
    #[validate(length(min = 1, max = 255, message = "First name must be 1 to 255 characters"))]
    pub first_name: String,

    /// Last name
    #[validate(length(min = 1, max = 255, message = "Last name must be 1 to 255 characters"))]
    pub last_name: String,

    /// Plaintext password (hashed before storage)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Active flag (defaults to true)
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Admin flag (defaults to false)
    #[serde(default)]
    pub is_admin: bool,
}

/// Update user request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New owning company
    pub company_id: Option<Uuid>,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New username
    #[validate(length(min = 1, max = 255, message = "Username must be 1 to 255 characters"))]
    pub username: Option<String>,

    /// New first name
    #[validate(length(min = 1, max = 255, message = "First name must be 1 to 255 characters"))]
    pub first_name: Option<String>,

    /// New last name
    #[validate(length(min = 1, max = 255, message = "Last name must be 1 to 255 characters"))]
    pub last_name: Option<String>,

    /// New plaintext password (hashed before storage)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    /// New active flag
    pub is_active: Option<bool>,

    /// New admin flag
    pub is_admin: Option<bool>,
}

/// User response
///
/// Carries the company name resolved by the model's join; never the
/// password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Owning company's name, if any
    pub company_name: Option<String>,

    /// Email address
    pub email: Option<String>,

    /// Username
    pub username: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Active flag
    pub is_active: bool,

    /// Admin flag
    pub is_admin: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<UserWithCompany> for UserResponse {
    fn from(user: UserWithCompany) -> Self {
        Self {
            id: user.id,
            company_name: user.company_name,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Checks that a supplied company id resolves
///
/// A dangling reference in a request body is a conflict, not a missing
/// resource; 404 is reserved for the addressed resource itself.
async fn ensure_company_exists(state: &AppState, company_id: Uuid) -> ApiResult<()> {
    Company::find_by_id(&state.db, company_id)
        .await?
        .ok_or_else(|| ApiError::Conflict("Referenced company not found".to_string()))?;

    Ok(())
}

/// List users, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<UserResponse>>> {
    query.validate()?;

    let total = User::count(&state.db).await?;
    let users = User::list(&state.db, query.limit, query.skip).await?;

    let items = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Paginated::new(total, query, items)))
}

/// Create a user
///
/// # Errors
///
/// - `409 Conflict`: Username or email already exists, or the supplied
///   company does not resolve
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    if let Some(company_id) = req.company_id {
        ensure_company_exists(&state, company_id).await?;
    }

    let password_hash = hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            company_id: req.company_id,
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
            is_active: req.is_active,
            is_admin: req.is_admin,
        },
    )
    .await?;

    // Re-read with the company join for the response shape.
    let user = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created user not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Get a user by ID
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Update a user; unset fields are left untouched
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    if let Some(company_id) = req.company_id {
        ensure_company_exists(&state, company_id).await?;
    }

    let password_hash = match req.password {
        Some(password) => Some(hash_password(&password)?),
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            company_id: req.company_id,
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
            is_active: req.is_active,
            is_admin: req.is_admin,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete a user
///
/// # Errors
///
/// - `404 Not Found`: Unknown user ID
/// - `409 Conflict`: The user still has tasks (deletes never cascade)
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_omits_password_hash() {
        let user = UserWithCompany {
            id: Uuid::new_v4(),
            company_id: None,
            company_name: None,
            email: Some("jdoe@example.com".to_string()),
            username: "jdoe".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            is_active: true,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "jdoe");
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{
                "username": "jdoe",
                "first_name": "John",
                "last_name": "Doe",
                "password": "short"
            }"#,
        )
        .unwrap();

        assert!(req.validate().is_err());
        assert!(req.is_active);
        assert!(!req.is_admin);
    }

    #[test]
    fn test_update_request_accepts_partial_payload() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"first_name": "Jane"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.first_name.as_deref(), Some("Jane"));
        assert!(req.password.is_none());
    }
}
