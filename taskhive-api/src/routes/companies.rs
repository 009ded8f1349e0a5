/// Company management endpoints (admin tier)
///
/// All routes here are nested behind the bearer and admin middleware; a
/// non-admin caller never reaches these handlers.
///
/// # Endpoints
///
/// - `GET    /companies/`    - List companies (paginated)
/// - `POST   /companies/`    - Create company
/// - `GET    /companies/:id` - Get company
/// - `PUT    /companies/:id` - Update company
/// - `DELETE /companies/:id` - Delete company

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
use taskhive_shared::models::company::{Company, CreateCompany, UpdateCompany};
use uuid::Uuid;
use validator::Validate;

fn default_true() -> bool {
    true
}

/// Create company request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    /// Company name
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Active flag (defaults to true)
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Update company request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New active flag
    pub active: Option<bool>,
}

/// Company response
///
/// The active flag is rendered as a display status string.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyResponse {
    /// Company ID
    pub id: Uuid,

    /// Company name
    pub name: String,

    /// Description
    pub description: Option<String>,

    /// "Active" or "Inactive"
    pub status: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            description: company.description,
            status: if company.active {
                "Active".to_string()
            } else {
                "Inactive".to_string()
            },
            created_at: company.created_at,
        }
    }
}

/// List companies, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<CompanyResponse>>> {
    query.validate()?;

    let total = Company::count(&state.db).await?;
    let companies = Company::list(&state.db, query.limit, query.skip).await?;

    let items = companies.into_iter().map(CompanyResponse::from).collect();
    Ok(Json(Paginated::new(total, query, items)))
}

/// Create a company
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCompanyRequest>,
) -> ApiResult<(StatusCode, Json<CompanyResponse>)> {
    req.validate()?;

    let company = Company::create(
        &state.db,
        CreateCompany {
            name: req.name,
            description: req.description,
            active: req.active,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(CompanyResponse::from(company))))
}

/// Get a company by ID
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CompanyResponse>> {
    let company = Company::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    Ok(Json(CompanyResponse::from(company)))
}

/// Update a company; unset fields are left untouched
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompanyRequest>,
) -> ApiResult<Json<CompanyResponse>> {
    req.validate()?;

    let company = Company::update(
        &state.db,
        id,
        UpdateCompany {
            name: req.name,
            description: req.description,
            active: req.active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    Ok(Json(CompanyResponse::from(company)))
}

/// Delete a company
///
/// # Errors
///
/// - `404 Not Found`: Unknown company ID
/// - `409 Conflict`: The company still has users (deletes never cascade)
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let deleted = Company::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Company not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_rendering() {
        let company = Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            description: None,
            active: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let response = CompanyResponse::from(company);
        assert_eq!(response.status, "Inactive");
    }

    #[test]
    fn test_create_request_validation() {
        let valid = CreateCompanyRequest {
            name: "Acme".to_string(),
            description: None,
            active: true,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateCompanyRequest {
            name: String::new(),
            description: None,
            active: true,
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_active_defaults_to_true() {
        let req: CreateCompanyRequest = serde_json::from_str(r#"{"name":"Acme"}"#).unwrap();
        assert!(req.active);
    }
}
