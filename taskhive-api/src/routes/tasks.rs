/// Task management endpoints (authenticated tier)
///
/// Every handler here runs behind the bearer middleware and derives its row
/// scope from the caller's role before touching the database: admins address
/// any row, non-admins only their own. The scope travels into the model
/// layer as a query predicate, so a foreign task reads as 404 rather than
/// 403: existence is not revealed to callers who cannot see the row.
///
/// # Endpoints
///
/// - `GET    /tasks/`                       - List tasks (paginated, scoped)
/// - `POST   /tasks/`                       - Create task (own, or any as admin)
/// - `GET    /tasks/:id`                    - Get task (scoped)
/// - `PUT    /tasks/:id`                    - Update task (scoped)
/// - `DELETE /tasks/:id`                    - Delete task (scoped)
/// - `GET    /tasks/user/:id`               - All tasks of a user (admin)
/// - `GET    /tasks/user/:id/completed`     - Completed tasks of a user (admin)
/// - `GET    /tasks/company/:id/completed`  - Completed tasks of a company (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{PageQuery, Paginated},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhive_shared::auth::{
    authorization::{can_create_for, list_scope, visible_owner},
    middleware::CurrentUser,
};
use taskhive_shared::models::{
    company::Company,
    task::{CreateTask, Task, TaskFilter, TaskPriority, TaskStatus, TaskWithOwner, UpdateTask},
    user::User,
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Owning user
    pub user_id: Uuid,

    /// Short summary
    #[validate(length(min = 1, max = 255, message = "Summary must be 1 to 255 characters"))]
    pub summary: String,

    /// Optional long description
    pub description: Option<String>,

    /// Workflow status (defaults to TODO)
    #[serde(default)]
    pub status: TaskStatus,

    /// Priority (defaults to MEDIUM)
    #[serde(default)]
    pub priority: TaskPriority,
}

/// Update task request
///
/// Ownership is not transferable: there is no `user_id` field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New summary
    #[validate(length(min = 1, max = 255, message = "Summary must be 1 to 255 characters"))]
    pub summary: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,
}

fn default_limit() -> i64 {
    10
}

/// List query: pagination plus optional equality filters
///
/// Pagination fields are inlined rather than flattened: flattening loses
/// the integer type hints under the urlencoded `Query` extractor.
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    /// Number of rows to skip
    #[serde(default)]
    pub skip: i64,

    /// Page size
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Restrict to this owner (admins only; ignored for other callers)
    pub user_id: Option<Uuid>,

    /// Restrict to this status
    pub status: Option<TaskStatus>,

    /// Restrict to this priority
    pub priority: Option<TaskPriority>,
}

impl TaskListQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

/// Owner display fields embedded in a task response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    /// Owning user's ID
    pub user_id: Uuid,

    /// Owner's first name
    pub first_name: String,

    /// Owner's last name
    pub last_name: String,
}

/// Task response
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Task ID
    pub task_id: Uuid,

    /// Owner display fields
    pub user_info: UserInfo,

    /// Short summary
    pub summary: String,

    /// Description
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<TaskWithOwner> for TaskResponse {
    fn from(task: TaskWithOwner) -> Self {
        Self {
            task_id: task.id,
            user_info: UserInfo {
                user_id: task.user_id,
                first_name: task.first_name,
                last_name: task.last_name,
            },
            summary: task.summary,
            description: task.description,
            status: task.status,
            priority: task.priority,
            created_at: task.created_at,
        }
    }
}

/// List tasks, newest first
///
/// Non-admin callers always get their own tasks; a `user_id` filter they
/// supply is overridden, not rejected. The total counts rows under the same
/// scope and filters as the page.
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Paginated<TaskResponse>>> {
    let page = query.page();
    page.validate()?;

    let filter = TaskFilter {
        user_id: list_scope(&caller, query.user_id),
        status: query.status,
        priority: query.priority,
    };

    let total = Task::count(&state.db, &filter).await?;
    let tasks = Task::list(&state.db, &filter, page.limit, page.skip).await?;

    let items = tasks.into_iter().map(TaskResponse::from).collect();
    Ok(Json(Paginated::new(total, page, items)))
}

/// Create a task
///
/// Admins may create tasks for any user; other callers only for themselves.
///
/// # Errors
///
/// - `403 Forbidden`: Creating a task owned by someone else without the
///   admin role
/// - `409 Conflict`: The referenced owning user does not resolve
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;

    if !can_create_for(&caller, req.user_id) {
        return Err(ApiError::Forbidden(
            "Cannot create tasks for another user".to_string(),
        ));
    }

    let owner = User::find_by_id(&state.db, req.user_id)
        .await?
        .ok_or_else(|| ApiError::Conflict("Referenced user not found".to_string()))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: req.user_id,
            summary: req.summary,
            description: req.description,
            status: req.status,
            priority: req.priority,
        },
    )
    .await?;

    let response = TaskResponse {
        task_id: task.id,
        user_info: UserInfo {
            user_id: owner.id,
            first_name: owner.first_name,
            last_name: owner.last_name,
        },
        summary: task.summary,
        description: task.description,
        status: task.status,
        priority: task.priority,
        created_at: task.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a task by ID
///
/// A task owned by someone else reads as 404 for non-admin callers.
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_by_id(&state.db, id, visible_owner(&caller))
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::from(task)))
}

/// Update a task; unset fields are left untouched
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            summary: req.summary,
            description: req.description,
            status: req.status,
            priority: req.priority,
        },
        visible_owner(&caller),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::from(task)))
}

/// Delete a task
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete(&state.db, id, visible_owner(&caller)).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// All tasks of a user (admin tier)
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    ensure_user_exists(&state, user_id).await?;

    let tasks = Task::list_by_user(&state.db, user_id, None).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Completed tasks of a user (admin tier)
pub async fn list_completed_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    ensure_user_exists(&state, user_id).await?;

    let tasks = Task::list_by_user(&state.db, user_id, Some(TaskStatus::Done)).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Completed tasks across a company's users (admin tier)
pub async fn list_completed_by_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    Company::find_by_id(&state.db, company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    let tasks = Task::list_by_company(&state.db, company_id, TaskStatus::Done).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> ApiResult<()> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let task = TaskWithOwner {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            summary: "Write report".to_string(),
            description: None,
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let owner_id = task.user_id;

        let json = serde_json::to_value(TaskResponse::from(task)).unwrap();
        assert_eq!(json["user_info"]["user_id"], owner_id.to_string());
        assert_eq!(json["user_info"]["first_name"], "John");
        assert_eq!(json["status"], "IN_PROGRESS");
        assert_eq!(json["priority"], "HIGH");
        assert!(json.get("updated_at").is_none());
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateTaskRequest = serde_json::from_str(&format!(
            r#"{{"user_id": "{}", "summary": "Write report"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();

        assert_eq!(req.status, TaskStatus::Todo);
        assert_eq!(req.priority, TaskPriority::Medium);
    }

    #[test]
    fn test_update_request_ignores_owner_field() {
        // Ownership transfer through update has no field to land on.
        let req: UpdateTaskRequest = serde_json::from_str(&format!(
            r#"{{"summary": "x", "user_id": "{}"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();

        assert_eq!(req.summary.as_deref(), Some("x"));
    }

    #[test]
    fn test_list_query_parses_from_query_string() {
        let query: TaskListQuery =
            serde_urlencoded::from_str("skip=20&limit=5&status=DONE&priority=LOW").unwrap();

        assert_eq!(query.skip, 20);
        assert_eq!(query.limit, 5);
        assert_eq!(query.status, Some(TaskStatus::Done));
        assert_eq!(query.priority, Some(TaskPriority::Low));

        let defaults: TaskListQuery = serde_urlencoded::from_str("").unwrap();
        assert_eq!(defaults.skip, 0);
        assert_eq!(defaults.limit, 10);
        assert!(defaults.user_id.is_none());
    }
}
