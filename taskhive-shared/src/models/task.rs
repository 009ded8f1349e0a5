/// Task model and database operations
///
/// Tasks are the rows the ownership rules guard. Every query here takes the
/// owner predicate as a bound parameter so visibility is enforced inside the
/// SQL: a non-admin caller's scope is part of the WHERE clause, never a
/// post-fetch filter. List totals come from a separate count query over the
/// same predicates, so pagination counts are exact.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'DONE');
/// CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     summary VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'TODO',
///     priority task_priority NOT NULL DEFAULT 'MEDIUM',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::models::task::{Task, TaskFilter, TaskStatus};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let filter = TaskFilter {
///     status: Some(TaskStatus::Todo),
///     ..Default::default()
/// };
///
/// let total = Task::count(&pool, &filter).await?;
/// let page = Task::list(&pool, &filter, 10, 0).await?;
/// assert!(page.len() as i64 <= total);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task workflow status
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Todo,

    /// In progress
    InProgress,

    /// Completed
    Done,
}

/// Task priority
///
/// The default is MEDIUM, matching the schema default.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    /// Low priority
    Low,

    /// Medium priority
    #[default]
    Medium,

    /// High priority
    High,
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user (required)
    pub user_id: Uuid,

    /// Short summary
    pub summary: String,

    /// Optional long description
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Task row with the owner's display fields resolved
///
/// Produced by an inner join against `users`; responses always carry the
/// owner's name, so the join is explicit rather than lazy.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskWithOwner {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Owner's first name
    pub first_name: String,

    /// Owner's last name
    pub last_name: String,

    /// Short summary
    pub summary: String,

    /// Optional long description
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning user (must resolve)
    pub user_id: Uuid,

    /// Short summary
    pub summary: String,

    /// Optional long description
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,
}

/// Input for updating an existing task
///
/// All fields are optional; only supplied fields change. Ownership is not
/// transferable through update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New summary
    pub summary: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,
}

/// Equality filters for task list queries
///
/// `user_id` carries the ownership scope: handlers derive it from the
/// caller's role before the query runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    /// Restrict to this owner
    pub user_id: Option<Uuid>,

    /// Restrict to this status
    pub status: Option<TaskStatus>,

    /// Restrict to this priority
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    /// Appends `WHERE` predicates for the present filters, numbering binds
    /// from `$1`. Returns the number of binds consumed.
    fn push_predicates(&self, query: &mut String) -> usize {
        let mut clauses = Vec::new();
        let mut bind_count = 0;

        if self.user_id.is_some() {
            bind_count += 1;
            clauses.push(format!("t.user_id = ${}", bind_count));
        }
        if self.status.is_some() {
            bind_count += 1;
            clauses.push(format!("t.status = ${}", bind_count));
        }
        if self.priority.is_some() {
            bind_count += 1;
            clauses.push(format!("t.priority = ${}", bind_count));
        }

        if !clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&clauses.join(" AND "));
        }

        bind_count
    }

    fn bind_to<'q, O>(
        &self,
        mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
        if let Some(user_id) = self.user_id {
            q = q.bind(user_id);
        }
        if let Some(status) = self.status {
            q = q.bind(status);
        }
        if let Some(priority) = self.priority {
            q = q.bind(priority);
        }
        q
    }
}

const TASK_WITH_OWNER_COLUMNS: &str =
    "t.id, t.user_id, u.first_name, u.last_name, t.summary, t.description, \
     t.status, t.priority, t.created_at, t.updated_at";

impl Task {
    /// Creates a new task
    ///
    /// The owning user must already be validated by the caller; a dangling
    /// `user_id` fails the foreign key constraint.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, summary, description, status, priority)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, summary, description, status, priority,
                      created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.summary)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, optionally restricted to an owner
    ///
    /// With `visible_to = Some(user_id)` a task owned by someone else reads
    /// as absent; the ownership check is part of the query, so callers
    /// cannot distinguish "not yours" from "does not exist".
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        visible_to: Option<Uuid>,
    ) -> Result<Option<TaskWithOwner>, sqlx::Error> {
        Self::fetch_with_owner(pool, id, visible_to).await
    }

    /// The owner-joined read, usable on the pool or inside a transaction
    async fn fetch_with_owner<'e, E>(
        executor: E,
        id: Uuid,
        visible_to: Option<Uuid>,
    ) -> Result<Option<TaskWithOwner>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let mut query = format!(
            r#"
            SELECT {TASK_WITH_OWNER_COLUMNS}
            FROM tasks t
            JOIN users u ON u.id = t.user_id
            WHERE t.id = $1
            "#,
        );
        if visible_to.is_some() {
            query.push_str(" AND t.user_id = $2");
        }

        let mut q = sqlx::query_as::<_, TaskWithOwner>(&query).bind(id);
        if let Some(owner) = visible_to {
            q = q.bind(owner);
        }

        q.fetch_optional(executor).await
    }

    /// Lists tasks matching the filter, newest first, owner names resolved
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TaskWithOwner>, sqlx::Error> {
        let mut query = format!(
            "SELECT {TASK_WITH_OWNER_COLUMNS} FROM tasks t JOIN users u ON u.id = t.user_id",
        );
        let bind_count = filter.push_predicates(&mut query);
        query.push_str(&format!(
            " ORDER BY t.created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let q = filter.bind_to(sqlx::query_as::<_, TaskWithOwner>(&query));
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Counts tasks matching the filter
    ///
    /// Runs the same predicates as [`Task::list`] without the page limit, so
    /// the total is independent of `skip`/`limit`.
    pub async fn count(pool: &PgPool, filter: &TaskFilter) -> Result<i64, sqlx::Error> {
        let mut query = String::from("SELECT COUNT(t.id) FROM tasks t");
        filter.push_predicates(&mut query);

        let q = filter.bind_to(sqlx::query_as::<_, (i64,)>(&query));
        let (count,) = q.fetch_one(pool).await?;

        Ok(count)
    }

    /// Lists tasks owned by a user, optionally restricted to a status
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<TaskWithOwner>, sqlx::Error> {
        let mut query = format!(
            r#"
            SELECT {TASK_WITH_OWNER_COLUMNS}
            FROM tasks t
            JOIN users u ON u.id = t.user_id
            WHERE t.user_id = $1
            "#,
        );
        if status.is_some() {
            query.push_str(" AND t.status = $2");
        }
        query.push_str(" ORDER BY t.created_at DESC");

        let mut q = sqlx::query_as::<_, TaskWithOwner>(&query).bind(user_id);
        if let Some(status) = status {
            q = q.bind(status);
        }

        q.fetch_all(pool).await
    }

    /// Lists tasks whose owners belong to a company, restricted to a status
    ///
    /// The company scope goes through the owner join; tasks have no direct
    /// company column.
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
        status: TaskStatus,
    ) -> Result<Vec<TaskWithOwner>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskWithOwner>(&format!(
            r#"
            SELECT {TASK_WITH_OWNER_COLUMNS}
            FROM tasks t
            JOIN users u ON u.id = t.user_id
            WHERE u.company_id = $1 AND t.status = $2
            ORDER BY t.created_at DESC
            "#,
        ))
        .bind(company_id)
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task, changing only the supplied fields
    ///
    /// Runs as a single read-modify-write transaction with the row locked
    /// (`FOR UPDATE`), so a racing delete resolves deterministically. With
    /// `visible_to = Some(user_id)` the lock query carries the ownership
    /// predicate, so another user's task reads as absent. The refreshed
    /// task is re-read inside the same transaction, so a commit that
    /// succeeds always returns the row. Returns `None` only if the row is
    /// not visible to the caller.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
        visible_to: Option<Uuid>,
    ) -> Result<Option<TaskWithOwner>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing = Self::lock_visible(&mut tx, id, visible_to).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.summary.is_some() {
            bind_count += 1;
            query.push_str(&format!(", summary = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1");

        let mut q = sqlx::query(&query).bind(id);

        if let Some(summary) = data.summary {
            q = q.bind(summary);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }

        q.execute(&mut *tx).await?;

        // Still holding the row lock, so this read cannot miss the update.
        let task = Self::fetch_with_owner(&mut *tx, id, visible_to).await?;
        tx.commit().await?;

        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// Returns `false` if the task does not exist or is not visible to the
    /// caller (same outcome for both, by the visibility rules).
    pub async fn delete(
        pool: &PgPool,
        id: Uuid,
        visible_to: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing = Self::lock_visible(&mut tx, id, visible_to).await?;
        if existing.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Locks the row for the transaction if it exists and is visible
    async fn lock_visible(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        visible_to: Option<Uuid>,
    ) -> Result<Option<(Uuid,)>, sqlx::Error> {
        let mut query = String::from("SELECT id FROM tasks WHERE id = $1");
        if visible_to.is_some() {
            query.push_str(" AND user_id = $2");
        }
        query.push_str(" FOR UPDATE");

        let mut q = sqlx::query_as::<_, (Uuid,)>(&query).bind(id);
        if let Some(owner) = visible_to {
            q = q.bind(owner);
        }

        q.fetch_optional(&mut **tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_default_is_medium() {
        // The business default follows the schema default.
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_status_default_is_todo() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "\"DONE\"");
        assert_eq!(
            serde_json::to_string(&TaskPriority::Medium).unwrap(),
            "\"MEDIUM\""
        );

        let status: TaskStatus = serde_json::from_str("\"TODO\"").unwrap();
        assert_eq!(status, TaskStatus::Todo);
    }

    #[test]
    fn test_filter_predicates_numbering() {
        let filter = TaskFilter {
            user_id: Some(Uuid::new_v4()),
            status: Some(TaskStatus::Done),
            priority: None,
        };

        let mut query = String::from("SELECT COUNT(t.id) FROM tasks t");
        let binds = filter.push_predicates(&mut query);

        assert_eq!(binds, 2);
        assert!(query.ends_with("WHERE t.user_id = $1 AND t.status = $2"));
    }

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let filter = TaskFilter::default();

        let mut query = String::from("SELECT COUNT(t.id) FROM tasks t");
        let binds = filter.push_predicates(&mut query);

        assert_eq!(binds, 0);
        assert_eq!(query, "SELECT COUNT(t.id) FROM tasks t");
    }

    #[test]
    fn test_update_task_default_is_noop_payload() {
        let update = UpdateTask::default();
        assert!(update.summary.is_none());
        assert!(update.description.is_none());
        assert!(update.status.is_none());
        assert!(update.priority.is_none());
    }
}
