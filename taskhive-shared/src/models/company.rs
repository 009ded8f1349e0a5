/// Company model and database operations
///
/// Companies are the tenant boundary: users optionally belong to one, and
/// task queries can be scoped to a company through its users. Deleting a
/// company that still has users is rejected by the `ON DELETE RESTRICT`
/// foreign key, which the API surfaces as a conflict.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE companies (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Company model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    /// Unique company ID (UUID v4)
    pub id: Uuid,

    /// Company name
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Whether the company is active
    pub active: bool,

    /// When the company was created
    pub created_at: DateTime<Utc>,

    /// When the company was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    /// Company name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Active flag
    pub active: bool,
}

/// Input for updating an existing company
///
/// All fields are optional; only supplied fields change. Unset fields are
/// left untouched, never nulled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompany {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New active flag
    pub active: Option<bool>,
}

impl Company {
    /// Creates a new company
    pub async fn create(pool: &PgPool, data: CreateCompany) -> Result<Self, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, description, active)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, active, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.active)
        .fetch_one(pool)
        .await?;

        Ok(company)
    }

    /// Finds a company by ID
    ///
    /// Absence is a normal outcome (`Ok(None)`), not an error.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, description, active, created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(company)
    }

    /// Lists companies with pagination, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, description, active, created_at, updated_at
            FROM companies
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(companies)
    }

    /// Counts all companies
    ///
    /// Computed independently of any page limit, so list totals stay correct.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Updates a company, changing only the supplied fields
    ///
    /// Runs as a single read-modify-write transaction (row locked with
    /// `FOR UPDATE`) so a racing delete resolves deterministically. Returns
    /// the refreshed company, or `None` if the id does not resolve.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCompany,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM companies WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Ok(None);
        }

        // Build the SET clause from the fields that are present.
        let mut query = String::from("UPDATE companies SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, description, active, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Company>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(active) = data.active {
            q = q.bind(active);
        }

        let company = q.fetch_one(&mut *tx).await?;
        tx.commit().await?;

        Ok(Some(company))
    }

    /// Deletes a company by ID
    ///
    /// Returns `false` if the company does not exist. A company with
    /// dependent users fails the foreign key constraint instead of cascading.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM companies WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_company_default_is_noop_payload() {
        let update = UpdateCompany::default();
        assert!(update.name.is_none());
        assert!(update.description.is_none());
        assert!(update.active.is_none());
    }

    // Database operations are exercised against a live Postgres in
    // deployment; unit coverage here is limited to payload semantics.
}
