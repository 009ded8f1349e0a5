/// User model and database operations
///
/// Users carry the credential hash and the role flags the authorization
/// gate relies on. Username is the login identity and is unique; email is
/// optional but unique when present. Both are enforced by unique indexes,
/// not pre-checked, so violations surface as constraint errors.
///
/// Reads that feed responses join the owning company's name explicitly
/// ([`UserWithCompany`]); there is no lazy relationship loading.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     company_id UUID REFERENCES companies(id) ON DELETE RESTRICT,
///     email VARCHAR(255) UNIQUE,
///     username VARCHAR(255) NOT NULL UNIQUE,
///     first_name VARCHAR(255) NOT NULL,
///     last_name VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::models::user::{CreateUser, User};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         company_id: None,
///         email: Some("jdoe@example.com".to_string()),
///         username: "jdoe".to_string(),
///         first_name: "John".to_string(),
///         last_name: "Doe".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         is_active: true,
///         is_admin: false,
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model
///
/// `password_hash` is an Argon2id PHC string; the plaintext password never
/// reaches this struct.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Owning company, if any (a user may be company-less)
    pub company_id: Option<Uuid>,

    /// Email address (unique when present)
    pub email: Option<String>,

    /// Username (unique, required; the login identity)
    pub username: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Whether the account is active
    pub is_active: bool,

    /// Whether the user holds the admin role
    pub is_admin: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// User row with the owning company's name resolved
///
/// Produced by a LEFT JOIN against `companies`; `company_name` is `None`
/// for company-less users.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserWithCompany {
    /// Unique user ID
    pub id: Uuid,

    /// Owning company, if any
    pub company_id: Option<Uuid>,

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

    /// Whether the account is active
    pub is_active: bool,

    /// Whether the user holds the admin role
    pub is_admin: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// Callers hash the password before building this; the model never sees
/// plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Owning company (must resolve if supplied)
    pub company_id: Option<Uuid>,

    /// Email address
    pub email: Option<String>,

    /// Username (unique)
    pub username: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Active flag
    pub is_active: bool,

    /// Admin flag
    pub is_admin: bool,
}

/// Input for updating an existing user
///
/// All fields are optional; only supplied fields change. Unset fields are
/// left untouched, never nulled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New owning company
    pub company_id: Option<Uuid>,

    /// New email address
    pub email: Option<String>,

    /// New username
    pub username: Option<String>,

    /// New first name
    pub first_name: Option<String>,

    /// New last name
    pub last_name: Option<String>,

    /// New password hash (already hashed by the caller)
    pub password_hash: Option<String>,

    /// New active flag
    pub is_active: Option<bool>,

    /// New admin flag
    pub is_admin: Option<bool>,
}

const USER_COLUMNS: &str = "id, company_id, email, username, first_name, last_name, \
     password_hash, is_active, is_admin, created_at, updated_at";

const USER_WITH_COMPANY_COLUMNS: &str =
    "u.id, u.company_id, c.name AS company_name, u.email, u.username, u.first_name, \
     u.last_name, u.is_active, u.is_admin, u.created_at, u.updated_at";

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// A duplicate username or email violates a unique index and surfaces as
    /// a database error for the boundary to map to a conflict.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (company_id, email, username, first_name, last_name,
                               password_hash, is_active, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.company_id)
        .bind(data.email)
        .bind(data.username)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.password_hash)
        .bind(data.is_active)
        .bind(data.is_admin)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID with the company name resolved
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<UserWithCompany>, sqlx::Error> {
        Self::fetch_with_company(pool, id).await
    }

    /// The company-joined read, usable on the pool or inside a transaction
    async fn fetch_with_company<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<UserWithCompany>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let user = sqlx::query_as::<_, UserWithCompany>(&format!(
            r#"
            SELECT {USER_WITH_COMPANY_COLUMNS}
            FROM users u
            LEFT JOIN companies c ON c.id = u.company_id
            WHERE u.id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by username, including the credential hash
    ///
    /// Used by authentication; the bare row is returned so the password
    /// hash is available for verification.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1",
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists users with pagination, newest first, company names resolved
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserWithCompany>, sqlx::Error> {
        let users = sqlx::query_as::<_, UserWithCompany>(&format!(
            r#"
            SELECT {USER_WITH_COMPANY_COLUMNS}
            FROM users u
            LEFT JOIN companies c ON c.id = u.company_id
            ORDER BY u.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts all users, independently of any page limit
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Updates a user, changing only the supplied fields
    ///
    /// Runs as a single read-modify-write transaction with the row locked
    /// (`FOR UPDATE`); the refreshed user is re-read inside the same
    /// transaction, so a commit that succeeds always returns the row, with
    /// the company name resolved. Returns `None` only if the id does not
    /// resolve.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<UserWithCompany>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.company_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", company_id = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${}", bind_count));
        }
        if data.first_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", first_name = ${}", bind_count));
        }
        if data.last_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", last_name = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }
        if data.is_admin.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_admin = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1");

        let mut q = sqlx::query(&query).bind(id);

        if let Some(company_id) = data.company_id {
            q = q.bind(company_id);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(first_name) = data.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = data.last_name {
            q = q.bind(last_name);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }
        if let Some(is_admin) = data.is_admin {
            q = q.bind(is_admin);
        }

        q.execute(&mut *tx).await?;

        // Still holding the row lock, so this read cannot miss the update.
        let user = Self::fetch_with_company(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// Returns `false` if the user does not exist. A user with dependent
    /// tasks fails the foreign key constraint instead of cascading.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
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
    fn test_update_user_default_is_noop_payload() {
        let update = UpdateUser::default();
        assert!(update.company_id.is_none());
        assert!(update.email.is_none());
        assert!(update.username.is_none());
        assert!(update.first_name.is_none());
        assert!(update.last_name.is_none());
        assert!(update.password_hash.is_none());
        assert!(update.is_active.is_none());
        assert!(update.is_admin.is_none());
    }

    #[test]
    fn test_create_user_carries_hash_not_password() {
        let create = CreateUser {
            company_id: None,
            email: None,
            username: "jdoe".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            is_active: true,
            is_admin: false,
        };

        assert!(create.password_hash.starts_with("$argon2id$"));
    }
}
