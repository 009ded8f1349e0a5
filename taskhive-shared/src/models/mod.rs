/// Database models for taskhive
///
/// Each model owns its SQL: associated functions over an explicit `&PgPool`
/// (no global engine, no inherited CRUD base). Reads that a response needs
/// joined display fields for (a task's owner, a user's company) perform the
/// join explicitly in the query rather than relying on lazy loading.
///
/// # Models
///
/// - `company`: tenant boundary owning users
/// - `user`: accounts with role flags and credential hashes
/// - `task`: work items owned by exactly one user
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::models::company::{Company, CreateCompany};
/// use taskhive_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let company = Company::create(
///     &pool,
///     CreateCompany {
///         name: "Acme".to_string(),
///         description: None,
///         active: true,
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod company;
pub mod task;
pub mod user;
