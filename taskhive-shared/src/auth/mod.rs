/// Authentication and authorization for taskhive
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Bearer token issuance and validation (HS256)
/// - [`middleware`]: Axum middleware deriving the caller identity per request
/// - [`authorization`]: Ownership and visibility rules applied to queries
///
/// # Access tiers
///
/// Every request resolves to one of three tiers, derived purely from the
/// presented token with no session state:
///
/// - **Anonymous**: no token or an invalid one; only public routes reachable
/// - **Authenticated**: valid token; identity available to handlers
/// - **Admin**: authenticated and the `is_admin` claim is set
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::auth::password::{hash_password, verify_password};
/// use taskhive_shared::auth::jwt::{issue_token, validate_token, Claims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "jdoe", "John", "Doe", false, Duration::minutes(15));
/// let token = issue_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// let validated = validate_token(&token, "secret-key-at-least-32-bytes-long!!")?;
/// assert_eq!(validated.sub, "jdoe");
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
