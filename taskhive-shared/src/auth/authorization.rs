/// Ownership and visibility rules
///
/// The policy deciding, per caller role, which task rows are visible and
/// mutable. These rules are applied as query predicates (an extra `user_id`
/// condition bound into the SQL), never as a post-fetch filter: that keeps
/// pagination counts correct and avoids leaking row existence through
/// responses or timing.
///
/// - Admin callers are unrestricted.
/// - Non-admin callers only ever see and mutate their own tasks. Fetching
///   another user's task by id reads as "not found", not "forbidden";
///   existence is not revealed to callers who cannot see the row.
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::authorization::{list_scope, visible_owner};
/// use taskhive_shared::auth::middleware::CurrentUser;
/// use uuid::Uuid;
///
/// let caller = CurrentUser {
///     id: Uuid::new_v4(),
///     username: "jdoe".to_string(),
///     first_name: "John".to_string(),
///     last_name: "Doe".to_string(),
///     is_admin: false,
/// };
///
/// // A non-admin asking for someone else's tasks still gets their own scope.
/// assert_eq!(list_scope(&caller, Some(Uuid::new_v4())), Some(caller.id));
/// assert_eq!(visible_owner(&caller), Some(caller.id));
/// ```

use uuid::Uuid;

use super::middleware::CurrentUser;

/// Derives the owner predicate for a task list query
///
/// Admins may scope the list to any requested owner, or leave it
/// unrestricted. Non-admins are always pinned to their own tasks; any
/// requested owner filter is overridden, not rejected, so the same endpoint
/// serves both roles.
///
/// Returns `Some(user_id)` to add an `user_id = $n` predicate, `None` for
/// an unrestricted query.
pub fn list_scope(caller: &CurrentUser, requested_owner: Option<Uuid>) -> Option<Uuid> {
    if caller.is_admin {
        requested_owner
    } else {
        Some(caller.id)
    }
}

/// Derives the owner predicate for single-row reads and mutations
///
/// `None` means the caller may address any row by id; `Some(user_id)` means
/// the row must also belong to that owner, and a mismatch reads as absent.
pub fn visible_owner(caller: &CurrentUser) -> Option<Uuid> {
    if caller.is_admin {
        None
    } else {
        Some(caller.id)
    }
}

/// Checks whether the caller may create a task owned by `owner`
///
/// Admins may create tasks for anyone; other callers only for themselves.
/// Unlike reads, a refused create is a Forbidden outcome; there is no row
/// whose existence could leak.
pub fn can_create_for(caller: &CurrentUser, owner: Uuid) -> bool {
    caller.is_admin || caller.id == owner
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            is_admin,
        }
    }

    #[test]
    fn test_admin_list_scope_passes_filter_through() {
        let admin = caller(true);
        let other = Uuid::new_v4();

        assert_eq!(list_scope(&admin, None), None);
        assert_eq!(list_scope(&admin, Some(other)), Some(other));
    }

    #[test]
    fn test_non_admin_list_scope_is_always_self() {
        let user = caller(false);
        let other = Uuid::new_v4();

        // The requested filter is overridden for any filter combination.
        assert_eq!(list_scope(&user, None), Some(user.id));
        assert_eq!(list_scope(&user, Some(other)), Some(user.id));
        assert_eq!(list_scope(&user, Some(user.id)), Some(user.id));
    }

    #[test]
    fn test_visible_owner() {
        let admin = caller(true);
        let user = caller(false);

        assert_eq!(visible_owner(&admin), None);
        assert_eq!(visible_owner(&user), Some(user.id));
    }

    #[test]
    fn test_can_create_for() {
        let admin = caller(true);
        let user = caller(false);
        let other = Uuid::new_v4();

        assert!(can_create_for(&admin, other));
        assert!(can_create_for(&user, user.id));
        assert!(!can_create_for(&user, other));
    }
}
