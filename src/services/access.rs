//! Request authorization
//!
//! Every service call resolves its caller first; mutations then check the
//! caller's role against the action before the store is touched.

use crate::audit::Action;
use crate::auth::Identity;
use crate::error::{LedgerError, LedgerResult};

/// Resolve the caller of a request
///
/// A missing identity, or one without a username, is unauthorized.
pub fn require_identity(caller: Option<&Identity>) -> LedgerResult<&Identity> {
    match caller {
        Some(identity) if identity.is_resolved() => Ok(identity),
        Some(_) => Err(LedgerError::Unauthorized("caller has no username".into())),
        None => Err(LedgerError::Unauthorized("no caller identity".into())),
    }
}

/// Whether the identity's role grants the action
pub fn is_permitted(identity: &Identity, action: Action) -> bool {
    match action {
        Action::Create | Action::Update => identity.role.can_write(),
        Action::Delete => identity.role.can_delete(),
    }
}

/// Fail with `Forbidden` unless the identity may perform the action
pub fn authorize(identity: &Identity, action: Action) -> LedgerResult<()> {
    if is_permitted(identity, action) {
        return Ok(());
    }

    tracing::warn!(
        user = %identity.username,
        role = %identity.role,
        action = %action,
        "authorization denied"
    );
    Err(LedgerError::Forbidden(format!(
        "role '{}' may not {} items",
        identity.role, action
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_require_identity() {
        let alice = Identity::new("alice", Role::Viewer);
        assert_eq!(require_identity(Some(&alice)).unwrap(), &alice);

        assert!(require_identity(None).unwrap_err().is_unauthorized());

        let blank = Identity::new(" ", Role::Admin);
        assert!(require_identity(Some(&blank)).unwrap_err().is_unauthorized());
    }

    #[test]
    fn test_permission_matrix() {
        let expected = [
            (Role::Viewer, [false, false, false]),
            (Role::Manager, [true, true, false]),
            (Role::Admin, [true, true, true]),
        ];
        let actions = [Action::Create, Action::Update, Action::Delete];

        for (role, allowed) in expected {
            let identity = Identity::new("user", role);
            for (action, allowed) in actions.iter().zip(allowed) {
                assert_eq!(
                    is_permitted(&identity, *action),
                    allowed,
                    "{} {}",
                    role,
                    action
                );
                assert_eq!(authorize(&identity, *action).is_ok(), allowed);
            }
        }
    }

    #[test]
    fn test_forbidden_message() {
        let err = authorize(&Identity::new("m", Role::Manager), Action::Delete).unwrap_err();
        assert!(err.is_forbidden());
        assert_eq!(err.to_string(), "Forbidden: role 'manager' may not delete items");
    }
}
