//! Who may do what to which record.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No identity was presented
    Unauthenticated,
    /// An identity was presented but lacks the privilege
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => {
                Err(ApiError::unauthorized("Authentication required"))
            }
            Decision::Deny(DenyReason::Forbidden) => Err(ApiError::forbidden(
                "You do not have permission to perform this action",
            )),
        }
    }
}

/// Core rule. Admins may act on anything. Everyone else only on their own
/// record, and never where an admin role is required.
pub fn authorize(
    caller_role: Role,
    caller_id: Uuid,
    target_id: Option<Uuid>,
    required_role: Option<Role>,
) -> Decision {
    if caller_role.is_admin() {
        return Decision::Allow;
    }
    if required_role.is_some_and(|r| r.is_admin()) {
        return Decision::Deny(DenyReason::Forbidden);
    }
    match target_id {
        Some(target) if target != caller_id => Decision::Deny(DenyReason::Forbidden),
        _ => Decision::Allow,
    }
}

/// Access rule attached to one operation on one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
    OwnerOrAdmin,
}

pub fn authorize_caller(caller: Option<&AuthUser>, access: Access, target_id: Option<Uuid>) -> Decision {
    if access == Access::Public {
        return Decision::Allow;
    }
    let Some(caller) = caller else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    match access {
        Access::Public | Access::Authenticated => Decision::Allow,
        Access::Admin => authorize(caller.role, caller.id, None, Some(Role::Admin)),
        Access::OwnerOrAdmin => authorize(caller.role, caller.id, target_id, None),
    }
}

/// Drop privileged fields a non-admin caller is not allowed to set
pub fn restrict_payload(caller: Option<&AuthUser>, payload: &mut Map<String, Value>) {
    let is_admin = caller.is_some_and(|c| c.role.is_admin());
    if !is_admin && payload.remove("role").is_some() {
        tracing::debug!("Stripped role field from non-admin payload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn caller(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn admin_is_allowed_everywhere() {
        let admin = caller(Role::Admin);
        for access in [Access::Public, Access::Authenticated, Access::Admin, Access::OwnerOrAdmin] {
            assert!(authorize_caller(Some(&admin), access, Some(Uuid::new_v4())).is_allowed());
        }
    }

    #[test]
    fn owner_rules() {
        let user = caller(Role::User);
        assert!(authorize_caller(Some(&user), Access::OwnerOrAdmin, Some(user.id)).is_allowed());
        assert_eq!(
            authorize_caller(Some(&user), Access::OwnerOrAdmin, Some(Uuid::new_v4())),
            Decision::Deny(DenyReason::Forbidden)
        );
        assert_eq!(
            authorize_caller(Some(&user), Access::Admin, None),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn anonymous_callers() {
        assert!(authorize_caller(None, Access::Public, None).is_allowed());
        assert_eq!(
            authorize_caller(None, Access::Authenticated, None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            authorize_caller(None, Access::OwnerOrAdmin, Some(Uuid::new_v4())),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn deny_reasons_map_to_status() {
        let unauth = Decision::Deny(DenyReason::Unauthenticated).into_result().unwrap_err();
        let forbidden = Decision::Deny(DenyReason::Forbidden).into_result().unwrap_err();
        assert_eq!(unauth.status_code(), 401);
        assert_eq!(forbidden.status_code(), 403);
    }

    #[test]
    fn role_is_stripped_for_non_admins() {
        let user = caller(Role::User);
        let admin = caller(Role::Admin);

        let mut payload = json!({ "role": "admin", "firstName": "Eve" }).as_object().cloned().unwrap();
        restrict_payload(Some(&user), &mut payload);
        assert!(!payload.contains_key("role"));
        assert!(payload.contains_key("firstName"));

        let mut payload = json!({ "role": "admin" }).as_object().cloned().unwrap();
        restrict_payload(Some(&admin), &mut payload);
        assert_eq!(payload["role"], "admin");

        let mut payload = json!({ "role": "admin" }).as_object().cloned().unwrap();
        restrict_payload(None, &mut payload);
        assert!(payload.is_empty());
    }
}
