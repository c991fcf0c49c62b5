//! Identity / permission provider port.
//!
//! Implementations decide what a caller holds; matching of wildcard grants
//! (`resource:*`, `*:*`) is shared domain logic in
//! [`opsplane_domain::permission_satisfies`].

/// Answers permission questions for a caller id.
pub trait PermissionChecker: Send + Sync {
    /// Whether `caller` holds `code`. Admins and wildcard grants satisfy any code.
    fn has_permission(&self, caller: &str, code: &str) -> bool;

    /// Whether `caller` is an administrator.
    fn is_admin(&self, caller: &str) -> bool;
}

/// Grants everything to everyone. For tests and single-operator setups.
pub struct AllowAllPermissions;

impl PermissionChecker for AllowAllPermissions {
    fn has_permission(&self, _caller: &str, _code: &str) -> bool {
        true
    }

    fn is_admin(&self, _caller: &str) -> bool {
        false
    }
}
