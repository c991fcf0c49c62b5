//! Permission code matching.
//!
//! Permission codes are `resource:action` strings. A granted code satisfies
//! a required one when it is equal, when it is `resource:*` for the same
//! resource, or when it is `*:*`.

/// Grant that satisfies every permission.
pub const WILDCARD_ALL: &str = "*:*";

/// Whether `granted` satisfies `required`.
pub fn permission_satisfies(granted: &str, required: &str) -> bool {
    let granted = granted.trim();
    let required = required.trim();
    if granted == WILDCARD_ALL || granted == required {
        return true;
    }
    match (granted.split_once(':'), required.split_once(':')) {
        (Some((g_res, "*")), Some((r_res, _))) => g_res == r_res,
        _ => false,
    }
}

/// Whether any of `grants` satisfies `required`.
pub fn any_grant_satisfies<'a>(grants: impl IntoIterator<Item = &'a str>, required: &str) -> bool {
    grants.into_iter().any(|g| permission_satisfies(g, required))
}
