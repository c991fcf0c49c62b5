//! Static permission provider built from the `[access]` config section.

use crate::config::FileAccessConfig;
use opsplane_application::PermissionChecker;
use opsplane_domain::any_grant_satisfies;
use std::collections::{HashMap, HashSet};

/// Fixed caller → grants table. Admins satisfy every permission.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionProvider {
    grants: HashMap<String, Vec<String>>,
    admins: HashSet<String>,
}

impl StaticPermissionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &FileAccessConfig) -> Self {
        let mut provider = Self::new();
        for admin in &config.admins {
            provider = provider.with_admin(admin);
        }
        for (caller, codes) in &config.grants {
            provider = provider.with_grants(caller, codes.iter().map(String::as_str));
        }
        provider
    }

    pub fn with_admin(mut self, caller: &str) -> Self {
        self.admins.insert(caller.trim().to_string());
        self
    }

    pub fn with_grants<'a>(mut self, caller: &str, codes: impl IntoIterator<Item = &'a str>) -> Self {
        self.grants
            .entry(caller.trim().to_string())
            .or_default()
            .extend(codes.into_iter().map(|c| c.trim().to_string()));
        self
    }

    /// Grants held by `caller`, in configuration order.
    pub fn grants_of(&self, caller: &str) -> &[String] {
        self.grants.get(caller).map_or(&[], Vec::as_slice)
    }
}

impl PermissionChecker for StaticPermissionProvider {
    fn has_permission(&self, caller: &str, code: &str) -> bool {
        self.is_admin(caller)
            || any_grant_satisfies(self.grants_of(caller).iter().map(String::as_str), code)
    }

    fn is_admin(&self, caller: &str) -> bool {
        self.admins.contains(caller)
    }
}
