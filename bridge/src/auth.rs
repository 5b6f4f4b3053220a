//! Administrative capability checks.

use std::collections::HashSet;

use remitbridge_common::Address;

/// Capability predicate supplied by the hosting environment.
///
/// Checks are synchronous preconditions, evaluated before any mutation
/// begins.
pub trait AdminPolicy: Send + Sync {
    /// Whether `caller` holds the administrative capability.
    fn is_admin(&self, caller: &Address) -> bool;
}

/// Policy backed by a fixed allow-set of administrative addresses.
#[derive(Debug, Clone, Default)]
pub struct StaticAdminPolicy {
    admins: HashSet<Address>,
}

impl StaticAdminPolicy {
    /// Create a policy from a set of administrative addresses.
    pub fn new(admins: impl IntoIterator<Item = Address>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    /// Create a policy with a single administrator.
    pub fn single(admin: Address) -> Self {
        Self::new([admin])
    }
}

impl AdminPolicy for StaticAdminPolicy {
    fn is_admin(&self, caller: &Address) -> bool {
        self.admins.contains(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_policy() {
        let policy = StaticAdminPolicy::single(Address::new("admin"));

        assert!(policy.is_admin(&Address::new("admin")));
        assert!(!policy.is_admin(&Address::new("alice")));
    }

    #[test]
    fn test_empty_policy_denies_everyone() {
        let policy = StaticAdminPolicy::default();
        assert!(!policy.is_admin(&Address::new("admin")));
    }
}
