use serde::{Deserialize, Serialize};

use crate::{CanonicalRole, RoleToken};

/// Role-name tables used to classify identities.
///
/// Names are compared after [`RoleToken`] normalization, so configuration may
/// use any casing or separator style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePolicy {
    pub super_admin: Vec<String>,
    pub organization_owner: Vec<String>,
    pub admin: Vec<String>,
    pub outlet_manager: Vec<String>,
    pub cashier: Vec<String>,
    pub staff: Vec<String>,
    /// Paths under these prefixes render as super-admin until identity arrives.
    pub provisional_super_admin_prefixes: Vec<String>,
}

impl Default for RolePolicy {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            super_admin: names(&["super_admin", "superadmin", "platform_admin", "system_admin"]),
            organization_owner: names(&[
                "organization_owner",
                "org_owner",
                "owner",
                "business_owner",
            ]),
            admin: names(&["admin", "administrator", "business_admin"]),
            outlet_manager: names(&["outlet_manager", "manager", "store_manager", "branch_manager"]),
            cashier: names(&["cashier"]),
            staff: names(&["staff", "employee", "member"]),
            provisional_super_admin_prefixes: names(&["/super-admin"]),
        }
    }
}

impl RolePolicy {
    pub fn is_super_admin(&self, token: &RoleToken) -> bool {
        contains(&self.super_admin, token)
    }

    pub fn is_organization_owner(&self, token: &RoleToken) -> bool {
        contains(&self.organization_owner, token)
    }

    /// Map a normalized role name onto the canonical role set.
    pub fn canonical(&self, token: &RoleToken) -> CanonicalRole {
        let table: [(&[String], CanonicalRole); 6] = [
            (self.super_admin.as_slice(), CanonicalRole::SuperAdmin),
            (self.organization_owner.as_slice(), CanonicalRole::OrganizationOwner),
            (self.admin.as_slice(), CanonicalRole::Admin),
            (self.outlet_manager.as_slice(), CanonicalRole::OutletManager),
            (self.cashier.as_slice(), CanonicalRole::Cashier),
            (self.staff.as_slice(), CanonicalRole::Staff),
        ];
        table
            .iter()
            .find(|(names, _)| contains(names, token))
            .map(|(_, role)| *role)
            .unwrap_or(CanonicalRole::Unknown)
    }
}

fn contains(names: &[String], token: &RoleToken) -> bool {
    names
        .iter()
        .filter_map(|n| RoleToken::normalize(n))
        .any(|n| n == *token)
}
