use serde::{Deserialize, Serialize};

use opsdash_core::UnitRouteRules;

/// Names of the persisted fallback keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedKeys {
    pub business_unit: String,
    pub outlet: String,
    /// Read and written for organization owners only.
    pub organization: String,
}

impl Default for PersistedKeys {
    fn default() -> Self {
        Self {
            business_unit: "active-business-unit".into(),
            outlet: "active-outlet-id".into(),
            organization: "active-organization-id".into(),
        }
    }
}

/// Route conventions the context resolver relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutePolicy {
    /// Unit parameters and the first-segment deny/allow lists.
    #[serde(flatten)]
    pub units: UnitRouteRules,
    pub organization_query: String,
    pub outlet_query: String,
    /// Paths under this prefix never carry a business unit.
    pub global_prefix: String,
    pub outlet_marker: String,
    /// Outlet segment meaning "creating a new outlet", i.e. no outlet.
    pub new_outlet_sentinel: String,
    pub keys: PersistedKeys,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            units: UnitRouteRules::default(),
            organization_query: "organizationId".into(),
            outlet_query: "outlet".into(),
            global_prefix: "/super-admin".into(),
            outlet_marker: "outlets".into(),
            new_outlet_sentinel: "new".into(),
            keys: PersistedKeys::default(),
        }
    }
}

impl RoutePolicy {
    /// Whether a first path segment can name a tenant.
    pub fn is_tenant_segment(&self, segment: &str) -> bool {
        self.units.is_tenant_segment(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_and_global_segments_are_not_tenants() {
        let policy = RoutePolicy::default();
        assert!(!policy.is_tenant_segment("reports"));
        assert!(!policy.is_tenant_segment("Super-Admin"));
        assert!(policy.is_tenant_segment("acme-shop"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let policy: RoutePolicy = serde_json::from_str(r#"{"outlet_query": "o"}"#).unwrap();
        assert_eq!(policy.outlet_query, "o");
        assert_eq!(policy.global_prefix, "/super-admin");
        assert_eq!(policy.units, UnitRouteRules::default());
    }

    #[test]
    fn unit_rules_are_configured_at_top_level() {
        let policy: RoutePolicy = serde_json::from_str(r#"{"unit_params": ["tenant"]}"#).unwrap();
        assert_eq!(policy.units.unit_params, vec!["tenant".to_string()]);
        assert!(!policy.is_tenant_segment("reports"));
    }
}
