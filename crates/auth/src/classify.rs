//! Role classification and the stability cache.
//!
//! Classification turns an [`Identity`] into a [`Classification`]: one
//! canonical role plus the two bypass predicates every downstream stage keys
//! off. The [`RoleClassifier`] wraps the pure classification with a
//! [`StabilityCache`] so that an identity refresh does not briefly render the
//! menu of an unknown user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use opsdash_core::{RouteSignals, UnitRouteRules};

use crate::{AccessScope, CanonicalRole, Identity, RolePolicy, RoleToken};

/// Result of role classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub role: CanonicalRole,
    /// Display label of the role the canonical role was derived from.
    pub source_role: Option<String>,
    pub is_super_admin: bool,
    /// Always false when `is_super_admin` is true.
    pub is_organization_owner: bool,
    /// Derived from the route alone; never cached.
    #[serde(default)]
    pub provisional: bool,
}

impl Classification {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn super_admin() -> Self {
        Self {
            role: CanonicalRole::SuperAdmin,
            is_super_admin: true,
            ..Self::default()
        }
    }

    pub fn organization_owner() -> Self {
        Self {
            role: CanonicalRole::OrganizationOwner,
            is_organization_owner: true,
            ..Self::default()
        }
    }

    pub fn with_role(role: CanonicalRole) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }

    /// Super-admin or organization owner.
    pub fn is_elevated(&self) -> bool {
        self.is_super_admin || self.is_organization_owner
    }
}

/// Classify a settled identity. Pure and total.
///
/// `route_unit` is the business unit the current route names, as read by
/// [`UnitRouteRules::unit_candidate`]; a grant on that unit decides the role.
pub fn classify_identity(policy: &RolePolicy, identity: &Identity, route_unit: Option<&str>) -> Classification {
    let global_tokens: Vec<RoleToken> = identity.global_roles.iter().filter_map(|r| r.token()).collect();

    let is_super_admin = identity.super_admin || global_tokens.iter().any(|t| policy.is_super_admin(t));

    let is_organization_owner = !is_super_admin
        && (identity
            .all_roles()
            .filter_map(|r| r.token())
            .any(|t| policy.is_organization_owner(&t))
            || identity
                .business_access
                .iter()
                .any(|g| g.scope == AccessScope::Organization));

    if is_super_admin {
        return Classification {
            source_role: source_label(identity, policy, CanonicalRole::SuperAdmin),
            ..Classification::super_admin()
        };
    }
    if is_organization_owner {
        return Classification {
            source_role: source_label(identity, policy, CanonicalRole::OrganizationOwner),
            ..Classification::organization_owner()
        };
    }

    // The grant for the unit the route points at takes priority over the
    // strongest role held anywhere.
    let route_grant = route_unit.and_then(|candidate| {
        identity
            .business_access
            .iter()
            .find(|g| g.business_unit.is_named(candidate))
    });
    if let Some(grant) = route_grant {
        if let Some(token) = grant.role.token() {
            let role = policy.canonical(&token);
            if role != CanonicalRole::Unknown {
                return Classification {
                    role,
                    source_role: grant.role.label().map(str::to_string),
                    ..Classification::default()
                };
            }
        }
    }

    let strongest = identity
        .all_roles()
        .filter_map(|r| r.token().map(|t| (policy.canonical(&t), r)))
        .filter(|(role, _)| *role != CanonicalRole::Unknown)
        .max_by_key(|(role, _)| role.rank());

    match strongest {
        Some((role, role_ref)) => Classification {
            role,
            source_role: role_ref.label().map(str::to_string),
            ..Classification::default()
        },
        None => Classification {
            source_role: identity
                .all_roles()
                .find_map(|r| r.label())
                .map(str::to_string),
            ..Classification::unknown()
        },
    }
}

/// First-paint classification derived from the route only.
pub fn provisional_from_route(policy: &RolePolicy, route: &RouteSignals) -> Classification {
    let under_admin_prefix = policy
        .provisional_super_admin_prefixes
        .iter()
        .any(|prefix| route.is_rooted_at(prefix));

    let base = if under_admin_prefix {
        Classification::super_admin()
    } else {
        Classification::unknown()
    };
    Classification {
        provisional: true,
        ..base
    }
}

fn source_label(identity: &Identity, policy: &RolePolicy, role: CanonicalRole) -> Option<String> {
    identity
        .all_roles()
        .find(|r| r.token().is_some_and(|t| policy.canonical(&t) == role))
        .and_then(|r| r.label())
        .map(str::to_string)
}

// ─────────────────────────────────────────────────────────────────────────────
// Stability cache
// ─────────────────────────────────────────────────────────────────────────────

/// Last identity-confirmed classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub classification: Classification,
    pub settled_at: DateTime<Utc>,
}

/// Holds the last settled classification across recomputations.
///
/// Written on settle (a non-loading identity was classified), read while a
/// refresh is in flight, cleared on logout. Provisional results are never
/// written.
#[derive(Debug, Clone, Default)]
pub struct StabilityCache {
    snapshot: Option<Snapshot>,
}

impl StabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Record a settled classification. Returns `true` if the stored value changed.
    pub fn settle(&mut self, classification: Classification, now: DateTime<Utc>) -> bool {
        if classification.provisional {
            return false;
        }
        if self
            .snapshot
            .as_ref()
            .is_some_and(|s| s.classification == classification)
        {
            return false;
        }
        self.snapshot = Some(Snapshot {
            classification,
            settled_at: now,
        });
        true
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classifier
// ─────────────────────────────────────────────────────────────────────────────

/// Stateful classifier: pure classification plus the stability cache.
#[derive(Debug, Clone, Default)]
pub struct RoleClassifier {
    policy: RolePolicy,
    units: UnitRouteRules,
    cache: StabilityCache,
}

impl RoleClassifier {
    pub fn new(policy: RolePolicy) -> Self {
        Self {
            policy,
            units: UnitRouteRules::default(),
            cache: StabilityCache::new(),
        }
    }

    /// Read the route's business unit with `units` instead of the defaults.
    pub fn with_unit_routes(mut self, units: UnitRouteRules) -> Self {
        self.units = units;
        self
    }

    pub fn policy(&self) -> &RolePolicy {
        &self.policy
    }

    pub fn cache(&self) -> &StabilityCache {
        &self.cache
    }

    /// Classify the caller.
    ///
    /// - Settled identity: classify and settle the cache.
    /// - Loading or missing identity: the cached snapshot if there is one,
    ///   otherwise a provisional route-derived classification.
    pub fn classify(&mut self, identity: Option<&Identity>, route: &RouteSignals) -> Classification {
        match identity {
            Some(identity) if !identity.is_loading => {
                let route_unit = self.units.unit_candidate(route).map(|(unit, _)| unit);
                let classification = classify_identity(&self.policy, identity, route_unit);
                if self.cache.settle(classification.clone(), Utc::now()) {
                    tracing::debug!(
                        role = %classification.role,
                        super_admin = classification.is_super_admin,
                        organization_owner = classification.is_organization_owner,
                        "role classification settled"
                    );
                }
                classification
            }
            _ => match self.cache.snapshot() {
                Some(snapshot) => snapshot.classification.clone(),
                None => provisional_from_route(&self.policy, route),
            },
        }
    }

    /// Forget the settled classification (session ended).
    pub fn logout(&mut self) {
        self.cache.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BusinessAccessGrant, EntityRef, RoleRef};

    fn identity_with_roles(roles: &[&str]) -> Identity {
        Identity {
            global_roles: roles.iter().map(|r| RoleRef::named(*r)).collect(),
            ..Identity::default()
        }
    }

    fn grant(unit: &str, role: &str, scope: AccessScope) -> BusinessAccessGrant {
        BusinessAccessGrant {
            business_unit: EntityRef::new(format!("id-{unit}")).with_slug(unit),
            role: RoleRef::named(role),
            scope,
        }
    }

    fn root() -> RouteSignals {
        RouteSignals::new("/")
    }

    #[test]
    fn super_admin_from_flag_or_role_name() {
        let policy = RolePolicy::default();

        let by_flag = Identity {
            super_admin: true,
            ..Identity::default()
        };
        assert!(classify_identity(&policy, &by_flag, None).is_super_admin);

        let by_name = identity_with_roles(&["Super-Admin"]);
        let c = classify_identity(&policy, &by_name, None);
        assert!(c.is_super_admin);
        assert_eq!(c.role, CanonicalRole::SuperAdmin);
        assert_eq!(c.source_role.as_deref(), Some("Super-Admin"));
    }

    #[test]
    fn super_admin_supersedes_owner() {
        let policy = RolePolicy::default();
        let mut identity = identity_with_roles(&["super_admin", "owner"]);
        identity
            .business_access
            .push(grant("acme-shop", "owner", AccessScope::Organization));

        let c = classify_identity(&policy, &identity, None);
        assert!(c.is_super_admin);
        assert!(!c.is_organization_owner);
    }

    #[test]
    fn owner_from_business_role_or_organization_scope() {
        let policy = RolePolicy::default();

        let mut by_role = Identity::default();
        by_role.business_access.push(grant("acme-shop", "org-owner", AccessScope::Unit));
        let c = classify_identity(&policy, &by_role, None);
        assert!(c.is_organization_owner);
        assert_eq!(c.role, CanonicalRole::OrganizationOwner);

        let mut by_scope = Identity::default();
        by_scope
            .business_access
            .push(grant("acme-shop", "staff", AccessScope::Organization));
        assert!(classify_identity(&policy, &by_scope, None).is_organization_owner);
    }

    #[test]
    fn route_unit_grant_wins_over_strongest_role() {
        let policy = RolePolicy::default();
        let mut identity = Identity::default();
        identity.business_access.push(grant("north", "admin", AccessScope::Unit));
        identity.business_access.push(grant("south", "cashier", AccessScope::Unit));

        let at_south = classify_identity(&policy, &identity, Some("south"));
        assert_eq!(at_south.role, CanonicalRole::Cashier);

        let elsewhere = classify_identity(&policy, &identity, None);
        assert_eq!(elsewhere.role, CanonicalRole::Admin);
    }

    #[test]
    fn explicit_unit_parameter_decides_the_role_over_path() {
        let mut identity = Identity::default();
        identity.business_access.push(grant("north", "admin", AccessScope::Unit));
        identity.business_access.push(grant("south", "cashier", AccessScope::Unit));
        let mut classifier = RoleClassifier::new(RolePolicy::default());

        let route = RouteSignals::new("/north/dashboard").with_param("slug", "south");
        assert_eq!(classifier.classify(Some(&identity), &route).role, CanonicalRole::Cashier);

        let unrelated = RouteSignals::new("/reports/daily").with_param("reportId", "south");
        assert_eq!(classifier.classify(Some(&identity), &unrelated).role, CanonicalRole::Admin);
    }

    #[test]
    fn unrecognized_roles_are_unknown_but_keep_their_label() {
        let policy = RolePolicy::default();
        let c = classify_identity(&policy, &identity_with_roles(&["Auditor"]), None);
        assert_eq!(c.role, CanonicalRole::Unknown);
        assert_eq!(c.source_role.as_deref(), Some("Auditor"));
        assert!(!c.is_super_admin && !c.is_organization_owner);

        let empty = classify_identity(&policy, &Identity::default(), None);
        assert_eq!(empty, Classification::unknown());
    }

    #[test]
    fn loading_identity_returns_cached_classification() {
        let mut classifier = RoleClassifier::new(RolePolicy::default());
        let settled = identity_with_roles(&["super_admin"]);
        assert!(classifier.classify(Some(&settled), &root()).is_super_admin);

        // The in-flight identity would classify as a plain cashier.
        let mut refreshing = identity_with_roles(&["cashier"]);
        refreshing.is_loading = true;
        let c = classifier.classify(Some(&refreshing), &root());
        assert!(c.is_super_admin);
        assert_eq!(c.role, CanonicalRole::SuperAdmin);
    }

    #[test]
    fn provisional_render_is_route_derived_and_not_cached() {
        let mut classifier = RoleClassifier::new(RolePolicy::default());

        let c = classifier.classify(None, &RouteSignals::new("/super-admin/organizations"));
        assert!(c.provisional);
        assert!(c.is_super_admin);
        assert!(classifier.cache().snapshot().is_none());

        let c = classifier.classify(Some(&Identity::loading()), &RouteSignals::new("/acme/dashboard"));
        assert!(c.provisional);
        assert_eq!(c.role, CanonicalRole::Unknown);
        assert!(classifier.cache().snapshot().is_none());
    }

    #[test]
    fn settle_only_rewrites_on_change() {
        let mut cache = StabilityCache::new();
        let first = Utc::now();
        assert!(cache.settle(Classification::super_admin(), first));
        assert!(!cache.settle(Classification::super_admin(), Utc::now()));
        assert_eq!(cache.snapshot().unwrap().settled_at, first);

        let provisional = Classification {
            provisional: true,
            ..Classification::unknown()
        };
        assert!(!cache.settle(provisional, Utc::now()));
    }

    #[test]
    fn logout_clears_cache() {
        let mut classifier = RoleClassifier::new(RolePolicy::default());
        classifier.classify(Some(&identity_with_roles(&["admin"])), &root());
        assert!(classifier.cache().snapshot().is_some());

        classifier.logout();
        let c = classifier.classify(Some(&Identity::loading()), &root());
        assert!(c.provisional);
        assert_eq!(c.role, CanonicalRole::Unknown);
    }
}
