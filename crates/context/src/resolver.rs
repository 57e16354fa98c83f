//! Active-context resolution: which organization, business unit and outlet
//! the current view is scoped to.
//!
//! Resolution is a pure function of the route, the identity, the
//! classification and the directory snapshot, except for three side effects:
//! persisted fallback keys are written back, and a change of the active
//! business unit is reported (once) to the session sink.

use serde::{Deserialize, Serialize};

use opsdash_auth::{Classification, Identity};
use opsdash_core::{BusinessUnitRef, OrganizationId, OutletId, RouteSignals, UnitSource, sanitize_identifier};

use crate::{ActiveUnitNotifier, ActiveUnitSink, BusinessUnit, Directory, KeyValueStore, RoutePolicy};

/// The resolved (organization, business unit, outlet) triple.
///
/// # Invariants
/// - `outlet_id` is only set when `business_unit` is set.
/// - `organization_id` is absent only for super-admins (platform-wide view)
///   or when nothing about the caller names an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveContext {
    pub organization_id: Option<OrganizationId>,
    #[serde(rename = "businessUnitRef")]
    pub business_unit: Option<BusinessUnitRef>,
    pub outlet_id: Option<OutletId>,
}

impl ActiveContext {
    /// No tenant selected at all.
    pub fn is_platform_wide(&self) -> bool {
        self.organization_id.is_none() && self.business_unit.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitOrigin {
    Route(UnitSource),
    Persisted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum OutletSignal {
    Explicit(OutletId),
    /// `/outlets/new`, or an outlet query that sanitizes to nothing.
    Cleared,
    Unspecified,
}

/// Resolves the active context and owns its collaborators.
#[derive(Debug)]
pub struct ContextResolver<S, D, N> {
    policy: RoutePolicy,
    store: S,
    directory: D,
    notifier: ActiveUnitNotifier<N>,
}

impl<S, D, N> ContextResolver<S, D, N>
where
    S: KeyValueStore,
    D: Directory,
    N: ActiveUnitSink,
{
    pub fn new(policy: RoutePolicy, store: S, directory: D, sink: N) -> Self {
        Self {
            policy,
            store,
            directory,
            notifier: ActiveUnitNotifier::new(sink),
        }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn sink(&self) -> &N {
        self.notifier.sink()
    }

    /// Resolve the active context for the current route. Never fails.
    pub fn resolve(
        &mut self,
        route: &RouteSignals,
        identity: &Identity,
        classification: &Classification,
    ) -> ActiveContext {
        let unit = self.resolve_business_unit(route, identity, classification);
        let organization_id = self.resolve_organization(route, identity, classification, unit.as_ref());
        let outlet_id = self.resolve_outlet(route, identity, unit.as_ref());
        let business_unit = unit.as_ref().and_then(BusinessUnit::unit_ref);

        self.notifier.report(business_unit.as_ref());

        ActiveContext {
            organization_id,
            business_unit,
            outlet_id,
        }
    }

    /// Business units the caller may switch between in `context`.
    pub fn visible_business_units(
        &self,
        context: &ActiveContext,
        identity: &Identity,
        classification: &Classification,
    ) -> Vec<BusinessUnit> {
        let directory_units = match (&context.organization_id, classification.is_elevated()) {
            (Some(org), true) => self.directory_units(Some(org)),
            _ => Vec::new(),
        };
        visible_business_units(context, identity, classification, &directory_units)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Business unit
    // ─────────────────────────────────────────────────────────────────────

    fn unit_candidate(&self, route: &RouteSignals) -> Option<(String, UnitOrigin)> {
        if let Some((value, source)) = self.policy.units.unit_candidate(route) {
            return Some((value.to_string(), UnitOrigin::Route(source)));
        }

        if route.is_rooted_at(&self.policy.global_prefix) {
            return None;
        }

        self.store
            .get(&self.policy.keys.business_unit)
            .and_then(|raw| sanitize_identifier(&raw).map(str::to_string))
            .map(|value| (value, UnitOrigin::Persisted))
    }

    fn resolve_business_unit(
        &mut self,
        route: &RouteSignals,
        identity: &Identity,
        classification: &Classification,
    ) -> Option<BusinessUnit> {
        let (candidate, source) = self.unit_candidate(route)?;
        let unit = self.find_unit(&candidate, identity, classification);

        match (&unit, source) {
            (Some(unit), UnitOrigin::Route(_)) => {
                if let Some(unit_ref) = unit.unit_ref() {
                    let key = self.policy.keys.business_unit.clone();
                    self.persist(&key, unit_ref.as_str());
                }
            }
            (None, source) => {
                tracing::debug!(candidate = %candidate, ?source, "business unit not resolvable");
            }
            _ => {}
        }
        unit
    }

    fn find_unit(&self, candidate: &str, identity: &Identity, classification: &Classification) -> Option<BusinessUnit> {
        if let Some(granted) = identity.granted_unit(candidate) {
            let mut unit = BusinessUnit::from(granted);
            if unit.organization().is_none() {
                // Grants do not always carry the owning organization.
                if let Some(listed) = self.directory_units(None).into_iter().find(|u| u.id == unit.id) {
                    unit.organization_id = listed.organization_id;
                }
            }
            return Some(unit);
        }

        if !classification.is_elevated() {
            return None;
        }

        let unit = self
            .directory_units(None)
            .into_iter()
            .find(|u| u.is_named(candidate))?;

        if classification.is_organization_owner {
            let owned = owner_organizations(identity);
            let in_owned_org = unit.organization().is_some_and(|org| owned.contains(&org));
            if !owned.is_empty() && !in_owned_org {
                tracing::debug!(candidate = %candidate, "business unit belongs to another organization");
                return None;
            }
        }
        Some(unit)
    }

    fn directory_units(&self, organization: Option<&OrganizationId>) -> Vec<BusinessUnit> {
        match self.directory.business_units(organization) {
            Ok(units) => units,
            Err(err) => {
                tracing::warn!(%err, "business unit lookup failed; treating as empty");
                Vec::new()
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Organization
    // ─────────────────────────────────────────────────────────────────────

    fn resolve_organization(
        &mut self,
        route: &RouteSignals,
        identity: &Identity,
        classification: &Classification,
        unit: Option<&BusinessUnit>,
    ) -> Option<OrganizationId> {
        if let Some(raw) = route.query(&self.policy.organization_query) {
            match OrganizationId::parse(raw) {
                Some(org) => {
                    self.remember_organization(classification, &org);
                    return Some(org);
                }
                None => tracing::debug!(raw, "ignoring malformed organization query"),
            }
        }

        if let Some(org) = unit.and_then(BusinessUnit::organization) {
            self.remember_organization(classification, &org);
            return Some(org);
        }

        if !classification.is_organization_owner || classification.is_super_admin {
            return None;
        }

        let owned = owner_organizations(identity);
        if let [only] = owned.as_slice() {
            let org = only.clone();
            self.remember_organization(classification, &org);
            return Some(org);
        }

        self.store
            .get(&self.policy.keys.organization)
            .and_then(|raw| OrganizationId::parse(&raw))
            .filter(|org| owned.is_empty() || owned.contains(org))
    }

    fn remember_organization(&mut self, classification: &Classification, org: &OrganizationId) {
        if classification.is_organization_owner && !classification.is_super_admin {
            let key = self.policy.keys.organization.clone();
            self.persist(&key, org.as_str());
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Outlet
    // ─────────────────────────────────────────────────────────────────────

    fn outlet_signal(&self, route: &RouteSignals) -> OutletSignal {
        let explicit = |raw: &str| match OutletId::parse(raw) {
            Some(id) if !id.as_str().eq_ignore_ascii_case(&self.policy.new_outlet_sentinel) => {
                OutletSignal::Explicit(id)
            }
            _ => OutletSignal::Cleared,
        };

        if let Some(raw) = route.query(&self.policy.outlet_query) {
            return explicit(raw);
        }
        match route.segment_after(&self.policy.outlet_marker) {
            Some(segment) => explicit(segment),
            None => OutletSignal::Unspecified,
        }
    }

    fn resolve_outlet(
        &mut self,
        route: &RouteSignals,
        identity: &Identity,
        unit: Option<&BusinessUnit>,
    ) -> Option<OutletId> {
        let key = self.policy.keys.outlet.clone();
        match self.outlet_signal(route) {
            OutletSignal::Cleared => {
                self.store.remove(&key);
                None
            }
            OutletSignal::Explicit(id) => {
                match unit.and_then(|unit| self.find_outlet(&id, identity, unit)) {
                    Some(found) => {
                        self.persist(&key, found.as_str());
                        Some(found)
                    }
                    None => {
                        // An unresolvable outlet is a transition to "no outlet".
                        self.store.remove(&key);
                        None
                    }
                }
            }
            OutletSignal::Unspecified => {
                let unit = unit?;
                let remembered = self.store.get(&key).and_then(|raw| OutletId::parse(&raw))?;
                self.find_outlet(&remembered, identity, unit)
            }
        }
    }

    fn find_outlet(&self, id: &OutletId, identity: &Identity, unit: &BusinessUnit) -> Option<OutletId> {
        if identity
            .granted_outlets(&unit.id)
            .any(|o| o.outlet_id().as_ref() == Some(id))
        {
            return Some(id.clone());
        }

        match self.directory.outlet(id) {
            Ok(Some(outlet)) if outlet.belongs_to(unit) => Some(id.clone()),
            Ok(Some(_)) => {
                tracing::debug!(outlet = %id, unit = %unit.id, "outlet belongs to another business unit");
                None
            }
            Ok(None) => {
                tracing::debug!(outlet = %id, "outlet not found");
                None
            }
            Err(err) => {
                tracing::warn!(outlet = %id, %err, "outlet lookup failed; treating as absent");
                None
            }
        }
    }

    fn persist(&mut self, key: &str, value: &str) {
        if self.store.get(key).as_deref() != Some(value) {
            self.store.set(key, value);
        }
    }
}

/// Business units the caller may see.
///
/// Elevated callers with a resolved organization see every directory unit of
/// that organization; everyone else sees exactly their own grants.
pub fn visible_business_units(
    context: &ActiveContext,
    identity: &Identity,
    classification: &Classification,
    directory_units: &[BusinessUnit],
) -> Vec<BusinessUnit> {
    match &context.organization_id {
        Some(org) if classification.is_elevated() => directory_units
            .iter()
            .filter(|u| u.organization().as_ref() == Some(org))
            .cloned()
            .collect(),
        _ => identity
            .granted_units()
            .into_iter()
            .map(BusinessUnit::from)
            .collect(),
    }
}

/// Distinct organizations named by the caller's grants, in grant order.
fn owner_organizations(identity: &Identity) -> Vec<OrganizationId> {
    let mut orgs: Vec<OrganizationId> = Vec::new();
    for org in identity.granted_units().into_iter().filter_map(|u| u.organization()) {
        if !orgs.contains(&org) {
            orgs.push(org);
        }
    }
    orgs
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
