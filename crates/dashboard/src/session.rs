//! Per-session facade: owns the classifier (and its stability cache), the
//! context resolver and the menu pipeline.

use serde::Serialize;

use opsdash_auth::{Classification, Identity, PermissionEntry, RoleClassifier};
use opsdash_context::{
    ActiveContext, ActiveUnitSink, BusinessUnit, ContextResolver, Directory, KeyValueStore, resolve_enabled_modules,
};
use opsdash_core::{EnabledModules, RouteSignals};
use opsdash_nav::{MenuNode, MenuPipeline, NavKey, NavigationTreeSource};

use crate::DashboardConfig;

/// Everything a dashboard shell needs to render one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub classification: Classification,
    pub context: ActiveContext,
    pub business_units: Vec<BusinessUnit>,
    pub enabled_modules: EnabledModules,
    pub menu: Vec<MenuNode>,
}

#[derive(Debug)]
pub struct DashboardSession<S, D, N> {
    classifier: RoleClassifier,
    resolver: ContextResolver<S, D, N>,
    pipeline: MenuPipeline,
}

impl<S, D, N> DashboardSession<S, D, N>
where
    S: KeyValueStore,
    D: Directory,
    N: ActiveUnitSink,
{
    pub fn new(config: DashboardConfig, store: S, directory: D, sink: N) -> Self {
        Self {
            classifier: RoleClassifier::new(config.roles).with_unit_routes(config.routes.units.clone()),
            resolver: ContextResolver::new(config.routes, store, directory, sink),
            pipeline: MenuPipeline::new(config.access),
        }
    }

    pub fn classifier(&self) -> &RoleClassifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &ContextResolver<S, D, N> {
        &self.resolver
    }

    /// `identity` is `None` (or loading) while the identity fetch is in flight.
    pub fn classify_role(&mut self, identity: Option<&Identity>, route: &RouteSignals) -> Classification {
        self.classifier.classify(identity, route)
    }

    pub fn resolve_context(
        &mut self,
        route: &RouteSignals,
        identity: &Identity,
        classification: &Classification,
    ) -> ActiveContext {
        self.resolver.resolve(route, identity, classification)
    }

    pub fn visible_business_units(
        &self,
        context: &ActiveContext,
        identity: &Identity,
        classification: &Classification,
    ) -> Vec<BusinessUnit> {
        self.resolver.visible_business_units(context, identity, classification)
    }

    pub fn enabled_modules(&self, context: &ActiveContext, identity: &Identity) -> EnabledModules {
        resolve_enabled_modules(context, identity, self.resolver.directory())
    }

    pub fn build_visible_menu(
        &self,
        raw: &[MenuNode],
        enabled_modules: &EnabledModules,
        classification: &Classification,
        permissions: &[PermissionEntry],
        query: &str,
    ) -> Vec<MenuNode> {
        self.pipeline
            .run(raw, enabled_modules, classification, permissions, query)
    }

    /// Run every stage for one route, in order.
    ///
    /// A missing or loading identity still yields a view: the classification
    /// comes from the cache or the route, and context resolution sees an
    /// empty identity.
    pub fn view<T>(&mut self, identity: Option<&Identity>, route: &RouteSignals, source: &T, query: &str) -> DashboardView
    where
        T: NavigationTreeSource + ?Sized,
    {
        let empty = Identity::loading();
        let settled = identity.unwrap_or(&empty);

        let classification = self.classify_role(identity, route);
        let context = self.resolve_context(route, settled, &classification);
        let business_units = self.visible_business_units(&context, settled, &classification);
        let enabled_modules = self.enabled_modules(&context, settled);

        let key = NavKey {
            role: classification.role,
            business_unit: context.business_unit.clone(),
            outlet_id: context.outlet_id.clone(),
            organization_id: context.organization_id.clone(),
        };
        let menu = if !classification.is_elevated() && context.business_unit.is_none() {
            // No tenant-scoped menu until the caller's unit is known.
            tracing::debug!(role = %classification.role, "business unit unresolved, menu withheld");
            Vec::new()
        } else {
            let raw = source.menu(&key);
            self.build_visible_menu(&raw, &enabled_modules, &classification, &settled.permissions, query)
        };

        DashboardView {
            classification,
            context,
            business_units,
            enabled_modules,
            menu,
        }
    }

    /// End the session: the settled classification is forgotten.
    pub fn logout(&mut self) {
        self.classifier.logout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdash_auth::{CanonicalRole, RoleRef};
    use opsdash_context::{InMemoryDirectory, MemoryStore, NoopSink};

    fn session() -> DashboardSession<MemoryStore, InMemoryDirectory, NoopSink> {
        DashboardSession::new(DashboardConfig::default(), MemoryStore::new(), InMemoryDirectory::default(), NoopSink)
    }

    #[test]
    fn logout_drops_the_cached_classification() {
        let mut session = session();
        let route = RouteSignals::parse("/dashboard");
        let admin = Identity {
            global_roles: vec![RoleRef::named("admin")],
            ..Identity::default()
        };

        assert_eq!(session.classify_role(Some(&admin), &route).role, CanonicalRole::Admin);
        assert_eq!(session.classify_role(Some(&Identity::loading()), &route).role, CanonicalRole::Admin);

        session.logout();
        let after = session.classify_role(Some(&Identity::loading()), &route);
        assert!(after.provisional);
        assert_eq!(after.role, CanonicalRole::Unknown);
    }
}
