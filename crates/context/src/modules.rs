//! Enabled-modules resolution for an active context.

use opsdash_auth::Identity;
use opsdash_core::EnabledModules;

use crate::{ActiveContext, Directory};

/// Merge the module layers that apply to `context`.
///
/// Precedence, highest first: outlet, business unit, organization (with the
/// caller's user-level map beneath it), system default. A layer whose lookup
/// fails is skipped.
pub fn resolve_enabled_modules<D: Directory + ?Sized>(
    context: &ActiveContext,
    identity: &Identity,
    directory: &D,
) -> EnabledModules {
    let outlet = context.outlet_id.as_ref().and_then(|id| match directory.outlet(id) {
        Ok(outlet) => outlet.and_then(|o| o.modules),
        Err(err) => {
            tracing::warn!(outlet = %id, %err, "outlet modules unavailable");
            None
        }
    });

    let unit = context.business_unit.as_ref().and_then(|unit_ref| {
        match directory.business_units(context.organization_id.as_ref()) {
            Ok(units) => units
                .into_iter()
                .find(|u| u.is_named(unit_ref.as_str()))
                .and_then(|u| u.modules),
            Err(err) => {
                tracing::warn!(business_unit = %unit_ref, %err, "business unit modules unavailable");
                None
            }
        }
    });

    let organization = context.organization_id.as_ref().and_then(|org| match directory.organizations() {
        Ok(orgs) => orgs
            .into_iter()
            .find(|o| o.id == org.as_str())
            .and_then(|o| o.modules),
        Err(err) => {
            tracing::warn!(organization = %org, %err, "organization modules unavailable");
            None
        }
    });
    let organization_or_user = EnabledModules::layered([organization.as_ref(), identity.enabled_modules.as_ref()]);

    let system = match directory.default_modules() {
        Ok(modules) => Some(modules),
        Err(err) => {
            tracing::warn!(%err, "system module defaults unavailable");
            None
        }
    };

    EnabledModules::layered([
        outlet.as_ref(),
        unit.as_ref(),
        Some(&organization_or_user),
        system.as_ref(),
    ])
}
