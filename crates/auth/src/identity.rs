//! Identity snapshot delivered by the upstream identity provider.
//!
//! An `Identity` is never mutated in place: a refresh produces a new value
//! that replaces the old one wholesale.

use serde::{Deserialize, Serialize};

use opsdash_core::{BusinessUnitRef, EnabledModules, OrganizationId, OutletId, sanitize_identifier};

use crate::{PermissionEntry, RoleRef};

/// Loose reference to a tenant entity (business unit or outlet) inside a grant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Owning organization (business units only).
    #[serde(default, alias = "organization")]
    pub organization_id: Option<String>,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// The slug if it is usable, otherwise the id.
    pub fn unit_ref(&self) -> Option<BusinessUnitRef> {
        self.slug
            .as_deref()
            .and_then(BusinessUnitRef::parse)
            .or_else(|| BusinessUnitRef::parse(&self.id))
    }

    pub fn outlet_id(&self) -> Option<OutletId> {
        OutletId::parse(&self.id)
    }

    pub fn organization(&self) -> Option<OrganizationId> {
        self.organization_id.as_deref().and_then(OrganizationId::parse)
    }

    /// Whether `candidate` names this entity by id or slug (case-insensitive).
    pub fn is_named(&self, candidate: &str) -> bool {
        let Some(candidate) = sanitize_identifier(candidate) else {
            return false;
        };
        sanitize_identifier(&self.id).is_some_and(|id| id.eq_ignore_ascii_case(candidate))
            || self
                .slug
                .as_deref()
                .and_then(sanitize_identifier)
                .is_some_and(|slug| slug.eq_ignore_ascii_case(candidate))
    }
}

/// How far a business-access grant reaches.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessScope {
    #[default]
    #[serde(alias = "unit")]
    Unit,
    #[serde(alias = "organization")]
    Organization,
}

/// A role held on a specific business unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAccessGrant {
    pub business_unit: EntityRef,
    pub role: RoleRef,
    #[serde(default)]
    pub scope: AccessScope,
}

/// Pre-scoped unit/outlet grant for non-elevated users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextGrant {
    pub business_unit: EntityRef,
    #[serde(default)]
    pub outlets: Vec<EntityRef>,
}

/// Everything the policy layer knows about the signed-in caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identity {
    /// Explicit platform-operator flag, independent of role names.
    #[serde(alias = "isSuperAdmin")]
    pub super_admin: bool,
    pub global_roles: Vec<RoleRef>,
    pub business_access: Vec<BusinessAccessGrant>,
    pub available_contexts: Vec<ContextGrant>,
    pub permissions: Vec<PermissionEntry>,
    /// User-level module toggles, merged under the organization layer.
    pub enabled_modules: Option<EnabledModules>,
    /// A refresh is in flight; the fields above may be stale or partial.
    pub is_loading: bool,
}

impl Identity {
    /// Placeholder identity while the first fetch is in flight.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    /// Business units granted to the caller, deduplicated by id, in grant order.
    pub fn granted_units(&self) -> Vec<&EntityRef> {
        let mut units: Vec<&EntityRef> = Vec::new();
        let candidates = self
            .business_access
            .iter()
            .map(|g| &g.business_unit)
            .chain(self.available_contexts.iter().map(|c| &c.business_unit));
        for unit in candidates {
            if sanitize_identifier(&unit.id).is_none() {
                continue;
            }
            if !units.iter().any(|u| u.id == unit.id) {
                units.push(unit);
            }
        }
        units
    }

    /// Granted unit named by `candidate` (id or slug).
    pub fn granted_unit(&self, candidate: &str) -> Option<&EntityRef> {
        self.granted_units().into_iter().find(|u| u.is_named(candidate))
    }

    /// Outlets pre-scoped for the unit with id `unit_id`.
    pub fn granted_outlets(&self, unit_id: &str) -> impl Iterator<Item = &EntityRef> {
        self.available_contexts
            .iter()
            .filter(move |c| c.business_unit.id == unit_id)
            .flat_map(|c| c.outlets.iter())
    }

    /// Every role reference, global first, then business-scoped.
    pub fn all_roles(&self) -> impl Iterator<Item = &RoleRef> {
        self.global_roles
            .iter()
            .chain(self.business_access.iter().map(|g| &g.role))
    }
}
