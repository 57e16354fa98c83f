//! Directory lookups: business units, outlets, organizations, module defaults.
//!
//! The resolver consumes already-fetched data through the [`Directory`] trait.
//! Implementations backed by a remote API fetch upstream and hand over a
//! snapshot; [`InMemoryDirectory`] is that snapshot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use opsdash_auth::EntityRef;
use opsdash_core::{BusinessUnitRef, EnabledModules, OrganizationId, OutletId, sanitize_identifier};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUnit {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "organization")]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub modules: Option<EnabledModules>,
}

impl BusinessUnit {
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

    pub fn with_modules(mut self, modules: EnabledModules) -> Self {
        self.modules = Some(modules);
        self
    }

    /// The slug if it is usable, otherwise the id.
    pub fn unit_ref(&self) -> Option<BusinessUnitRef> {
        self.slug
            .as_deref()
            .and_then(BusinessUnitRef::parse)
            .or_else(|| BusinessUnitRef::parse(&self.id))
    }

    pub fn organization(&self) -> Option<OrganizationId> {
        self.organization_id.as_deref().and_then(OrganizationId::parse)
    }

    pub fn is_named(&self, candidate: &str) -> bool {
        let Some(candidate) = sanitize_identifier(candidate) else {
            return false;
        };
        [Some(self.id.as_str()), self.slug.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(sanitize_identifier)
            .any(|name| name.eq_ignore_ascii_case(candidate))
    }
}

impl From<&EntityRef> for BusinessUnit {
    fn from(value: &EntityRef) -> Self {
        Self {
            id: value.id.clone(),
            slug: value.slug.clone(),
            name: value.name.clone(),
            organization_id: value.organization_id.clone(),
            modules: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outlet {
    pub id: String,
    /// Id or slug of the owning business unit.
    pub business_unit_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub modules: Option<EnabledModules>,
}

impl Outlet {
    pub fn outlet_id(&self) -> Option<OutletId> {
        OutletId::parse(&self.id)
    }

    pub fn belongs_to(&self, unit: &BusinessUnit) -> bool {
        unit.is_named(&self.business_unit_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub modules: Option<EnabledModules>,
}

/// Read-only directory of tenant entities.
pub trait Directory {
    /// Business units, optionally restricted to one organization.
    fn business_units(&self, organization: Option<&OrganizationId>) -> Result<Vec<BusinessUnit>, DirectoryError>;

    fn outlet(&self, id: &OutletId) -> Result<Option<Outlet>, DirectoryError>;

    fn organizations(&self) -> Result<Vec<Organization>, DirectoryError>;

    /// System-wide module defaults.
    fn default_modules(&self) -> Result<EnabledModules, DirectoryError>;
}

/// Directory snapshot held in memory (also the JSON fixture format of the CLI).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InMemoryDirectory {
    pub organizations: Vec<Organization>,
    pub business_units: Vec<BusinessUnit>,
    pub outlets: Vec<Outlet>,
    pub default_modules: EnabledModules,
}

impl Directory for InMemoryDirectory {
    fn business_units(&self, organization: Option<&OrganizationId>) -> Result<Vec<BusinessUnit>, DirectoryError> {
        Ok(self
            .business_units
            .iter()
            .filter(|u| organization.is_none_or(|org| u.organization().as_ref() == Some(org)))
            .cloned()
            .collect())
    }

    fn outlet(&self, id: &OutletId) -> Result<Option<Outlet>, DirectoryError> {
        Ok(self
            .outlets
            .iter()
            .find(|o| o.outlet_id().as_ref() == Some(id))
            .cloned())
    }

    fn organizations(&self) -> Result<Vec<Organization>, DirectoryError> {
        Ok(self.organizations.clone())
    }

    fn default_modules(&self) -> Result<EnabledModules, DirectoryError> {
        Ok(self.default_modules.clone())
    }
}

/// Directory that always fails; stands in for an unreachable backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableDirectory;

impl Directory for UnavailableDirectory {
    fn business_units(&self, _organization: Option<&OrganizationId>) -> Result<Vec<BusinessUnit>, DirectoryError> {
        Err(DirectoryError::Unavailable("business units".into()))
    }

    fn outlet(&self, _id: &OutletId) -> Result<Option<Outlet>, DirectoryError> {
        Err(DirectoryError::Unavailable("outlet".into()))
    }

    fn organizations(&self) -> Result<Vec<Organization>, DirectoryError> {
        Err(DirectoryError::Unavailable("organizations".into()))
    }

    fn default_modules(&self) -> Result<EnabledModules, DirectoryError> {
        Err(DirectoryError::Unavailable("default modules".into()))
    }
}
