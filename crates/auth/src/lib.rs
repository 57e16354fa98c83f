//! `opsdash-auth` — caller identity, role classification and permission grants.
//!
//! This crate is pure: no IO, no storage, no HTTP. Identity payloads are
//! ingested here once and normalized into typed values every later stage
//! consumes.

pub mod classify;
pub mod identity;
pub mod permissions;
pub mod policy;
pub mod roles;

pub use classify::{
    Classification, RoleClassifier, Snapshot, StabilityCache, classify_identity, provisional_from_route,
};
pub use identity::{AccessScope, BusinessAccessGrant, ContextGrant, EntityRef, Identity};
pub use permissions::{PermissionEntry, PermissionGrant, any_grant_matches, parse_grants};
pub use policy::RolePolicy;
pub use roles::{CanonicalRole, RoleRef, RoleToken};
