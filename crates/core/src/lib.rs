//! `opsdash-core` — shared primitives for tenant scoping and navigation policy.
//!
//! This crate contains **pure** value types (no IO, no storage).

pub mod error;
pub mod id;
pub mod modules;
pub mod route;

pub use error::{DomainError, DomainResult};
pub use id::{BusinessUnitRef, OrganizationId, OutletId, sanitize_identifier};
pub use modules::EnabledModules;
pub use route::{RouteSignals, UnitRouteRules, UnitSource};
