//! `opsdash` — multi-tenant dashboard policy engine.
//!
//! Decides, for one caller on one route, which role they act as, which
//! organization / business unit / outlet the view is scoped to, which feature
//! modules are on, and which navigation entries they may see.
//!
//! The stages live in their own crates; this crate wires them into a
//! per-session facade and carries the shared configuration.

pub mod config;
pub mod session;

pub use config::{CONFIG_ENV, DashboardConfig};
pub use session::{DashboardSession, DashboardView};

pub use opsdash_auth::{CanonicalRole, Classification, Identity, PermissionEntry, RoleClassifier};
pub use opsdash_context::{ActiveContext, BusinessUnit, ContextResolver};
pub use opsdash_core::{EnabledModules, RouteSignals};
pub use opsdash_nav::{MenuNode, StaticMenuSource, build_visible_menu};
