//! `opsdash-context` — resolves which tenant the current view is scoped to.
//!
//! Collaborators (persisted store, directory, notification sink) are traits so
//! the resolver stays synchronous and IO-free: remote lookups happen upstream
//! and arrive here as snapshots.

pub mod directory;
pub mod modules;
pub mod notify;
pub mod policy;
pub mod resolver;
pub mod store;

pub use directory::{BusinessUnit, Directory, DirectoryError, InMemoryDirectory, Organization, Outlet, UnavailableDirectory};
pub use modules::resolve_enabled_modules;
pub use notify::{ActiveUnitNotifier, ActiveUnitSink, NoopSink, RecordingSink, TracingSink};
pub use policy::{PersistedKeys, RoutePolicy};
pub use resolver::{ActiveContext, ContextResolver, visible_business_units};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
