//! `opsdash-nav` — decides which navigation entries a caller may see.
//!
//! All stages are pure tree transforms: each takes a borrowed tree and returns
//! a new one. Run them in the order [`MenuPipeline`] does.

pub mod access;
pub mod module_gate;
pub mod node;
pub mod pipeline;
pub mod search;
pub mod source;

pub use access::{AccessDecision, AccessPolicy, AccessRule, elevated_role, filter_by_permission};
pub use module_gate::filter_by_module;
pub use node::{MenuNode, count_nodes};
pub use pipeline::{MenuPipeline, build_visible_menu};
pub use search::filter_by_query;
pub use source::{NavKey, NavigationTreeSource, StaticMenuSource};
