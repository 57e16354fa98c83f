//! Route signals: the current path plus router-supplied parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sanitize_identifier;

/// Snapshot of what the router knows about the current view.
///
/// `params` are named path parameters extracted by the router (e.g.
/// `businessUnitSlug`); `query` holds decoded query-string values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSignals {
    pub path: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

impl RouteSignals {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse a request target such as `/acme-shop/outlets/o-1?outlet=o-2`.
    ///
    /// Query values are percent-decoded; when a key repeats, the first value wins.
    pub fn parse(target: &str) -> Self {
        let target = target.split('#').next().unwrap_or_default();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };

        let mut signals = Self::new(path);
        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                signals
                    .query
                    .entry(key.into_owned())
                    .or_insert_with(|| value.into_owned());
            }
        }
        signals
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Non-empty path segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    pub fn first_segment(&self) -> Option<&str> {
        self.segments().next()
    }

    /// The segment immediately following the first occurrence of `marker`.
    pub fn segment_after(&self, marker: &str) -> Option<&str> {
        let mut segments = self.segments();
        segments.by_ref().find(|s| s.eq_ignore_ascii_case(marker))?;
        segments.next()
    }

    /// Raw path parameter value (unsanitized).
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Raw query value (unsanitized).
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Whether the path starts with every segment of `prefix`.
    ///
    /// Matching is per segment, so `/super-admin-tools` is not rooted at `/super-admin`.
    pub fn is_rooted_at(&self, prefix: &str) -> bool {
        let wanted: Vec<&str> = prefix.split('/').filter(|s| !s.is_empty()).collect();
        if wanted.is_empty() {
            return false;
        }
        let mut actual = self.segments();
        wanted.iter().all(|w| {
            actual
                .next()
                .is_some_and(|a| a.eq_ignore_ascii_case(w))
        })
    }
}

/// Where a route candidate for the business unit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSource {
    Param,
    Path,
}

/// Which parts of a route may name a business unit.
///
/// Shared by role classification and context resolution so both read the
/// same unit off a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitRouteRules {
    /// Accepted path-parameter names carrying a business unit slug or id, in priority order.
    pub unit_params: Vec<String>,
    /// First segments that name platform modules, never tenants.
    pub reserved_segments: Vec<String>,
    /// First segments that open global (tenant-less) areas.
    pub global_roots: Vec<String>,
}

impl Default for UnitRouteRules {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            unit_params: names(&["businessUnitSlug", "slug"]),
            reserved_segments: names(&[
                "reports",
                "settings",
                "users",
                "roles",
                "organizations",
                "business-units",
                "outlets",
                "modules",
                "profile",
                "notifications",
                "billing",
                "help",
            ]),
            global_roots: names(&["super-admin", "login", "logout", "register", "account", "onboarding"]),
        }
    }
}

impl UnitRouteRules {
    /// Whether a first path segment can name a tenant.
    pub fn is_tenant_segment(&self, segment: &str) -> bool {
        let is_listed = |list: &[String]| list.iter().any(|s| s.eq_ignore_ascii_case(segment));
        !is_listed(&self.reserved_segments) && !is_listed(&self.global_roots)
    }

    /// The business unit the route names, if any.
    ///
    /// The first accepted parameter that sanitizes to a value wins; otherwise a
    /// first segment that is neither reserved nor a global root.
    pub fn unit_candidate<'a>(&self, route: &'a RouteSignals) -> Option<(&'a str, UnitSource)> {
        for name in &self.unit_params {
            if let Some(raw) = route.param(name) {
                match sanitize_identifier(raw) {
                    Some(value) => return Some((value, UnitSource::Param)),
                    None => tracing::debug!(param = %name, raw, "ignoring malformed business unit parameter"),
                }
            }
        }

        route
            .first_segment()
            .filter(|segment| self.is_tenant_segment(segment))
            .and_then(sanitize_identifier)
            .map(|value| (value, UnitSource::Path))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
