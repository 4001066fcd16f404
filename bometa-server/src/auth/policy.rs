//! Route policy table: which identities may reach which paths.

use std::collections::BTreeSet;

use super::identity::ANONYMOUS_MARKER;

/// Paths anyone may reach, signed in or not.
pub const DEFAULT_PUBLIC_PATHS: [&str; 6] = [
    "/favicon.ico",
    "/api/health_checker",
    "/api/bot/list",
    "/api/bot/detail",
    "/api/github/app/webhook",
    "/app/installation/callback",
];

/// Paths anonymous clients may reach in addition to the public ones.
pub const DEFAULT_ANONYMOUS_PATHS: [&str; 2] = ["/api/chat/qa", "/api/chat/stream_qa"];

/// Prefix owned by the authentication subsystem.
pub const DEFAULT_BYPASS_PREFIX: &str = "/api/auth";

/// Least privileged identity a path admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessTier {
    /// Owned by the auth subsystem; the gate does not look at it.
    Bypass,
    /// Reachable without any identity.
    Public,
    /// Reachable by anonymous clients and registered users.
    Anonymous,
    /// Registered users only.
    Authenticated,
}

/// Immutable classification of request paths.
///
/// Public and anonymous paths match exactly (no trailing-slash or case
/// folding). Anything unlisted requires an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    public_paths: BTreeSet<String>,
    anonymous_paths: BTreeSet<String>,
    bypass_prefix: Option<String>,
    anonymous_marker: String,
}

impl RoutePolicy {
    pub fn builder() -> RoutePolicyBuilder {
        RoutePolicyBuilder::default()
    }

    /// Required tier for `path`.
    ///
    /// Checked in order: bypass prefix (plain `starts_with`), public set,
    /// anonymous set, default.
    pub fn tier(&self, path: &str) -> AccessTier {
        if self
            .bypass_prefix
            .as_deref()
            .is_some_and(|prefix| path.starts_with(prefix))
        {
            AccessTier::Bypass
        } else if self.public_paths.contains(path) {
            AccessTier::Public
        } else if self.anonymous_paths.contains(path) {
            AccessTier::Anonymous
        } else {
            AccessTier::Authenticated
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }

    pub fn permits_anonymous(&self, path: &str) -> bool {
        self.anonymous_paths.contains(path)
    }

    pub fn public_paths(&self) -> impl Iterator<Item = &str> {
        self.public_paths.iter().map(String::as_str)
    }

    pub fn anonymous_paths(&self) -> impl Iterator<Item = &str> {
        self.anonymous_paths.iter().map(String::as_str)
    }

    /// Plain string prefix whose paths skip the gate. Not segment-aware, see
    /// [`RoutePolicyBuilder::bypass_prefix`].
    pub fn bypass_prefix(&self) -> Option<&str> {
        self.bypass_prefix.as_deref()
    }

    pub fn anonymous_marker(&self) -> &str {
        &self.anonymous_marker
    }
}

impl Default for RoutePolicy {
    /// The lists the gateway ships with.
    fn default() -> Self {
        RoutePolicy::builder()
            .public_paths(DEFAULT_PUBLIC_PATHS)
            .anonymous_paths(DEFAULT_ANONYMOUS_PATHS)
            .bypass_prefix(DEFAULT_BYPASS_PREFIX)
            .build()
    }
}

/// Builder for [`RoutePolicy`]. Starts empty: no public or anonymous paths,
/// no bypass prefix, the default anonymous marker.
#[derive(Debug, Clone)]
pub struct RoutePolicyBuilder {
    public_paths: BTreeSet<String>,
    anonymous_paths: BTreeSet<String>,
    bypass_prefix: Option<String>,
    anonymous_marker: String,
}

impl Default for RoutePolicyBuilder {
    fn default() -> Self {
        Self {
            public_paths: BTreeSet::new(),
            anonymous_paths: BTreeSet::new(),
            bypass_prefix: None,
            anonymous_marker: ANONYMOUS_MARKER.to_string(),
        }
    }
}

impl RoutePolicyBuilder {
    pub fn public_path(mut self, path: impl Into<String>) -> Self {
        self.public_paths.insert(path.into());
        self
    }

    pub fn public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn anonymous_path(mut self, path: impl Into<String>) -> Self {
        self.anonymous_paths.insert(path.into());
        self
    }

    pub fn anonymous_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.anonymous_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Hand every path starting with `prefix` to the auth subsystem. An
    /// empty prefix disables the bypass.
    ///
    /// The match is a plain string prefix and does not respect path
    /// segments: `/api/auth` also bypasses `/api/authorize` and
    /// `/api/authors`. End the prefix with `/` to stop at a segment.
    pub fn bypass_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.bypass_prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    pub fn anonymous_marker(mut self, marker: impl Into<String>) -> Self {
        self.anonymous_marker = marker.into();
        self
    }

    pub fn build(self) -> RoutePolicy {
        RoutePolicy {
            public_paths: self.public_paths,
            anonymous_paths: self.anonymous_paths,
            bypass_prefix: self.bypass_prefix,
            anonymous_marker: self.anonymous_marker,
        }
    }
}
