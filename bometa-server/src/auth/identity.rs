//! Caller identity derived from session state.

use crate::session::Session;

/// Subject prefix reserved for anonymous clients.
pub const ANONYMOUS_MARKER: &str = "client|";

/// Who is making a request.
///
/// Built fresh for every request and never written back to the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// No usable user record in the session.
    Absent,
    /// A client-issued identity whose subject carries the anonymous marker.
    Anonymous { subject: String },
    /// A registered user.
    Authenticated { subject: String },
}

impl Identity {
    /// Resolve the identity for a request using the default anonymous marker.
    pub fn resolve(session: Option<&Session>) -> Self {
        Self::resolve_with_marker(session, ANONYMOUS_MARKER)
    }

    /// Resolve the identity for a request.
    ///
    /// Never fails: a missing session, a missing or non-object user record,
    /// or a missing, non-string or empty `sub` all resolve to `Absent`.
    pub fn resolve_with_marker(session: Option<&Session>, marker: &str) -> Self {
        session
            .and_then(Session::user)
            .and_then(|user| user.get("sub"))
            .and_then(|sub| sub.as_str())
            .map(|subject| Self::from_subject_with_marker(subject, marker))
            .unwrap_or(Identity::Absent)
    }

    /// Classify a bare subject using the default anonymous marker.
    pub fn from_subject(subject: &str) -> Self {
        Self::from_subject_with_marker(subject, ANONYMOUS_MARKER)
    }

    pub fn from_subject_with_marker(subject: &str, marker: &str) -> Self {
        if subject.is_empty() {
            Identity::Absent
        } else if !marker.is_empty() && subject.starts_with(marker) {
            Identity::Anonymous {
                subject: subject.to_string(),
            }
        } else {
            Identity::Authenticated {
                subject: subject.to_string(),
            }
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            Identity::Absent => None,
            Identity::Anonymous { subject } | Identity::Authenticated { subject } => Some(subject),
        }
    }

    /// Short label for logs. Never includes the subject.
    pub fn kind(&self) -> &'static str {
        match self {
            Identity::Absent => "absent",
            Identity::Anonymous { .. } => "anonymous",
            Identity::Authenticated { .. } => "authenticated",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Identity::Absent)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous { .. })
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated { .. })
    }
}
