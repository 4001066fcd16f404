//! Access control: who is calling and where they may go.
//!
//! [`Identity`] is resolved from the request's session, [`RoutePolicy`]
//! classifies the path and [`AccessGate`] combines the two into a
//! [`Decision`]. The [`access_gate`] middleware enforces it in front of every
//! route.

mod gate;
mod identity;
mod policy;

pub use gate::{access_gate, AccessGate, Decision, DenyReason};
pub use identity::{Identity, ANONYMOUS_MARKER};
pub use policy::{
    AccessTier, RoutePolicy, RoutePolicyBuilder, DEFAULT_ANONYMOUS_PATHS, DEFAULT_BYPASS_PREFIX,
    DEFAULT_PUBLIC_PATHS,
};
