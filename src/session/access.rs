//! Route guard
//!
//! Decides whether a protected view may render for the current session.

use super::store::SessionSnapshot;
use crate::identity::Identity;

/// Outcome of guarding a protected view
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Signed in; render the view for this identity
    Allow(Identity),
    /// Session check still running; render a loading indicator
    Loading,
    /// Nobody signed in; go to `/login`
    RedirectToLogin,
}

/// Guard a protected view.
///
/// While loading without an identity the view neither renders nor
/// redirects, so a page refresh never bounces a signed-in user to `/login`.
pub fn guard(snapshot: &SessionSnapshot) -> GuardDecision {
    match (&snapshot.identity, snapshot.loading) {
        (Some(identity), _) => GuardDecision::Allow(identity.clone()),
        (None, true) => GuardDecision::Loading,
        (None, false) => GuardDecision::RedirectToLogin,
    }
}

/// True when a public auth page (`/login`) should send the visitor on to
/// `/dashboard` instead
pub fn redirect_authenticated(snapshot: &SessionSnapshot) -> bool {
    snapshot.identity.is_some()
}
