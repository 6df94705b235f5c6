//! Session
//!
//! Process-wide authentication state and the guard protected views use.
//!
//! ## Architecture
//!
//! - **SessionStore**: owns the current identity, the loading flag and the
//!   last error; every auth operation goes through it
//! - **guard**: maps a snapshot to allow / wait / redirect
//! - **AuthError**: normalized `{message, code}` failure

mod access;
mod error;
mod store;

pub use access::{guard, redirect_authenticated, GuardDecision};
pub use error::{AuthError, INVALID_CREDENTIALS, UNKNOWN_ERROR};
pub use store::{SessionConfig, SessionPhase, SessionSnapshot, SessionStore};
