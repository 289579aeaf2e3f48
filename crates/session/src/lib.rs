//! `bureau-session` — the re-authentication guard.
//!
//! Navigation into protected dashboard paths requires a recent password
//! re-entry: a persisted validation timestamp younger than five minutes.
//! Inactivity past the same window invalidates the session. The guard is a
//! client-side UX gate only; the API re-validates every privileged action
//! independently.
//!
//! All time and storage access goes through the injected [`Clock`] and
//! [`SessionStore`] seams, so the state machine is fully testable with
//! synthetic time.

pub mod clock;
pub mod guard;
pub mod monitor;
pub mod paths;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use guard::{
    ActivityKind, AuthState, ChallengeOutcome, NavigationDecision, PasswordVerifier, ReauthGuard,
    TickOutcome, VerifyError, VerifyResponse, REAUTH_WINDOW_MS,
};
pub use monitor::{spawn_monitor, MonitorHandle, CHECK_INTERVAL};
pub use paths::ProtectedPaths;
pub use store::{InMemorySessionStore, SessionStore, PASSWORD_TIMESTAMP_KEY};
