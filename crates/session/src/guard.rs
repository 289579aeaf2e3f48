//! The re-authentication state machine.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use bureau_core::Role;

use crate::clock::Clock;
use crate::paths::ProtectedPaths;
use crate::store::{SessionStore, PASSWORD_TIMESTAMP_KEY};

/// A password validation is good for this long, and the same window bounds
/// inactivity before forced invalidation.
pub const REAUTH_WINDOW_MS: i64 = 300_000;

/// Authentication state of the guard.
///
/// `Bypassed` is entered once at construction for privileged roles and never
/// left; the challenge is never rendered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
    Bypassed,
}

/// User activity the guard listens to.
///
/// Pointer movement is deliberately not counted, to avoid resetting the
/// inactivity clock on every mouse twitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    PointerDown,
    KeyPress,
    Scroll,
    PointerMove,
}

/// Decision for an intercepted navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Session valid (or target unprotected, or role bypassed): navigate.
    Proceed,
    /// Cancel navigation, remember the target, show the password challenge.
    Challenge { target: String },
}

/// Result of an inactivity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Active,
    /// The inactivity window elapsed: the session was invalidated. When the
    /// user sat on a protected path, `redirect` carries the fallback path and
    /// `challenge` the path to re-open once the password is re-entered.
    Expired {
        redirect: Option<String>,
        challenge: Option<String>,
    },
}

/// Response of the backend password check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Transport-level failure of the password check.
#[derive(Debug, Error)]
#[error("password verification failed: {0}")]
pub struct VerifyError(pub String);

/// Seam to the backend's password-verification endpoint.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    async fn verify_password(&self, email: &str, password: &str)
        -> Result<VerifyResponse, VerifyError>;
}

/// Outcome of a password challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Password accepted; navigate to the previously pending target, if any.
    Granted { navigate_to: Option<String> },
    /// Password refused or the check could not be performed.
    Rejected { message: String },
}

/// Client-side re-authentication guard.
///
/// One instance per dashboard session. State is re-derived from the persisted
/// timestamp at construction, so a remount lands in the same state.
pub struct ReauthGuard {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    paths: ProtectedPaths,
    role: Role,
    fallback_path: String,
    state: AuthState,
    last_activity_ms: i64,
    pending_target: Option<String>,
}

impl ReauthGuard {
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        paths: ProtectedPaths,
        role: Role,
        fallback_path: impl Into<String>,
    ) -> Self {
        let now_ms = clock.now().timestamp_millis();
        let mut guard = Self {
            store,
            clock,
            paths,
            role,
            fallback_path: fallback_path.into(),
            state: AuthState::Unauthenticated,
            last_activity_ms: now_ms,
            pending_target: None,
        };
        if role.bypasses_reauth() {
            guard.state = AuthState::Bypassed;
        } else {
            guard.check_session();
        }
        guard
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn pending_target(&self) -> Option<&str> {
        self.pending_target.as_deref()
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.paths.is_protected(path)
    }

    /// Whether the persisted validation timestamp is still within the window.
    ///
    /// Also realigns the guard's authenticated flag with what it read, so two
    /// back-to-back calls without time passing return the same answer.
    pub fn check_session(&mut self) -> bool {
        if self.state == AuthState::Bypassed {
            return true;
        }

        let now_ms = self.clock.now().timestamp_millis();
        let valid = self
            .store
            .get(PASSWORD_TIMESTAMP_KEY)
            .and_then(|raw| raw.parse::<i64>().ok())
            .is_some_and(|ts| now_ms - ts < REAUTH_WINDOW_MS);

        self.state = if valid { AuthState::Authenticated } else { AuthState::Unauthenticated };
        valid
    }

    /// Record user activity. Pointer movement is ignored.
    pub fn record_activity(&mut self, kind: ActivityKind) {
        if kind == ActivityKind::PointerMove {
            return;
        }
        self.last_activity_ms = self.clock.now().timestamp_millis();
    }

    /// Intercept a click on a link to `target`.
    pub fn handle_navigation(&mut self, target: &str) -> NavigationDecision {
        if self.state == AuthState::Bypassed || !self.paths.is_protected(target) {
            return NavigationDecision::Proceed;
        }
        if self.check_session() {
            return NavigationDecision::Proceed;
        }

        tracing::debug!(target, "navigation intercepted, session re-entry required");
        self.pending_target = Some(target.to_string());
        NavigationDecision::Challenge { target: target.to_string() }
    }

    /// Apply the guard to the path the user is currently on (called once on
    /// mount). An invalid session on a protected path forces the fallback
    /// redirect and queues the challenge for the path that was active.
    pub fn enforce(&mut self, current_path: &str) -> TickOutcome {
        if self.state == AuthState::Bypassed {
            return TickOutcome::Active;
        }
        if self.check_session() || !self.paths.is_protected(current_path) {
            return TickOutcome::Active;
        }

        self.pending_target = Some(current_path.to_string());
        TickOutcome::Expired {
            redirect: Some(self.fallback_path.clone()),
            challenge: Some(current_path.to_string()),
        }
    }

    /// Periodic inactivity check.
    ///
    /// Once the window elapses the persisted timestamp is cleared and the
    /// internal activity clock is reset, so the monitor fires once per
    /// genuine inactivity stretch rather than every interval thereafter.
    pub fn tick(&mut self, current_path: &str) -> TickOutcome {
        if self.state == AuthState::Bypassed {
            return TickOutcome::Active;
        }

        let now_ms = self.clock.now().timestamp_millis();
        if now_ms - self.last_activity_ms < REAUTH_WINDOW_MS {
            return TickOutcome::Active;
        }

        tracing::info!(
            elapsed_ms = now_ms - self.last_activity_ms,
            "inactivity window elapsed, invalidating session"
        );
        self.store.clear(PASSWORD_TIMESTAMP_KEY);
        self.state = AuthState::Unauthenticated;
        self.last_activity_ms = now_ms;

        if self.paths.is_protected(current_path) {
            self.pending_target = Some(current_path.to_string());
            TickOutcome::Expired {
                redirect: Some(self.fallback_path.clone()),
                challenge: Some(current_path.to_string()),
            }
        } else {
            TickOutcome::Expired { redirect: None, challenge: None }
        }
    }

    /// Run the password challenge against the backend.
    ///
    /// On success the validation timestamp is persisted, the pending target
    /// is released for navigation, and the entry counts as activity. Failures
    /// (wrong password or transport) never escape as errors.
    pub async fn complete_challenge<V: PasswordVerifier + ?Sized>(
        &mut self,
        verifier: &V,
        email: &str,
        password: &str,
    ) -> ChallengeOutcome {
        match verifier.verify_password(email, password).await {
            Ok(VerifyResponse { success: true, .. }) => {
                let now = self.clock.now();
                self.store
                    .set(PASSWORD_TIMESTAMP_KEY, &now.timestamp_millis().to_string());
                self.state = AuthState::Authenticated;
                self.last_activity_ms = now.timestamp_millis();
                ChallengeOutcome::Granted { navigate_to: self.pending_target.take() }
            }
            Ok(VerifyResponse { success: false, message }) => ChallengeOutcome::Rejected {
                message: message.unwrap_or_else(|| "Mot de passe incorrect.".to_string()),
            },
            Err(err) => {
                tracing::warn!(error = %err, "password verification transport failure");
                ChallengeOutcome::Rejected {
                    message: "Une erreur est survenue. Veuillez réessayer.".to_string(),
                }
            }
        }
    }

    /// Dismiss the challenge without entering a password.
    ///
    /// Returns the fallback path when the user is currently on a protected
    /// page and must be moved off it.
    pub fn cancel_challenge(&mut self, current_path: &str) -> Option<String> {
        self.pending_target = None;
        if self.paths.is_protected(current_path) {
            Some(self.fallback_path.clone())
        } else {
            None
        }
    }
}
