// ── Authenticator ──
//
// Decides whether a login may be attempted at all, runs the
// challenge-response handshake, and records the outcome in `AuthState`.
// Only real rejections move the failure counter; transport errors leave
// the state exactly as it was.

mod state;

pub use state::{AuthState, LOCKOUT_SECS, MAX_LOGIN_ATTEMPTS};

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use ztewatch_api::{LoginReply, RouterClient, challenge_response};

/// Result of [`Authenticator::ensure_authenticated`].
#[derive(Debug)]
pub enum AuthOutcome {
    /// A session token was already held; no network call was made.
    AlreadyValid,
    /// A fresh login succeeded.
    Reauthenticated,
    /// Logins are suppressed until `until`; no network call was made.
    LockedOut { until: DateTime<Utc> },
    /// No usable session this time.
    Failed(AuthFailure),
}

/// Why [`AuthOutcome::Failed`] happened.
#[derive(Debug)]
pub enum AuthFailure {
    /// No password configured; nothing was sent.
    NoCredentials,
    /// The router rejected the credential.
    Rejected { message: Option<String> },
    /// Challenge or login call failed below the auth layer.
    Transport(ztewatch_api::Error),
}

/// Challenge-response login against one router.
#[derive(Debug)]
pub struct Authenticator {
    password: Option<SecretString>,
}

impl Authenticator {
    pub fn new(password: Option<SecretString>) -> Self {
        Self { password }
    }

    /// Make sure `state` holds a session token, logging in if needed.
    ///
    /// Never touches the network during an active lockout or when no
    /// password is configured.
    pub async fn ensure_authenticated(
        &self,
        client: &RouterClient,
        state: &mut AuthState,
    ) -> AuthOutcome {
        let now = Utc::now();

        if state.expire_lockout(now) {
            info!("router login lockout elapsed");
        }
        if let Some(until) = state.lockout_until().filter(|_| state.is_locked_out(now)) {
            debug!(%until, "login suppressed during lockout");
            return AuthOutcome::LockedOut { until };
        }

        if state.has_session() {
            return AuthOutcome::AlreadyValid;
        }

        let Some(password) = self.password.as_ref() else {
            return AuthOutcome::Failed(AuthFailure::NoCredentials);
        };

        let info = match client.login_info().await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "could not fetch login challenge");
                return AuthOutcome::Failed(AuthFailure::Transport(e));
            }
        };

        let credential = challenge_response(password, &info.salt);

        match client.login(&credential).await {
            Ok(LoginReply::Accepted { session }) => {
                state.record_success(session);
                info!("authenticated to router");
                AuthOutcome::Reauthenticated
            }
            Ok(LoginReply::Rejected { failures, message }) => {
                state.record_rejection(failures, Utc::now());
                warn!(
                    attempt = state.failed_attempts(),
                    max = MAX_LOGIN_ATTEMPTS,
                    reason = message.as_deref().unwrap_or("unknown"),
                    "router rejected password"
                );
                if let Some(until) = state.lockout_until() {
                    warn!(%until, "login attempts exhausted; suppressing logins");
                }
                AuthOutcome::Failed(AuthFailure::Rejected { message })
            }
            Ok(LoginReply::Locked { remaining }) => {
                state.record_router_lockout(remaining, Utc::now());
                let until = state.lockout_until().unwrap_or(now);
                warn!(%until, "router reports login lockout");
                AuthOutcome::LockedOut { until }
            }
            Err(e) => {
                warn!(error = %e, "login call failed");
                AuthOutcome::Failed(AuthFailure::Transport(e))
            }
        }
    }
}
