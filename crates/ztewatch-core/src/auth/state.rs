// ── Session and lockout bookkeeping ──
//
// Pure data plus transition rules. Every transition takes `now` so the
// lockout arithmetic stays out of the clock's hands.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;

/// Consecutive rejections after which the router locks logins.
pub const MAX_LOGIN_ATTEMPTS: u8 = 5;

/// How long the router refuses logins once locked.
pub const LOCKOUT_SECS: i64 = 5 * 60;

/// Authentication state for one router, held in memory for the process
/// lifetime.
///
/// `failed_attempts >= MAX_LOGIN_ATTEMPTS` always comes with a
/// `lockout_until`; the two only change together.
#[derive(Debug, Default)]
pub struct AuthState {
    session: Option<SecretString>,
    failed_attempts: u8,
    lockout_until: Option<DateTime<Utc>>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current session token, if the last login succeeded and the
    /// router has not rejected it since.
    pub fn session_token(&self) -> Option<&SecretString> {
        self.session.as_ref()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn failed_attempts(&self) -> u8 {
        self.failed_attempts
    }

    pub fn lockout_until(&self) -> Option<DateTime<Utc>> {
        self.lockout_until
    }

    /// `true` while a lockout deadline lies in the future.
    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_until.is_some_and(|until| until > now)
    }

    /// Forget an elapsed lockout and start counting from zero again.
    ///
    /// Returns `true` if a lockout was cleared.
    pub fn expire_lockout(&mut self, now: DateTime<Utc>) -> bool {
        match self.lockout_until {
            Some(until) if until <= now => {
                self.lockout_until = None;
                self.failed_attempts = 0;
                true
            }
            _ => false,
        }
    }

    /// A login succeeded.
    pub fn record_success(&mut self, session: SecretString) {
        self.session = Some(session);
        self.failed_attempts = 0;
        self.lockout_until = None;
    }

    /// The router rejected the credential.
    ///
    /// `reported` is the router's own failure count, when it sends one; the
    /// higher of the two wins so a restart cannot undercount.
    pub fn record_rejection(&mut self, reported: Option<u32>, now: DateTime<Utc>) {
        self.session = None;

        let local = self.failed_attempts.saturating_add(1);
        let reported = reported
            .map(|n| u8::try_from(n).unwrap_or(u8::MAX))
            .unwrap_or(0);
        self.failed_attempts = local.max(reported).min(MAX_LOGIN_ATTEMPTS);

        if self.failed_attempts >= MAX_LOGIN_ATTEMPTS {
            self.lockout_until = Some(now + TimeDelta::seconds(LOCKOUT_SECS));
        }
    }

    /// The router says it is locked, optionally with its remaining countdown.
    ///
    /// A countdown that does not fit the calendar falls back to the local
    /// lockout period.
    pub fn record_router_lockout(&mut self, remaining: Option<Duration>, now: DateTime<Utc>) {
        let until = remaining
            .and_then(|d| TimeDelta::from_std(d).ok())
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or_else(|| now + TimeDelta::seconds(LOCKOUT_SECS));

        self.session = None;
        self.failed_attempts = MAX_LOGIN_ATTEMPTS;
        self.lockout_until = Some(until);
    }

    /// The router refused the current token. Returns `true` if one was held.
    pub fn invalidate_session(&mut self) -> bool {
        self.session.take().is_some()
    }
}
