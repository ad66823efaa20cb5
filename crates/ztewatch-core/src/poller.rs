// ── Polling cycle ──
//
// One pass over the catalog, group by group, strictly sequential. Login
// happens at most once per cycle and only when an auth-required call is
// reached. A session the router rejects mid-cycle is dropped and the
// remaining auth-required calls are skipped; the next cycle logs in again.

use secrecy::SecretString;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use ztewatch_api::{RouterClient, TransportConfig};

use crate::auth::{AuthFailure, AuthOutcome, AuthState, Authenticator, MAX_LOGIN_ATTEMPTS};
use crate::catalog::{MethodCatalog, MetricGroup};
use crate::config::RouterConfig;
use crate::error::CoreError;
use crate::snapshot::{ErrorCause, GroupError, Snapshot, SnapshotBuilder};

/// Session availability within one cycle.
enum CycleSession {
    /// No auth-required call reached yet.
    Unresolved,
    /// `AuthState` holds a token the router has not refused this cycle.
    Ready,
    /// Auth-required calls are skipped for the rest of the cycle.
    Unavailable(GroupError),
}

/// Drives polling cycles against one router.
///
/// Owns the only [`AuthState`]. Cycles take `&mut self`, so two can never
/// overlap on the same poller.
pub struct Poller {
    client: RouterClient,
    authenticator: Authenticator,
    catalog: &'static MethodCatalog,
    auth: AuthState,
    cycles: u64,
}

impl Poller {
    /// Build a poller from runtime configuration.
    pub fn new(config: &RouterConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = RouterClient::new(config.endpoint.clone(), &transport)?;
        Ok(Self::with_client(client, config.password.clone()))
    }

    /// Build a poller around an existing client.
    pub fn with_client(client: RouterClient, password: Option<SecretString>) -> Self {
        Self {
            client,
            authenticator: Authenticator::new(password),
            catalog: MethodCatalog::global(),
            auth: AuthState::new(),
            cycles: 0,
        }
    }

    pub fn auth_state(&self) -> &AuthState {
        &self.auth
    }

    /// Run one polling cycle.
    ///
    /// Always yields a snapshot; failures are recorded per group.
    pub async fn run_cycle(&mut self) -> Snapshot {
        self.cycles += 1;
        let mut builder = SnapshotBuilder::new(self.cycles);
        let mut session = CycleSession::Unresolved;
        let catalog = self.catalog;

        for group in MetricGroup::iter() {
            let mut failure: Option<GroupError> = None;

            for descriptor in catalog.variants(group) {
                if descriptor.requires_auth {
                    if let CycleSession::Unresolved = session {
                        session = self.resolve_session().await;
                    }
                    if let CycleSession::Unavailable(ref err) = session {
                        failure = Some(err.clone());
                        continue;
                    }
                }

                let token = if descriptor.requires_auth {
                    self.auth.session_token()
                } else {
                    None
                };

                let result = self
                    .client
                    .call(descriptor.object, descriptor.method, &descriptor.args, token)
                    .await;

                match result {
                    Ok(payload) => match builder.populate(group, descriptor.name(), payload) {
                        Ok(()) => {
                            if descriptor.requires_auth {
                                builder.mark_authenticated();
                            }
                            failure = None;
                            break;
                        }
                        Err(err) => failure = Some(err),
                    },
                    Err(err) if descriptor.requires_auth && err.is_unauthorized() => {
                        if self.auth.invalidate_session() {
                            info!(method = %descriptor.name(), "router rejected session; will log in next cycle");
                        }
                        let err = GroupError::new(
                            ErrorCause::Unauthorized,
                            format!("session rejected by router: {err}"),
                        );
                        session = CycleSession::Unavailable(err.clone());
                        failure = Some(err);
                    }
                    Err(err) => {
                        debug!(method = %descriptor.name(), error = %err, "call failed");
                        failure = Some(GroupError::from_api(&err));
                    }
                }
            }

            if let Some(err) = failure {
                debug!(%group, cause = %err.cause, "group unavailable this cycle");
                builder.fail(group, err);
            }
        }

        let snapshot = builder.finish();
        debug!(
            endpoint = %self.client.endpoint(),
            cycle = snapshot.cycle,
            failed = snapshot.group_errors.len(),
            authenticated = snapshot.authenticated,
            "polling cycle complete"
        );
        snapshot
    }

    async fn resolve_session(&mut self) -> CycleSession {
        let outcome = self
            .authenticator
            .ensure_authenticated(&self.client, &mut self.auth)
            .await;

        match outcome {
            AuthOutcome::AlreadyValid | AuthOutcome::Reauthenticated => CycleSession::Ready,
            AuthOutcome::LockedOut { until } => CycleSession::Unavailable(GroupError::new(
                ErrorCause::LockedOut,
                format!("router login locked until {until}"),
            )),
            AuthOutcome::Failed(AuthFailure::NoCredentials) => CycleSession::Unavailable(
                GroupError::new(ErrorCause::NoCredentials, "no router password configured"),
            ),
            AuthOutcome::Failed(AuthFailure::Rejected { message }) => {
                let mut text = format!(
                    "login rejected ({}/{MAX_LOGIN_ATTEMPTS})",
                    self.auth.failed_attempts()
                );
                if let Some(reason) = message {
                    text.push_str(": ");
                    text.push_str(&reason);
                }
                CycleSession::Unavailable(GroupError::new(ErrorCause::Unauthorized, text))
            }
            AuthOutcome::Failed(AuthFailure::Transport(err)) => {
                CycleSession::Unavailable(GroupError::from_api(&err))
            }
        }
    }
}
