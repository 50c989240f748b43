//! Session store: the single owner of "who is signed in".
//!
//! [`SessionStore`] is the cloneable handle views hold. [`SessionDriver`] is
//! the one task that mutates session state; it consumes user commands and
//! provider auth events from queues, so no provider callback ever re-enters
//! the store. Provider calls started by commands run alongside event handling
//! and are applied in the order they complete.

use crate::provider::{AuthProvider, AuthSubscription, ProfileStore};
use crate::resolver::{ProfileAbsent, ProfileResolver};
use futures::stream::{FuturesUnordered, StreamExt};
use shared_types::{
    AuthError, AuthEvent, Identity, NewProfile, ProfileFields, Registration, Role, SessionState,
    SignUpError, SignUpOutcome, UserProfile,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

enum Command {
    SignIn {
        email: String,
        password: String,
        reply: oneshot::Sender<Result<(), AuthError>>,
    },
    SignUp {
        email: String,
        password: String,
        fields: ProfileFields,
        reply: oneshot::Sender<Result<Registration, SignUpError>>,
    },
    SignOut {
        reply: oneshot::Sender<Result<(), AuthError>>,
    },
    Shutdown,
}

/// Handle to the session state and its operations.
#[derive(Clone)]
pub struct SessionStore {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SessionState>,
}

impl SessionStore {
    /// Create a store and the driver that must be spawned to serve it.
    ///
    /// The provider subscription is taken here, so events emitted before the
    /// driver first runs are queued rather than lost.
    pub fn start(
        auth: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> (SessionStore, SessionDriver) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::starting());
        let events = auth.on_auth_state_change();
        let (registrations, _) = watch::channel(0);

        let store = SessionStore {
            commands,
            state: state_rx,
        };
        let driver = SessionDriver {
            auth,
            resolver: ProfileResolver::new(profiles),
            events: Some(events),
            commands: command_rx,
            state: state_tx,
            resolution: None,
            operations: FuturesUnordered::new(),
            registrations,
            epoch: 0,
        };
        (store, driver)
    }

    /// Current snapshot.
    pub fn state(&self) -> SessionState {
        (*self.state.borrow()).clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Wait until no resolution is pending and return that state.
    pub async fn settled(&self) -> Result<SessionState, AuthError> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|state| !state.loading)
            .await
            .map_err(|_| AuthError::SessionClosed)?;
        Ok((*settled).clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.state.borrow().has_role(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.state.borrow().has_any_role(roles)
    }

    /// Check credentials with the provider.
    ///
    /// On success the identity is recorded and its profile resolution has
    /// started; `loading` stays true until that resolution completes.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::SignIn {
            email: email.to_string(),
            password: password.to_string(),
            reply,
        })?;
        answer.await.map_err(|_| AuthError::SessionClosed)?
    }

    /// Create a credential and its profile row.
    ///
    /// A credential that was created without its profile comes back as
    /// [`SignUpError::ProfileCreation`]. When the provider wants the email
    /// confirmed first, the registration is flagged and no one is signed in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        fields: ProfileFields,
    ) -> Result<Registration, SignUpError> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::SignUp {
            email: email.to_string(),
            password: password.to_string(),
            fields,
            reply,
        })?;
        answer.await.map_err(|_| AuthError::SessionClosed)?
    }

    /// Sign out with the provider. The state is signed out once this returns `Ok`.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::SignOut { reply })?;
        answer.await.map_err(|_| AuthError::SessionClosed)?
    }

    /// Stop the driver and release the provider subscription.
    pub fn teardown(&self) {
        if self.commands.send(Command::Shutdown).is_err() {
            tracing::debug!("Session driver already stopped");
        }
    }

    fn send(&self, command: Command) -> Result<(), AuthError> {
        self.commands
            .send(command)
            .map_err(|_| AuthError::SessionClosed)
    }
}

type ResolutionTask = Pin<Box<dyn Future<Output = Result<UserProfile, ProfileAbsent>> + Send>>;

/// Profile resolution in flight, tagged with the identity it was started for.
struct Resolution {
    user_id: String,
    epoch: u64,
    task: ResolutionTask,
}

struct Finished {
    user_id: String,
    epoch: u64,
    outcome: Result<UserProfile, ProfileAbsent>,
}

/// A provider call started by a command, carrying the caller's reply.
type Operation = Pin<Box<dyn Future<Output = Completed> + Send>>;

enum Completed {
    SignIn {
        result: Result<Identity, AuthError>,
        reply: oneshot::Sender<Result<(), AuthError>>,
    },
    SignUp {
        result: Result<Registration, SignUpError>,
        reply: oneshot::Sender<Result<Registration, SignUpError>>,
    },
    SignOut {
        result: Result<(), AuthError>,
        reply: oneshot::Sender<Result<(), AuthError>>,
    },
}

/// The task that owns session state. Spawn [`SessionDriver::run`] once.
pub struct SessionDriver {
    auth: Arc<dyn AuthProvider>,
    resolver: ProfileResolver,
    events: Option<AuthSubscription>,
    commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<SessionState>,
    resolution: Option<Resolution>,
    operations: FuturesUnordered<Operation>,
    /// Sign-ups still writing their profile row. Resolutions wait for zero so
    /// they never provision a default row over a registration.
    registrations: watch::Sender<usize>,
    /// Bumped whenever the current identity changes; stale results carry an older epoch.
    epoch: u64,
}

impl SessionDriver {
    /// Restore any existing session, then serve events and commands until
    /// teardown or until every handle is dropped.
    pub async fn run(mut self) {
        self.initialize().await;

        loop {
            tokio::select! {
                biased;

                event = next_event(&mut self.events) => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        tracing::warn!("Auth event stream closed");
                        self.events = None;
                    }
                },
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(completed) = self.operations.next() => self.complete(completed),
                finished = next_resolution(&mut self.resolution) => {
                    self.finish_resolution(finished);
                }
            }
        }

        if !self.operations.is_empty() {
            tracing::debug!(pending = self.operations.len(), "Abandoning in-flight provider calls");
        }
        if let Some(events) = self.events.take() {
            events.unsubscribe();
        }
        tracing::info!("Session driver stopped");
    }

    async fn initialize(&mut self) {
        match self.auth.get_session().await {
            Ok(Some(identity)) => {
                tracing::info!(user_id = %identity.id, "Restoring existing session");
                self.adopt(identity);
            }
            Ok(None) => {
                tracing::debug!("No existing session");
                self.clear();
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read existing session, starting signed out");
                self.clear();
            }
        }
    }

    fn handle_event(&mut self, event: AuthEvent) {
        tracing::debug!(event = ?event.kind, "Auth state changed");
        match event.identity {
            Some(identity) => self.adopt(identity),
            None => self.clear(),
        }
    }

    /// Start the provider call for `command`. Its result is applied by
    /// [`SessionDriver::complete`].
    fn handle_command(&mut self, command: Command) {
        let auth = self.auth.clone();
        let operation: Operation = match command {
            Command::SignIn {
                email,
                password,
                reply,
            } => Box::pin(async move {
                let result = auth.sign_in_with_password(&email, &password).await;
                Completed::SignIn { result, reply }
            }),
            Command::SignUp {
                email,
                password,
                fields,
                reply,
            } => {
                self.registrations.send_modify(|count| *count += 1);
                let profiles = self.resolver.store().clone();
                Box::pin(async move {
                    let result =
                        register(auth.as_ref(), profiles.as_ref(), &email, &password, fields).await;
                    Completed::SignUp { result, reply }
                })
            }
            Command::SignOut { reply } => Box::pin(async move {
                let result = auth.sign_out().await;
                Completed::SignOut { result, reply }
            }),
            Command::Shutdown => return,
        };
        self.operations.push(operation);
    }

    fn complete(&mut self, completed: Completed) {
        match completed {
            Completed::SignIn { result, reply } => {
                let result = match result {
                    Ok(identity) => {
                        tracing::info!(user_id = %identity.id, "Signed in");
                        self.adopt(identity);
                        Ok(())
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Sign-in rejected");
                        Err(err)
                    }
                };
                let _ = reply.send(result);
            }
            Completed::SignUp { result, reply } => {
                self.registrations
                    .send_modify(|count| *count = count.saturating_sub(1));
                let _ = reply.send(result);
            }
            Completed::SignOut { result, reply } => {
                let result = match result {
                    Ok(()) => {
                        tracing::info!("Signed out");
                        self.clear();
                        Ok(())
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Sign-out failed, keeping session");
                        Err(err)
                    }
                };
                let _ = reply.send(result);
            }
        }
    }

    /// Make `identity` current and resolve its profile.
    ///
    /// A repeated identity only refreshes the stored copy, unless its last
    /// resolution came up empty, in which case it gets a fresh attempt.
    fn adopt(&mut self, identity: Identity) {
        let (same_user, has_profile) = {
            let state = self.state.borrow();
            let same_user = state
                .identity
                .as_ref()
                .is_some_and(|current| current.id == identity.id);
            (same_user, state.profile.is_some())
        };
        let pending = self
            .resolution
            .as_ref()
            .is_some_and(|resolution| resolution.user_id == identity.id);

        if same_user && (has_profile || pending) {
            self.state.send_modify(|state| state.identity = Some(identity));
            return;
        }

        if let Some(superseded) = self.resolution.take() {
            tracing::debug!(user_id = %superseded.user_id, "Superseding in-flight profile resolution");
        }
        self.epoch += 1;

        let resolver = self.resolver.clone();
        let target = identity.clone();
        let mut registrations = self.registrations.subscribe();
        self.resolution = Some(Resolution {
            user_id: identity.id.clone(),
            epoch: self.epoch,
            task: Box::pin(async move {
                registrations_settled(&mut registrations).await;
                resolver.resolve(&target).await
            }),
        });

        tracing::debug!(user_id = %identity.id, "Resolving profile");
        self.publish(SessionState {
            identity: Some(identity),
            profile: None,
            loading: true,
        });
    }

    fn finish_resolution(&mut self, finished: Finished) {
        let current = self
            .state
            .borrow()
            .identity
            .as_ref()
            .map(|identity| identity.id == finished.user_id)
            .unwrap_or(false);
        if finished.epoch != self.epoch || !current {
            tracing::debug!(user_id = %finished.user_id, "Discarding stale profile resolution");
            return;
        }

        let profile = match finished.outcome {
            Ok(profile) => {
                tracing::info!(user_id = %profile.id, role = %profile.role, "Profile resolved");
                Some(profile)
            }
            Err(absent) => {
                tracing::warn!(user_id = %absent.user_id, cause = %absent.cause, "Signed in without a profile");
                None
            }
        };
        self.state.send_modify(|state| {
            state.profile = profile;
            state.loading = false;
            debug_assert!(state.is_consistent(), "profile does not match identity");
        });
    }

    fn clear(&mut self) {
        if let Some(dropped) = self.resolution.take() {
            tracing::debug!(user_id = %dropped.user_id, "Dropping in-flight profile resolution");
        }
        self.epoch += 1;
        self.publish(SessionState::signed_out());
    }

    fn publish(&self, state: SessionState) {
        debug_assert!(state.is_consistent(), "profile does not match identity");
        self.state.send_replace(state);
    }
}

/// Credential first, then the profile row. Provider events drive adopting
/// the new identity.
async fn register(
    auth: &dyn AuthProvider,
    profiles: &dyn ProfileStore,
    email: &str,
    password: &str,
    fields: ProfileFields,
) -> Result<Registration, SignUpError> {
    let outcome = auth.sign_up(email, password).await.map_err(|err| {
        tracing::warn!(error = %err, "Sign-up rejected");
        SignUpError::Auth(err)
    })?;
    let awaiting_confirmation = matches!(outcome, SignUpOutcome::AwaitingConfirmation(_));
    let identity = outcome.into_identity();

    let draft = NewProfile::registered(&identity, fields);
    match profiles.insert_profile(&draft).await {
        Ok(profile) => {
            tracing::info!(
                user_id = %identity.id,
                role = %profile.role,
                awaiting_confirmation,
                "Registered new account"
            );
            Ok(Registration {
                profile,
                awaiting_confirmation,
            })
        }
        Err(source) => {
            tracing::error!(
                user_id = %identity.id,
                error = %source,
                "Credential created but profile insert failed"
            );
            Err(SignUpError::ProfileCreation { identity, source })
        }
    }
}

/// Returns once no sign-up is between creating its credential and writing
/// its profile row.
async fn registrations_settled(registrations: &mut watch::Receiver<usize>) {
    loop {
        let busy = *registrations.borrow_and_update() > 0;
        if !busy || registrations.changed().await.is_err() {
            return;
        }
    }
}

async fn next_event(events: &mut Option<AuthSubscription>) -> Option<AuthEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

/// Completes when the tracked resolution does, leaving the slot empty.
/// Dropping this future leaves the resolution in place to be polled again.
async fn next_resolution(slot: &mut Option<Resolution>) -> Finished {
    let Some(resolution) = slot.as_mut() else {
        return std::future::pending().await;
    };
    let outcome = resolution.task.as_mut().await;
    let finished = Finished {
        user_id: resolution.user_id.clone(),
        epoch: resolution.epoch,
        outcome,
    };
    *slot = None;
    finished
}
