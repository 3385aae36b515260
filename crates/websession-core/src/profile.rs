use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::api::UserProfile;
use crate::error::SessionError;

/// What started the in-flight profile initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializationKind {
    Login,
    SessionCheck,
}

#[derive(Debug, Clone)]
enum Resolution {
    Pending,
    Resolved(Option<UserProfile>),
}

#[derive(Debug)]
enum ProfileState {
    Idle {
        profile: Option<UserProfile>,
    },
    Initializing {
        generation: u64,
        kind: InitializationKind,
        sender: watch::Sender<Resolution>,
    },
}

#[derive(Debug)]
struct Inner {
    state: ProfileState,
    generation: u64,
}

/// Holds the current user profile and the single in-flight initialization, if any.
#[derive(Debug, Clone)]
pub struct ProfileHandler {
    inner: Arc<Mutex<Inner>>,
}

impl Default for ProfileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileHandler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: ProfileState::Idle { profile: None },
                generation: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts an initialization. Only one may be in flight at a time.
    pub fn initialization_starts(
        &self,
        kind: InitializationKind,
    ) -> Result<InitializationTicket, SessionError> {
        let mut inner = self.lock();
        if let ProfileState::Initializing { kind: running, .. } = &inner.state {
            debug!(event = "profile_init_rejected", requested = ?kind, running = ?running);
            return Err(SessionError::InitializationInProgress);
        }
        inner.generation += 1;
        let generation = inner.generation;
        let (sender, _) = watch::channel(Resolution::Pending);
        inner.state = ProfileState::Initializing {
            generation,
            kind,
            sender,
        };
        debug!(event = "profile_init_started", generation, kind = ?kind);
        Ok(InitializationTicket {
            handler: self.clone(),
            generation,
            finished: false,
        })
    }

    fn finish(&self, generation: u64, profile: Option<UserProfile>) {
        let mut inner = self.lock();
        match &inner.state {
            ProfileState::Initializing {
                generation: current,
                sender,
                ..
            } if *current == generation => {
                sender.send_replace(Resolution::Resolved(profile.clone()));
            }
            _ => {
                debug!(event = "profile_init_stale", generation);
                return;
            }
        }
        debug!(
            event = "profile_init_finished",
            generation,
            resolved = profile.is_some()
        );
        inner.state = ProfileState::Idle { profile };
    }

    /// Forgets the stored profile. An in-flight initialization is left alone.
    pub fn user_logged_off(&self) {
        let mut inner = self.lock();
        if let ProfileState::Idle { profile } = &mut inner.state {
            *profile = None;
        }
    }

    /// Joins the in-flight initialization, or returns the current profile.
    pub fn get_profile(&self) -> ProfileHandle {
        let inner = self.lock();
        match &inner.state {
            ProfileState::Idle { profile } => ProfileHandle(HandleState::Ready(profile.clone())),
            ProfileState::Initializing { sender, .. } => {
                ProfileHandle(HandleState::Pending(sender.subscribe()))
            }
        }
    }

    pub fn initializing(&self) -> Option<InitializationKind> {
        match &self.lock().state {
            ProfileState::Initializing { kind, .. } => Some(*kind),
            ProfileState::Idle { .. } => None,
        }
    }

    pub fn has_profile(&self) -> bool {
        matches!(
            &self.lock().state,
            ProfileState::Idle { profile: Some(_) }
        )
    }
}

/// Exclusive right to complete one initialization.
///
/// Dropping the ticket without calling `succeeded` or `failed` fails the
/// initialization, so waiters are released when the owning future is cancelled.
#[derive(Debug)]
#[must_use = "an unfinished ticket fails the initialization when dropped"]
pub struct InitializationTicket {
    handler: ProfileHandler,
    generation: u64,
    finished: bool,
}

impl InitializationTicket {
    pub fn succeeded(mut self, profile: UserProfile) {
        self.finished = true;
        self.handler.finish(self.generation, Some(profile));
    }

    pub fn failed(mut self) {
        self.finished = true;
        self.handler.finish(self.generation, None);
    }
}

impl Drop for InitializationTicket {
    fn drop(&mut self) {
        if !self.finished {
            debug!(event = "profile_init_abandoned", generation = self.generation);
            self.handler.finish(self.generation, None);
        }
    }
}

/// Eventual profile as seen at the time `get_profile` was called.
///
/// Resolves to `None` when no user is logged in; it never fails.
#[derive(Debug)]
pub struct ProfileHandle(HandleState);

#[derive(Debug)]
enum HandleState {
    Ready(Option<UserProfile>),
    Pending(watch::Receiver<Resolution>),
}

impl ProfileHandle {
    pub fn is_pending(&self) -> bool {
        matches!(self.0, HandleState::Pending(_))
    }

    pub async fn resolve(self) -> Option<UserProfile> {
        match self.0 {
            HandleState::Ready(profile) => profile,
            HandleState::Pending(mut receiver) => {
                let resolved = receiver
                    .wait_for(|resolution| matches!(resolution, Resolution::Resolved(_)))
                    .await;
                match resolved.as_deref() {
                    Ok(Resolution::Resolved(profile)) => profile.clone(),
                    _ => None,
                }
            }
        }
    }
}

impl IntoFuture for ProfileHandle {
    type Output = Option<UserProfile>;
    type IntoFuture = Pin<Box<dyn Future<Output = Option<UserProfile>> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.resolve())
    }
}
