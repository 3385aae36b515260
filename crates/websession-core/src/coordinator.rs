use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{CsrfToken, UserProfile};
use crate::collaborators::{AppContext, AuthApi};
use crate::csrf::{CsrfProtection, CsrfTokenView};
use crate::error::SessionError;
use crate::headers::DefaultHeaders;
use crate::profile::{InitializationKind, InitializationTicket, ProfileHandle, ProfileHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    LoggedOut,
    LoginInProgress,
    CheckingExistingSession,
    LoggedIn,
    LogoffInProgress,
}

/// Client-side session state: the user profile, the CSRF token and the
/// default headers that carry it.
pub struct SessionCoordinator {
    auth: Arc<dyn AuthApi>,
    app_context: Arc<dyn AppContext>,
    headers: DefaultHeaders,
    csrf: CsrfProtection,
    profile: ProfileHandler,
    logoffs_in_flight: AtomicUsize,
}

impl SessionCoordinator {
    pub fn new(
        auth: Arc<dyn AuthApi>,
        app_context: Arc<dyn AppContext>,
        headers: DefaultHeaders,
    ) -> Self {
        Self {
            auth,
            app_context,
            headers,
            csrf: CsrfProtection::new(),
            profile: ProfileHandler::new(),
            logoffs_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn headers(&self) -> &DefaultHeaders {
        &self.headers
    }

    pub fn status(&self) -> SessionStatus {
        if self.logoffs_in_flight.load(Ordering::SeqCst) > 0 {
            return SessionStatus::LogoffInProgress;
        }
        match self.profile.initializing() {
            Some(InitializationKind::Login) => SessionStatus::LoginInProgress,
            Some(InitializationKind::SessionCheck) => SessionStatus::CheckingExistingSession,
            None if self.profile.has_profile() => SessionStatus::LoggedIn,
            None => SessionStatus::LoggedOut,
        }
    }

    pub async fn log_in(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let ticket = self
            .profile
            .initialization_starts(InitializationKind::Login)?;

        if let Err(err) = self.auth.login(username, password).await {
            warn!(event = "login_failed", username, error = %err);
            ticket.failed();
            return Err(SessionError::AuthenticationFailed);
        }

        let joined = tokio::try_join!(
            async { self.auth.current_user().await.map_err(SessionError::from) },
            self.enable_csrf_protection()
        );
        match joined {
            Ok((profile, _)) => {
                ticket.succeeded(profile.clone());
                self.app_context.on_logging_in(&profile);
                info!(event = "login_succeeded", username);
                Ok(())
            }
            Err(err) => {
                warn!(event = "login_initialization_failed", username, error = %err);
                ticket.failed();
                Err(err)
            }
        }
    }

    /// Logs off on the server, then clears the local session.
    ///
    /// A failing logout is returned as is and the local session stays untouched.
    pub async fn log_off(&self) -> Result<(), SessionError> {
        let _logoff = LogoffGuard::enter(&self.logoffs_in_flight);
        if let Err(err) = self.auth.logout().await {
            warn!(event = "logout_failed", error = %err);
            return Err(err.into());
        }
        self.csrf.invalidate();
        self.profile.user_logged_off();
        self.app_context.on_logging_off();
        info!(event = "logout_succeeded");
        Ok(())
    }

    pub fn current_csrf_token(&self) -> CsrfTokenView {
        self.csrf.view()
    }

    /// Re-validates an existing server session and, if there is one, restores the
    /// profile and CSRF token. Failures leave the user logged out and are not reported.
    pub async fn check_logged_in_and_reinitialize_app_context(&self) {
        if let Some(ticket) = self.begin_session_check() {
            self.finish_session_check(ticket).await;
        }
    }

    /// Fire-and-forget variant of [`Self::check_logged_in_and_reinitialize_app_context`].
    ///
    /// The check is registered before this returns, so a following
    /// `current_user_profile` call waits for its outcome.
    pub fn spawn_session_check(self: &Arc<Self>) -> JoinHandle<()> {
        let ticket = self.begin_session_check();
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            if let Some(ticket) = ticket {
                coordinator.finish_session_check(ticket).await;
            }
        })
    }

    pub fn current_user_profile(&self) -> ProfileHandle {
        self.profile.get_profile()
    }

    fn begin_session_check(&self) -> Option<InitializationTicket> {
        match self
            .profile
            .initialization_starts(InitializationKind::SessionCheck)
        {
            Ok(ticket) => Some(ticket),
            Err(_) => {
                debug!(event = "session_check_joined");
                None
            }
        }
    }

    async fn finish_session_check(&self, ticket: InitializationTicket) {
        let profile: UserProfile = match self.auth.current_user().await {
            Ok(profile) => profile,
            Err(err) => {
                debug!(event = "session_check_no_session", error = %err);
                ticket.failed();
                return;
            }
        };
        if let Err(err) = self.enable_csrf_protection().await {
            debug!(event = "session_check_csrf_failed", error = %err);
            ticket.failed();
            return;
        }
        ticket.succeeded(profile.clone());
        self.app_context.on_logging_in(&profile);
        info!(event = "session_restored", user = profile.display_name());
    }

    /// Only reached while holding an initialization ticket, so acquisitions never
    /// overlap.
    async fn enable_csrf_protection(&self) -> Result<CsrfToken, SessionError> {
        let token = self.auth.csrf_token().await.map_err(|err| {
            warn!(event = "csrf_request_failed", error = %err);
            SessionError::CsrfAcquisitionFailed
        })?;

        self.headers
            .install_csrf(&token.header_name, &token.token)
            .map_err(|err| {
                warn!(event = "csrf_header_rejected", error = %err);
                SessionError::CsrfAcquisitionFailed
            })?;
        self.csrf.set(&token.header_name, &token.token);
        debug!(event = "csrf_enabled", header = %token.header_name);
        Ok(token)
    }
}

struct LogoffGuard<'a>(&'a AtomicUsize);

impl<'a> LogoffGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LogoffGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
