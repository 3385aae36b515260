#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use websession_core::{ApiError, AppContext, AuthApi, CsrfToken, UserProfile};

pub fn profile(name: &str) -> UserProfile {
    UserProfile::named(name)
}

pub fn csrf(token: &str) -> CsrfToken {
    CsrfToken {
        header_name: "X-CSRF-TOKEN".to_string(),
        parameter_name: Some("_csrf".to_string()),
        token: token.to_string(),
    }
}

/// Scripted authentication endpoint.
///
/// `current_user` can be held back with a gate so tests can observe the
/// coordinator while an initialization is in flight.
pub struct FakeAuthApi {
    pub accept_login: bool,
    pub accept_logout: bool,
    pub user: Mutex<Option<UserProfile>>,
    pub token: Mutex<Option<CsrfToken>>,
    pub user_gate: Option<Arc<Semaphore>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeAuthApi {
    pub fn accepting(user: UserProfile, token: CsrfToken) -> Self {
        Self {
            accept_login: true,
            accept_logout: true,
            user: Mutex::new(Some(user)),
            token: Mutex::new(Some(token)),
            user_gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting_login() -> Self {
        Self {
            accept_login: false,
            ..Self::accepting(profile("nobody"), csrf("unused"))
        }
    }

    pub fn without_session() -> Self {
        Self {
            user: Mutex::new(None),
            ..Self::accepting(profile("nobody"), csrf("unused"))
        }
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.user_gate = Some(gate);
        self
    }

    pub fn set_token(&self, token: Option<CsrfToken>) {
        *self.token.lock().expect("token lock") = token;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn login(&self, _username: &str, _password: &str) -> Result<(), ApiError> {
        self.record("login");
        if self.accept_login {
            Ok(())
        } else {
            Err(ApiError::Rejected("bad credentials".to_string()))
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("logout");
        if self.accept_logout {
            Ok(())
        } else {
            Err(ApiError::Rejected("logout refused".to_string()))
        }
    }

    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.record("current_user");
        if let Some(gate) = &self.user_gate {
            gate.acquire().await.expect("gate open").forget();
        }
        self.user
            .lock()
            .expect("user lock")
            .clone()
            .ok_or_else(|| ApiError::Rejected("no session".to_string()))
    }

    async fn csrf_token(&self) -> Result<CsrfToken, ApiError> {
        self.record("csrf_token");
        self.token
            .lock()
            .expect("token lock")
            .clone()
            .ok_or_else(|| ApiError::Rejected("csrf endpoint down".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    LoggingIn(String),
    LoggingOff,
}

#[derive(Default)]
pub struct RecordingAppContext {
    events: Mutex<Vec<AppEvent>>,
}

impl RecordingAppContext {
    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

impl AppContext for RecordingAppContext {
    fn on_logging_in(&self, profile: &UserProfile) {
        self.events
            .lock()
            .expect("events lock")
            .push(AppEvent::LoggingIn(profile.display_name().to_string()));
    }

    fn on_logging_off(&self) {
        self.events
            .lock()
            .expect("events lock")
            .push(AppEvent::LoggingOff);
    }
}
