use async_trait::async_trait;

use crate::api::{CsrfToken, UserProfile};
use crate::error::ApiError;

/// Remote authentication endpoint the session layer talks to.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<(), ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn current_user(&self) -> Result<UserProfile, ApiError>;
    async fn csrf_token(&self) -> Result<CsrfToken, ApiError>;
}

/// Application-side consumer of login and logoff events.
pub trait AppContext: Send + Sync {
    fn on_logging_in(&self, profile: &UserProfile);
    fn on_logging_off(&self);
}
