use tracing::info;
use websession_core::{AppContext, UserProfile};

/// Reports login and logoff notifications through the log.
pub(crate) struct LoggingAppContext;

impl AppContext for LoggingAppContext {
    fn on_logging_in(&self, profile: &UserProfile) {
        info!(event = "app_context_login", user = profile.display_name());
    }

    fn on_logging_off(&self) {
        info!(event = "app_context_logoff");
    }
}
