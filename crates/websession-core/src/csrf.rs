use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
struct CsrfPair {
    header_name: String,
    token: String,
}

/// Current CSRF header name and token.
///
/// Both values are stored as one pair, so they are always set and cleared together.
#[derive(Debug, Clone, Default)]
pub struct CsrfProtection {
    current: Arc<RwLock<Option<CsrfPair>>>,
}

impl CsrfProtection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, header_name: &str, token: &str) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(CsrfPair {
            header_name: header_name.to_string(),
            token: token.to_string(),
        });
    }

    pub fn invalidate(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = None;
    }

    /// Read-only handle that follows later updates.
    pub fn view(&self) -> CsrfTokenView {
        CsrfTokenView {
            current: Arc::clone(&self.current),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsrfTokenView {
    current: Arc<RwLock<Option<CsrfPair>>>,
}

impl CsrfTokenView {
    pub fn has_token(&self) -> bool {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        current
            .as_ref()
            .is_some_and(|pair| !pair.header_name.is_empty() && !pair.token.is_empty())
    }

    pub fn header_name(&self) -> Option<String> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        current.as_ref().map(|pair| pair.header_name.clone())
    }

    pub fn token(&self) -> Option<String> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        current.as_ref().map(|pair| pair.token.clone())
    }
}
