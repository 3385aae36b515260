use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder};

use crate::error::ApiError;

/// Verbs that carry the CSRF header once a token is installed.
pub const CSRF_PROTECTED_METHODS: [Method; 3] = [Method::POST, Method::PUT, Method::DELETE];

/// Per-verb default headers shared by every request the transport sends.
#[derive(Debug, Clone, Default)]
pub struct DefaultHeaders {
    by_method: Arc<RwLock<HashMap<Method, HeaderMap>>>,
}

impl DefaultHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the CSRF header to every protected verb. POST and PUT keep their other
    /// defaults; the DELETE defaults are reset to just that header. All maps change
    /// under one write lock.
    pub fn install_csrf(&self, header_name: &str, token: &str) -> Result<(), ApiError> {
        let name = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|err| ApiError::InvalidHeader(format!("{header_name}: {err}")))?;
        let value = HeaderValue::from_str(token)
            .map_err(|err| ApiError::InvalidHeader(format!("{header_name} value: {err}")))?;

        let mut by_method = self.by_method.write().unwrap_or_else(PoisonError::into_inner);
        for method in CSRF_PROTECTED_METHODS {
            let defaults = by_method.entry(method.clone()).or_default();
            if method == Method::DELETE {
                defaults.clear();
            }
            defaults.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    pub fn insert(&self, method: Method, name: HeaderName, value: HeaderValue) {
        let mut by_method = self.by_method.write().unwrap_or_else(PoisonError::into_inner);
        by_method.entry(method).or_default().insert(name, value);
    }

    pub fn for_method(&self, method: &Method) -> HeaderMap {
        let by_method = self.by_method.read().unwrap_or_else(PoisonError::into_inner);
        by_method.get(method).cloned().unwrap_or_default()
    }

    pub fn apply(&self, builder: RequestBuilder, method: &Method) -> RequestBuilder {
        let headers = self.for_method(method);
        if headers.is_empty() {
            builder
        } else {
            builder.headers(headers)
        }
    }
}
