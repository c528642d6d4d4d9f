use axum::http::HeaderMap;
use flashgen_core::{UserId, DEFAULT_USER_ID};

/// Decides which user a request acts for.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> UserId;
}

/// Every request belongs to the same user. Stands in until real auth exists.
#[derive(Clone, Copy, Debug)]
pub struct FixedIdentity(pub UserId);

impl Default for FixedIdentity {
    fn default() -> Self {
        Self(DEFAULT_USER_ID)
    }
}

impl IdentityResolver for FixedIdentity {
    fn resolve(&self, _headers: &HeaderMap) -> UserId {
        self.0
    }
}
