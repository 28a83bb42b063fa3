//! Request identity types

use crate::auth::rbac::types::UserId;
use crate::utils::error::{AuthzError, Result};
use actix_web::{HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};

/// Identity attached to a request by upstream authentication.
///
/// Guards treat a request without one as unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

impl AuthenticatedUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Attach the identity to a request
    pub fn attach(self, req: &HttpRequest) {
        req.extensions_mut().insert(self);
    }
}

/// Extract the authenticated user from request extensions
pub fn get_authenticated_user(req: &HttpRequest) -> Result<AuthenticatedUser> {
    req.extensions()
        .get::<AuthenticatedUser>()
        .copied()
        .ok_or_else(|| AuthzError::unauthenticated("No authenticated user on the request"))
}
