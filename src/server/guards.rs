//! Authorization guards for request handlers
//!
//! Each guard resolves the caller from request extensions and asks the
//! [`AuthorizationService`] registered in [`AppState`]. A missing identity
//! fails with `Unauthenticated`, a denied check with `Forbidden`.

use super::state::AppState;
use super::types::{AuthenticatedUser, get_authenticated_user};
use crate::auth::rbac::types::{CategoryAction, CategoryId};
use crate::auth::AuthorizationService;
use crate::utils::error::{AuthzError, Result};
use actix_web::{HttpRequest, web};
use std::collections::HashMap;
use tracing::debug;

/// How a list of permission slugs is combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionMode {
    #[default]
    All,
    Any,
}

fn service(req: &HttpRequest) -> Result<&AuthorizationService> {
    req.app_data::<web::Data<AppState>>()
        .map(|state| &state.authz)
        .ok_or_else(|| AuthzError::internal("AppState is not registered"))
}

/// Require the listed permissions, checked without resource context
pub async fn require_permissions(
    req: &HttpRequest,
    slugs: &[&str],
    mode: PermissionMode,
) -> Result<AuthenticatedUser> {
    let user = get_authenticated_user(req)?;
    let authz = service(req)?;

    let granted = match mode {
        PermissionMode::All => authz.has_all_permissions(user.user_id, slugs).await?,
        PermissionMode::Any => authz.has_any_permission(user.user_id, slugs).await?,
    };

    if granted {
        Ok(user)
    } else {
        debug!(
            "User {} denied {:?} of {:?} on {}",
            user.user_id,
            mode,
            slugs,
            req.path()
        );
        Err(AuthzError::forbidden(format!(
            "Missing permission: {}",
            slugs.join(", ")
        )))
    }
}

/// Require a category action. The category id comes from the `category_id`
/// (or `categoryId`) path or query parameter; without an explicit `action`
/// the `action` parameter is used.
pub async fn require_category_permission(
    req: &HttpRequest,
    action: Option<CategoryAction>,
) -> Result<AuthenticatedUser> {
    let user = get_authenticated_user(req)?;
    let authz = service(req)?;

    let params = RequestParams::new(req);
    let category_id: CategoryId = params
        .get(&["category_id", "categoryId"])
        .ok_or_else(|| AuthzError::validation("Missing category id"))?
        .parse()
        .map_err(|_| AuthzError::validation("Category id must be an integer"))?;
    let action = match action {
        Some(action) => action,
        None => params
            .get(&["action"])
            .ok_or_else(|| AuthzError::validation("Missing category action"))?
            .parse()
            .map_err(AuthzError::validation)?,
    };

    if authz
        .check_category_permission(user.user_id, category_id, action)
        .await?
    {
        Ok(user)
    } else {
        Err(AuthzError::forbidden(format!(
            "Cannot {} in category {}",
            action, category_id
        )))
    }
}

/// Require any of the listed role slugs
pub async fn require_role(req: &HttpRequest, roles: &[&str]) -> Result<AuthenticatedUser> {
    let user = get_authenticated_user(req)?;
    let authz = service(req)?;

    if authz.has_any_role(user.user_id, roles).await? {
        Ok(user)
    } else {
        Err(AuthzError::forbidden(format!(
            "Requires role: {}",
            roles.join(" or ")
        )))
    }
}

pub async fn require_admin(req: &HttpRequest) -> Result<AuthenticatedUser> {
    let admin = service(req)?.config().admin_role.clone();
    require_role(req, &[admin.as_str()]).await
}

/// Moderators and administrators
pub async fn require_moderator(req: &HttpRequest) -> Result<AuthenticatedUser> {
    let config = service(req)?.config().clone();
    require_role(req, &[config.admin_role.as_str(), config.moderator_role.as_str()]).await
}

/// Path parameters first, then the query string
struct RequestParams<'a> {
    req: &'a HttpRequest,
    query: HashMap<String, String>,
}

impl<'a> RequestParams<'a> {
    fn new(req: &'a HttpRequest) -> Self {
        let query = web::Query::<HashMap<String, String>>::from_query(req.query_string())
            .map(|query| query.into_inner())
            .unwrap_or_default();
        Self { req, query }
    }

    fn get(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| {
            self.req
                .match_info()
                .get(name)
                .map(str::to_string)
                .or_else(|| self.query.get(*name).cloned())
        })
    }
}
