//! Permission middleware
//!
//! Wraps a scope or resource so that every request must pass
//! [`require_permissions`](super::guards::require_permissions) before the
//! inner service runs.

use super::guards::{PermissionMode, require_permissions};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use tracing::debug;

/// Permission middleware for Actix-web
#[derive(Debug, Clone)]
pub struct RequirePermission {
    slugs: Rc<[String]>,
    mode: PermissionMode,
}

impl RequirePermission {
    /// Every slug is required
    pub fn all<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(slugs, PermissionMode::All)
    }

    /// One of the slugs is enough
    pub fn any<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(slugs, PermissionMode::Any)
    }

    fn with_mode<I, S>(slugs: I, mode: PermissionMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slugs: slugs.into_iter().map(Into::into).collect(),
            mode,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequirePermission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequirePermissionService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequirePermissionService {
            service: Rc::new(service),
            slugs: self.slugs.clone(),
            mode: self.mode,
        }))
    }
}

/// Service implementation for the permission middleware
pub struct RequirePermissionService<S> {
    service: Rc<S>,
    slugs: Rc<[String]>,
    mode: PermissionMode,
}

impl<S, B> Service<ServiceRequest> for RequirePermissionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let slugs = self.slugs.clone();
        let mode = self.mode;

        Box::pin(async move {
            {
                let http_req = req.request();
                let slugs: Vec<&str> = slugs.iter().map(String::as_str).collect();
                require_permissions(http_req, &slugs, mode).await?;
            }

            debug!("Permission check passed for {}", req.path());
            service.call(req).await
        })
    }
}
