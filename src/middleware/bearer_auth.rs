/// Bearer Authentication Middleware
///
/// Runs the request authorizer in front of protected routes and injects the
/// resolved `UserRecord` into request extensions for handlers.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::{AccessPolicy, RequestAuthorizer};

/// Middleware for protecting routes
///
/// Handlers behind it read the caller with `web::ReqData<UserRecord>`.
pub struct BearerAuth {
    authorizer: Arc<RequestAuthorizer>,
    policy: AccessPolicy,
}

impl BearerAuth {
    pub fn new(authorizer: Arc<RequestAuthorizer>, policy: AccessPolicy) -> Self {
        Self { authorizer, policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(BearerAuthService {
            service: Rc::new(service),
            authorizer: self.authorizer.clone(),
            policy: self.policy,
        }))
    }
}

pub struct BearerAuthService<S> {
    service: Rc<S>,
    authorizer: Arc<RequestAuthorizer>,
    policy: AccessPolicy,
}

impl<S, B> Service<ServiceRequest> for BearerAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);

        let authorizer = self.authorizer.clone();
        let policy = self.policy;
        let service = self.service.clone();

        Box::pin(async move {
            let user = authorizer.authorize(authorization.as_deref(), policy).await?;

            // Inject identity into request extensions
            req.extensions_mut().insert(user);

            service.call(req).await
        })
    }
}
