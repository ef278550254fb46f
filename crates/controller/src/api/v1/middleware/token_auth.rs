//! Bearer token authentication for the RSVP endpoints
use crate::api::v1::response::{ApiError, AuthenticationError};
use crate::token::{TokenService, VerifyError};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::Error;
use actix_web::http::header::Header;
use actix_web::{HttpMessage, ResponseError};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use core::future::ready;
use std::future::{Future, Ready};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Middleware factory for [`TokenAuthMiddleware`]
pub struct TokenAuth {
    pub token_service: TokenService,
}

impl<S> Transform<S, ServiceRequest> for TokenAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Transform = TokenAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenAuthMiddleware {
            service: Rc::new(service),
            token_service: self.token_service.clone(),
        }))
    }
}

/// Rejects every request that does not carry a valid access token
///
/// The verified claims are stored as [`ReqData`](actix_web::web::ReqData)
/// for the wrapped services.
pub struct TokenAuthMiddleware<S> {
    service: Rc<S>,
    token_service: TokenService,
}

type ResultFuture<O, E> = Pin<Box<dyn Future<Output = Result<O, E>>>>;

impl<S> Service<ServiceRequest> for TokenAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = ResultFuture<Self::Response, Self::Error>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let auth = match Authorization::<Bearer>::parse(&req) {
            Ok(auth) => auth,
            Err(e) => {
                log::warn!("Request carries no usable bearer token, {}", e);
                return reject(req, AuthenticationError::InvalidAccessToken);
            }
        };

        let claims = match self.token_service.verify(auth.into_scheme().token()) {
            Ok(claims) => claims,
            Err(VerifyError::Expired(_)) => {
                return reject(req, AuthenticationError::AccessTokenExpired)
            }
            Err(_) => return reject(req, AuthenticationError::InvalidAccessToken),
        };

        req.extensions_mut().insert(claims);

        Box::pin(self.service.call(req))
    }
}

/// Ends the request with a 401 response carrying a bearer challenge
fn reject(
    req: ServiceRequest,
    authentication_error: AuthenticationError,
) -> ResultFuture<ServiceResponse, Error> {
    let error = ApiError::unauthorized().with_www_authenticate(authentication_error);
    let response = req.into_response(error.error_response());

    Box::pin(ready(Ok(response)))
}
