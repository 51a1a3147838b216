//! Bearer-token authentication, per SPEC_FULL.md §3/§6. Grounded on the teacher's
//! `AuthenticationMiddlewareFactory`/`AuthenticateMiddleware` pair and its
//! `SecurityContext` token helper, swapping the teacher's own claims shape for
//! `{sub, name, exp}` and HS256 signing keyed off `jwt.secret`.

use crate::config::SERVICE_CONFIG;
use crate::domain::PlayerId;
use crate::errors::ServiceError;
use actix_web::body::BoxBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::rc::Rc;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub exp: i64,
}

/// The player identity attached to a request once the middleware has validated its
/// bearer token — the typed extractor downstream handlers pull out of the request,
/// mirroring the teacher's `SecurityContext` extractor.
#[derive(Debug, Clone)]
pub struct AuthenticatedPlayer {
    pub id: PlayerId,
    pub name: String,
}

/// Signs a fresh token for `(id, name)`, `exp` set `token_ttl_seconds` from now.
pub fn issue_token(id: PlayerId, name: &str, now_unix: i64) -> String {
    let claims = Claims {
        sub: id.to_string(),
        name: name.to_string(),
        exp: now_unix + SERVICE_CONFIG.jwt.token_ttl_seconds,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SERVICE_CONFIG.jwt.secret.as_bytes()),
    )
    .expect("HS256 signing must not fail for well-formed claims")
}

fn validate_token(token: &str) -> Result<AuthenticatedPlayer, ServiceError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(SERVICE_CONFIG.jwt.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| ServiceError::Auth(e.to_string()))?;
    let id = PlayerId::from_str(&data.claims.sub)
        .map_err(|_| ServiceError::Auth("token subject is not a valid player id".to_string()))?;
    Ok(AuthenticatedPlayer {
        id,
        name: data.claims.name,
    })
}

pub struct AuthenticationMiddlewareFactory;

impl<S> Transform<S, ServiceRequest> for AuthenticationMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = ActixError> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = ActixError;
    type Transform = AuthenticateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthenticateMiddleware<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthenticateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = ActixError> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);

        let service = self.service.clone();
        Box::pin(async move {
            let token = match bearer {
                Some(t) => t,
                None => {
                    return Ok(req.into_response(
                        ServiceError::Auth("missing bearer token".to_string()).to_http_response(),
                    ))
                }
            };
            match validate_token(&token) {
                Ok(player) => {
                    req.extensions_mut().insert(player);
                    service.call(req).await
                }
                Err(e) => Ok(req.into_response(e.to_http_response())),
            }
        })
    }
}

impl FromRequest for AuthenticatedPlayer {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthenticatedPlayer>()
            .cloned()
            .ok_or_else(|| {
                actix_web::error::ErrorUnauthorized(
                    "request reached a handler without passing authentication middleware",
                )
            });
        ready(result)
    }
}
