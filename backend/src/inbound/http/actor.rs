//! Actor extraction from the `Authorization` header.
//!
//! Builds the explicit [`Actor`] value once per request: verify the bearer
//! token, load a fresh account snapshot, and hand the result to handlers.
//! Requests without a credential extract as [`Actor::Anonymous`] so public
//! reads need no special casing; presented-but-invalid credentials fail
//! extraction with `401 Unauthorized`.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::signup::map_account_persistence_error;
use crate::domain::{Actor, Error};

use super::state::HttpState;

/// Extractor wrapper producing an [`Actor`] for the request.
pub struct RequestActor(pub Actor);

impl RequestActor {
    /// The extracted actor.
    pub fn into_inner(self) -> Actor {
        self.0
    }
}

async fn extract(req: HttpRequest) -> Result<RequestActor, Error> {
    let Some(header_value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(RequestActor(Actor::Anonymous));
    };
    let value = header_value
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;

    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("http state is not configured"))?;

    let account_id = state.tokens.verify(token)?;
    let account = state
        .accounts
        .find_by_id(account_id)
        .await
        .map_err(map_account_persistence_error)?
        .ok_or_else(|| Error::unauthorized("invalid or expired token"))?;

    Ok(RequestActor(Actor::Authenticated(account)))
}

impl FromRequest for RequestActor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(extract(req))
    }
}
