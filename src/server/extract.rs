//! Request extractors.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::auth::TenantId;
use crate::error::Error;
use crate::server::AppState;

/// The tenant behind the request's bearer token.
///
/// Rejects with [`Error::Unauthenticated`] when the `Authorization` header
/// is missing, is not a bearer token, or does not authenticate.
///
/// ```rust,ignore
/// async fn handler(AuthenticatedTenant(tenant): AuthenticatedTenant) -> String {
///     tenant.to_string()
/// }
/// ```
#[derive(Clone, Debug)]
pub struct AuthenticatedTenant(pub TenantId);

impl FromRequestParts<AppState> for AuthenticatedTenant {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(Error::Unauthenticated)?;

        let tenant = state.authenticator.authenticate(bearer).await?;
        Ok(Self(tenant))
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// A JSON body whose rejection is reported as [`Error::InvalidFormat`].
#[derive(Clone, Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Error> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(Error::invalid("body", rejection.body_text())),
        }
    }
}
