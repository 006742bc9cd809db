//! Authentication types.
//!
//! Two kinds of authentication meet in this service:
//!
//! - **Callers** of the service authenticate with a bearer token, resolved
//!   to a [`TenantId`] by an [`Authenticator`].
//! - **Shops** are connected through the OAuth authorization code grant in
//!   [`oauth`], yielding an [`AccessToken`].
//!
//! # Overview
//!
//! - [`AuthScopes`]: a set of OAuth scopes with implied scope handling
//! - [`TenantId`], [`AccessToken`], [`ShopCredentials`]: identities and secrets
//! - [`Authenticator`], [`JwtAuthenticator`]: bearer token validation
//! - [`oauth`]: authorization URL, callback verification, code exchange

mod bearer;
pub mod oauth;
mod scopes;
pub mod session;

pub use bearer::{Authenticator, JwtAuthenticator};
pub use scopes::AuthScopes;
pub use session::{AccessToken, ShopCredentials, TenantId};
