//! OAuth 2.0 authorization code grant for Shopify.
//!
//! 1. **Authorization** ([`begin_auth`]): build the URL the merchant is sent
//!    to, with a fresh [`StateParam`].
//! 2. **Callback verification** ([`verify_callback`]): parse the
//!    [`CallbackParams`], check the shop domain, the HMAC signature and,
//!    when one was issued, the echoed `state`.
//! 3. **Code exchange** ([`exchange_code`]): trade the code for an offline
//!    access token, exactly once.
//!
//! [`complete_callback`] runs steps 2 and 3 and stores the token.
//!
//! # Security Features
//!
//! - **HMAC Validation**: callbacks are verified with HMAC-SHA256 over the
//!   canonical parameter string, compared in constant time
//! - **Strict Shop Domains**: the callback shop must be a canonical
//!   `name.myshopify.com` domain before any request is made to it
//! - **State Binding**: a callback must echo the state issued to the same
//!   tenant, tracked by [`PendingStates`]
//! - **Key Rotation Support**: a previous API secret can be configured so
//!   in-flight flows survive a rotation
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_connect::auth::oauth::{begin_auth, complete_callback, CallbackParams};
//!
//! // Step 1: send the merchant to Shopify
//! let result = begin_auth(&config, "example-shop", None)?;
//! // respond with result.auth_url
//!
//! // Step 2 + 3: Shopify redirects back with signed parameters
//! let params = CallbackParams::from_map(body)?;
//! let shop = complete_callback(&http, &config, store.as_ref(), &tenant, &params, Some(&result.state)).await?;
//! ```

mod begin_auth;
mod callback;
pub mod hmac;
mod state;
mod token_exchange;

pub use begin_auth::{begin_auth, BeginAuthResult};
pub use callback::{complete_callback, verify_callback, CallbackParams, VerifiedCallback};
pub use state::{PendingStates, StateParam};
pub use token_exchange::exchange_code;
