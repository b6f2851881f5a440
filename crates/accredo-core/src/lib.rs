#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod auth;
pub mod constants;
pub mod tokens;

pub use crate::auth::*;
pub use crate::constants::*;
pub use crate::tokens::{decode_claims, expires_at, is_expired, is_expired_at, TokenClaims};
