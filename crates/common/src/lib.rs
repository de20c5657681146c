//! Common utilities and types shared by the token issuer and the resource
//! servers that consume its tokens.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for access-token claims, bearer parsing and size limits
pub mod jwt;
