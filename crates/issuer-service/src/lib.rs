//! Token Issuer Service Library
//!
//! Registers users, exchanges verified credentials for a signed access token
//! and lets resource servers introspect bearer tokens.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Token signing and password digests
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `models` - Data models
//! - `repositories` - User store access
//! - `routes` - Router and application state
//! - `services` - Registration, issuance and introspection
//! - `session` - Session cache and its backends

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod session;
