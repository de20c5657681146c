//! HTTP request handlers for the token issuer.

pub mod check_handler;
pub mod health;
pub mod metrics;
pub mod token_handler;
pub mod user_handler;

pub use check_handler::handle_check;
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use token_handler::handle_token;
pub use user_handler::handle_register;
