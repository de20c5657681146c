pub mod introspection_service;
pub mod token_issuer;
pub mod user_service;

pub use introspection_service::IntrospectionService;
pub use token_issuer::TokenIssuer;
