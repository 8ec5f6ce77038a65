pub mod algorithm;
pub mod claims;
pub mod errors;
pub mod handler;

pub use algorithm::SigningAlgorithm;
pub use claims::Claims;
pub use errors::TokenError;
pub use handler::TokenHandler;
pub use handler::TokenSettings;
pub use handler::DEFAULT_ISSUER;
