pub mod errors;
pub mod hasher;
pub mod params;

pub use errors::PasswordError;
pub use hasher::PasswordHasher;
pub use hasher::MAX_PASSWORD_LENGTH;
pub use params::PasswordParams;
