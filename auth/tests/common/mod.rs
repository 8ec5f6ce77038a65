#![allow(dead_code)]

use chirpy_auth::Authenticator;
use chirpy_auth::PasswordHasher;
use chirpy_auth::PasswordParams;

pub const SECRET: &[u8] = b"test-secret";
pub const SUBJECT: &str = "11111111-1111-1111-1111-111111111111";

/// Argon2 with minimal cost; keeps property loops fast.
pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(PasswordParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("Failed to build hasher")
}

pub fn fast_authenticator() -> Authenticator {
    Authenticator::default().with_password_hasher(fast_hasher())
}
