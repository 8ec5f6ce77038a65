use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::password_hash::Error as PhcError;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::Salt;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Version;

use super::errors::PasswordError;
use super::params::PasswordParams;

/// Longest password accepted, in bytes.
pub const MAX_PASSWORD_LENGTH: usize = 4096;

/// Password hashing implementation.
///
/// Produces Argon2id digests in PHC string format. Holds only cost
/// parameters, so a single instance can be shared freely between threads.
///
/// Hashing is deliberately slow. Async callers should run it on a blocking
/// worker (e.g. `spawn_blocking`).
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a password hasher using the library default cost.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Create a password hasher with explicit cost parameters.
    ///
    /// # Errors
    /// * `InvalidParams` - Parameters are outside Argon2's accepted ranges
    pub fn with_params(params: PasswordParams) -> Result<Self, PasswordError> {
        let params = params.to_argon2()?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password.
    ///
    /// A fresh random salt is drawn for every call, so hashing the same
    /// password twice yields two different digests.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `EmptyPassword` / `PasswordTooLong` - Input rejected before hashing
    /// * `HashingFailed` - Randomness source or primitive failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        check_length(password)?;

        let salt = generate_salt()?;

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                PasswordError::HashingFailed(e.to_string())
            })
    }

    /// Verify a password against a stored digest.
    ///
    /// The hash is re-derived with the salt and cost recorded in `digest`
    /// and compared in constant time.
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match the digest
    /// * `MalformedDigest` - Digest is not a usable Argon2 PHC string
    pub fn verify(&self, password: &str, digest: &str) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| PasswordError::MalformedDigest(e.to_string()))?;

        if parsed.salt.is_none() || parsed.hash.is_none() {
            return Err(PasswordError::MalformedDigest(
                "digest has no salt or hash".to_string(),
            ));
        }

        if password.len() > MAX_PASSWORD_LENGTH {
            tracing::debug!("Password verification failed: candidate too long");
            return Err(PasswordError::Mismatch);
        }

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(PhcError::Password) => {
                tracing::debug!("Password verification failed: mismatch");
                Err(PasswordError::Mismatch)
            }
            Err(e) => Err(PasswordError::MalformedDigest(e.to_string())),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn check_length(password: &str) -> Result<(), PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::EmptyPassword);
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::PasswordTooLong {
            max: MAX_PASSWORD_LENGTH,
            actual: password.len(),
        });
    }

    Ok(())
}

/// Draw a recommended-length salt from the OS RNG.
fn generate_salt() -> Result<SaltString, PasswordError> {
    let mut bytes = [0u8; Salt::RECOMMENDED_LENGTH];

    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        tracing::error!(error = %e, "Randomness source failed while generating salt");
        PasswordError::HashingFailed(e.to_string())
    })?;

    SaltString::encode_b64(&bytes).map_err(|e| PasswordError::HashingFailed(e.to_string()))
}
