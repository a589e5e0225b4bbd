//! Authentication primitives: login credentials and stored password digests.
//!
//! Plaintext passwords only ever live in [`Zeroizing`] buffers. Digests are
//! Argon2id with default parameters, stored as PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`).

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{ARGON2ID_IDENT, Argon2};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by the identity provider.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use foodgram_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" cook@example.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "cook@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Errors raised while hashing a password or parsing a stored digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordDigestError {
    /// Stored value is not a PHC string.
    #[error("password digest is not a valid PHC string: {0}")]
    Malformed(String),
    /// Stored value uses a hash other than Argon2id.
    #[error("password digest uses unsupported algorithm `{0}`")]
    UnsupportedAlgorithm(String),
    /// Argon2 rejected the input while hashing.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Argon2id password hash in PHC string form, as stored alongside a user.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    phc: String,
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

impl PasswordDigest {
    /// Hash `password` with a fresh random salt.
    pub fn generate(password: &str) -> Result<Self, PasswordDigestError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordDigestError::Hashing(err.to_string()))?
            .to_string();
        Ok(Self { phc })
    }

    /// Whether `password` produces this digest.
    pub fn verify(&self, password: &str) -> bool {
        PasswordHash::new(&self.phc).is_ok_and(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), &hash)
                .is_ok()
        })
    }

    /// Parse a stored PHC string.
    pub fn parse(encoded: &str) -> Result<Self, PasswordDigestError> {
        let hash =
            PasswordHash::new(encoded).map_err(|err| PasswordDigestError::Malformed(err.to_string()))?;
        if hash.algorithm != ARGON2ID_IDENT {
            return Err(PasswordDigestError::UnsupportedAlgorithm(
                hash.algorithm.as_str().to_owned(),
            ));
        }
        Ok(Self {
            phc: encoded.to_owned(),
        })
    }

    /// Encode for storage.
    pub fn encode(&self) -> String {
        self.phc.clone()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("cook@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn digest_verifies_only_the_original_password() {
        let digest = PasswordDigest::generate("correct horse").expect("hash");
        assert!(digest.verify("correct horse"));
        assert!(!digest.verify("correct horse "));
    }

    #[rstest]
    fn digests_are_salted_argon2id_phc_strings() {
        let first = PasswordDigest::generate("same").expect("hash");
        let second = PasswordDigest::generate("same").expect("hash");
        assert!(first.encode().starts_with("$argon2id$v=19$"));
        assert!(!first.encode().contains("same"));
        assert_ne!(first.encode(), second.encode());
    }

    #[rstest]
    fn encoded_form_parses_back() {
        let encoded = PasswordDigest::generate("pw").expect("hash").encode();
        let parsed = PasswordDigest::parse(&encoded).expect("parse");
        assert!(parsed.verify("pw"));
        assert!(!parsed.verify("pw2"));
    }

    #[rstest]
    #[case("sha256$00$00")]
    #[case("")]
    #[case("argon2id")]
    fn parse_rejects_non_phc_values(#[case] encoded: &str) {
        assert!(matches!(
            PasswordDigest::parse(encoded),
            Err(PasswordDigestError::Malformed(_))
        ));
    }

    #[rstest]
    fn parse_rejects_other_algorithms() {
        assert!(matches!(
            PasswordDigest::parse("$pbkdf2-sha256$i=1000$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA"),
            Err(PasswordDigestError::UnsupportedAlgorithm(name)) if name == "pbkdf2-sha256"
        ));
    }
}
