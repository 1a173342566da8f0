use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::ports::{PasswordHasher, TokenCodec};
use crate::domain::user::User;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user: User,
    exp: i64,
}

/// Issues and checks HS256 JSON web tokens carrying a copy of the user.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        let secret = secret.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }
}

impl TokenCodec for TokenSigner {
    fn encode(&self, user: &User) -> Result<String, DomainError> {
        let claims = Claims {
            user: user.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::Upstream(format!("token encoding: {}", e)))
    }

    fn decode(&self, token: &str) -> Result<User, DomainError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.user)
            .map_err(|e| {
                let msg = match e.kind() {
                    ErrorKind::ExpiredSignature => "token expired",
                    ErrorKind::InvalidSignature => "token signature mismatch",
                    ErrorKind::InvalidAlgorithm => "unexpected signing method",
                    _ => "malformed token",
                };
                DomainError::Unauthorized(msg.to_string())
            })
    }
}

// ── Passwords ────────────────────────────────────────────────────────────────

/// Argon2id with the crate's default parameters, stored as a PHC string.
#[derive(Clone, Default)]
pub struct Argon2Passwords {
    argon2: Argon2<'static>,
}

impl PasswordHasher for Argon2Passwords {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::Upstream(format!("password hashing: {}", e)))
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
