//! Bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the username, an expiry and a fixed issuer.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::tracer::SharedTracer;

/// Prefix of an Authorization header carrying a token.
pub const BEARER_PREFIX: &str = "Bearer ";

const ISSUER: &str = "UserJWTService";

// == Tokenizer Trait ==
pub trait Tokenizer: Send + Sync {
    fn create_token(&self, username: &str) -> Result<String>;
    fn username_from_token(&self, token: &str) -> Result<String>;
}

// == Claims ==
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    username: String,
    exp: i64,
    iss: String,
}

// == JWT Tokenizer ==
pub struct JwtTokenizer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration: Duration,
    tracer: SharedTracer,
}

impl JwtTokenizer {
    pub fn new(secret: impl AsRef<[u8]>, expiration_minutes: i64, tracer: SharedTracer) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expiration: Duration::minutes(expiration_minutes),
            tracer,
        }
    }
}

impl Tokenizer for JwtTokenizer {
    fn create_token(&self, username: &str) -> Result<String> {
        let claims = Claims {
            username: username.to_string(),
            exp: (Utc::now() + self.expiration).timestamp(),
            iss: ISSUER.to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            self.tracer
                .log_error(&format!("Error creating the token: {}", e));
            StoreError::TokenCreation(e.to_string())
        })
    }

    fn username_from_token(&self, token: &str) -> Result<String> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims.username),
            Err(e) => {
                self.tracer
                    .log_error(&format!("Error processing JWT token: {}", e));
                Err(StoreError::AuthorizationFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    use crate::tracer::{Level, NullTracer, RecordingTracer};

    fn sign(header: Header, claims: &Claims, secret: &str) -> String {
        encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn valid_claims(username: &str) -> Claims {
        Claims {
            username: username.to_string(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            iss: ISSUER.to_string(),
        }
    }

    fn tokenizer() -> JwtTokenizer {
        JwtTokenizer::new("my_secret_key", 30, NullTracer::shared())
    }

    #[test]
    fn test_token_carries_username() {
        let tokenizer = tokenizer();
        let token = tokenizer.create_token("alice").unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(tokenizer.username_from_token(&token).unwrap(), "alice");
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = JwtTokenizer::new("other", 30, NullTracer::shared());
        let token = other.create_token("alice").unwrap();

        assert_eq!(
            tokenizer().username_from_token(&token),
            Err(StoreError::AuthorizationFailed)
        );
    }

    #[test]
    fn test_tampered_claims_are_rejected() {
        let tokenizer = tokenizer();
        let token = tokenizer.create_token("alice").unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = URL_SAFE_NO_PAD.encode(
            r#"{"username":"admin","exp":99999999999,"iss":"UserJWTService"}"#,
        );
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);

        assert_eq!(
            tokenizer.username_from_token(&forged),
            Err(StoreError::AuthorizationFailed)
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tracer = RecordingTracer::new();
        let tokenizer = JwtTokenizer::new("my_secret_key", -1, tracer.clone());
        let token = tokenizer.create_token("alice").unwrap();

        assert_eq!(
            tokenizer.username_from_token(&token),
            Err(StoreError::AuthorizationFailed)
        );
        assert!(tracer.contains(Level::Error, "ExpiredSignature"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let tokenizer = tokenizer();
        for token in ["", "abc", "a.b", "a.b.c", "a.b.c.d"] {
            assert!(tokenizer.username_from_token(token).is_err());
        }
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let claims = Claims {
            iss: "SomeoneElse".to_string(),
            ..valid_claims("alice")
        };
        let token = sign(Header::new(Algorithm::HS256), &claims, "my_secret_key");

        assert_eq!(
            tokenizer().username_from_token(&token),
            Err(StoreError::AuthorizationFailed)
        );
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let token = sign(Header::new(Algorithm::HS384), &valid_claims("alice"), "my_secret_key");

        assert_eq!(
            tokenizer().username_from_token(&token),
            Err(StoreError::AuthorizationFailed)
        );
    }

    #[test]
    fn test_token_header_declares_hs256() {
        let token = tokenizer().create_token("alice").unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }
}
