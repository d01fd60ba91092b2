//! Resolving the caller's identity from request headers.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::token::{Tokenizer, BEARER_PREFIX};
use crate::error::{Result, StoreError};

const BASIC_PREFIX: &str = "Basic ";

// == Authenticator ==
/// Turns an `Authorization` header into a username.
#[derive(Clone)]
pub struct Authenticator {
    tokenizer: Arc<dyn Tokenizer>,
}

impl Authenticator {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    /// `Bearer <token>` resolves to the token's username. Any other
    /// non-empty header is taken verbatim as the username.
    pub fn username(&self, header: Option<&str>) -> Result<String> {
        let header = header.unwrap_or_default();
        if header.is_empty() {
            return Err(StoreError::AuthorizationHeaderMissing);
        }

        match header.strip_prefix(BEARER_PREFIX) {
            Some(token) => self.tokenizer.username_from_token(token.trim()),
            None => Ok(header.to_string()),
        }
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }
}

// == Basic Credentials ==
/// Username and password from a `Basic` Authorization header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parses `Basic base64(username:password)`.
    pub fn parse(header: Option<&str>) -> Result<Self> {
        let encoded = header
            .and_then(|h| h.strip_prefix(BASIC_PREFIX))
            .ok_or(StoreError::InvalidAuthorizationHeader)?;
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| StoreError::InvalidAuthorizationHeader)?;
        let decoded =
            String::from_utf8(decoded).map_err(|_| StoreError::InvalidAuthorizationHeader)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(StoreError::InvalidAuthorizationHeader)?;

        if username.is_empty() || password.is_empty() {
            return Err(StoreError::AuthorizationHeaderMissing);
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtTokenizer;
    use crate::tracer::NullTracer;

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(JwtTokenizer::new("secret", 30, NullTracer::shared())))
    }

    #[test]
    fn test_missing_header() {
        let auth = authenticator();
        assert_eq!(auth.username(None), Err(StoreError::AuthorizationHeaderMissing));
        assert_eq!(auth.username(Some("")), Err(StoreError::AuthorizationHeaderMissing));
    }

    #[test]
    fn test_bearer_token() {
        let auth = authenticator();
        let token = auth.tokenizer().create_token("alice").unwrap();
        let header = format!("Bearer {}", token);

        assert_eq!(auth.username(Some(&header)).unwrap(), "alice");
    }

    #[test]
    fn test_invalid_bearer_token() {
        let auth = authenticator();
        assert_eq!(
            auth.username(Some("Bearer not-a-token")),
            Err(StoreError::AuthorizationFailed)
        );
    }

    #[test]
    fn test_plain_header_is_username() {
        let auth = authenticator();
        assert_eq!(auth.username(Some("bob")).unwrap(), "bob");
    }

    #[test]
    fn test_basic_credentials() {
        let header = format!("Basic {}", STANDARD.encode("alice:pw:with:colons"));
        let creds = BasicCredentials::parse(Some(&header)).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "pw:with:colons");
    }

    #[test]
    fn test_basic_credentials_errors() {
        assert_eq!(
            BasicCredentials::parse(None),
            Err(StoreError::InvalidAuthorizationHeader)
        );
        assert_eq!(
            BasicCredentials::parse(Some("Bearer abc")),
            Err(StoreError::InvalidAuthorizationHeader)
        );
        assert_eq!(
            BasicCredentials::parse(Some("Basic !!!")),
            Err(StoreError::InvalidAuthorizationHeader)
        );
        let empty_password = format!("Basic {}", STANDARD.encode("alice:"));
        assert_eq!(
            BasicCredentials::parse(Some(&empty_password)),
            Err(StoreError::AuthorizationHeaderMissing)
        );
    }
}
