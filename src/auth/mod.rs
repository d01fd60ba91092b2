//! Auth Module
//!
//! Bearer token issuance and validation, and identity resolution for the
//! secure routes.

mod authenticator;
mod token;

pub use authenticator::{Authenticator, BasicCredentials};
pub use token::{JwtTokenizer, Tokenizer, BEARER_PREFIX};
