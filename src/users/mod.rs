//! Users Module
//!
//! Registered identities, password verification and the administrator
//! check the store consults before letting a non-owner mutate a key.

mod database;
mod password;

pub use database::{User, UserDatabase, UserError, UserStorage, ADMIN_USERNAME, USERS_FILE};
pub use password::{hash_password, password_matches};
