//! User database: registered identities and their password hashes.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::password::{hash_password, password_matches};

/// The identity that may override ownership checks, once registered.
pub const ADMIN_USERNAME: &str = "admin";

/// File name of the user database inside its directory.
pub const USERS_FILE: &str = "users.dat";

// == User Error ==
#[derive(Error, Debug)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("User exists")]
    Exists,

    #[error("User authentication failed. Username or Password is invalid")]
    AuthenticationFailed,

    #[error("User database I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("User database is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

// == User ==
/// A registered identity as stored in `users.dat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "UserName")]
    pub username: String,
    #[serde(rename = "HashPassword")]
    pub hash_password: String,
}

impl User {
    /// Creates a user, hashing the clear-text password.
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            hash_password: hash_password(password),
        }
    }
}

// == User Database Trait ==
/// Authentication and authorization oracle.
pub trait UserDatabase: Send + Sync {
    fn add_user(&self, username: &str, password: &str) -> Result<(), UserError>;
    fn authenticate(&self, username: &str, password: &str) -> Result<(), UserError>;
    /// True only for a registered user named [`ADMIN_USERNAME`].
    fn is_admin(&self, username: &str) -> bool;
}

// == User Storage ==
/// In-memory user database, optionally backed by `<dir>/users.dat`.
#[derive(Debug, Default)]
pub struct UserStorage {
    users: RwLock<HashMap<String, User>>,
}

impl UserStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `<dir>/users.dat`, falling back to an empty database if the
    /// file is missing or unreadable.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        match Self::load_from_file(dir.as_ref()) {
            Ok(storage) => storage,
            Err(e) => {
                tracing::warn!(
                    "No user database loaded from {}: {}",
                    dir.as_ref().display(),
                    e
                );
                Self::new()
            }
        }
    }

    /// Strict variant of [`UserStorage::load`].
    pub fn load_from_file(dir: &Path) -> Result<Self, UserError> {
        let data = fs::read_to_string(dir.join(USERS_FILE))?;
        let users: Vec<User> = serde_json::from_str(&data)?;

        let users = users
            .into_iter()
            .map(|user| (user.username.clone(), user))
            .collect();
        Ok(Self {
            users: RwLock::new(users),
        })
    }

    /// Writes every user to `<dir>/users.dat`, creating `dir` if needed.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<(), UserError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut users: Vec<User> = self.users.read().values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        fs::write(dir.join(USERS_FILE), serde_json::to_string(&users)?)?;
        Ok(())
    }

    pub fn find_user(&self, username: &str) -> Result<User, UserError> {
        self.users
            .read()
            .get(username)
            .cloned()
            .ok_or(UserError::NotFound)
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl UserDatabase for UserStorage {
    fn add_user(&self, username: &str, password: &str) -> Result<(), UserError> {
        let mut users = self.users.write();
        if users.contains_key(username) {
            return Err(UserError::Exists);
        }
        users.insert(username.to_string(), User::new(username, password));
        Ok(())
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<(), UserError> {
        let user = self.find_user(username)?;
        if !password_matches(password, &user.hash_password) {
            return Err(UserError::AuthenticationFailed);
        }
        Ok(())
    }

    fn is_admin(&self, username: &str) -> bool {
        username == ADMIN_USERNAME && self.users.read().contains_key(username)
    }
}
