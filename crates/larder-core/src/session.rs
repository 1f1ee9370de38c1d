//! Local sign-in state.
//!
//! A [`Session`] keeps the registered-user map and the signed-in user in two
//! persistent cells. It is an explicit value handed to the recipe store, so
//! several independent sessions can coexist (one per storage).

use std::{collections::BTreeMap, fmt::Write as _, sync::Arc};

use log::{debug, info};
use ring::digest::{digest, SHA256};

use crate::{
    cell::PersistentCell,
    error::{LarderError, Result},
    storage::KeyValueStore,
};

/// Storage key of the email → password digest map.
pub const USERS_KEY: &str = "recipeAppUsers";

/// Storage key of the signed-in user's email.
pub const CURRENT_USER_KEY: &str = "recipeAppCurrentUser";

/// Registered users and the currently signed-in one.
pub struct Session {
    storage: Arc<dyn KeyValueStore>,
    users: PersistentCell<BTreeMap<String, String>>,
    current_user: PersistentCell<Option<String>>,
}

impl Session {
    /// Loads the session state from `storage`.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let users = PersistentCell::load(storage.clone(), USERS_KEY, BTreeMap::new());
        let current_user = PersistentCell::load(storage.clone(), CURRENT_USER_KEY, None);

        Self {
            storage,
            users,
            current_user,
        }
    }

    /// Storage this session persists into.
    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        self.storage.clone()
    }

    /// Email of the signed-in user, if any.
    pub fn current_user(&self) -> Option<&str> {
        self.current_user.get().as_deref()
    }

    /// Registers a new account and signs it in.
    ///
    /// # Errors
    ///
    /// * `LarderError::InvalidInput` - When email or password is blank
    /// * `LarderError::Auth` - When the email is already registered
    pub fn signup(&mut self, email: &str, password: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LarderError::invalid_input("email").with_reason("must not be blank"));
        }
        if password.is_empty() {
            return Err(LarderError::invalid_input("password").with_reason("must not be blank"));
        }
        if self.users.get().contains_key(email) {
            return Err(LarderError::Auth(
                "An account with this email already exists.".to_string(),
            ));
        }

        let hashed = password_digest(email, password);
        self.users.update(|users| {
            let mut users = users.clone();
            users.insert(email.to_string(), hashed);
            users
        })?;
        self.current_user.set(Some(email.to_string()))?;

        info!("Registered account {email}");
        Ok(())
    }

    /// Signs in an existing account.
    ///
    /// # Errors
    ///
    /// Returns `LarderError::Auth` when the email is unknown or the password
    /// does not match.
    pub fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let email = email.trim();
        let matches = self
            .users
            .get()
            .get(email)
            .is_some_and(|stored| *stored == password_digest(email, password));

        if !matches {
            debug!("Rejected sign-in for {email}");
            return Err(LarderError::Auth("Invalid email or password.".to_string()));
        }

        self.current_user.set(Some(email.to_string()))?;
        info!("Signed in as {email}");
        Ok(())
    }

    /// Signs out. Signing out with nobody signed in is a no-op.
    pub fn logout(&mut self) -> Result<()> {
        if self.current_user.get().is_none() {
            return Ok(());
        }
        self.current_user.set(None)
    }
}

/// Hex SHA-256 of the email-salted password.
fn password_digest(email: &str, password: &str) -> String {
    let material = format!("{email}:{password}");
    let hash = digest(&SHA256, material.as_bytes());
    hash.as_ref()
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}
