//! Signup and login.
//!
//! Passwords are hashed with bcrypt and only ever compared against the
//! stored hash. Hashing runs on the blocking thread pool.

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{PublicUser, Role};
use crate::store::{Store, StoreError};

/// Error from account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Signup input was incomplete
    #[error("Name, email and password are required")]
    MissingSignupFields,

    /// Password and its confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Login input was incomplete
    #[error("Email and password are required")]
    MissingCredentials,

    /// The email is already registered
    #[error("User already exists")]
    DuplicateEmail,

    /// No user has this email
    #[error("User not found")]
    UnknownEmail,

    /// The password does not match the stored hash
    #[error("Invalid credentials")]
    WrongPassword,

    /// bcrypt failed or the hashing task died
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Storage failed
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AccountError::DuplicateEmail,
            other => AccountError::Store(other),
        }
    }
}

/// Signup input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Signup {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Login input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Login {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Account operations over the user collection.
#[derive(Clone)]
pub struct Accounts {
    store: Store,
    hash_cost: u32,
}

impl Accounts {
    /// `hash_cost` is the bcrypt cost factor (4..=31).
    pub fn new(store: Store, hash_cost: u32) -> Self {
        Self { store, hash_cost }
    }

    /// Register a user.
    ///
    /// Name and email are stored trimmed. The role defaults to `user`.
    pub async fn signup(&self, signup: Signup) -> Result<PublicUser, AccountError> {
        let name = non_blank(signup.name).ok_or(AccountError::MissingSignupFields)?;
        let email = non_blank(signup.email).ok_or(AccountError::MissingSignupFields)?;
        let password = signup
            .password
            .filter(|p| !p.is_empty())
            .ok_or(AccountError::MissingSignupFields)?;
        let role = signup.role.unwrap_or_default();

        // Cheap check first so a duplicate doesn't pay for hashing. The
        // store re-checks under its write lock.
        if self.store.find_user_by_email(&email).await.is_some() {
            warn!(%email, "signup rejected: email already registered");
            return Err(AccountError::DuplicateEmail);
        }

        let cost = self.hash_cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AccountError::Hash(e.to_string()))?
            .map_err(|e| AccountError::Hash(e.to_string()))?;

        let user = self.store.insert_user(name, email, hash, role).await?;
        info!(user = %user.id, role = %user.role, "user signed up");

        Ok(PublicUser::from(&user))
    }

    /// Check credentials and return the user's public fields.
    pub async fn login(&self, login: Login) -> Result<PublicUser, AccountError> {
        let email = non_blank(login.email).ok_or(AccountError::MissingCredentials)?;
        let password = login.password.ok_or(AccountError::MissingCredentials)?;

        let user = self
            .store
            .find_user_by_email(&email)
            .await
            .ok_or(AccountError::UnknownEmail)?;

        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AccountError::Hash(e.to_string()))?
            .map_err(|e| AccountError::Hash(e.to_string()))?;

        if !matches {
            warn!(user = %user.id, "login rejected: wrong password");
            return Err(AccountError::WrongPassword);
        }

        Ok(PublicUser::from(&user))
    }
}

/// Trim, treating blank as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
