//! Driving port for account management.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{Actor, Email, Error, ImageUpload, PersonName, RegisteredUserView, Username};

/// Validated registration form; the password is hashed by the service.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: Email,
    pub username: Username,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub password: Zeroizing<String>,
}

/// Password change form.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current_password: Zeroizing<String>,
    pub new_password: Zeroizing<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Create an account.
    async fn register(&self, registration: Registration) -> Result<RegisteredUserView, Error>;

    /// Replace the caller's password after checking the current one.
    async fn change_password(&self, actor: Actor, change: PasswordChange) -> Result<(), Error>;

    /// Store a new avatar and return its public URL.
    async fn set_avatar(&self, actor: Actor, upload: ImageUpload) -> Result<String, Error>;

    /// Clear the caller's avatar.
    async fn remove_avatar(&self, actor: Actor) -> Result<(), Error>;
}
