//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to authenticate credentials and to turn the user
//! id held in a session back into an [`Actor`] without knowing the backing
//! infrastructure.

use async_trait::async_trait;

use crate::domain::{Actor, Error, LoginCredentials, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;

    /// Actor for a session's user id; `None` when the account is gone.
    async fn resolve(&self, id: UserId) -> Result<Option<Actor>, Error>;
}
