//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{ImageRef, NewUser, PageParams, PageSlice, PasswordDigest, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email.
        DuplicateEmail => "email is already registered",
        /// Another account already uses the username.
        DuplicateUsername => "username is already taken",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Id and stored digest for the account registered under `email`.
    async fn credentials(
        &self,
        email: String,
    ) -> Result<Option<(UserId, PasswordDigest)>, UserRepositoryError>;

    /// Stored digest for `id`.
    async fn password_digest(
        &self,
        id: UserId,
    ) -> Result<Option<PasswordDigest>, UserRepositoryError>;

    /// Replace the stored digest. Returns `false` for unknown users.
    async fn set_password(
        &self,
        id: UserId,
        digest: PasswordDigest,
    ) -> Result<bool, UserRepositoryError>;

    /// One page of users ordered by username.
    async fn list(&self, page: PageParams) -> Result<PageSlice<User>, UserRepositoryError>;

    /// One page of the authors `follower` subscribes to, ordered by username.
    async fn followed_by(
        &self,
        follower: UserId,
        page: PageParams,
    ) -> Result<PageSlice<User>, UserRepositoryError>;

    /// Replace the avatar and return the previous one.
    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<ImageRef>,
    ) -> Result<Option<ImageRef>, UserRepositoryError>;
}
