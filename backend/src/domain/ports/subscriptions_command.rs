//! Driving port for following authors.

use async_trait::async_trait;

use crate::domain::{Actor, AuthorView, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionsCommand: Send + Sync {
    /// Follow `author` and return their projection with up to
    /// `recipes_limit` recipes.
    async fn subscribe(
        &self,
        actor: Actor,
        author: UserId,
        recipes_limit: Option<u32>,
    ) -> Result<AuthorView, Error>;

    /// Stop following `author`.
    async fn unsubscribe(&self, actor: Actor, author: UserId) -> Result<(), Error>;
}
