//! Driving port for user-facing queries.
//!
//! Inbound adapters (HTTP handlers) use this port to fetch user projections
//! without importing outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{Actor, AuthorView, Error, PageParams, PageSlice, UserId, UserView, Viewer};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// One page of users ordered by username.
    async fn list(&self, viewer: Viewer, page: PageParams) -> Result<PageSlice<UserView>, Error>;

    /// One user, or `NotFound`.
    async fn get(&self, viewer: Viewer, id: UserId) -> Result<UserView, Error>;

    /// The caller's own projection.
    async fn me(&self, actor: Actor) -> Result<UserView, Error>;

    /// Authors the caller follows, with up to `recipes_limit` recipes each.
    async fn subscriptions(
        &self,
        actor: Actor,
        page: PageParams,
        recipes_limit: Option<u32>,
    ) -> Result<PageSlice<AuthorView>, Error>;
}
