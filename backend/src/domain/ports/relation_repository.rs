//! Port for relation edges: favorites, shopping-cart entries, subscriptions.
//!
//! Adapters enforce one edge per pair at the storage level and report
//! duplicates through [`EdgeInsert::AlreadyExists`] rather than an error.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Edge, EdgeDelete, EdgeInsert, RecipeId, RecipeRelation, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by relation repository adapters.
    pub enum RelationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "relation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "relation repository query failed: {message}",
        /// One end of the edge does not exist.
        MissingEndpoint { message: String } => "{message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationRepository: Send + Sync {
    /// Store `edge` stamped with `added_at` unless it already exists.
    ///
    /// An existing edge keeps its original timestamp.
    async fn insert(
        &self,
        edge: Edge,
        added_at: DateTime<Utc>,
    ) -> Result<EdgeInsert, RelationRepositoryError>;

    /// Remove `edge` if present.
    async fn delete(&self, edge: Edge) -> Result<EdgeDelete, RelationRepositoryError>;

    /// Which of `recipes` carry a `kind` edge from `user`.
    async fn recipe_memberships(
        &self,
        kind: RecipeRelation,
        user: UserId,
        recipes: Vec<RecipeId>,
    ) -> Result<HashSet<RecipeId>, RelationRepositoryError>;

    /// Which of `authors` `follower` is subscribed to.
    async fn followed_among(
        &self,
        follower: UserId,
        authors: Vec<UserId>,
    ) -> Result<HashSet<UserId>, RelationRepositoryError>;
}
