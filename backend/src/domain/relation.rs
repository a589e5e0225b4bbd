//! Relation edges between users and recipes, and the add/remove toggle.
//!
//! Favorites, shopping-cart entries and subscriptions share one contract:
//! adding an existing edge and removing an absent one are both errors. The
//! storage-level uniqueness constraint decides which of two racing `add`
//! calls wins; there is no read-before-write check.

#![deny(missing_docs)]

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::ports::{RelationRepository, RelationRepositoryError};
use crate::domain::{Error, RecipeId, UserId};

/// User-to-recipe relation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeRelation {
    /// Recipe bookmarked by the user.
    Favorite,
    /// Recipe queued for the user's shopping list.
    ShoppingCart,
}

impl RecipeRelation {
    /// Conflict messages reported by the toggle for this kind.
    pub const fn messages(self) -> EdgeMessages {
        match self {
            Self::Favorite => FAVORITE_MESSAGES,
            Self::ShoppingCart => SHOPPING_CART_MESSAGES,
        }
    }

    /// Stable label used in logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::ShoppingCart => "shopping_cart",
        }
    }
}

/// A join record between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// User-to-recipe edge of a given kind.
    Recipe {
        /// Favorite or shopping-cart entry.
        kind: RecipeRelation,
        /// Owner of the entry.
        user: UserId,
        /// Recipe the entry points at.
        recipe: RecipeId,
    },
    /// User following an author.
    Subscription {
        /// Subscribing user.
        follower: UserId,
        /// Followed author; never equal to `follower`.
        author: UserId,
    },
}

impl Edge {
    /// Favorite edge.
    pub const fn favorite(user: UserId, recipe: RecipeId) -> Self {
        Self::Recipe {
            kind: RecipeRelation::Favorite,
            user,
            recipe,
        }
    }

    /// Shopping-cart edge.
    pub const fn shopping_cart(user: UserId, recipe: RecipeId) -> Self {
        Self::Recipe {
            kind: RecipeRelation::ShoppingCart,
            user,
            recipe,
        }
    }

    /// Subscription edge; rejects following oneself.
    pub fn subscription(follower: UserId, author: UserId) -> Result<Self, Error> {
        if follower == author {
            return Err(Error::conflict(SELF_SUBSCRIPTION));
        }
        Ok(Self::Subscription { follower, author })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Recipe { kind, .. } => kind.label(),
            Self::Subscription { .. } => "subscription",
        }
    }
}

/// Result of inserting an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    /// A new edge was stored.
    Created,
    /// The pair was already linked; nothing changed.
    AlreadyExists,
}

/// Result of deleting an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDelete {
    /// The edge existed and is gone.
    Removed,
    /// There was no edge to remove.
    Missing,
}

/// Messages reported when a toggle conflicts with stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeMessages {
    /// Reported when adding an edge that is already stored.
    pub already_exists: &'static str,
    /// Reported when removing an edge that is not stored.
    pub does_not_exist: &'static str,
}

/// Conflicts for the favorites toggle.
pub const FAVORITE_MESSAGES: EdgeMessages = EdgeMessages {
    already_exists: "Рецепт уже в избранном.",
    does_not_exist: "Рецепта не было в избранном.",
};

/// Conflicts for the shopping-cart toggle.
pub const SHOPPING_CART_MESSAGES: EdgeMessages = EdgeMessages {
    already_exists: "Рецепт уже в списке покупок.",
    does_not_exist: "Рецепта не было в списке покупок.",
};

/// Conflicts for the subscription toggle.
pub const SUBSCRIPTION_MESSAGES: EdgeMessages = EdgeMessages {
    already_exists: "Вы уже подписаны на этого автора.",
    does_not_exist: "Вы не были подписаны на этого автора.",
};

/// Reported when a user tries to follow themselves.
pub const SELF_SUBSCRIPTION: &str = "Нельзя подписаться на самого себя.";

pub(crate) fn map_relation_error(error: RelationRepositoryError) -> Error {
    match error {
        RelationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("relation repository unavailable: {message}"))
        }
        RelationRepositoryError::Query { message } => {
            Error::internal(format!("relation repository error: {message}"))
        }
        RelationRepositoryError::MissingEndpoint { message } => Error::not_found(message),
    }
}

/// Create `edge` stamped with `added_at`, failing with `Conflict` when it
/// already exists.
pub async fn add_edge<R>(
    repo: &R,
    edge: Edge,
    added_at: DateTime<Utc>,
    messages: EdgeMessages,
) -> Result<(), Error>
where
    R: RelationRepository + ?Sized,
{
    let outcome = repo
        .insert(edge, added_at)
        .await
        .map_err(map_relation_error)?;
    debug!(edge = edge.label(), ?outcome, "relation add");
    match outcome {
        EdgeInsert::Created => Ok(()),
        EdgeInsert::AlreadyExists => Err(Error::conflict(messages.already_exists)),
    }
}

/// Delete `edge`, failing with `Conflict` when it does not exist.
pub async fn remove_edge<R>(repo: &R, edge: Edge, messages: EdgeMessages) -> Result<(), Error>
where
    R: RelationRepository + ?Sized,
{
    let outcome = repo.delete(edge).await.map_err(map_relation_error)?;
    debug!(edge = edge.label(), ?outcome, "relation remove");
    match outcome {
        EdgeDelete::Removed => Ok(()),
        EdgeDelete::Missing => Err(Error::conflict(messages.does_not_exist)),
    }
}

#[cfg(test)]
mod tests {
    //! Toggle semantics over a mocked relation store.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockRelationRepository;
    use rstest::rstest;

    const USER: UserId = UserId::new(1);
    const RECIPE: RecipeId = RecipeId::new(10);

    #[rstest]
    #[case(EdgeInsert::Created, None)]
    #[case(EdgeInsert::AlreadyExists, Some("Рецепт уже в избранном."))]
    #[tokio::test]
    async fn add_reports_existing_edges(
        #[case] outcome: EdgeInsert,
        #[case] expected_conflict: Option<&str>,
    ) {
        let mut repo = MockRelationRepository::new();
        let now = Utc::now();
        repo.expect_insert()
            .withf(move |edge, added_at| {
                *edge == Edge::favorite(USER, RECIPE) && *added_at == now
            })
            .times(1)
            .return_once(move |_, _| Ok(outcome));

        let result = add_edge(
            &repo,
            Edge::favorite(USER, RECIPE),
            now,
            FAVORITE_MESSAGES,
        )
        .await;
        match expected_conflict {
            None => assert!(result.is_ok()),
            Some(message) => {
                let error = result.expect_err("conflict");
                assert_eq!(error.code(), ErrorCode::Conflict);
                assert_eq!(error.message(), message);
            }
        }
    }

    #[rstest]
    #[tokio::test]
    async fn remove_reports_missing_edges() {
        let mut repo = MockRelationRepository::new();
        repo.expect_delete()
            .times(1)
            .return_once(|_| Ok(EdgeDelete::Missing));

        let error = remove_edge(
            &repo,
            Edge::shopping_cart(USER, RECIPE),
            SHOPPING_CART_MESSAGES,
        )
        .await
        .expect_err("conflict");
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.message(), "Рецепта не было в списке покупок.");
    }

    #[rstest]
    fn self_subscription_is_rejected_before_storage() {
        let error = Edge::subscription(USER, USER).expect_err("self subscription");
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.message(), SELF_SUBSCRIPTION);
    }

    #[rstest]
    #[tokio::test]
    async fn vanished_targets_surface_as_not_found() {
        let mut repo = MockRelationRepository::new();
        repo.expect_insert()
            .return_once(|_, _| Err(RelationRepositoryError::missing_endpoint("recipe not found")));

        let error = add_edge(
            &repo,
            Edge::favorite(USER, RECIPE),
            Utc::now(),
            FAVORITE_MESSAGES,
        )
        .await
        .expect_err("missing endpoint");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
