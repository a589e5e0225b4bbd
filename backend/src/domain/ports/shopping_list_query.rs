//! Driving port for the shopping-list export.

use async_trait::async_trait;

use crate::domain::{Actor, Error, ShoppingList};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShoppingListQuery: Send + Sync {
    /// Aggregate the actor's cart; an empty cart is `EmptyResource`.
    async fn shopping_list(&self, actor: Actor) -> Result<ShoppingList, Error>;
}
