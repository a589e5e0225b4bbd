//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, image store) are implemented by outbound
//! adapters; driving ports (commands and queries) are implemented by the
//! domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts_command;
mod image_store;
mod ingredient_repository;
mod ingredients_query;
mod login_service;
mod recipe_relations_command;
mod recipe_repository;
mod recipes_command;
mod recipes_query;
mod relation_repository;
mod shopping_list_query;
mod subscriptions_command;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use accounts_command::MockAccountsCommand;
pub use accounts_command::{AccountsCommand, PasswordChange, Registration};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use ingredient_repository::MockIngredientRepository;
pub use ingredient_repository::{IngredientRepository, IngredientRepositoryError};
#[cfg(test)]
pub use ingredients_query::MockIngredientsQuery;
pub use ingredients_query::IngredientsQuery;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use recipe_relations_command::MockRecipeRelationsCommand;
pub use recipe_relations_command::RecipeRelationsCommand;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipeRepository, RecipeRepositoryError};
#[cfg(test)]
pub use recipes_command::MockRecipesCommand;
pub use recipes_command::RecipesCommand;
#[cfg(test)]
pub use recipes_query::MockRecipesQuery;
pub use recipes_query::{RecipeListFilter, RecipesQuery};
#[cfg(test)]
pub use relation_repository::MockRelationRepository;
pub use relation_repository::{RelationRepository, RelationRepositoryError};
#[cfg(test)]
pub use shopping_list_query::MockShoppingListQuery;
pub use shopping_list_query::ShoppingListQuery;
#[cfg(test)]
pub use subscriptions_command::MockSubscriptionsCommand;
pub use subscriptions_command::SubscriptionsCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
