//! Read projections rendered for a particular viewer.
//!
//! Per-viewer flags (`is_favorited`, `is_in_shopping_cart`, `is_subscribed`)
//! are resolved with one set-membership query per flag for a whole batch of
//! rows. Anonymous viewers never reach the relation store.

#![deny(missing_docs)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{ImageStore, RelationRepository};
use crate::domain::relation::map_relation_error;
use crate::domain::{
    AuthorRecipes, Error, ImageRef, IngredientId, Recipe, RecipeId, RecipeRelation, RecipeSummary,
    User, UserId, Viewer,
};

/// Public user projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserView {
    /// Account id.
    #[schema(value_type = i64)]
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Unique public handle.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Whether the viewer follows this user; `false` for anonymous viewers.
    pub is_subscribed: bool,
    /// Absolute avatar URL.
    pub avatar: Option<String>,
}

/// Account as echoed back after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RegisteredUserView {
    /// Id assigned to the new account.
    #[schema(value_type = i64)]
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Unique public handle.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl From<&User> for RegisteredUserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Ingredient line inside a recipe projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IngredientAmountView {
    /// Catalogue ingredient id.
    #[schema(value_type = i64)]
    pub id: IngredientId,
    /// Ingredient name.
    pub name: String,
    /// Unit the amount is measured in.
    pub measurement_unit: String,
    /// Quantity used by the recipe.
    pub amount: i32,
}

/// Full recipe projection; every recipe response uses this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecipeView {
    /// Recipe id.
    #[schema(value_type = i64)]
    pub id: RecipeId,
    /// Author as seen by the viewer.
    pub author: UserView,
    /// Ingredient lines in insertion order.
    pub ingredients: Vec<IngredientAmountView>,
    /// Whether the viewer has favorited the recipe.
    pub is_favorited: bool,
    /// Whether the recipe is in the viewer's shopping cart.
    pub is_in_shopping_cart: bool,
    /// Recipe title.
    pub name: String,
    /// Absolute image URL.
    pub image: String,
    /// Cooking instructions.
    pub text: String,
    /// Minutes to cook.
    pub cooking_time: i32,
}

/// Minified recipe used by relation responses and author listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecipeSummaryView {
    /// Recipe id.
    #[schema(value_type = i64)]
    pub id: RecipeId,
    /// Recipe title.
    pub name: String,
    /// Absolute image URL.
    pub image: String,
    /// Minutes to cook.
    pub cooking_time: i32,
}

/// User projection extended with the author's recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthorView {
    /// Author fields, flattened into the response object.
    #[serde(flatten)]
    pub user: UserView,
    /// Newest recipes, truncated by `recipes_limit`.
    pub recipes: Vec<RecipeSummaryView>,
    /// Total recipes by the author, ignoring truncation.
    pub recipes_count: u64,
}

/// Attach an author's recipes to their user projection, rendering each
/// recipe with `render`.
pub fn project_author<F>(user: UserView, recipes: AuthorRecipes, render: F) -> AuthorView
where
    F: Fn(RecipeSummary) -> RecipeSummaryView,
{
    AuthorView {
        user,
        recipes: recipes.recipes.into_iter().map(render).collect(),
        recipes_count: recipes.total,
    }
}

/// Flags resolved for one batch of rows.
#[derive(Debug, Default)]
struct ViewerFlags {
    viewer: Option<UserId>,
    favorited: HashSet<RecipeId>,
    in_cart: HashSet<RecipeId>,
    followed: HashSet<UserId>,
}

impl ViewerFlags {
    fn is_subscribed(&self, author: UserId) -> bool {
        self.viewer != Some(author) && self.followed.contains(&author)
    }
}

/// Renders entities into their read projections.
pub struct ViewProjector<L: ?Sized, I: ?Sized> {
    relations: Arc<L>,
    images: Arc<I>,
}

impl<L: ?Sized, I: ?Sized> Clone for ViewProjector<L, I> {
    fn clone(&self) -> Self {
        Self {
            relations: Arc::clone(&self.relations),
            images: Arc::clone(&self.images),
        }
    }
}

impl<L, I> ViewProjector<L, I>
where
    L: RelationRepository + ?Sized,
    I: ImageStore + ?Sized,
{
    /// Build a projector that resolves relation flags through `relations`.
    pub fn new(relations: Arc<L>, images: Arc<I>) -> Self {
        Self { relations, images }
    }

    /// Project a page of recipes.
    pub async fn recipes(
        &self,
        viewer: &Viewer,
        recipes: Vec<Recipe>,
    ) -> Result<Vec<RecipeView>, Error> {
        let recipe_ids: Vec<RecipeId> = recipes.iter().map(|recipe| recipe.id).collect();
        let authors: Vec<UserId> = recipes.iter().map(|recipe| recipe.author.id).collect();
        let flags = self.flags(viewer, recipe_ids, authors).await?;
        Ok(recipes
            .into_iter()
            .map(|recipe| self.render_recipe(recipe, &flags))
            .collect())
    }

    /// Project one recipe.
    pub async fn recipe(&self, viewer: &Viewer, recipe: Recipe) -> Result<RecipeView, Error> {
        self.recipes(viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| Error::internal("recipe projection lost its row"))
    }

    /// Project a batch of users.
    pub async fn users(&self, viewer: &Viewer, users: Vec<User>) -> Result<Vec<UserView>, Error> {
        let ids = users.iter().map(|user| user.id).collect();
        let flags = self.flags(viewer, Vec::new(), ids).await?;
        Ok(users
            .iter()
            .map(|user| self.render_user(user, &flags))
            .collect())
    }

    /// Project one user.
    pub async fn user(&self, viewer: &Viewer, user: &User) -> Result<UserView, Error> {
        self.users(viewer, vec![user.clone()])
            .await?
            .pop()
            .ok_or_else(|| Error::internal("user projection lost its row"))
    }

    /// Project authors with their recipes; authors missing from `recipes`
    /// get an empty list.
    pub async fn authors(
        &self,
        viewer: &Viewer,
        users: Vec<User>,
        mut recipes: HashMap<UserId, AuthorRecipes>,
    ) -> Result<Vec<AuthorView>, Error> {
        let ids = users.iter().map(|user| user.id).collect();
        let flags = self.flags(viewer, Vec::new(), ids).await?;
        Ok(users
            .iter()
            .map(|user| {
                let own = recipes.remove(&user.id).unwrap_or_default();
                project_author(self.render_user(user, &flags), own, |summary| {
                    self.summary(summary)
                })
            })
            .collect())
    }

    /// Minified recipe projection.
    pub fn summary(&self, summary: RecipeSummary) -> RecipeSummaryView {
        RecipeSummaryView {
            id: summary.id,
            name: summary.name,
            image: self.images.public_url(&summary.image),
            cooking_time: summary.cooking_time,
        }
    }

    /// Absolute URL of a stored image.
    pub fn image_url(&self, image: &ImageRef) -> String {
        self.images.public_url(image)
    }

    async fn flags(
        &self,
        viewer: &Viewer,
        recipes: Vec<RecipeId>,
        authors: Vec<UserId>,
    ) -> Result<ViewerFlags, Error> {
        let Some(user) = viewer.user_id() else {
            return Ok(ViewerFlags::default());
        };
        let mut flags = ViewerFlags {
            viewer: Some(user),
            ..ViewerFlags::default()
        };
        if !recipes.is_empty() {
            flags.favorited = self
                .relations
                .recipe_memberships(RecipeRelation::Favorite, user, recipes.clone())
                .await
                .map_err(map_relation_error)?;
            flags.in_cart = self
                .relations
                .recipe_memberships(RecipeRelation::ShoppingCart, user, recipes)
                .await
                .map_err(map_relation_error)?;
        }
        let mut others: Vec<UserId> = authors.into_iter().filter(|id| *id != user).collect();
        others.sort_unstable();
        others.dedup();
        if !others.is_empty() {
            flags.followed = self
                .relations
                .followed_among(user, others)
                .await
                .map_err(map_relation_error)?;
        }
        Ok(flags)
    }

    fn render_user(&self, user: &User, flags: &ViewerFlags) -> UserView {
        UserView {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed: flags.is_subscribed(user.id),
            avatar: user
                .avatar
                .as_ref()
                .map(|avatar| self.images.public_url(avatar)),
        }
    }

    fn render_recipe(&self, recipe: Recipe, flags: &ViewerFlags) -> RecipeView {
        RecipeView {
            id: recipe.id,
            author: self.render_user(&recipe.author, flags),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(|line| IngredientAmountView {
                    id: line.ingredient.id,
                    name: line.ingredient.name,
                    measurement_unit: line.ingredient.measurement_unit,
                    amount: line.amount,
                })
                .collect(),
            is_favorited: flags.favorited.contains(&recipe.id),
            is_in_shopping_cart: flags.in_cart.contains(&recipe.id),
            name: recipe.name,
            image: self.images.public_url(&recipe.image),
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[cfg(test)]
mod tests;
