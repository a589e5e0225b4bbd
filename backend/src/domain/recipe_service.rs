//! Recipe store service: publishing, editing, listing and the shopping-list
//! export.
//!
//! Writes validate everything that can be checked without touching storage
//! first, then store the image, then persist the recipe and its lines in one
//! repository call. Responses are rendered from a fresh read of the stored
//! recipe.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ingredient_service::map_ingredient_error;
use crate::domain::media::{discard_image, store_image};
use crate::domain::ports::{
    ImageStore, IngredientRepository, RecipeListFilter, RecipeRepository, RecipeRepositoryError,
    RecipesCommand, RecipesQuery, RelationRepository, ShoppingListQuery,
};
use crate::domain::{
    Actor, EMPTY_SHOPPING_LIST, Error, ImageKind, IngredientId, IngredientLines, NewRecipe,
    PageParams, PageSlice, Recipe, RecipeChanges, RecipeDraft, RecipeFilter, RecipeId,
    RecipeUpdate, RecipeValidationError, RecipeView, ShoppingList, ViewProjector, Viewer,
};

pub(crate) const RECIPE_NOT_FOUND: &str = "Рецепт не найден.";
pub(crate) const PERMISSION_DENIED: &str =
    "У вас недостаточно прав для выполнения данного действия.";

pub(crate) fn map_recipe_error(error: RecipeRepositoryError) -> Error {
    match error {
        RecipeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipeRepositoryError::Query { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
        RecipeRepositoryError::MissingReference { message } => {
            Error::invalid_field("ingredients", "does_not_exist", message)
        }
    }
}

fn unknown_ingredient(id: IngredientId) -> Error {
    Error::invalid_field(
        "ingredients",
        "does_not_exist",
        format!("Недопустимый первичный ключ \"{id}\" - объект не существует."),
    )
}

/// Recipe service implementing the recipe driving ports.
pub struct RecipeService<R, G, L: ?Sized, M: ?Sized> {
    recipes: Arc<R>,
    ingredients: Arc<G>,
    images: Arc<M>,
    projector: ViewProjector<L, M>,
    clock: Arc<dyn Clock>,
}

impl<R, G, L, M> RecipeService<R, G, L, M>
where
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    pub fn new(
        recipes: Arc<R>,
        ingredients: Arc<G>,
        relations: Arc<L>,
        images: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            recipes,
            ingredients,
            projector: ViewProjector::new(relations, Arc::clone(&images)),
            images,
            clock,
        }
    }
}

impl<R, G, L, M> RecipeService<R, G, L, M>
where
    R: RecipeRepository,
    G: IngredientRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn load(&self, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find(id)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(|| Error::not_found(RECIPE_NOT_FOUND))
    }

    async fn load_modifiable(&self, actor: &Actor, id: RecipeId) -> Result<Recipe, Error> {
        let recipe = self.load(id).await?;
        if !recipe.can_be_modified_by(actor) {
            return Err(Error::forbidden(PERMISSION_DENIED));
        }
        Ok(recipe)
    }

    async fn ensure_ingredients_exist(&self, lines: &IngredientLines) -> Result<(), Error> {
        let missing = self
            .ingredients
            .missing(lines.ingredient_ids())
            .await
            .map_err(map_ingredient_error)?;
        match missing.first() {
            Some(id) => Err(unknown_ingredient(*id)),
            None => Ok(()),
        }
    }

    async fn render(&self, actor: Actor, id: RecipeId) -> Result<RecipeView, Error> {
        let recipe = self.load(id).await?;
        self.projector.recipe(&Viewer::from(actor), recipe).await
    }

    fn resolve_filter(viewer: &Viewer, filter: RecipeListFilter) -> RecipeFilter {
        let user = viewer.user_id();
        RecipeFilter {
            author: filter.author,
            favorited_by: user.filter(|_| filter.is_favorited),
            in_cart_of: user.filter(|_| filter.is_in_shopping_cart),
        }
    }
}

#[async_trait]
impl<R, G, L, M> RecipesCommand for RecipeService<R, G, L, M>
where
    R: RecipeRepository,
    G: IngredientRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn create(&self, actor: Actor, draft: RecipeDraft) -> Result<RecipeView, Error> {
        self.ensure_ingredients_exist(&draft.ingredients).await?;
        let image = store_image(self.images.as_ref(), ImageKind::Recipe, draft.image).await?;
        let recipe = NewRecipe {
            author: actor.id,
            name: draft.name,
            text: draft.text,
            cooking_time: draft.cooking_time,
            image: image.clone(),
            ingredients: draft.ingredients,
            created_at: self.clock.utc(),
        };
        let id = match self.recipes.create(recipe).await {
            Ok(id) => id,
            Err(error) => {
                discard_image(self.images.as_ref(), image).await;
                return Err(map_recipe_error(error));
            }
        };
        debug!(recipe = %id, author = %actor.id, "recipe created");
        self.render(actor, id).await
    }

    async fn update(
        &self,
        actor: Actor,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<RecipeView, Error> {
        let current = self.load_modifiable(&actor, id).await?;
        let ingredients = changes
            .ingredients
            .ok_or(RecipeValidationError::IngredientsRequired)?;
        self.ensure_ingredients_exist(&ingredients).await?;

        let image = match changes.image {
            Some(upload) => {
                Some(store_image(self.images.as_ref(), ImageKind::Recipe, upload).await?)
            }
            None => None,
        };
        let update = RecipeUpdate {
            name: changes.name,
            text: changes.text,
            cooking_time: changes.cooking_time,
            image: image.clone(),
            ingredients,
        };
        let outcome = self.recipes.update(id, update).await;
        match (outcome, image) {
            (Ok(true), Some(_)) => discard_image(self.images.as_ref(), current.image).await,
            (Ok(true), None) => {}
            (Ok(false), fresh) => {
                if let Some(fresh) = fresh {
                    discard_image(self.images.as_ref(), fresh).await;
                }
                return Err(Error::not_found(RECIPE_NOT_FOUND));
            }
            (Err(error), fresh) => {
                if let Some(fresh) = fresh {
                    discard_image(self.images.as_ref(), fresh).await;
                }
                return Err(map_recipe_error(error));
            }
        }
        debug!(recipe = %id, actor = %actor.id, "recipe updated");
        self.render(actor, id).await
    }

    async fn delete(&self, actor: Actor, id: RecipeId) -> Result<(), Error> {
        let recipe = self.load_modifiable(&actor, id).await?;
        if !self.recipes.delete(id).await.map_err(map_recipe_error)? {
            return Err(Error::not_found(RECIPE_NOT_FOUND));
        }
        discard_image(self.images.as_ref(), recipe.image).await;
        debug!(recipe = %id, actor = %actor.id, "recipe deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, G, L, M> RecipesQuery for RecipeService<R, G, L, M>
where
    R: RecipeRepository,
    G: IngredientRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn list(
        &self,
        viewer: Viewer,
        filter: RecipeListFilter,
        page: PageParams,
    ) -> Result<PageSlice<RecipeView>, Error> {
        let filter = Self::resolve_filter(&viewer, filter);
        let slice = self
            .recipes
            .list(filter, page)
            .await
            .map_err(map_recipe_error)?
            .ensure_page(page)?;
        let items = self.projector.recipes(&viewer, slice.items).await?;
        Ok(PageSlice::new(items, slice.total))
    }

    async fn get(&self, viewer: Viewer, id: RecipeId) -> Result<RecipeView, Error> {
        let recipe = self.load(id).await?;
        self.projector.recipe(&viewer, recipe).await
    }

    async fn short_link(&self, id: RecipeId) -> Result<String, Error> {
        let recipe = self.load(id).await?;
        Ok(recipe.id.to_string())
    }
}

#[async_trait]
impl<R, G, L, M> ShoppingListQuery for RecipeService<R, G, L, M>
where
    R: RecipeRepository,
    G: IngredientRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn shopping_list(&self, actor: Actor) -> Result<ShoppingList, Error> {
        let lines = self
            .recipes
            .shopping_list(actor.id)
            .await
            .map_err(map_recipe_error)?;
        if lines.is_empty() {
            return Err(Error::empty_resource(EMPTY_SHOPPING_LIST));
        }
        Ok(ShoppingList::from_sorted(lines))
    }
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
