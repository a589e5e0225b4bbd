//! PostgreSQL-backed `RecipeRepository`.
//!
//! A recipe and its ingredient lines are written in one transaction; updates
//! replace the whole line set. Reads hydrate authors and lines with one query
//! each per page rather than per recipe.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use diesel::dsl::sum;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    AuthorRecipes, ImageRef, Ingredient, IngredientLines, NewRecipe, PageParams, PageSlice, Recipe,
    RecipeFilter, RecipeId, RecipeIngredient, RecipeUpdate, ShoppingListLine, User, UserId,
};

use super::diesel_helpers::{
    Violation, map_diesel_error, map_pool_error, page_window, to_total, violation,
};
use super::models::{
    IngredientRow, NewRecipeLineRow, NewRecipeRow, RecipeChangeset, RecipeRow, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{favorites, ingredients, recipe_ingredients, recipes, shopping_cart, users};

type DieselResult<T> = Result<T, diesel::result::Error>;

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> RecipeRepositoryError {
    map_pool_error(error, RecipeRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> RecipeRepositoryError {
    match violation(&error) {
        Some(Violation::ForeignKey { constraint }) => {
            debug!(%constraint, "recipe write referenced a missing row");
            RecipeRepositoryError::missing_reference(constraint)
        }
        _ => map_diesel_error(
            error,
            RecipeRepositoryError::query,
            RecipeRepositoryError::connection,
        ),
    }
}

/// Recipes matching `filter`, without selection or ordering.
fn filtered(filter: RecipeFilter) -> recipes::BoxedQuery<'static, Pg> {
    let mut query = recipes::table.into_boxed();
    if let Some(author) = filter.author {
        query = query.filter(recipes::author_id.eq(author.get()));
    }
    if let Some(user) = filter.favorited_by {
        query = query.filter(
            recipes::id.eq_any(
                favorites::table
                    .filter(favorites::user_id.eq(user.get()))
                    .select(favorites::recipe_id),
            ),
        );
    }
    if let Some(user) = filter.in_cart_of {
        query = query.filter(
            recipes::id.eq_any(
                shopping_cart::table
                    .filter(shopping_cart::user_id.eq(user.get()))
                    .select(shopping_cart::recipe_id),
            ),
        );
    }
    query
}

fn line_rows(recipe_id: i64, lines: &IngredientLines) -> Vec<NewRecipeLineRow> {
    lines
        .as_slice()
        .iter()
        .map(|line| NewRecipeLineRow {
            recipe_id,
            ingredient_id: line.ingredient.get(),
            amount: line.amount.get(),
        })
        .collect()
}

/// Attach authors and ingredient lines to `rows`, keeping their order.
async fn hydrate(conn: &mut AsyncPgConnection, rows: Vec<RecipeRow>) -> DieselResult<Vec<Recipe>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let author_ids: Vec<i64> = rows
        .iter()
        .map(|row| row.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<i64, User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(UserRow::as_select())
        .load::<UserRow>(conn)
        .await?
        .into_iter()
        .map(|row| (row.id, User::from(row)))
        .collect();

    let line_rows: Vec<(i64, i32, IngredientRow)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::amount,
            IngredientRow::as_select(),
        ))
        .order_by(recipe_ingredients::id.asc())
        .load(conn)
        .await?;
    let mut lines: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
    for (recipe_id, amount, ingredient) in line_rows {
        lines.entry(recipe_id).or_default().push(RecipeIngredient {
            ingredient: Ingredient::from(ingredient),
            amount,
        });
    }

    rows.into_iter()
        .map(|row| {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or(diesel::result::Error::NotFound)?;
            Ok(Recipe {
                id: RecipeId::new(row.id),
                author,
                ingredients: lines.remove(&row.id).unwrap_or_default(),
                name: row.name,
                image: ImageRef::new(row.image),
                text: row.text,
                cooking_time: row.cooking_time,
                created_at: row.created_at,
            })
        })
        .collect()
}

fn group_by_author(rows: Vec<RecipeRow>, limit: Option<u32>) -> HashMap<UserId, AuthorRecipes> {
    let cap = limit.map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
    let mut grouped: HashMap<UserId, AuthorRecipes> = HashMap::new();
    for row in rows {
        let entry = grouped.entry(UserId::new(row.author_id)).or_default();
        entry.total += 1;
        if entry.recipes.len() < cap {
            entry.recipes.push(row.summary());
        }
    }
    grouped
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn create(&self, recipe: NewRecipe) -> Result<RecipeId, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let id = conn
            .transaction(|conn| {
                async move {
                    let row = NewRecipeRow {
                        author_id: recipe.author.get(),
                        name: recipe.name.as_ref(),
                        image: recipe.image.as_ref(),
                        text: recipe.text.as_ref(),
                        cooking_time: recipe.cooking_time.get(),
                        created_at: recipe.created_at,
                    };
                    let id: i64 = diesel::insert_into(recipes::table)
                        .values(&row)
                        .returning(recipes::id)
                        .get_result(conn)
                        .await?;

                    diesel::insert_into(recipe_ingredients::table)
                        .values(&line_rows(id, &recipe.ingredients))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        Ok(RecipeId::new(id))
    }

    async fn update(
        &self,
        id: RecipeId,
        update: RecipeUpdate,
    ) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        conn.transaction(|conn| {
            async move {
                let exists: Option<i64> = recipes::table
                    .find(id.get())
                    .select(recipes::id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if exists.is_none() {
                    return Ok(false);
                }

                let changes = RecipeChangeset {
                    name: update.name.as_ref().map(AsRef::as_ref),
                    image: update.image.as_ref().map(AsRef::as_ref),
                    text: update.text.as_ref().map(AsRef::as_ref),
                    cooking_time: update.cooking_time.map(|time| time.get()),
                };
                if !changes.is_empty() {
                    diesel::update(recipes::table.find(id.get()))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                }

                diesel::delete(
                    recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(id.get())),
                )
                .execute(conn)
                .await?;
                diesel::insert_into(recipe_ingredients::table)
                    .values(&line_rows(id.get(), &update.ingredients))
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(diesel_error)
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let removed = diesel::delete(recipes::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(removed > 0)
    }

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<RecipeRow> = recipes::table
            .find(id.get())
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut hydrated = hydrate(&mut conn, vec![row]).await.map_err(diesel_error)?;
        Ok(hydrated.pop())
    }

    async fn list(
        &self,
        filter: RecipeFilter,
        page: PageParams,
    ) -> Result<PageSlice<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (limit, offset) = page_window(page);

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let rows: Vec<RecipeRow> = filtered(filter)
            .select(RecipeRow::as_select())
            .order_by((recipes::created_at.desc(), recipes::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        let items = hydrate(&mut conn, rows).await.map_err(diesel_error)?;
        Ok(PageSlice::new(items, to_total(total)))
    }

    async fn author_recipes(
        &self,
        authors: Vec<UserId>,
        limit: Option<u32>,
    ) -> Result<HashMap<UserId, AuthorRecipes>, RecipeRepositoryError> {
        if authors.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let raw: Vec<i64> = authors.iter().map(|id| id.get()).collect();

        let rows: Vec<RecipeRow> = recipes::table
            .filter(recipes::author_id.eq_any(&raw))
            .select(RecipeRow::as_select())
            .order_by((recipes::created_at.desc(), recipes::id.desc()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(group_by_author(rows, limit))
    }

    async fn shopping_list(
        &self,
        user: UserId,
    ) -> Result<Vec<ShoppingListLine>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let carted = shopping_cart::table
            .filter(shopping_cart::user_id.eq(user.get()))
            .select(shopping_cart::recipe_id);
        let rows: Vec<(String, String, Option<i64>)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq_any(carted))
            .group_by((ingredients::name, ingredients::measurement_unit))
            .select((
                ingredients::name,
                ingredients::measurement_unit,
                sum(recipe_ingredients::amount),
            ))
            .order_by((ingredients::name.asc(), ingredients::measurement_unit.asc()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(name, measurement_unit, total)| ShoppingListLine {
                name,
                measurement_unit,
                total: total.unwrap_or_default(),
            })
            .collect())
    }
}
