//! In-process store implementing every driven repository port.
//!
//! Backs the server when no database is configured and the HTTP and
//! behaviour tests. It enforces the same rules as the PostgreSQL schema:
//! unique email, username and ingredient name; one edge per pair; cascading
//! removal of lines and edges with their recipe; foreign-key checks on
//! recipe lines and edges.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    IngredientRepository, IngredientRepositoryError, RecipeRepository, RecipeRepositoryError,
    RelationRepository, RelationRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    AuthorRecipes, Edge, EdgeDelete, EdgeInsert, ImageRef, Ingredient, IngredientId,
    IngredientLines, NewIngredient, NewRecipe, NewUser, PageParams, PageSlice, PasswordDigest,
    Recipe, RecipeFilter, RecipeId, RecipeIngredient, RecipeRelation, RecipeUpdate, ShoppingList,
    ShoppingListLine, User, UserId, matches_prefix, paginate,
};

const POISONED: &str = "memory store lock poisoned";

struct StoredUser {
    user: User,
    password: PasswordDigest,
}

struct StoredRecipe {
    author: UserId,
    name: String,
    image: ImageRef,
    text: String,
    cooking_time: i32,
    created_at: DateTime<Utc>,
    lines: Vec<(IngredientId, i32)>,
}

#[derive(Default)]
struct State {
    last_id: i64,
    users: BTreeMap<UserId, StoredUser>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    recipes: BTreeMap<RecipeId, StoredRecipe>,
    favorites: BTreeMap<(UserId, RecipeId), DateTime<Utc>>,
    shopping_cart: BTreeMap<(UserId, RecipeId), DateTime<Utc>>,
    subscriptions: BTreeMap<(UserId, UserId), DateTime<Utc>>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn recipe_edges(
        &self,
        kind: RecipeRelation,
    ) -> &BTreeMap<(UserId, RecipeId), DateTime<Utc>> {
        match kind {
            RecipeRelation::Favorite => &self.favorites,
            RecipeRelation::ShoppingCart => &self.shopping_cart,
        }
    }

    fn recipe_edges_mut(
        &mut self,
        kind: RecipeRelation,
    ) -> &mut BTreeMap<(UserId, RecipeId), DateTime<Utc>> {
        match kind {
            RecipeRelation::Favorite => &mut self.favorites,
            RecipeRelation::ShoppingCart => &mut self.shopping_cart,
        }
    }

    fn missing_ingredient(&self, lines: &IngredientLines) -> Option<IngredientId> {
        lines
            .as_slice()
            .iter()
            .map(|line| line.ingredient)
            .find(|id| !self.ingredients.contains_key(id))
    }

    fn hydrate(&self, id: RecipeId, stored: &StoredRecipe) -> Option<Recipe> {
        let author = self.users.get(&stored.author)?.user.clone();
        let ingredients = stored
            .lines
            .iter()
            .filter_map(|(ingredient, amount)| {
                self.ingredients
                    .get(ingredient)
                    .map(|ingredient| RecipeIngredient {
                        ingredient: ingredient.clone(),
                        amount: *amount,
                    })
            })
            .collect();
        Some(Recipe {
            id,
            author,
            name: stored.name.clone(),
            image: stored.image.clone(),
            text: stored.text.clone(),
            cooking_time: stored.cooking_time,
            created_at: stored.created_at,
            ingredients,
        })
    }

    /// Recipe ids matching `filter`, newest first.
    fn matching(&self, filter: &RecipeFilter) -> Vec<RecipeId> {
        let mut ids: Vec<(DateTime<Utc>, RecipeId)> = self
            .recipes
            .iter()
            .filter(|(id, recipe)| {
                filter.author.is_none_or(|author| recipe.author == author)
                    && filter
                        .favorited_by
                        .is_none_or(|user| self.favorites.contains_key(&(user, **id)))
                    && filter
                        .in_cart_of
                        .is_none_or(|user| self.shopping_cart.contains_key(&(user, **id)))
            })
            .map(|(id, recipe)| (recipe.created_at, *id))
            .collect();
        ids.sort_by(|a, b| b.cmp(a));
        ids.into_iter().map(|(_, id)| id).collect()
    }

    fn users_by_name(&self, keep: impl Fn(UserId) -> bool) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .values()
            .filter(|stored| keep(stored.user.id))
            .map(|stored| stored.user.clone())
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));
        users
    }
}

/// Cloneable handle to a shared in-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
    ) -> Result<MutexGuard<'_, State>, E> {
        self.state.lock().map_err(|_| poisoned(POISONED))
    }

    /// Flag an account as administrator. Returns `false` for unknown users.
    pub fn grant_admin(&self, id: UserId) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        match state.users.get_mut(&id) {
            Some(stored) => {
                stored.user.is_admin = true;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IngredientRepository for MemoryStore {
    async fn search(
        &self,
        prefix: Option<String>,
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        let state = self.lock(IngredientRepositoryError::query)?;
        let mut found: Vec<Ingredient> = state
            .ingredients
            .values()
            .filter(|ingredient| matches_prefix(&ingredient.name, prefix.as_deref()))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn find(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, IngredientRepositoryError> {
        let state = self.lock(IngredientRepositoryError::query)?;
        Ok(state.ingredients.get(&id).cloned())
    }

    async fn missing(
        &self,
        ids: Vec<IngredientId>,
    ) -> Result<Vec<IngredientId>, IngredientRepositoryError> {
        let state = self.lock(IngredientRepositoryError::query)?;
        Ok(ids
            .into_iter()
            .filter(|id| !state.ingredients.contains_key(id))
            .collect())
    }

    async fn insert_missing(
        &self,
        batch: Vec<NewIngredient>,
    ) -> Result<usize, IngredientRepositoryError> {
        let mut state = self.lock(IngredientRepositoryError::query)?;
        let mut names: HashSet<String> = state
            .ingredients
            .values()
            .map(|ingredient| ingredient.name.clone())
            .collect();
        let mut written = 0;
        for ingredient in batch {
            if !names.insert(ingredient.name().to_owned()) {
                continue;
            }
            let id = IngredientId::new(state.next_id());
            state.ingredients.insert(
                id,
                Ingredient {
                    id,
                    name: ingredient.name().to_owned(),
                    measurement_unit: ingredient.measurement_unit().to_owned(),
                },
            );
            written += 1;
        }
        Ok(written)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        let mut state = self.lock(UserRepositoryError::query)?;
        let taken = |check: fn(&User) -> &str, value: &str| {
            state
                .users
                .values()
                .any(|stored| check(&stored.user) == value)
        };
        if taken(|user| user.email.as_str(), user.email.as_ref()) {
            return Err(UserRepositoryError::duplicate_email());
        }
        if taken(|user| user.username.as_str(), user.username.as_ref()) {
            return Err(UserRepositoryError::duplicate_username());
        }

        let id = UserId::new(state.next_id());
        let created = User {
            id,
            email: user.email.as_ref().to_owned(),
            username: user.username.as_ref().to_owned(),
            first_name: user.first_name.as_ref().to_owned(),
            last_name: user.last_name.as_ref().to_owned(),
            avatar: None,
            is_admin: false,
        };
        state.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                password: user.password,
            },
        );
        Ok(created)
    }

    async fn find(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let state = self.lock(UserRepositoryError::query)?;
        Ok(state.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn credentials(
        &self,
        email: String,
    ) -> Result<Option<(UserId, PasswordDigest)>, UserRepositoryError> {
        let state = self.lock(UserRepositoryError::query)?;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.email == email)
            .map(|stored| (stored.user.id, stored.password.clone())))
    }

    async fn password_digest(
        &self,
        id: UserId,
    ) -> Result<Option<PasswordDigest>, UserRepositoryError> {
        let state = self.lock(UserRepositoryError::query)?;
        Ok(state.users.get(&id).map(|stored| stored.password.clone()))
    }

    async fn set_password(
        &self,
        id: UserId,
        digest: PasswordDigest,
    ) -> Result<bool, UserRepositoryError> {
        let mut state = self.lock(UserRepositoryError::query)?;
        Ok(state
            .users
            .get_mut(&id)
            .map(|stored| stored.password = digest)
            .is_some())
    }

    async fn list(&self, page: PageParams) -> Result<PageSlice<User>, UserRepositoryError> {
        let state = self.lock(UserRepositoryError::query)?;
        Ok(paginate(state.users_by_name(|_| true), page))
    }

    async fn followed_by(
        &self,
        follower: UserId,
        page: PageParams,
    ) -> Result<PageSlice<User>, UserRepositoryError> {
        let state = self.lock(UserRepositoryError::query)?;
        let followed =
            state.users_by_name(|author| state.subscriptions.contains_key(&(follower, author)));
        Ok(paginate(followed, page))
    }

    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<ImageRef>,
    ) -> Result<Option<ImageRef>, UserRepositoryError> {
        let mut state = self.lock(UserRepositoryError::query)?;
        Ok(state
            .users
            .get_mut(&id)
            .and_then(|stored| std::mem::replace(&mut stored.user.avatar, avatar)))
    }
}

#[async_trait]
impl RecipeRepository for MemoryStore {
    async fn create(&self, recipe: NewRecipe) -> Result<RecipeId, RecipeRepositoryError> {
        let mut state = self.lock(RecipeRepositoryError::query)?;
        if !state.users.contains_key(&recipe.author) {
            return Err(RecipeRepositoryError::missing_reference("recipes_author_id_fkey"));
        }
        if state.missing_ingredient(&recipe.ingredients).is_some() {
            return Err(RecipeRepositoryError::missing_reference(
                "recipe_ingredients_ingredient_id_fkey",
            ));
        }

        let id = RecipeId::new(state.next_id());
        state.recipes.insert(
            id,
            StoredRecipe {
                author: recipe.author,
                name: recipe.name.as_ref().to_owned(),
                image: recipe.image,
                text: recipe.text.as_ref().to_owned(),
                cooking_time: recipe.cooking_time.get(),
                created_at: recipe.created_at,
                lines: lines_of(&recipe.ingredients),
            },
        );
        Ok(id)
    }

    async fn update(
        &self,
        id: RecipeId,
        update: RecipeUpdate,
    ) -> Result<bool, RecipeRepositoryError> {
        let mut state = self.lock(RecipeRepositoryError::query)?;
        if !state.recipes.contains_key(&id) {
            return Ok(false);
        }
        if state.missing_ingredient(&update.ingredients).is_some() {
            return Err(RecipeRepositoryError::missing_reference(
                "recipe_ingredients_ingredient_id_fkey",
            ));
        }
        let Some(stored) = state.recipes.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(name) = update.name {
            stored.name = name.as_ref().to_owned();
        }
        if let Some(text) = update.text {
            stored.text = text.as_ref().to_owned();
        }
        if let Some(cooking_time) = update.cooking_time {
            stored.cooking_time = cooking_time.get();
        }
        if let Some(image) = update.image {
            stored.image = image;
        }
        stored.lines = lines_of(&update.ingredients);
        Ok(true)
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut state = self.lock(RecipeRepositoryError::query)?;
        if state.recipes.remove(&id).is_none() {
            return Ok(false);
        }
        state.favorites.retain(|(_, recipe), _| *recipe != id);
        state.shopping_cart.retain(|(_, recipe), _| *recipe != id);
        Ok(true)
    }

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let state = self.lock(RecipeRepositoryError::query)?;
        Ok(state
            .recipes
            .get(&id)
            .and_then(|stored| state.hydrate(id, stored)))
    }

    async fn list(
        &self,
        filter: RecipeFilter,
        page: PageParams,
    ) -> Result<PageSlice<Recipe>, RecipeRepositoryError> {
        let state = self.lock(RecipeRepositoryError::query)?;
        let slice = paginate(state.matching(&filter), page);
        let items = slice
            .items
            .iter()
            .filter_map(|id| {
                state
                    .recipes
                    .get(id)
                    .and_then(|stored| state.hydrate(*id, stored))
            })
            .collect();
        Ok(PageSlice::new(items, slice.total))
    }

    async fn author_recipes(
        &self,
        authors: Vec<UserId>,
        limit: Option<u32>,
    ) -> Result<HashMap<UserId, AuthorRecipes>, RecipeRepositoryError> {
        let state = self.lock(RecipeRepositoryError::query)?;
        let cap = limit.map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        let mut grouped = HashMap::new();
        for author in authors {
            let filter = RecipeFilter {
                author: Some(author),
                ..RecipeFilter::default()
            };
            let ids = state.matching(&filter);
            let recipes = ids
                .iter()
                .take(cap)
                .filter_map(|id| {
                    state
                        .recipes
                        .get(id)
                        .and_then(|stored| state.hydrate(*id, stored))
                })
                .map(|recipe| recipe.summary())
                .collect();
            grouped.insert(
                author,
                AuthorRecipes {
                    recipes,
                    total: ids.len() as u64,
                },
            );
        }
        Ok(grouped)
    }

    async fn shopping_list(
        &self,
        user: UserId,
    ) -> Result<Vec<ShoppingListLine>, RecipeRepositoryError> {
        let state = self.lock(RecipeRepositoryError::query)?;
        let raw = state
            .shopping_cart
            .keys()
            .filter(|(owner, _)| *owner == user)
            .filter_map(|(_, recipe)| state.recipes.get(recipe))
            .flat_map(|recipe| recipe.lines.iter())
            .filter_map(|(ingredient, amount)| {
                state.ingredients.get(ingredient).map(|ingredient| {
                    (
                        ingredient.name.clone(),
                        ingredient.measurement_unit.clone(),
                        i64::from(*amount),
                    )
                })
            });
        Ok(ShoppingList::aggregate(raw).lines().to_vec())
    }
}

#[async_trait]
impl RelationRepository for MemoryStore {
    async fn insert(
        &self,
        edge: Edge,
        added_at: DateTime<Utc>,
    ) -> Result<EdgeInsert, RelationRepositoryError> {
        let mut state = self.lock(RelationRepositoryError::query)?;
        let outcome = match edge {
            Edge::Recipe { kind, user, recipe } => {
                if !state.users.contains_key(&user) {
                    return Err(RelationRepositoryError::missing_endpoint(
                        "Пользователь не найден.",
                    ));
                }
                if !state.recipes.contains_key(&recipe) {
                    return Err(RelationRepositoryError::missing_endpoint("Рецепт не найден."));
                }
                stamp(state.recipe_edges_mut(kind).entry((user, recipe)), added_at)
            }
            Edge::Subscription { follower, author } => {
                if !state.users.contains_key(&follower) || !state.users.contains_key(&author) {
                    return Err(RelationRepositoryError::missing_endpoint(
                        "Пользователь не найден.",
                    ));
                }
                stamp(state.subscriptions.entry((follower, author)), added_at)
            }
        };
        Ok(outcome)
    }

    async fn delete(&self, edge: Edge) -> Result<EdgeDelete, RelationRepositoryError> {
        let mut state = self.lock(RelationRepositoryError::query)?;
        let removed = match edge {
            Edge::Recipe { kind, user, recipe } => {
                state.recipe_edges_mut(kind).remove(&(user, recipe)).is_some()
            }
            Edge::Subscription { follower, author } => {
                state.subscriptions.remove(&(follower, author)).is_some()
            }
        };
        Ok(if removed {
            EdgeDelete::Removed
        } else {
            EdgeDelete::Missing
        })
    }

    async fn recipe_memberships(
        &self,
        kind: RecipeRelation,
        user: UserId,
        recipes: Vec<RecipeId>,
    ) -> Result<HashSet<RecipeId>, RelationRepositoryError> {
        let state = self.lock(RelationRepositoryError::query)?;
        let edges = state.recipe_edges(kind);
        Ok(recipes
            .into_iter()
            .filter(|recipe| edges.contains_key(&(user, *recipe)))
            .collect())
    }

    async fn followed_among(
        &self,
        follower: UserId,
        authors: Vec<UserId>,
    ) -> Result<HashSet<UserId>, RelationRepositoryError> {
        let state = self.lock(RelationRepositoryError::query)?;
        Ok(authors
            .into_iter()
            .filter(|author| state.subscriptions.contains_key(&(follower, *author)))
            .collect())
    }
}

fn stamp<K: Ord>(entry: Entry<'_, K, DateTime<Utc>>, added_at: DateTime<Utc>) -> EdgeInsert {
    match entry {
        Entry::Occupied(_) => EdgeInsert::AlreadyExists,
        Entry::Vacant(slot) => {
            slot.insert(added_at);
            EdgeInsert::Created
        }
    }
}

fn lines_of(lines: &IngredientLines) -> Vec<(IngredientId, i32)> {
    lines
        .as_slice()
        .iter()
        .map(|line| (line.ingredient, line.amount.get()))
        .collect()
}
