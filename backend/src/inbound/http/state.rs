//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;
use pagination::DEFAULT_PAGE_SIZE;

use crate::domain::ports::{
    AccountsCommand, ImageStore, IngredientRepository, IngredientsQuery, LoginService,
    RecipeRelationsCommand, RecipeRepository, RecipesCommand, RecipesQuery, RelationRepository,
    ShoppingListQuery, SubscriptionsCommand, UserRepository, UsersQuery,
};
use crate::domain::{AccountService, IngredientCatalogService, RecipeService, RelationService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub subscriptions: Arc<dyn SubscriptionsCommand>,
    pub ingredients: Arc<dyn IngredientsQuery>,
    pub recipes: Arc<dyn RecipesCommand>,
    pub recipes_query: Arc<dyn RecipesQuery>,
    pub relations: Arc<dyn RecipeRelationsCommand>,
    pub shopping_list: Arc<dyn ShoppingListQuery>,
    /// Page size applied when a listing request carries no `limit`.
    pub page_size: u32,
}

/// Driven adapters the domain services are built over.
pub struct Adapters<U, R, G, L, M> {
    pub users: Arc<U>,
    pub recipes: Arc<R>,
    pub ingredients: Arc<G>,
    pub relations: Arc<L>,
    pub images: Arc<M>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Wire the domain services over one set of driven adapters.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use foodgram_backend::inbound::http::state::{Adapters, HttpState};
    /// use foodgram_backend::outbound::media::FsImageStore;
    /// use foodgram_backend::outbound::memory::MemoryStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let images = Arc::new(FsImageStore::open("media", "/media/").expect("media root"));
    /// let state = HttpState::from_adapters(Adapters {
    ///     users: Arc::clone(&store),
    ///     recipes: Arc::clone(&store),
    ///     ingredients: Arc::clone(&store),
    ///     relations: store,
    ///     images,
    ///     clock: Arc::new(DefaultClock),
    /// });
    /// let _recipes = state.recipes_query.clone();
    /// ```
    pub fn from_adapters<U, R, G, L, M>(adapters: Adapters<U, R, G, L, M>) -> Self
    where
        U: UserRepository + 'static,
        R: RecipeRepository + 'static,
        G: IngredientRepository + 'static,
        L: RelationRepository + 'static,
        M: ImageStore + 'static,
    {
        let Adapters {
            users,
            recipes,
            ingredients,
            relations,
            images,
            clock,
        } = adapters;
        let accounts = Arc::new(AccountService::new(
            Arc::clone(&users),
            Arc::clone(&recipes),
            Arc::clone(&relations),
            Arc::clone(&images),
        ));
        let recipe_service = Arc::new(RecipeService::new(
            Arc::clone(&recipes),
            Arc::clone(&ingredients),
            Arc::clone(&relations),
            Arc::clone(&images),
            Arc::clone(&clock),
        ));
        let relation_service = Arc::new(RelationService::new(
            recipes, users, relations, images, clock,
        ));
        Self {
            login: accounts.clone(),
            accounts: accounts.clone(),
            users: accounts,
            subscriptions: relation_service.clone(),
            ingredients: Arc::new(IngredientCatalogService::new(ingredients)),
            recipes: recipe_service.clone(),
            recipes_query: recipe_service.clone(),
            relations: relation_service,
            shopping_list: recipe_service,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the default page size for listings.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}
