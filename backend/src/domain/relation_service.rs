//! Favorites, shopping cart and subscriptions over the shared toggle.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::account_service::{USER_NOT_FOUND, map_user_error};
use crate::domain::ports::{
    ImageStore, RecipeRelationsCommand, RecipeRepository, RelationRepository,
    SubscriptionsCommand, UserRepository,
};
use crate::domain::recipe_service::{RECIPE_NOT_FOUND, map_recipe_error};
use crate::domain::{
    Actor, AuthorView, Edge, Error, Recipe, RecipeId, RecipeRelation, RecipeSummaryView,
    SUBSCRIPTION_MESSAGES, User, UserId, ViewProjector, Viewer, add_edge, remove_edge,
};

/// Relation service implementing the toggle driving ports.
pub struct RelationService<R, U, L: ?Sized, M: ?Sized> {
    recipes: Arc<R>,
    users: Arc<U>,
    relations: Arc<L>,
    projector: ViewProjector<L, M>,
    clock: Arc<dyn Clock>,
}

impl<R, U, L, M> RelationService<R, U, L, M>
where
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    /// Build the service; `clock` stamps every stored edge.
    pub fn new(
        recipes: Arc<R>,
        users: Arc<U>,
        relations: Arc<L>,
        images: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            recipes,
            users,
            projector: ViewProjector::new(Arc::clone(&relations), images),
            relations,
            clock,
        }
    }
}

impl<R, U, L, M> RelationService<R, U, L, M>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn recipe(&self, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find(id)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(|| Error::not_found(RECIPE_NOT_FOUND))
    }

    async fn author(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }
}

#[async_trait]
impl<R, U, L, M> RecipeRelationsCommand for RelationService<R, U, L, M>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn add(
        &self,
        actor: Actor,
        kind: RecipeRelation,
        recipe: RecipeId,
    ) -> Result<RecipeSummaryView, Error> {
        let recipe = self.recipe(recipe).await?;
        let edge = Edge::Recipe {
            kind,
            user: actor.id,
            recipe: recipe.id,
        };
        add_edge(
            self.relations.as_ref(),
            edge,
            self.clock.utc(),
            kind.messages(),
        )
        .await?;
        Ok(self.projector.summary(recipe.summary()))
    }

    async fn remove(
        &self,
        actor: Actor,
        kind: RecipeRelation,
        recipe: RecipeId,
    ) -> Result<(), Error> {
        let recipe = self.recipe(recipe).await?;
        let edge = Edge::Recipe {
            kind,
            user: actor.id,
            recipe: recipe.id,
        };
        remove_edge(self.relations.as_ref(), edge, kind.messages()).await
    }
}

#[async_trait]
impl<R, U, L, M> SubscriptionsCommand for RelationService<R, U, L, M>
where
    R: RecipeRepository,
    U: UserRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn subscribe(
        &self,
        actor: Actor,
        author: UserId,
        recipes_limit: Option<u32>,
    ) -> Result<AuthorView, Error> {
        let author = self.author(author).await?;
        let edge = Edge::subscription(actor.id, author.id)?;
        add_edge(
            self.relations.as_ref(),
            edge,
            self.clock.utc(),
            SUBSCRIPTION_MESSAGES,
        )
        .await?;

        let recipes = self
            .recipes
            .author_recipes(vec![author.id], recipes_limit)
            .await
            .map_err(map_recipe_error)?;
        self.projector
            .authors(&Viewer::from(actor), vec![author], recipes)
            .await?
            .pop()
            .ok_or_else(|| Error::internal("author projection lost its row"))
    }

    async fn unsubscribe(&self, actor: Actor, author: UserId) -> Result<(), Error> {
        let author = self.author(author).await?;
        let edge = Edge::subscription(actor.id, author.id)?;
        remove_edge(self.relations.as_ref(), edge, SUBSCRIPTION_MESSAGES).await
    }
}

#[cfg(test)]
mod tests {
    //! Toggle wiring for each relation kind.
    use std::collections::{HashMap, HashSet};

    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{
        MockImageStore, MockRecipeRepository, MockRelationRepository, MockUserRepository,
    };
    use crate::domain::{
        AuthorRecipes, EdgeDelete, EdgeInsert, ErrorCode, ImageRef, SELF_SUBSCRIPTION,
    };

    type Service = RelationService<
        MockRecipeRepository,
        MockUserRepository,
        MockRelationRepository,
        MockImageStore,
    >;

    struct FixtureClock;

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            now().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            now()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0)
            .single()
            .expect("timestamp")
    }

    struct Mocks {
        recipes: MockRecipeRepository,
        users: MockUserRepository,
        relations: MockRelationRepository,
        images: MockImageStore,
    }

    impl Mocks {
        fn into_service(self) -> Service {
            RelationService::new(
                Arc::new(self.recipes),
                Arc::new(self.users),
                Arc::new(self.relations),
                Arc::new(self.images),
                Arc::new(FixtureClock),
            )
        }
    }

    #[fixture]
    fn mocks() -> Mocks {
        let mut images = MockImageStore::new();
        images
            .expect_public_url()
            .returning(|image| format!("/media/{image}"));
        Mocks {
            recipes: MockRecipeRepository::new(),
            users: MockUserRepository::new(),
            relations: MockRelationRepository::new(),
            images,
        }
    }

    const ME: UserId = UserId::new(1);
    const CHEF: UserId = UserId::new(2);

    fn user(id: UserId) -> User {
        User {
            id,
            email: format!("u{id}@example.com"),
            username: format!("u{id}"),
            first_name: "Имя".to_owned(),
            last_name: "Фамилия".to_owned(),
            avatar: None,
            is_admin: false,
        }
    }

    fn recipe(id: i64) -> Recipe {
        Recipe {
            id: RecipeId::new(id),
            author: user(CHEF),
            name: "Плов".to_owned(),
            image: ImageRef::new("recipes/images/plov.png"),
            text: "Тушить.".to_owned(),
            cooking_time: 60,
            created_at: Utc
                .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .expect("timestamp"),
            ingredients: Vec::new(),
        }
    }

    #[rstest]
    #[case(RecipeRelation::Favorite, "Рецепт уже в избранном.")]
    #[case(RecipeRelation::ShoppingCart, "Рецепт уже в списке покупок.")]
    #[tokio::test]
    async fn duplicate_adds_report_the_kind_message(
        mut mocks: Mocks,
        #[case] kind: RecipeRelation,
        #[case] message: &str,
    ) {
        mocks
            .recipes
            .expect_find()
            .return_once(|id| Ok(Some(recipe(id.get()))));
        mocks
            .relations
            .expect_insert()
            .withf(move |edge, _| matches!(edge, Edge::Recipe { kind: got, .. } if *got == kind))
            .times(1)
            .return_once(|_, _| Ok(EdgeInsert::AlreadyExists));

        let error = mocks
            .into_service()
            .add(Actor::user(ME), kind, RecipeId::new(4))
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.message(), message);
    }

    #[rstest]
    #[tokio::test]
    async fn added_recipes_are_returned_minified(mut mocks: Mocks) {
        mocks
            .recipes
            .expect_find()
            .return_once(|id| Ok(Some(recipe(id.get()))));
        mocks
            .relations
            .expect_insert()
            .withf(|_, added_at| *added_at == now())
            .return_once(|_, _| Ok(EdgeInsert::Created));

        let summary = mocks
            .into_service()
            .add(Actor::user(ME), RecipeRelation::Favorite, RecipeId::new(4))
            .await
            .expect("added");
        assert_eq!(summary.id, RecipeId::new(4));
        assert_eq!(summary.image, "/media/recipes/images/plov.png");
    }

    #[rstest]
    #[tokio::test]
    async fn toggles_on_unknown_recipes_are_not_found(mut mocks: Mocks) {
        mocks.recipes.expect_find().return_once(|_| Ok(None));
        mocks.relations.expect_delete().never();

        let error = mocks
            .into_service()
            .remove(Actor::user(ME), RecipeRelation::ShoppingCart, RecipeId::new(4))
            .await
            .expect_err("missing recipe");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn self_subscription_never_reaches_the_store(mut mocks: Mocks) {
        mocks
            .users
            .expect_find()
            .return_once(|id| Ok(Some(user(id))));
        mocks.relations.expect_insert().never();

        let error = mocks
            .into_service()
            .subscribe(Actor::user(ME), ME, None)
            .await
            .expect_err("self subscription");
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.message(), SELF_SUBSCRIPTION);
    }

    #[rstest]
    #[tokio::test]
    async fn subscribing_renders_the_author_with_recipes(mut mocks: Mocks) {
        mocks
            .users
            .expect_find()
            .return_once(|id| Ok(Some(user(id))));
        mocks
            .relations
            .expect_insert()
            .withf(|edge, added_at| {
                *edge
                    == Edge::Subscription {
                        follower: ME,
                        author: CHEF,
                    }
                    && *added_at == now()
            })
            .return_once(|_, _| Ok(EdgeInsert::Created));
        mocks
            .recipes
            .expect_author_recipes()
            .withf(|authors, limit| authors == &vec![CHEF] && *limit == Some(1))
            .return_once(|_, _| {
                Ok(HashMap::from([(
                    CHEF,
                    AuthorRecipes {
                        recipes: vec![recipe(9).summary()],
                        total: 3,
                    },
                )]))
            });
        mocks
            .relations
            .expect_followed_among()
            .return_once(|_, _| Ok(HashSet::from([CHEF])));

        let view = mocks
            .into_service()
            .subscribe(Actor::user(ME), CHEF, Some(1))
            .await
            .expect("subscribed");
        assert!(view.user.is_subscribed);
        assert_eq!(view.recipes.len(), 1);
        assert_eq!(view.recipes_count, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn unsubscribing_twice_is_a_conflict(mut mocks: Mocks) {
        mocks
            .users
            .expect_find()
            .return_once(|id| Ok(Some(user(id))));
        mocks
            .relations
            .expect_delete()
            .return_once(|_| Ok(EdgeDelete::Missing));

        let error = mocks
            .into_service()
            .unsubscribe(Actor::user(ME), CHEF)
            .await
            .expect_err("not subscribed");
        assert_eq!(error.message(), "Вы не были подписаны на этого автора.");
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_authors_are_not_found(mut mocks: Mocks) {
        mocks.users.expect_find().return_once(|_| Ok(None));

        let error = mocks
            .into_service()
            .subscribe(Actor::user(ME), CHEF, None)
            .await
            .expect_err("unknown author");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
