//! Tests for the recipe service.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockImageStore, MockIngredientRepository, MockRecipeRepository, MockRelationRepository,
};
use crate::domain::recipe::INGREDIENTS_REQUIRED_ON_UPDATE;
use crate::domain::{
    Amount, CookingTime, ErrorCode, ImageFormat, ImageRef, ImageUpload, Ingredient,
    IngredientLine, RecipeIngredient, RecipeName, RecipeText, ShoppingListLine, User, UserId,
};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 8, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

type Service = RecipeService<
    MockRecipeRepository,
    MockIngredientRepository,
    MockRelationRepository,
    MockImageStore,
>;

struct Mocks {
    recipes: MockRecipeRepository,
    ingredients: MockIngredientRepository,
    relations: MockRelationRepository,
    images: MockImageStore,
}

impl Mocks {
    fn into_service(self) -> Service {
        RecipeService::new(
            Arc::new(self.recipes),
            Arc::new(self.ingredients),
            Arc::new(self.relations),
            Arc::new(self.images),
            Arc::new(FixtureClock {
                utc_now: fixture_timestamp(),
            }),
        )
    }
}

#[fixture]
fn mocks() -> Mocks {
    let mut images = MockImageStore::new();
    images
        .expect_public_url()
        .returning(|image| format!("http://testserver/media/{image}"));
    Mocks {
        recipes: MockRecipeRepository::new(),
        ingredients: MockIngredientRepository::new(),
        relations: MockRelationRepository::new(),
        images,
    }
}

const AUTHOR: UserId = UserId::new(1);
const STRANGER: UserId = UserId::new(2);
const SALT: IngredientId = IngredientId::new(10);

fn author(id: UserId) -> User {
    User {
        id,
        email: format!("cook{id}@example.com"),
        username: format!("cook{id}"),
        first_name: "Вася".to_owned(),
        last_name: "Пупкин".to_owned(),
        avatar: None,
        is_admin: false,
    }
}

fn stored_recipe(id: i64, owner: UserId) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        author: author(owner),
        name: "Борщ".to_owned(),
        image: ImageRef::new("recipes/images/old.png"),
        text: "Варить.".to_owned(),
        cooking_time: 90,
        created_at: fixture_timestamp(),
        ingredients: vec![RecipeIngredient {
            ingredient: Ingredient {
                id: SALT,
                name: "Соль".to_owned(),
                measurement_unit: "г".to_owned(),
            },
            amount: 10,
        }],
    }
}

fn lines() -> IngredientLines {
    IngredientLines::new(vec![IngredientLine {
        ingredient: SALT,
        amount: Amount::new(SALT, 10).expect("amount"),
    }])
    .expect("lines")
}

fn upload() -> ImageUpload {
    ImageUpload {
        format: ImageFormat::Png,
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

fn draft() -> RecipeDraft {
    RecipeDraft {
        name: RecipeName::new("Борщ").expect("name"),
        text: RecipeText::new("Варить.").expect("text"),
        cooking_time: CookingTime::new(90).expect("cooking time"),
        image: upload(),
        ingredients: lines(),
    }
}

fn no_memberships(relations: &mut MockRelationRepository) {
    relations
        .expect_recipe_memberships()
        .returning(|_, _, _| Ok(HashSet::new()));
}

#[rstest]
#[tokio::test]
async fn create_renders_the_stored_recipe(mut mocks: Mocks) {
    mocks
        .ingredients
        .expect_missing()
        .times(1)
        .return_once(|_| Ok(Vec::new()));
    mocks
        .images
        .expect_save()
        .times(1)
        .return_once(|_, _| Ok(ImageRef::new("recipes/images/new.png")));
    mocks
        .recipes
        .expect_create()
        .withf(|recipe| {
            recipe.author == AUTHOR
                && recipe.created_at == fixture_timestamp()
                && recipe.image.as_ref() == "recipes/images/new.png"
                && recipe.ingredients.len() == 1
        })
        .times(1)
        .return_once(|_| Ok(RecipeId::new(5)));
    mocks
        .recipes
        .expect_find()
        .times(1)
        .return_once(|id| Ok(Some(stored_recipe(id.get(), AUTHOR))));
    no_memberships(&mut mocks.relations);

    let view = mocks
        .into_service()
        .create(Actor::user(AUTHOR), draft())
        .await
        .expect("recipe created");

    assert_eq!(view.id, RecipeId::new(5));
    assert_eq!(view.ingredients[0].amount, 10);
    assert!(!view.author.is_subscribed);
}

#[rstest]
#[tokio::test]
async fn create_rejects_unknown_ingredients_before_writing(mut mocks: Mocks) {
    mocks
        .ingredients
        .expect_missing()
        .times(1)
        .return_once(|_| Ok(vec![SALT]));

    let error = mocks
        .into_service()
        .create(Actor::user(AUTHOR), draft())
        .await
        .expect_err("unknown ingredient");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().expect("details")["field"], "ingredients");
}

#[rstest]
#[tokio::test]
async fn failed_create_discards_the_stored_image(mut mocks: Mocks) {
    mocks
        .ingredients
        .expect_missing()
        .return_once(|_| Ok(Vec::new()));
    mocks
        .images
        .expect_save()
        .return_once(|_, _| Ok(ImageRef::new("recipes/images/new.png")));
    mocks
        .recipes
        .expect_create()
        .return_once(|_| Err(RecipeRepositoryError::query("constraint")));
    mocks
        .images
        .expect_remove()
        .withf(|image| image.as_ref() == "recipes/images/new.png")
        .times(1)
        .return_once(|_| Ok(()));

    let error = mocks
        .into_service()
        .create(Actor::user(AUTHOR), draft())
        .await
        .expect_err("storage failure");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn update_without_ingredients_writes_nothing(mut mocks: Mocks) {
    mocks
        .recipes
        .expect_find()
        .return_once(|_| Ok(Some(stored_recipe(3, AUTHOR))));
    mocks.recipes.expect_update().never();

    let changes = RecipeChanges {
        name: Some(RecipeName::new("Щи").expect("name")),
        ..RecipeChanges::default()
    };
    let error = mocks
        .into_service()
        .update(Actor::user(AUTHOR), RecipeId::new(3), changes)
        .await
        .expect_err("ingredients required");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), INGREDIENTS_REQUIRED_ON_UPDATE);
}

#[rstest]
#[tokio::test]
async fn strangers_cannot_update(mut mocks: Mocks) {
    mocks
        .recipes
        .expect_find()
        .return_once(|_| Ok(Some(stored_recipe(3, AUTHOR))));

    let changes = RecipeChanges {
        ingredients: Some(lines()),
        ..RecipeChanges::default()
    };
    let error = mocks
        .into_service()
        .update(Actor::user(STRANGER), RecipeId::new(3), changes)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn replacing_the_image_discards_the_old_file(mut mocks: Mocks) {
    mocks
        .recipes
        .expect_find()
        .times(2)
        .returning(|_| Ok(Some(stored_recipe(3, AUTHOR))));
    mocks
        .ingredients
        .expect_missing()
        .return_once(|_| Ok(Vec::new()));
    mocks
        .images
        .expect_save()
        .return_once(|_, _| Ok(ImageRef::new("recipes/images/fresh.png")));
    mocks
        .recipes
        .expect_update()
        .withf(|_, update| update.image.is_some() && update.ingredients.len() == 1)
        .times(1)
        .return_once(|_, _| Ok(true));
    mocks
        .images
        .expect_remove()
        .withf(|image| image.as_ref() == "recipes/images/old.png")
        .times(1)
        .return_once(|_| Ok(()));
    no_memberships(&mut mocks.relations);

    let changes = RecipeChanges {
        image: Some(upload()),
        ingredients: Some(lines()),
        ..RecipeChanges::default()
    };
    mocks
        .into_service()
        .update(Actor::user(AUTHOR), RecipeId::new(3), changes)
        .await
        .expect("updated");
}

#[rstest]
#[tokio::test]
async fn admins_may_delete_any_recipe(mut mocks: Mocks) {
    mocks
        .recipes
        .expect_find()
        .return_once(|_| Ok(Some(stored_recipe(3, AUTHOR))));
    mocks
        .recipes
        .expect_delete()
        .times(1)
        .return_once(|_| Ok(true));
    mocks.images.expect_remove().return_once(|_| Ok(()));

    let admin = Actor {
        id: STRANGER,
        is_admin: true,
    };
    mocks
        .into_service()
        .delete(admin, RecipeId::new(3))
        .await
        .expect("deleted");
}

#[rstest]
#[case(Viewer::Anonymous, RecipeFilter::default())]
#[case(
    Viewer::from(Actor::user(AUTHOR)),
    RecipeFilter { author: None, favorited_by: Some(AUTHOR), in_cart_of: Some(AUTHOR) }
)]
#[tokio::test]
async fn relation_filters_apply_to_the_viewer_only(
    mut mocks: Mocks,
    #[case] viewer: Viewer,
    #[case] expected: RecipeFilter,
) {
    mocks
        .recipes
        .expect_list()
        .withf(move |filter, _| *filter == expected)
        .times(1)
        .return_once(|_, _| Ok(PageSlice::new(Vec::new(), 0)));

    let filter = RecipeListFilter {
        author: None,
        is_favorited: true,
        is_in_shopping_cart: true,
    };
    let page = mocks
        .into_service()
        .list(viewer, filter, PageParams::default())
        .await
        .expect("listing");
    assert_eq!(page.total, 0);
}

#[rstest]
#[tokio::test]
async fn empty_cart_cannot_be_exported(mut mocks: Mocks) {
    mocks
        .recipes
        .expect_shopping_list()
        .return_once(|_| Ok(Vec::new()));

    let error = mocks
        .into_service()
        .shopping_list(Actor::user(AUTHOR))
        .await
        .expect_err("empty cart");
    assert_eq!(error.code(), ErrorCode::EmptyResource);
    assert_eq!(error.message(), EMPTY_SHOPPING_LIST);
}

#[rstest]
#[tokio::test]
async fn cart_export_keeps_storage_order(mut mocks: Mocks) {
    mocks.recipes.expect_shopping_list().return_once(|_| {
        Ok(vec![ShoppingListLine {
            name: "Salt".to_owned(),
            measurement_unit: "g".to_owned(),
            total: 25,
        }])
    });

    let list = mocks
        .into_service()
        .shopping_list(Actor::user(AUTHOR))
        .await
        .expect("shopping list");
    assert!(list.render().ends_with("• Salt (g) — 25\n"));
}

#[rstest]
#[tokio::test]
async fn short_links_require_an_existing_recipe(mut mocks: Mocks) {
    mocks.recipes.expect_find().return_once(|_| Ok(None));

    let error = mocks
        .into_service()
        .short_link(RecipeId::new(77))
        .await
        .expect_err("missing recipe");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
