//! Viewer-dependent flags and batching of membership lookups.

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockImageStore, MockRelationRepository};
use crate::domain::{Actor, ImageRef, Ingredient, RecipeIngredient};

fn user(id: i64) -> User {
    User {
        id: UserId::new(id),
        email: format!("user{id}@example.com"),
        username: format!("user{id}"),
        first_name: "Ада".to_owned(),
        last_name: "Лавлейс".to_owned(),
        avatar: None,
        is_admin: false,
    }
}

fn recipe(id: i64, author: i64) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        author: user(author),
        name: format!("Рецепт {id}"),
        image: ImageRef::new(format!("recipes/images/{id}.png")),
        text: "Смешать.".to_owned(),
        cooking_time: 5,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("timestamp"),
        ingredients: vec![RecipeIngredient {
            ingredient: Ingredient {
                id: IngredientId::new(1),
                name: "Соль".to_owned(),
                measurement_unit: "г".to_owned(),
            },
            amount: 10,
        }],
    }
}

#[fixture]
fn images() -> Arc<MockImageStore> {
    let mut store = MockImageStore::new();
    store
        .expect_public_url()
        .returning(|image| format!("http://testserver/media/{image}"));
    Arc::new(store)
}

fn viewer(id: i64) -> Viewer {
    Viewer::from(Actor::user(UserId::new(id)))
}

#[rstest]
#[tokio::test]
async fn anonymous_viewers_never_query_relations(images: Arc<MockImageStore>) {
    let projector = ViewProjector::new(Arc::new(MockRelationRepository::new()), images);

    let views = projector
        .recipes(&Viewer::Anonymous, vec![recipe(1, 2), recipe(2, 3)])
        .await
        .expect("projection");

    assert!(views.iter().all(|view| !view.is_favorited && !view.is_in_shopping_cart));
    assert!(views.iter().all(|view| !view.author.is_subscribed));
    assert_eq!(views[0].image, "http://testserver/media/recipes/images/1.png");
}

#[rstest]
#[tokio::test]
async fn flags_are_fetched_once_per_page(images: Arc<MockImageStore>) {
    let mut relations = MockRelationRepository::new();
    relations
        .expect_recipe_memberships()
        .withf(|kind, _, ids| *kind == RecipeRelation::Favorite && ids.len() == 3)
        .times(1)
        .return_once(|_, _, _| Ok(HashSet::from([RecipeId::new(1)])));
    relations
        .expect_recipe_memberships()
        .withf(|kind, _, _| *kind == RecipeRelation::ShoppingCart)
        .times(1)
        .return_once(|_, _, _| Ok(HashSet::from([RecipeId::new(2), RecipeId::new(3)])));
    relations
        .expect_followed_among()
        .withf(|_, authors| authors == &vec![UserId::new(7)])
        .times(1)
        .return_once(|_, _| Ok(HashSet::from([UserId::new(7)])));
    let projector = ViewProjector::new(Arc::new(relations), images);

    let views = projector
        .recipes(&viewer(1), vec![recipe(1, 7), recipe(2, 7), recipe(3, 7)])
        .await
        .expect("projection");

    let flags: Vec<(bool, bool)> = views
        .iter()
        .map(|view| (view.is_favorited, view.is_in_shopping_cart))
        .collect();
    assert_eq!(flags, [(true, false), (false, true), (false, true)]);
    assert!(views.iter().all(|view| view.author.is_subscribed));
}

#[rstest]
#[tokio::test]
async fn users_are_never_subscribed_to_themselves(images: Arc<MockImageStore>) {
    let mut relations = MockRelationRepository::new();
    relations
        .expect_followed_among()
        .withf(|_, authors| !authors.contains(&UserId::new(1)))
        .times(1)
        .return_once(|_, _| Ok(HashSet::from([UserId::new(1), UserId::new(2)])));
    let projector = ViewProjector::new(Arc::new(relations), images);

    let views = projector
        .users(&viewer(1), vec![user(1), user(2)])
        .await
        .expect("projection");

    assert!(!views[0].is_subscribed);
    assert!(views[1].is_subscribed);
}

#[rstest]
fn authors_render_recipes_through_the_given_function() {
    let view = project_author(
        UserView {
            id: UserId::new(2),
            email: "a@example.com".to_owned(),
            username: "a".to_owned(),
            first_name: "A".to_owned(),
            last_name: "B".to_owned(),
            is_subscribed: true,
            avatar: None,
        },
        AuthorRecipes {
            recipes: vec![recipe(4, 2).summary()],
            total: 9,
        },
        |summary| RecipeSummaryView {
            id: summary.id,
            name: summary.name,
            image: "rendered".to_owned(),
            cooking_time: summary.cooking_time,
        },
    );

    assert_eq!(view.recipes_count, 9);
    assert_eq!(view.recipes[0].image, "rendered");
    let json = serde_json::to_value(&view).expect("serialise");
    assert_eq!(json["username"], "a");
    assert_eq!(json["recipes"][0]["id"], 4);
}
