//! Tests for the account service.

use std::collections::HashSet;
use std::sync::Arc;

use rstest::{fixture, rstest};
use zeroize::Zeroizing;

use super::*;
use crate::domain::ports::{
    MockImageStore, MockRecipeRepository, MockRelationRepository, MockUserRepository,
};
use crate::domain::{ErrorCode, ImageFormat, PersonName, Username};

type Service = AccountService<
    MockUserRepository,
    MockRecipeRepository,
    MockRelationRepository,
    MockImageStore,
>;

struct Mocks {
    users: MockUserRepository,
    recipes: MockRecipeRepository,
    relations: MockRelationRepository,
    images: MockImageStore,
}

impl Mocks {
    fn into_service(self) -> Service {
        AccountService::new(
            Arc::new(self.users),
            Arc::new(self.recipes),
            Arc::new(self.relations),
            Arc::new(self.images),
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
        users: MockUserRepository::new(),
        recipes: MockRecipeRepository::new(),
        relations: MockRelationRepository::new(),
        images,
    }
}

const ME: UserId = UserId::new(1);

fn user(id: i64) -> User {
    User {
        id: UserId::new(id),
        email: format!("u{id}@example.com"),
        username: format!("u{id}"),
        first_name: "Ада".to_owned(),
        last_name: "Лавлейс".to_owned(),
        avatar: None,
        is_admin: id == 99,
    }
}

fn registration() -> Registration {
    Registration {
        email: Email::new("ada@example.com").expect("email"),
        username: Username::new("ada").expect("username"),
        first_name: PersonName::new("first_name", "Ада").expect("first name"),
        last_name: PersonName::new("last_name", "Лавлейс").expect("last name"),
        password: Zeroizing::new("s3cret-pass".to_owned()),
    }
}

#[rstest]
#[tokio::test]
async fn registration_stores_a_salted_digest(mut mocks: Mocks) {
    mocks
        .users
        .expect_create()
        .withf(|new_user| {
            new_user.password.verify("s3cret-pass")
                && !new_user.password.encode().contains("s3cret")
        })
        .times(1)
        .return_once(|new_user| {
            Ok(User {
                email: new_user.email.as_ref().to_owned(),
                ..user(5)
            })
        });

    let view = mocks
        .into_service()
        .register(registration())
        .await
        .expect("registered");
    assert_eq!(view.id, UserId::new(5));
    assert_eq!(view.email, "ada@example.com");
}

#[rstest]
#[case(UserRepositoryError::duplicate_email(), "email")]
#[case(UserRepositoryError::duplicate_username(), "username")]
#[tokio::test]
async fn duplicate_accounts_are_field_errors(
    mut mocks: Mocks,
    #[case] failure: UserRepositoryError,
    #[case] field: &str,
) {
    mocks
        .users
        .expect_create()
        .return_once(move |_| Err(failure));

    let error = mocks
        .into_service()
        .register(registration())
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().expect("details")["field"], field);
}

#[rstest]
#[case("s3cret-pass", true)]
#[case("wrong", false)]
#[tokio::test]
async fn login_checks_the_stored_digest(
    mut mocks: Mocks,
    #[case] password: &str,
    #[case] accepted: bool,
) {
    mocks
        .users
        .expect_credentials()
        .withf(|email| email == "ada@example.com")
        .return_once(|_| {
            let digest = PasswordDigest::generate("s3cret-pass").expect("digest");
            Ok(Some((ME, digest)))
        });

    let credentials =
        LoginCredentials::try_from_parts("ada@EXAMPLE.com", password).expect("credentials");
    let result = mocks.into_service().authenticate(&credentials).await;
    match (accepted, result) {
        (true, Ok(id)) => assert_eq!(id, ME),
        (false, Err(error)) => assert_eq!(error.code(), ErrorCode::Unauthorized),
        (expected, other) => panic!("accepted={expected}, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn unknown_emails_are_unauthorised(mut mocks: Mocks) {
    mocks.users.expect_credentials().return_once(|_| Ok(None));

    let credentials =
        LoginCredentials::try_from_parts("ghost@example.com", "x").expect("credentials");
    let error = mocks
        .into_service()
        .authenticate(&credentials)
        .await
        .expect_err("unknown account");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn resolve_carries_the_admin_flag(mut mocks: Mocks) {
    mocks
        .users
        .expect_find()
        .return_once(|id| Ok(Some(user(id.get()))));

    let actor = mocks
        .into_service()
        .resolve(UserId::new(99))
        .await
        .expect("resolve")
        .expect("actor");
    assert!(actor.is_admin);
}

#[rstest]
#[tokio::test]
async fn wrong_current_password_leaves_the_digest(mut mocks: Mocks) {
    mocks
        .users
        .expect_password_digest()
        .return_once(|_| Ok(Some(PasswordDigest::generate("old").expect("digest"))));
    mocks.users.expect_set_password().never();

    let change = PasswordChange {
        current_password: Zeroizing::new("nope".to_owned()),
        new_password: Zeroizing::new("new".to_owned()),
    };
    let error = mocks
        .into_service()
        .change_password(Actor::user(ME), change)
        .await
        .expect_err("wrong password");
    assert_eq!(error.details().expect("details")["field"], "current_password");
}

#[rstest]
#[tokio::test]
async fn new_avatar_replaces_and_discards_the_old_one(mut mocks: Mocks) {
    mocks
        .images
        .expect_save()
        .withf(|kind, _| *kind == ImageKind::Avatar)
        .return_once(|_, _| Ok(ImageRef::new("users/avatars/new.png")));
    mocks
        .users
        .expect_set_avatar()
        .return_once(|_, _| Ok(Some(ImageRef::new("users/avatars/old.png"))));
    mocks
        .images
        .expect_remove()
        .withf(|image| image.as_ref() == "users/avatars/old.png")
        .times(1)
        .return_once(|_| Ok(()));

    let upload = ImageUpload {
        format: ImageFormat::Png,
        bytes: vec![1, 2, 3],
    };
    let url = mocks
        .into_service()
        .set_avatar(Actor::user(ME), upload)
        .await
        .expect("avatar stored");
    assert_eq!(url, "http://testserver/media/users/avatars/new.png");
}

#[rstest]
#[tokio::test]
async fn me_is_never_subscribed_to_itself(mut mocks: Mocks) {
    mocks
        .users
        .expect_find()
        .return_once(|id| Ok(Some(user(id.get()))));
    mocks.relations.expect_followed_among().never();

    let view = mocks.into_service().me(Actor::user(ME)).await.expect("me");
    assert!(!view.is_subscribed);
}

#[rstest]
#[tokio::test]
async fn subscriptions_batch_recipe_lookups(mut mocks: Mocks) {
    mocks
        .users
        .expect_followed_by()
        .return_once(|_, _| Ok(PageSlice::new(vec![user(2), user(3)], 2)));
    mocks
        .recipes
        .expect_author_recipes()
        .withf(|authors, limit| authors.len() == 2 && limit.is_none())
        .times(1)
        .return_once(|_, _| Ok(Default::default()));
    mocks
        .relations
        .expect_followed_among()
        .times(1)
        .return_once(|_, _| Ok(HashSet::from([UserId::new(2), UserId::new(3)])));

    let page = mocks
        .into_service()
        .subscriptions(Actor::user(ME), PageParams::default(), None)
        .await
        .expect("subscriptions");
    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|author| author.user.is_subscribed));
    assert!(page.items.iter().all(|author| author.recipes_count == 0));
}
