//! Accounts: registration, login, passwords, avatars and user projections.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::media::{discard_image, store_image};
use crate::domain::ports::{
    AccountsCommand, ImageStore, LoginService, PasswordChange, RecipeRepository, Registration,
    RelationRepository, UserRepository, UserRepositoryError, UsersQuery,
};
use crate::domain::recipe_service::map_recipe_error;
use crate::domain::{
    Actor, AuthorView, Email, Error, ImageKind, ImageRef, ImageUpload, LoginCredentials, NewUser,
    PageParams, PageSlice, PasswordDigest, PasswordDigestError, RegisteredUserView, User, UserId,
    UserView, ViewProjector, Viewer,
};

pub(crate) const USER_NOT_FOUND: &str = "Пользователь не найден.";
pub(crate) const INVALID_CREDENTIALS: &str = "Неверные учетные данные.";
const WRONG_PASSWORD: &str = "Неверный пароль.";
const EMAIL_TAKEN: &str = "Пользователь с таким email уже существует.";
const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail => Error::invalid_field("email", "unique", EMAIL_TAKEN),
        UserRepositoryError::DuplicateUsername => {
            Error::invalid_field("username", "unique", USERNAME_TAKEN)
        }
    }
}

fn digest_error(error: PasswordDigestError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

/// Account service implementing the user-facing driving ports.
pub struct AccountService<U, R, L: ?Sized, M: ?Sized> {
    users: Arc<U>,
    recipes: Arc<R>,
    images: Arc<M>,
    projector: ViewProjector<L, M>,
}

impl<U, R, L, M> AccountService<U, R, L, M>
where
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    pub fn new(users: Arc<U>, recipes: Arc<R>, relations: Arc<L>, images: Arc<M>) -> Self {
        Self {
            users,
            recipes,
            projector: ViewProjector::new(relations, Arc::clone(&images)),
            images,
        }
    }
}

impl<U, R, L, M> AccountService<U, R, L, M>
where
    U: UserRepository,
    R: RecipeRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn load(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }

    async fn replace_avatar(
        &self,
        actor: &Actor,
        avatar: Option<ImageRef>,
    ) -> Result<(), Error> {
        match self.users.set_avatar(actor.id, avatar.clone()).await {
            Ok(Some(previous)) => {
                discard_image(self.images.as_ref(), previous).await;
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(error) => {
                if let Some(fresh) = avatar {
                    discard_image(self.images.as_ref(), fresh).await;
                }
                Err(map_user_error(error))
            }
        }
    }
}

#[async_trait]
impl<U, R, L, M> AccountsCommand for AccountService<U, R, L, M>
where
    U: UserRepository,
    R: RecipeRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn register(&self, registration: Registration) -> Result<RegisteredUserView, Error> {
        let password = PasswordDigest::generate(&registration.password).map_err(digest_error)?;
        let user = NewUser {
            email: registration.email,
            username: registration.username,
            first_name: registration.first_name,
            last_name: registration.last_name,
            password,
        };
        let created = self.users.create(user).await.map_err(map_user_error)?;
        debug!(user = %created.id, "account registered");
        Ok(RegisteredUserView::from(&created))
    }

    async fn change_password(&self, actor: Actor, change: PasswordChange) -> Result<(), Error> {
        let stored = self
            .users
            .password_digest(actor.id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;
        if !stored.verify(&change.current_password) {
            return Err(Error::invalid_field(
                "current_password",
                "invalid",
                WRONG_PASSWORD,
            ));
        }
        let digest = PasswordDigest::generate(&change.new_password).map_err(digest_error)?;
        if !self
            .users
            .set_password(actor.id, digest)
            .await
            .map_err(map_user_error)?
        {
            return Err(Error::not_found(USER_NOT_FOUND));
        }
        Ok(())
    }

    async fn set_avatar(&self, actor: Actor, upload: ImageUpload) -> Result<String, Error> {
        let stored = store_image(self.images.as_ref(), ImageKind::Avatar, upload).await?;
        self.replace_avatar(&actor, Some(stored.clone())).await?;
        Ok(self.projector.image_url(&stored))
    }

    async fn remove_avatar(&self, actor: Actor) -> Result<(), Error> {
        self.replace_avatar(&actor, None).await
    }
}

#[async_trait]
impl<U, R, L, M> UsersQuery for AccountService<U, R, L, M>
where
    U: UserRepository,
    R: RecipeRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn list(&self, viewer: Viewer, page: PageParams) -> Result<PageSlice<UserView>, Error> {
        let slice = self
            .users
            .list(page)
            .await
            .map_err(map_user_error)?
            .ensure_page(page)?;
        let items = self.projector.users(&viewer, slice.items).await?;
        Ok(PageSlice::new(items, slice.total))
    }

    async fn get(&self, viewer: Viewer, id: UserId) -> Result<UserView, Error> {
        let user = self.load(id).await?;
        self.projector.user(&viewer, &user).await
    }

    async fn me(&self, actor: Actor) -> Result<UserView, Error> {
        self.get(Viewer::from(actor), actor.id).await
    }

    async fn subscriptions(
        &self,
        actor: Actor,
        page: PageParams,
        recipes_limit: Option<u32>,
    ) -> Result<PageSlice<AuthorView>, Error> {
        let slice = self
            .users
            .followed_by(actor.id, page)
            .await
            .map_err(map_user_error)?
            .ensure_page(page)?;
        let authors: Vec<UserId> = slice.items.iter().map(|user| user.id).collect();
        let recipes = if authors.is_empty() {
            Default::default()
        } else {
            self.recipes
                .author_recipes(authors, recipes_limit)
                .await
                .map_err(map_recipe_error)?
        };
        let items = self
            .projector
            .authors(&Viewer::from(actor), slice.items, recipes)
            .await?;
        Ok(PageSlice::new(items, slice.total))
    }
}

#[async_trait]
impl<U, R, L, M> LoginService for AccountService<U, R, L, M>
where
    U: UserRepository,
    R: RecipeRepository,
    L: RelationRepository + ?Sized,
    M: ImageStore + ?Sized,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Ok(email) = Email::new(credentials.email()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let stored = self
            .users
            .credentials(email.as_ref().to_owned())
            .await
            .map_err(map_user_error)?;
        match stored {
            Some((id, digest)) if digest.verify(credentials.password()) => Ok(id),
            _ => Err(Error::unauthorized(INVALID_CREDENTIALS)),
        }
    }

    async fn resolve(&self, id: UserId) -> Result<Option<Actor>, Error> {
        let user = self.users.find(id).await.map_err(map_user_error)?;
        Ok(user.map(|user| Actor {
            id: user.id,
            is_admin: user.is_admin,
        }))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
