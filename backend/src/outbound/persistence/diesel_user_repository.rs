//! PostgreSQL-backed `UserRepository`.
//!
//! Uniqueness of email and username is enforced by the `users_email_key` and
//! `users_username_key` constraints; violations surface as the matching
//! duplicate error instead of a generic query failure.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{ImageRef, NewUser, PageParams, PageSlice, PasswordDigest, User, UserId};

use super::diesel_helpers::{
    Violation, map_diesel_error, map_pool_error, page_window, to_total, violation,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{subscriptions, users};

const EMAIL_CONSTRAINT: &str = "users_email_key";
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    match violation(&error) {
        Some(Violation::Unique { constraint }) if constraint == EMAIL_CONSTRAINT => {
            UserRepositoryError::duplicate_email()
        }
        Some(Violation::Unique { constraint }) if constraint == USERNAME_CONSTRAINT => {
            UserRepositoryError::duplicate_username()
        }
        _ => map_diesel_error(
            error,
            UserRepositoryError::query,
            UserRepositoryError::connection,
        ),
    }
}

fn parse_digest(id: i64, encoded: &str) -> Result<PasswordDigest, UserRepositoryError> {
    PasswordDigest::parse(encoded).map_err(|err| {
        warn!(user_id = id, error = %err, "stored password digest is malformed");
        UserRepositoryError::query("stored password digest is malformed")
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let password = user.password.encode();
        let row = NewUserRow {
            email: user.email.as_ref(),
            username: user.username.as_ref(),
            first_name: user.first_name.as_ref(),
            last_name: user.last_name.as_ref(),
            password: &password,
        };

        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(User::from(stored))
    }

    async fn find(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(User::from))
    }

    async fn credentials(
        &self,
        email: String,
    ) -> Result<Option<(UserId, PasswordDigest)>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<(i64, String)> = users::table
            .filter(users::email.eq(&email))
            .select((users::id, users::password))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(|(id, encoded)| Ok((UserId::new(id), parse_digest(id, &encoded)?)))
            .transpose()
    }

    async fn password_digest(
        &self,
        id: UserId,
    ) -> Result<Option<PasswordDigest>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let encoded: Option<String> = users::table
            .find(id.get())
            .select(users::password)
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        encoded
            .map(|encoded| parse_digest(id.get(), &encoded))
            .transpose()
    }

    async fn set_password(
        &self,
        id: UserId,
        digest: PasswordDigest,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let updated = diesel::update(users::table.find(id.get()))
            .set(users::password.eq(digest.encode()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(updated > 0)
    }

    async fn list(&self, page: PageParams) -> Result<PageSlice<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (limit, offset) = page_window(page);

        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by((users::username.asc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(PageSlice::new(
            rows.into_iter().map(User::from).collect(),
            to_total(total),
        ))
    }

    async fn followed_by(
        &self,
        follower: UserId,
        page: PageParams,
    ) -> Result<PageSlice<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (limit, offset) = page_window(page);

        let authors = subscriptions::table
            .filter(subscriptions::follower_id.eq(follower.get()))
            .select(subscriptions::author_id);

        let total: i64 = users::table
            .filter(users::id.eq_any(authors.clone()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(authors))
            .select(UserRow::as_select())
            .order_by((users::username.asc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(PageSlice::new(
            rows.into_iter().map(User::from).collect(),
            to_total(total),
        ))
    }

    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<ImageRef>,
    ) -> Result<Option<ImageRef>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let next = avatar.as_ref().map(|image| image.as_ref().to_owned());

        let previous = conn
            .transaction(|conn| {
                async move {
                    let previous: Option<Option<String>> = users::table
                        .find(id.get())
                        .select(users::avatar)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;

                    diesel::update(users::table.find(id.get()))
                        .set(users::avatar.eq(next))
                        .execute(conn)
                        .await?;

                    Ok::<_, diesel::result::Error>(previous.flatten())
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        Ok(previous.map(ImageRef::new))
    }
}
