//! Users API handlers: registration, profiles, avatars, passwords and
//! subscriptions.
//!
//! ```text
//! POST   /api/users
//! GET    /api/users?page=1&limit=6
//! GET    /api/users/me
//! GET    /api/users/subscriptions?recipes_limit=3
//! GET    /api/users/{id}
//! PUT    /api/users/me/avatar {"avatar":"data:image/png;base64,..."}
//! DELETE /api/users/me/avatar
//! POST   /api/users/set_password
//! POST   /api/users/{id}/subscribe?recipes_limit=3
//! DELETE /api/users/{id}/subscribe
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordChange, Registration};
use crate::domain::{
    AuthorView, Email, Error, PersonName, RegisteredUserView, UserId, UserView, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{require_actor, viewer};
use crate::inbound::http::images::decode_data_uri;
use crate::inbound::http::pages::{envelope, page_params};
use crate::inbound::http::schemas::{AuthorPageSchema, UserPageSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, required};

const EMAIL: FieldName = FieldName::new("email");
const USERNAME: FieldName = FieldName::new("username");
const FIRST_NAME: FieldName = FieldName::new("first_name");
const LAST_NAME: FieldName = FieldName::new("last_name");
const PASSWORD: FieldName = FieldName::new("password");
const CURRENT_PASSWORD: FieldName = FieldName::new("current_password");
const NEW_PASSWORD: FieldName = FieldName::new("new_password");
const AVATAR: FieldName = FieldName::new("avatar");

/// Registration body for `POST /api/users`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "cook@example.com")]
    pub email: Option<String>,
    #[schema(example = "cook")]
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let password = Zeroizing::new(required(value.password, PASSWORD)?);
        if password.is_empty() {
            return Err(missing_field_error(PASSWORD));
        }
        Ok(Self {
            email: Email::new(required(value.email, EMAIL)?)?,
            username: Username::new(required(value.username, USERNAME)?)?,
            first_name: PersonName::new(
                FIRST_NAME.as_str(),
                required(value.first_name, FIRST_NAME)?,
            )?,
            last_name: PersonName::new(LAST_NAME.as_str(), required(value.last_name, LAST_NAME)?)?,
            password,
        })
    }
}

/// Body for `POST /api/users/set_password`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl TryFrom<SetPasswordRequest> for PasswordChange {
    type Error = Error;

    fn try_from(value: SetPasswordRequest) -> Result<Self, Self::Error> {
        let current_password = Zeroizing::new(required(value.current_password, CURRENT_PASSWORD)?);
        let new_password = Zeroizing::new(required(value.new_password, NEW_PASSWORD)?);
        if new_password.is_empty() {
            return Err(missing_field_error(NEW_PASSWORD));
        }
        Ok(Self {
            current_password,
            new_password,
        })
    }
}

/// Body for `PUT /api/users/me/avatar`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AvatarRequest {
    #[schema(example = "data:image/png;base64,iVBORw0KGgo=")]
    pub avatar: Option<String>,
}

/// Stored avatar URL.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvatarResponse {
    pub avatar: String,
}

/// `page`/`limit` query for user listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UsersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query for subscription listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SubscriptionsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Maximum number of recipes embedded per author.
    pub recipes_limit: Option<u32>,
}

/// Query for `POST /api/users/{id}/subscribe`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<u32>,
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisteredUserView),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let created = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(created))
}

/// List users, one page at a time.
#[utoipa::path(
    get,
    path = "/api/users",
    params(UsersQuery),
    responses(
        (status = 200, description = "Users", body = UserPageSchema),
        (status = 404, description = "Page out of range", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users")]
pub async fn list_users(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UsersQuery>,
) -> ApiResult<web::Json<Page<UserView>>> {
    let viewer = viewer(&session, &state).await?;
    let params = page_params(&state, query.page, query.limit)?;
    let slice = state.users.list(viewer, params).await?;
    Ok(web::Json(envelope(&req, slice, params)))
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserView>> {
    let actor = require_actor(&session, &state).await?;
    Ok(web::Json(state.users.me(actor).await?))
}

/// Authors the signed-in user follows, ordered by username.
#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    params(SubscriptionsQuery),
    responses(
        (status = 200, description = "Followed authors", body = AuthorPageSchema),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "listSubscriptions"
)]
#[get("/users/subscriptions")]
pub async fn subscriptions(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SubscriptionsQuery>,
) -> ApiResult<web::Json<Page<AuthorView>>> {
    let actor = require_actor(&session, &state).await?;
    let params = page_params(&state, query.page, query.limit)?;
    let slice = state
        .users
        .subscriptions(actor, params, query.recipes_limit)
        .await?;
    Ok(web::Json(envelope(&req, slice, params)))
}

/// Public profile of one user.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserView),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security([])
)]
#[get("/users/{id:\\d+}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserView>> {
    let viewer = viewer(&session, &state).await?;
    let user = state
        .users
        .get(viewer, UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(user))
}

/// Replace the signed-in user's avatar.
#[utoipa::path(
    put,
    path = "/api/users/me/avatar",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, description = "Invalid image", body = Error),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "setAvatar"
)]
#[put("/users/me/avatar")]
pub async fn set_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AvatarRequest>,
) -> ApiResult<web::Json<AvatarResponse>> {
    let actor = require_actor(&session, &state).await?;
    let raw = required(payload.into_inner().avatar, AVATAR)?;
    let upload = decode_data_uri(&raw, AVATAR)?;
    let avatar = state.accounts.set_avatar(actor, upload).await?;
    Ok(web::Json(AvatarResponse { avatar }))
}

/// Remove the signed-in user's avatar.
#[utoipa::path(
    delete,
    path = "/api/users/me/avatar",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "removeAvatar"
)]
#[delete("/users/me/avatar")]
pub async fn remove_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, &state).await?;
    state.accounts.remove_avatar(actor).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change the signed-in user's password.
#[utoipa::path(
    post,
    path = "/api/users/set_password",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password", body = Error),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "setPassword"
)]
#[post("/users/set_password")]
pub async fn set_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, &state).await?;
    let change = PasswordChange::try_from(payload.into_inner())?;
    state.accounts.change_password(actor, change).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Follow an author.
#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    params(("id" = i64, Path, description = "Author id"), SubscribeQuery),
    responses(
        (status = 201, description = "Subscribed", body = AuthorView),
        (status = 400, description = "Already subscribed or self-subscription", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 404, description = "Unknown author", body = Error)
    ),
    tags = ["users"],
    operation_id = "subscribe"
)]
#[post("/users/{id:\\d+}/subscribe")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    query: web::Query<SubscribeQuery>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, &state).await?;
    let author = state
        .subscriptions
        .subscribe(actor, UserId::new(path.into_inner()), query.recipes_limit)
        .await?;
    Ok(HttpResponse::Created().json(author))
}

/// Stop following an author.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    params(("id" = i64, Path, description = "Author id")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Was not subscribed", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 404, description = "Unknown author", body = Error)
    ),
    tags = ["users"],
    operation_id = "unsubscribe"
)]
#[delete("/users/{id:\\d+}/subscribe")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, &state).await?;
    state
        .subscriptions
        .unsubscribe(actor, UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register every users route on `cfg`; fixed paths precede `{id}` paths.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(list_users)
        .service(me)
        .service(subscriptions)
        .service(set_avatar)
        .service(remove_avatar)
        .service(set_password)
        .service(get_user)
        .service(subscribe)
        .service(unsubscribe);
}
