//! Session login and logout, plus resolution of the session into the
//! identity handed to the domain.
//!
//! ```text
//! POST /api/auth/login {"email":"cook@example.com","password":"..."}
//! POST /api/auth/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::domain::{Actor, Error, LoginCredentials, LoginValidationError, Viewer};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error};

const NOT_AUTHENTICATED: &str = "Учетные данные не были предоставлены.";

/// Resolve the viewer behind the session.
///
/// Sessions naming a user that no longer exists are anonymous.
pub(crate) async fn viewer(session: &SessionContext, state: &HttpState) -> ApiResult<Viewer> {
    let Some(id) = session.user_id()? else {
        return Ok(Viewer::Anonymous);
    };
    match state.login.resolve(id).await? {
        Some(actor) => Ok(Viewer::Authenticated(actor)),
        None => {
            warn!(user_id = %id, "session refers to an unknown user");
            Ok(Viewer::Anonymous)
        }
    }
}

/// Require an authenticated actor or fail with `401 Unauthorized`.
pub(crate) async fn require_actor(session: &SessionContext, state: &HttpState) -> ApiResult<Actor> {
    viewer(session, state)
        .await?
        .actor()
        .copied()
        .ok_or_else(|| Error::unauthorized(NOT_AUTHENTICATED))
}

/// Login request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "cook@example.com")]
    pub email: String,
    pub password: String,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => missing_field_error(FieldName::new("email")),
        LoginValidationError::EmptyPassword => missing_field_error(FieldName::new("password")),
    }
}

/// Authenticate by email and password and establish a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(user_id)?;
    debug!(user_id = %user_id, "session established");
    Ok(HttpResponse::Ok().finish())
}

/// Forget the session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, &state).await?;
    session.forget();
    debug!(user_id = %actor.id, "session closed");
    Ok(HttpResponse::NoContent().finish())
}
