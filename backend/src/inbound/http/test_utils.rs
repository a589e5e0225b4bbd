//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::json;
use mockable::DefaultClock;
use tempfile::TempDir;

use crate::domain::ports::{IngredientRepository, UserRepository};
use crate::domain::{
    Email, NewIngredient, NewUser, PasswordDigest, PersonName, User, UserId, Username,
};
use crate::inbound::http::auth::{login, logout};
use crate::inbound::http::error::{json_config, path_config, query_config};
use crate::inbound::http::state::{Adapters, HttpState};
use crate::outbound::media::FsImageStore;
use crate::outbound::memory::MemoryStore;

/// Password given to every user created by [`TestHarness::user`].
pub const TEST_PASSWORD: &str = "s3cret-pass";

/// One-pixel PNG as a data URI.
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by a response.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// App serving `routes` under `/api` next to the login and logout routes.
pub fn api_app(
    state: HttpState,
    routes: impl FnOnce(&mut web::ServiceConfig),
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(test_session_middleware())
        .service(
            web::scope("/api")
                .service(login)
                .service(logout)
                .configure(routes),
        )
}

/// Log in as `<name>@example.com` and return the session cookie.
pub async fn login_as<S>(app: &S, name: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": format!("{name}@example.com"), "password": TEST_PASSWORD}))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "login as {name} failed");
    session_cookie(&res)
}

/// Real services over the in-memory store and a scratch media root.
pub struct TestHarness {
    pub store: MemoryStore,
    pub state: HttpState,
    _media: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let media = tempfile::tempdir().expect("media dir");
        let images = Arc::new(
            FsImageStore::open(media.path(), "http://testserver/media/").expect("image store"),
        );
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());
        let state = HttpState::from_adapters(Adapters {
            users: Arc::clone(&shared),
            recipes: Arc::clone(&shared),
            ingredients: Arc::clone(&shared),
            relations: shared,
            images,
            clock: Arc::new(DefaultClock),
        });
        Self {
            store,
            state,
            _media: media,
        }
    }

    /// Register `name` with email `<name>@example.com` and [`TEST_PASSWORD`].
    pub async fn user(&self, name: &str) -> User {
        UserRepository::create(
            &self.store,
            NewUser {
                email: Email::new(format!("{name}@example.com")).expect("email"),
                username: Username::new(name).expect("username"),
                first_name: PersonName::new("first_name", "Имя").expect("first name"),
                last_name: PersonName::new("last_name", "Фамилия").expect("last name"),
                password: PasswordDigest::generate(TEST_PASSWORD).expect("digest"),
            },
        )
        .await
        .expect("user stored")
    }

    /// Seed ingredients and return their ids in the order given.
    pub async fn ingredients(&self, entries: &[(&str, &str)]) -> Vec<i64> {
        let fresh = entries
            .iter()
            .map(|(name, unit)| NewIngredient::try_new(Some(*name), Some(*unit)).expect("ingredient"))
            .collect();
        self.store.insert_missing(fresh).await.expect("seeded");
        let all = self.store.search(None).await.expect("catalogue");
        entries
            .iter()
            .map(|(name, _)| {
                all.iter()
                    .find(|ingredient| ingredient.name == *name)
                    .map(|ingredient| ingredient.id.get())
                    .expect("seeded ingredient")
            })
            .collect()
    }

    /// Flag `user` as an administrator.
    pub fn promote(&self, user: UserId) {
        assert!(self.store.grant_admin(user), "user exists");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
