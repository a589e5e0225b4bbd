//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use foodgram_backend::outbound::media::FsImageStore;
use foodgram_backend::outbound::persistence::DbPool;
use pagination::DEFAULT_PAGE_SIZE;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) media: FsImageStore,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) page_size: u32,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        media: FsImageStore,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            media,
            db_pool: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Attach a database pool; without one the in-memory store is used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Default page size for listings without `limit`.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}
