//! Page-number pagination glue for list endpoints.

use actix_web::HttpRequest;
use pagination::{Page, PageParams};

use crate::domain::listing::map_page_error;
use crate::domain::{Error, PageSlice};
use crate::inbound::http::state::HttpState;

/// Normalise `page`/`limit` using the deployment's default page size.
pub(crate) fn page_params(
    state: &HttpState,
    page: Option<u32>,
    limit: Option<u32>,
) -> Result<PageParams, Error> {
    PageParams::with_default_limit(page, limit, state.page_size).map_err(map_page_error)
}

/// Wrap a slice in the `{count, next, previous, results}` envelope.
pub(crate) fn envelope<T>(req: &HttpRequest, slice: PageSlice<T>, params: PageParams) -> Page<T> {
    Page::new(slice.items, slice.total, params, &req.full_url())
}
