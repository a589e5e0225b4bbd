//! Page-number pagination primitives shared by backend list endpoints.
//!
//! Clients request a page with the `page` and `limit` query parameters.
//! [`PageParams`] normalises those values and [`Page`] wraps one page of
//! results together with the total count and absolute links to the
//! neighbouring pages.

mod envelope;
mod params;

pub use envelope::Page;
pub use params::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageParams, PageParamsError, PageQuery};
