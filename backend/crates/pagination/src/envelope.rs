//! Response envelope for one page of results.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::PageParams;

/// One page of results with navigation links.
///
/// # Examples
/// ```
/// use pagination::{Page, PageParams};
/// use url::Url;
///
/// let url = Url::parse("https://example.test/api/recipes?limit=2").unwrap();
/// let params = PageParams::new(None, Some(2)).unwrap();
/// let page = Page::new(vec![1, 2], 5, params, &url);
/// assert_eq!(
///     page.next.as_deref(),
///     Some("https://example.test/api/recipes?limit=2&page=2")
/// );
/// assert!(page.previous.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of rows across all pages.
    pub count: u64,
    /// Absolute URL of the following page, if any.
    pub next: Option<String>,
    /// Absolute URL of the preceding page, if any.
    pub previous: Option<String>,
    /// Rows on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page, deriving links from the URL of the current request.
    #[must_use]
    pub fn new(results: Vec<T>, count: u64, params: PageParams, request_url: &Url) -> Self {
        let next = params
            .has_next(count)
            .then(|| with_page(request_url, Some(params.page() + 1)));
        let previous = match params.page() {
            1 => None,
            2 => Some(with_page(request_url, None)),
            page => Some(with_page(request_url, Some(page - 1))),
        };
        Self {
            count,
            next,
            previous,
            results,
        }
    }

    /// Transform every row while keeping counts and links.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

fn with_page(url: &Url, page: Option<u32>) -> String {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut target = url.clone();
    target.set_query(None);
    if !retained.is_empty() || page.is_some() {
        let mut pairs = target.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        if let Some(number) = page {
            pairs.append_pair("page", &number.to_string());
        }
    }
    target.to_string()
}
