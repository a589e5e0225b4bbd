//! Request-side pagination parameters.

use serde::Deserialize;
use thiserror::Error;

/// Page size used when the client does not supply a usable `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Largest page size a client may request; larger values are clamped.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw query-string shape accepted by paginated endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    /// One-based page number.
    pub page: Option<u32>,
    /// Requested page size.
    pub limit: Option<u32>,
}

/// Errors raised while normalising pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageParamsError {
    /// The page number was zero.
    #[error("page numbers start at 1")]
    ZeroPage,
    /// The page lies beyond the last page of results.
    #[error("page {page} is out of range")]
    OutOfRange {
        /// Page number the client asked for.
        page: u32,
    },
}

/// Validated page number and page size.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= MAX_PAGE_SIZE`
///
/// # Examples
/// ```
/// use pagination::{PageParams, PageQuery};
///
/// let params = PageParams::try_from(PageQuery { page: Some(3), limit: Some(10) }).unwrap();
/// assert_eq!(params.offset(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    page: u32,
    limit: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    /// Build parameters from optional client values.
    ///
    /// A missing or zero `limit` falls back to [`DEFAULT_PAGE_SIZE`]; values
    /// above [`MAX_PAGE_SIZE`] are clamped.
    ///
    /// # Errors
    /// Returns [`PageParamsError::ZeroPage`] when `page` is zero.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageParamsError> {
        Self::with_default_limit(page, limit, DEFAULT_PAGE_SIZE)
    }

    /// Like [`PageParams::new`] with a deployment-specific default size.
    ///
    /// `default_limit` is itself clamped to `1..=MAX_PAGE_SIZE`.
    ///
    /// # Errors
    /// Returns [`PageParamsError::ZeroPage`] when `page` is zero.
    pub fn with_default_limit(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Result<Self, PageParamsError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(PageParamsError::ZeroPage);
        }
        let limit = match limit {
            None | Some(0) => default_limit.clamp(1, MAX_PAGE_SIZE),
            Some(value) => value.min(MAX_PAGE_SIZE),
        };
        Ok(Self { page, limit })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of rows per page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Reject pages past the end of a result set holding `count` rows.
    ///
    /// The first page is always valid, even for an empty result set.
    ///
    /// # Errors
    /// Returns [`PageParamsError::OutOfRange`] when the page starts beyond
    /// the last row.
    pub const fn ensure_within(&self, count: u64) -> Result<(), PageParamsError> {
        if self.page > 1 && self.offset() >= count {
            return Err(PageParamsError::OutOfRange { page: self.page });
        }
        Ok(())
    }

    /// Whether a page follows this one for a result set of `count` rows.
    #[must_use]
    pub const fn has_next(&self, count: u64) -> bool {
        self.offset() + (self.limit as u64) < count
    }
}

impl TryFrom<PageQuery> for PageParams {
    type Error = PageParamsError;

    fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
        Self::new(query.page, query.limit)
    }
}

#[cfg(test)]
mod tests {
    //! Normalisation rules for page parameters.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, DEFAULT_PAGE_SIZE)]
    #[case(Some(2), Some(10), 2, 10)]
    #[case(Some(1), Some(0), 1, DEFAULT_PAGE_SIZE)]
    #[case(Some(4), Some(1_000), 4, MAX_PAGE_SIZE)]
    fn normalises_client_values(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let params = PageParams::new(page, limit).expect("valid params");
        assert_eq!(params.page(), expected_page);
        assert_eq!(params.limit(), expected_limit);
    }

    #[rstest]
    fn zero_page_is_rejected() {
        assert_eq!(
            PageParams::new(Some(0), None),
            Err(PageParamsError::ZeroPage)
        );
    }

    #[rstest]
    #[case(None, 10, 10)]
    #[case(None, 0, 1)]
    #[case(None, 500, MAX_PAGE_SIZE)]
    #[case(Some(3), 10, 3)]
    fn deployment_default_applies_only_without_a_limit(
        #[case] limit: Option<u32>,
        #[case] default_limit: u32,
        #[case] expected: u32,
    ) {
        let params = PageParams::with_default_limit(None, limit, default_limit).expect("params");
        assert_eq!(params.limit(), expected);
    }

    #[rstest]
    #[case(1, 0, true)]
    #[case(2, 6, false)]
    #[case(2, 7, true)]
    fn range_check_allows_first_page_and_partial_pages(
        #[case] page: u32,
        #[case] count: u64,
        #[case] accepted: bool,
    ) {
        let params = PageParams::new(Some(page), Some(6)).expect("valid params");
        assert_eq!(params.ensure_within(count).is_ok(), accepted);
    }

    #[rstest]
    #[case(1, 6, false)]
    #[case(1, 7, true)]
    #[case(2, 13, true)]
    fn has_next_tracks_remaining_rows(#[case] page: u32, #[case] count: u64, #[case] next: bool) {
        let params = PageParams::new(Some(page), Some(6)).expect("valid params");
        assert_eq!(params.has_next(count), next);
    }
}
