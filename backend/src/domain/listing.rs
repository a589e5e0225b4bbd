//! One page of a listing as returned by repositories and services.

pub use pagination::PageParams;
use pagination::PageParamsError;

use crate::domain::Error;

/// Rows of one page plus the total across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> PageSlice<T> {
    /// Wrap a page of rows.
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// Transform every row, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageSlice<U> {
        PageSlice {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }

    /// Fail with `NotFound` when `params` points past the last row.
    pub fn ensure_page(self, params: PageParams) -> Result<Self, Error> {
        params.ensure_within(self.total).map_err(map_page_error)?;
        Ok(self)
    }
}

pub(crate) fn map_page_error(error: PageParamsError) -> Error {
    match error {
        PageParamsError::ZeroPage => Error::invalid_field("page", "invalid", error.to_string()),
        PageParamsError::OutOfRange { .. } => Error::not_found("Неправильная страница"),
    }
}

/// Take one page out of an already ordered, fully materialised sequence.
pub fn paginate<T>(rows: Vec<T>, params: PageParams) -> PageSlice<T> {
    let total = rows.len() as u64;
    let offset = usize::try_from(params.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(params.limit()).unwrap_or(usize::MAX);
    let items = rows.into_iter().skip(offset).take(limit).collect();
    PageSlice { items, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn paginate_takes_the_requested_window() {
        let params = PageParams::new(Some(2), Some(2)).expect("params");
        let slice = paginate((1..=5).collect(), params);
        assert_eq!(slice, PageSlice::new(vec![3, 4], 5));
    }

    #[rstest]
    fn pages_past_the_end_are_not_found() {
        let params = PageParams::new(Some(4), Some(2)).expect("params");
        let error = paginate((1..=5).collect::<Vec<i32>>(), params)
            .ensure_page(params)
            .expect_err("out of range");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
