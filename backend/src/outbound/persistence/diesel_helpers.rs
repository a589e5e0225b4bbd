//! Shared helpers for the Diesel repositories.
//!
//! - Pool and Diesel error mapping onto each port's constructors.
//! - Constraint classification for unique and foreign-key violations.
//! - Conversions between page parameters, counts and SQL integers.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::PageParams;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map Diesel errors into query/connection constructors.
///
/// Constraint violations a repository wants to surface differently must be
/// classified with [`violation`] before falling through to this function.
pub(crate) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Integrity violations the repositories translate into port errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Violation {
    Unique { constraint: String },
    ForeignKey { constraint: String },
}

/// Classify a unique or foreign-key violation, if `error` is one.
pub(crate) fn violation(error: &DieselError) -> Option<Violation> {
    let DieselError::DatabaseError(kind, info) = error else {
        return None;
    };
    let constraint = info.constraint_name().unwrap_or_default().to_owned();
    match kind {
        DatabaseErrorKind::UniqueViolation => Some(Violation::Unique { constraint }),
        DatabaseErrorKind::ForeignKeyViolation => Some(Violation::ForeignKey { constraint }),
        _ => None,
    }
}

/// Escape `LIKE` wildcards so `prefix` matches literally, then append `%`.
pub(crate) fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// `COUNT(*)` results are never negative.
pub(crate) fn to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

/// `LIMIT`/`OFFSET` pair for a page.
pub(crate) fn page_window(page: PageParams) -> (i64, i64) {
    let limit = i64::from(page.limit());
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}
