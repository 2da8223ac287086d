//! Shared Diesel error mapping for the ledger repositories.
//!
//! Both repository ports expose `Connection` and `Query` variants, so a single
//! pair of helpers translates pool and Diesel failures for either of them.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{ChannelRepositoryError, LedgerRepositoryError};

use super::pool::PoolError;

/// Repository errors that distinguish connectivity from query failures.
pub(crate) trait StorageError {
    fn connection(message: String) -> Self;
    fn query(message: String) -> Self;
}

impl StorageError for ChannelRepositoryError {
    fn connection(message: String) -> Self {
        Self::connection(message)
    }

    fn query(message: String) -> Self {
        Self::query(message)
    }
}

impl StorageError for LedgerRepositoryError {
    fn connection(message: String) -> Self {
        Self::connection(message)
    }

    fn query(message: String) -> Self {
        Self::query(message)
    }
}

/// Map pool checkout and build failures to a connection error.
pub(crate) fn map_pool_error<E: StorageError>(error: PoolError) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => E::connection(message),
    }
}

/// Map Diesel errors to a repository error, keeping driver detail in logs.
pub(crate) fn map_diesel_error<E: StorageError>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            E::query("check constraint violated".to_owned())
        }
        DieselError::NotFound => E::query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query("database query error".to_owned()),
        _ => E::query("database error".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_failures_become_connection_errors() {
        let err: LedgerRepositoryError = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, LedgerRepositoryError::connection("timed out"));

        let err: ChannelRepositoryError = map_pool_error(PoolError::build("bad url"));
        assert_eq!(err, ChannelRepositoryError::connection("bad url"));
    }

    #[rstest]
    fn not_found_becomes_query_error() {
        let err: ChannelRepositoryError = map_diesel_error(DieselError::NotFound);
        assert_eq!(err, ChannelRepositoryError::query("record not found"));
    }

    #[rstest]
    fn closed_connection_becomes_connection_error() {
        let err: LedgerRepositoryError = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        ));
        assert_eq!(
            err,
            LedgerRepositoryError::connection("database connection error")
        );
    }
}
