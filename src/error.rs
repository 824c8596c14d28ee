//! Error types for client repository operations.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Failures surfaced by [`crate::db::ClientRepository`].
///
/// Every variant keeps the store's diagnostic message.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A unique constraint (email or phone) would be violated.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A write referenced a client id with no matching client.
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// No client exists with the requested id.
    #[error("client {0} not found")]
    NotFound(i32),

    /// The store is unreachable or the session is no longer usable.
    #[error("connection failure: {0}")]
    ConnectionFailure(#[source] sqlx::Error),

    /// Any other failure reported by the store.
    #[error("database error: {0}")]
    Store(#[source] sqlx::Error),
}

impl RepoError {
    /// Whether this failure came from a uniqueness or referential constraint.
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            RepoError::ConstraintViolation(_) | RepoError::ForeignKeyViolation(_)
        )
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.code().is_some_and(is_connection_state) => {
                RepoError::ConnectionFailure(sqlx::Error::Database(db_err))
            }
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    RepoError::ConstraintViolation(db_err.message().to_string())
                }
                ErrorKind::ForeignKeyViolation => {
                    RepoError::ForeignKeyViolation(db_err.message().to_string())
                }
                _ => RepoError::Store(sqlx::Error::Database(db_err)),
            },
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => RepoError::ConnectionFailure(err),
            other => RepoError::Store(other),
        }
    }
}

/// SQLSTATE class 08 (connection exception) and the 57P0x shutdown codes
/// mean the session itself is gone.
fn is_connection_state(code: std::borrow::Cow<'_, str>) -> bool {
    code.starts_with("08") || matches!(code.as_ref(), "57P01" | "57P02" | "57P03")
}

/// Convenience alias for results with [`RepoError`].
pub type Result<T> = std::result::Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::io;

    #[derive(Debug, Error)]
    #[error("{message}")]
    struct PgFailure {
        code: &'static str,
        message: &'static str,
    }

    impl sqlx::error::DatabaseError for PgFailure {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.code {
                "23505" => ErrorKind::UniqueViolation,
                "23503" => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn pg(code: &'static str, message: &'static str) -> RepoError {
        RepoError::from(sqlx::Error::Database(Box::new(PgFailure { code, message })))
    }

    #[test]
    fn unique_and_foreign_key_codes() {
        let err = pg(
            "23505",
            "duplicate key value violates unique constraint \"clients_email_key\"",
        );
        assert!(
            matches!(&err, RepoError::ConstraintViolation(m) if m.contains("clients_email_key"))
        );

        let err = pg(
            "23503",
            "insert or update on table \"phones\" violates foreign key constraint",
        );
        assert!(matches!(err, RepoError::ForeignKeyViolation(_)));
    }

    #[test]
    fn server_side_connection_errors_are_connection_failures() {
        for code in ["08006", "08003", "57P01", "57P03"] {
            let err = pg(code, "terminating connection");
            assert!(matches!(err, RepoError::ConnectionFailure(_)), "{code}");
        }
    }

    #[test]
    fn other_database_errors_are_store_errors() {
        let err = pg("42P01", "relation \"clients\" does not exist");
        assert!(matches!(err, RepoError::Store(sqlx::Error::Database(_))));
    }

    #[test]
    fn io_errors_are_connection_failures() {
        let err = RepoError::from(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        )));

        assert!(matches!(err, RepoError::ConnectionFailure(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn protocol_errors_are_connection_failures() {
        let err = RepoError::from(sqlx::Error::Protocol("unexpected message".into()));
        assert!(matches!(err, RepoError::ConnectionFailure(_)));
    }

    #[test]
    fn other_errors_pass_through_as_store() {
        let err = RepoError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepoError::Store(sqlx::Error::RowNotFound)));
        assert!(!err.is_constraint());
    }

    #[test]
    fn constraint_kinds() {
        assert!(RepoError::ConstraintViolation("dup".into()).is_constraint());
        assert!(RepoError::ForeignKeyViolation("fk".into()).is_constraint());
        assert!(!RepoError::NotFound(7).is_constraint());
        assert_eq!(RepoError::NotFound(7).to_string(), "client 7 not found");
    }
}
