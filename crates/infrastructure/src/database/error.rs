//! Errors raised by the database plugins

use dbcreds_domain::credentials::{CredentialError, MutationKind};
use thiserror::Error;

/// Failure inside a database plugin
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database user '{username}' does not exist")]
    UserNotFound { username: String },

    #[error("Unsupported database plugin: {0}")]
    UnsupportedPlugin(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

impl DatabaseError {
    /// Converts a failed renew/revoke into the domain error
    pub fn into_mutation(self, operation: MutationKind, username: &str) -> CredentialError {
        CredentialError::database_mutation(operation, username, self.to_string())
    }

    /// Converts a failed connect into the domain error
    pub fn into_connection(self, connection: &str) -> CredentialError {
        CredentialError::connection_failed(connection, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbcreds_domain::credentials::CredentialErrorKind;

    #[test]
    fn test_user_not_found_maps_to_mutation_failure() {
        let err = DatabaseError::UserNotFound {
            username: "v-ghost".to_string(),
        }
        .into_mutation(MutationKind::Revoke, "v-ghost");

        assert_eq!(err.kind(), CredentialErrorKind::DatabaseMutation);
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_unsupported_plugin_maps_to_connection_failure() {
        let err = DatabaseError::UnsupportedPlugin("mysql".to_string()).into_connection("main");

        assert!(matches!(
            err,
            CredentialError::ConnectionFailed { ref connection, ref message }
                if connection == "main" && message.contains("mysql")
        ));
    }

    #[test]
    fn test_sql_error_from() {
        let err: DatabaseError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DatabaseError::Sql(_)));
    }
}
