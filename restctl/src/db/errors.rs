use sqlx::error::ErrorKind;
use thiserror::Error;

/// Database failures the API layer can map to a response.
///
/// Constraint violations keep the offending table and column so they can be reported precisely.
#[derive(Error, Debug)]
pub enum DbError {
    /// `fetch_one` found no row
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Check or NOT NULL constraint violation
    #[error("Check constraint violation")]
    CheckViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Anything else: connection, pool, decode and migration failures
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let db_err = match &err {
            sqlx::Error::RowNotFound => return DbError::NotFound,
            sqlx::Error::Database(db_err) => db_err,
            _ => return DbError::Other(err.into()),
        };

        let message = db_err.message().to_string();
        // SQLite reports neither table nor constraint, only "<KIND> constraint failed: table.column"
        let (table, constraint) = match db_err.table() {
            Some(table) => (Some(table.to_string()), db_err.constraint().map(str::to_string)),
            None => parse_constraint_target(&message),
        };

        match db_err.kind() {
            ErrorKind::UniqueViolation => DbError::UniqueViolation { constraint, table, message },
            ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { constraint, table, message },
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => DbError::CheckViolation { constraint, table, message },
            _ => DbError::Other(err.into()),
        }
    }
}

/// Extract `(table, column)` from a message like `UNIQUE constraint failed: users.email`.
fn parse_constraint_target(message: &str) -> (Option<String>, Option<String>) {
    let Some((_, target)) = message.split_once("failed: ") else {
        return (None, None);
    };
    // Composite constraints list every column; the first one names the table
    let first = target.split(',').next().unwrap_or_default().trim();
    match first.split_once('.') {
        Some((table, column)) => (Some(table.to_string()), Some(column.to_string())),
        None => (None, None),
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constraint_target() {
        assert_eq!(
            parse_constraint_target("UNIQUE constraint failed: users.email"),
            (Some("users".to_string()), Some("email".to_string()))
        );
        assert_eq!(
            parse_constraint_target("UNIQUE constraint failed: user_has_user_groups.user_id, user_has_user_groups.user_group_id"),
            (Some("user_has_user_groups".to_string()), Some("user_id".to_string()))
        );
        assert_eq!(parse_constraint_target("FOREIGN KEY constraint failed"), (None, None));
    }
}
