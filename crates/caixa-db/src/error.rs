//! # Storage Errors
//!
//! Everything caixa-db can fail with. The register never shows these to the
//! cashier verbatim: catalog failures become `CatalogUnavailable`, recorder
//! failures become `RecordingFailed`, and SQL text stays in the log.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Lookup by id found nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `UNIQUE constraint failed`, e.g. two sales racing for one receipt number.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A sale item pointed at a product the catalog does not have.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A sale line asked for more units than the catalog holds.
    ///
    /// The stock decrement is guarded in SQL, so this surfaces when another
    /// sale consumed the stock after the line was added to the cart.
    #[error("Insufficient stock for product {product_id}: requested {requested}")]
    InsufficientStock { product_id: String, requested: i64 },

    /// Entity failed validation before it reached SQL.
    #[error("Invalid {entity}: {reason}")]
    Invalid { entity: String, reason: String },

    /// The file could not be opened or created, or the pool was closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected the statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No connection freed up within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Constraint failures are told apart by SQLite's message text.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("database is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<caixa_core::ValidationError> for DbError {
    fn from(err: caixa_core::ValidationError) -> Self {
        DbError::Invalid {
            entity: "Product".to_string(),
            reason: err.to_string(),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
