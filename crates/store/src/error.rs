use sqlx::error::ErrorKind;
use thiserror::Error;

/// Errors raised by the persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A foreign key rejected the write, either a dangling reference on insert
    /// or a RESTRICT on delete. Carries the constraint name.
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// A CHECK constraint rejected the write (negative stock, zero quantity).
    #[error("Check constraint violated: {0}")]
    CheckViolation(String),

    /// A stored value could not be mapped back into its Rust type.
    #[error("Corrupt value {value:?} in column {column}")]
    Corrupt { column: &'static str, value: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Maps constraint failures reported by the database onto dedicated
    /// variants so callers can react without inspecting driver errors.
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let constraint = db_err.constraint().unwrap_or_default().to_owned();
            match db_err.kind() {
                ErrorKind::UniqueViolation => return Self::UniqueViolation(constraint),
                ErrorKind::ForeignKeyViolation => return Self::ForeignKeyViolation(constraint),
                ErrorKind::CheckViolation => return Self::CheckViolation(constraint),
                _ => {}
            }
        }
        Self::Database(err)
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
