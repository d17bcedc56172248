use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// The store could not be reached at all: missing directory, permissions,
    /// pool exhausted past its acquire timeout, or a closed pool.
    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[source] sqlx::Error),

    #[error("Database query failed: {0}")]
    QueryError(#[source] sqlx::Error),

    /// A row was rejected by one of the table's constraints.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// True when the failure means the store itself is unhealthy, as opposed
    /// to a bad input or a bad query.
    pub fn is_unavailable(&self) -> bool {
        match self {
            DbError::ConnectionError(_) => true,
            DbError::MigrationError(sqlx::migrate::MigrateError::Execute(e)) => {
                is_unavailable(e)
            }
            _ => false,
        }
    }
}

/// A constraint violation reported by the store, mapped back to the field the
/// caller sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Wire name of the offending field, when it can be identified.
    pub field: Option<&'static str>,
    pub message: String,
}

/// (constraint name, wire field name, message)
const CHECK_CONSTRAINTS: &[(&str, &str, &str)] = &[
    ("weighins_weight_range", "weight", "weight must be between 100 and 300 pounds"),
    ("weighins_fat_range", "fat", "fat must be between 0 and 100 percent"),
    ("weighins_muscle_range", "muscle", "muscle must be between 0 and 100 percent"),
    ("weighins_resting_metab_min", "restingMetab", "restingMetab must be greater than 1000 kcal"),
    ("weighins_visceral_fat_range", "visceralFat", "visceralFat must be between 10 and 30"),
    ("runs_distance_positive", "distance", "distance must be greater than 0"),
    ("runs_time_non_negative", "time", "time must not be negative"),
];

const COLUMNS: &[&str] = &[
    "date",
    "weight",
    "bmi",
    "fat",
    "muscle",
    "restingMetab",
    "visceralFat",
    "distance",
    "distanceUnit",
    "time",
];

impl ValidationError {
    /// Builds the error from SQLite's `CHECK constraint failed: <name>` message.
    fn from_check_message(message: &str) -> Self {
        let name = message
            .rsplit(':')
            .next()
            .map(str::trim)
            .unwrap_or_default();
        match CHECK_CONSTRAINTS.iter().find(|(constraint, _, _)| *constraint == name) {
            Some((_, field, text)) => Self {
                field: Some(*field),
                message: (*text).to_string(),
            },
            None => Self {
                field: None,
                message: "the record violates a data constraint".to_string(),
            },
        }
    }

    /// Builds the error from SQLite's `NOT NULL constraint failed: <table>.<column>` message.
    fn from_not_null_message(message: &str) -> Self {
        let column = message
            .rsplit('.')
            .next()
            .map(str::trim)
            .unwrap_or_default();
        match COLUMNS.iter().find(|c| **c == column) {
            Some(field) => Self {
                field: Some(*field),
                message: format!("{field} is required"),
            },
            None => Self {
                field: None,
                message: "a required value is missing".to_string(),
            },
        }
    }
}

// Primary SQLite result codes that mean the file itself is unusable.
const SQLITE_PERM: i64 = 3;
const SQLITE_IOERR: i64 = 10;
const SQLITE_CORRUPT: i64 = 11;
const SQLITE_CANTOPEN: i64 = 14;
const SQLITE_NOTADB: i64 = 26;

fn is_unavailable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Configuration(_)
        | sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i64>().ok())
            .map(|code| {
                matches!(
                    code & 0xff,
                    SQLITE_PERM | SQLITE_IOERR | SQLITE_CORRUPT | SQLITE_CANTOPEN | SQLITE_NOTADB
                )
            })
            .unwrap_or(false),
        _ => false,
    }
}

/// Classifies driver errors so that nothing driver-specific has to be
/// inspected above this crate.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::CheckViolation => {
                    return DbError::Validation(ValidationError::from_check_message(
                        db_err.message(),
                    ));
                }
                ErrorKind::NotNullViolation => {
                    return DbError::Validation(ValidationError::from_not_null_message(
                        db_err.message(),
                    ));
                }
                _ => {}
            }
        }
        if is_unavailable(&err) {
            DbError::ConnectionError(err)
        } else {
            DbError::QueryError(err)
        }
    }
}
