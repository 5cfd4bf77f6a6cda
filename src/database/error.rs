use serde::Serialize;
use thiserror::Error;
use warp::{
    http::StatusCode,
    reject::Reject,
    reply::{self, Reply, Response},
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const NOT_NULL_VIOLATION: &str = "23502";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Referenced row does not exist, or the mutator target is absent
    #[error("{0}")]
    NotFound(String),

    /// Duplicate add of something that is already present
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    /// Shopping list requested while the cart holds nothing
    #[error("Shopping cart is empty")]
    EmptyResult,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid session; {0}")]
    InvalidSession(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

#[derive(Serialize)]
struct ErrorBody {
    errors: String,
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) | Error::EmptyResult => StatusCode::NOT_FOUND,
            Error::Conflict(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::FORBIDDEN,
            Error::InvalidSession(_) => StatusCode::UNAUTHORIZED,
            Error::Config(_) | Error::Query(_) | Error::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON `{"errors": ...}` body carrying [`Error::status`].
    pub fn into_reply(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            errors: self.to_string(),
        };

        reply::with_status(reply::json(&body), status).into_response()
    }

    /// Maps a PostgreSQL SQLSTATE onto the caller-visible taxonomy.
    pub fn from_sqlstate(code: &str, info: String) -> Self {
        match code {
            UNIQUE_VIOLATION => Error::Conflict(info),
            FOREIGN_KEY_VIOLATION => Error::NotFound(info),
            CHECK_VIOLATION | NOT_NULL_VIOLATION => Error::Validation(info),
            _ => Error::Query(info),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(e) => match e.code() {
                Some(code) => Self::from_sqlstate(&code, e.message().to_owned()),
                None => Self::Query(format!("{e}")),
            },
            sqlx::Error::RowNotFound => Self::NotFound(String::from("Object not found")),
            sqlx::Error::PoolTimedOut => Self::Query(String::from("Pool timed out")),
            sqlx::Error::PoolClosed => Self::Query(String::from("Pool closed")),
            sqlx::Error::Migrate(e) => Self::Config(format!("{e}")),
            e => Self::Query(format!("{e}")),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::Config(format!("Migration failed: {value}"))
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::Hash(format!("{value}"))
    }
}

impl Reject for Error {}
