//! Defines the app level error type and its conversion into JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction was submitted with an empty or whitespace-only category.
    #[error("category cannot be empty")]
    EmptyCategory,

    /// A required field was missing from a submitted transaction.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// The amount could not be parsed as a finite decimal number.
    ///
    /// Callers should pass in the text that failed to parse.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// The date could not be parsed as a `YYYY-MM-DD` calendar date.
    ///
    /// Callers should pass in the text that failed to parse.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A stored row could not be turned into a transaction.
    ///
    /// `row` is the one-based index of the data row, not counting the header.
    #[error("row {row} is malformed: {reason}")]
    MalformedRow {
        /// The one-based index of the offending row.
        row: usize,
        /// Why the row was rejected.
        reason: String,
    },

    /// A required column is missing from a stored ledger.
    #[error("the ledger has no \"{0}\" column")]
    MissingColumn(&'static str),

    /// The flat file could not be read or written.
    ///
    /// The error string comes from the underlying IO or CSV error.
    #[error("could not access the ledger file: {0}")]
    FlatFileError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::debug!("an SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::FlatFileError(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::FlatFileError(value.to_string())
    }
}

impl Error {
    /// Whether the error was caused by the client sending bad input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::EmptyCategory
                | Error::MissingField(_)
                | Error::InvalidAmount(_)
                | Error::InvalidDate(_)
        )
    }

    /// The HTTP status code that best describes the error.
    pub fn status_code(&self) -> StatusCode {
        if self.is_invalid_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// A human readable description of the error.
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal errors are logged here and replaced with a generic message.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::Error;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let response = Error::InvalidAmount("abc".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_errors_map_to_internal_server_error() {
        let response = Error::FlatFileError("disk full".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_row_message_names_row() {
        let error = Error::MalformedRow {
            row: 3,
            reason: "bad date".to_owned(),
        };

        assert_eq!(error.to_string(), "row 3 is malformed: bad date");
    }
}
