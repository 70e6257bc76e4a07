use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoletimError>;

/// Every way a boletim request can fail. One variant per [`ErrorKind`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoletimError {
    #[error("The 'studentName' field was not supplied")]
    StudentNameMissing,

    #[error("The 'motherName' field was not supplied")]
    MotherNameMissing,

    #[error("The 'year' field was not supplied")]
    YearMissing,

    #[error("The 'year' field doesn't match the format YYYY")]
    YearInvalidFormat,

    #[error("The 'year' field is not in the range {min} <= n <= {max}")]
    YearOutOfRange { min: i32, max: i32 },

    #[error("The 'birthDate' field was not supplied")]
    BirthDateMissing,

    #[error("The 'birthDate' field doesn't match the format dd/mm/YYYY")]
    BirthDateInvalidFormat,

    #[error("The user doesn't exist")]
    UserNotFound,

    #[error("No redirection URL found")]
    NoRedirectUrlFound,

    #[error("Cookie parse error: {0}")]
    CookieParse(String),

    #[error("Boletim URL fetch failed: {0}")]
    BoletimUrlFetch(String),

    #[error("Malformed table data")]
    MalformedTable,

    #[error("{0}")]
    Unknown(String),
}

/// Stable, machine-readable error code sent to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    StudentNameMissing,
    MotherNameMissing,
    YearMissing,
    YearInvalidFormat,
    YearOutOfRange,
    BirthDateMissing,
    BirthDateInvalidFormat,
    UserNotFound,
    NoRedirectUrlFound,
    CookieParseError,
    BoletimUrlFetchError,
    MalformedTable,
    Unknown,
}

impl BoletimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoletimError::StudentNameMissing => ErrorKind::StudentNameMissing,
            BoletimError::MotherNameMissing => ErrorKind::MotherNameMissing,
            BoletimError::YearMissing => ErrorKind::YearMissing,
            BoletimError::YearInvalidFormat => ErrorKind::YearInvalidFormat,
            BoletimError::YearOutOfRange { .. } => ErrorKind::YearOutOfRange,
            BoletimError::BirthDateMissing => ErrorKind::BirthDateMissing,
            BoletimError::BirthDateInvalidFormat => ErrorKind::BirthDateInvalidFormat,
            BoletimError::UserNotFound => ErrorKind::UserNotFound,
            BoletimError::NoRedirectUrlFound => ErrorKind::NoRedirectUrlFound,
            BoletimError::CookieParse(_) => ErrorKind::CookieParseError,
            BoletimError::BoletimUrlFetch(_) => ErrorKind::BoletimUrlFetchError,
            BoletimError::MalformedTable => ErrorKind::MalformedTable,
            BoletimError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// True for the errors raised before any network call is made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BoletimError::StudentNameMissing
                | BoletimError::MotherNameMissing
                | BoletimError::YearMissing
                | BoletimError::YearInvalidFormat
                | BoletimError::YearOutOfRange { .. }
                | BoletimError::BirthDateMissing
                | BoletimError::BirthDateInvalidFormat
        )
    }
}

/// Wire shape of an error inside the API envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: ErrorKind,
    pub message: String,
}

impl From<&BoletimError> for ErrorBody {
    fn from(err: &BoletimError) -> Self {
        Self {
            code: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_screaming_snake_case() {
        let body = ErrorBody::from(&BoletimError::CookieParse("bad".into()));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "COOKIE_PARSE_ERROR");
        assert_eq!(json["message"], "Cookie parse error: bad");
    }

    #[test]
    fn unknown_carries_underlying_message() {
        let err = BoletimError::Unknown("connection reset".into());
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn only_input_errors_are_validation() {
        assert!(BoletimError::YearOutOfRange { min: 2020, max: 2025 }.is_validation());
        assert!(!BoletimError::UserNotFound.is_validation());
        assert!(!BoletimError::MalformedTable.is_validation());
    }
}
