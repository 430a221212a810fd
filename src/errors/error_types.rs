/// Enum representing the different types of errors that can occur while running the map viewer.
///
/// ### Error Codes:
/// - **100–199**: Errors in the `data` module (fetching and parsing datasets).
/// - **200–299**: Errors in the `controller` module.
/// - **300–399**: Errors in the `ui` module (tile providers).
/// - **400–499**: Errors in the `config` module.
/// - **500–599**: Errors starting the application.
///
/// Each error is represented by:
/// - `code` (`i32`): The unique error code.
/// - `message` (`String`): A detailed error message.
#[derive(PartialEq, Clone)]
pub enum ErrorTypes {
    /// Represents an error with a specific code and message.
    Error { code: i32, message: String },
}

pub const TRANSPORT_FAILED: i32 = 101;
pub const HTTP_STATUS: i32 = 102;
pub const BODY_READ_FAILED: i32 = 103;
pub const MALFORMED_BODY: i32 = 110;
pub const NOT_A_FEATURE_COLLECTION: i32 = 111;
pub const WORKER_LOST: i32 = 120;
pub const CLIENT_BUILD_FAILED: i32 = 130;

pub const LOAD_ALREADY_STARTED: i32 = 201;

pub const TILE_FETCH_FAILED: i32 = 301;
pub const TILE_STATUS: i32 = 302;
pub const TILE_DECODE_FAILED: i32 = 303;

pub const INVALID_CONFIG: i32 = 401;

pub const APP_START_FAILED: i32 = 501;

impl ErrorTypes {
    /// Creates a new `ErrorTypes::Error` instance.
    ///
    /// # Arguments:
    /// - `code`: The error code associated with this error.
    /// - `message`: A descriptive message explaining the error.
    pub fn new(code: i32, message: String) -> Self {
        ErrorTypes::Error { code, message }
    }

    /// Retrieves the code and message of the error.
    pub fn get(&self) -> (i32, String) {
        match self {
            ErrorTypes::Error { code, message } => (*code, message.clone()),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ErrorTypes::Error { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ErrorTypes::Error { message, .. } => message,
        }
    }
}

impl std::fmt::Debug for ErrorTypes {
    /// Formats the error information for debugging purposes.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTypes::Error { code, message } => {
                write!(f, "An error has occured: {:?}, code: [{:?}]", message, code)
            }
        }
    }
}

impl std::fmt::Display for ErrorTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTypes::Error { code, message } => write!(f, "{} (code {})", message, code),
        }
    }
}

impl std::error::Error for ErrorTypes {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_returns_code_and_message() {
        let error = ErrorTypes::new(HTTP_STATUS, "HTTP 500".to_string());
        assert_eq!(error.get(), (102, "HTTP 500".to_string()));
        assert_eq!(error.message(), "HTTP 500");
    }

    #[test]
    fn test_display_includes_code() {
        let error = ErrorTypes::new(MALFORMED_BODY, "expected value".to_string());
        assert_eq!(error.to_string(), "expected value (code 110)");
    }
}
