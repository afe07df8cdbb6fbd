use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    Network(String),
    /// The server answered outside the 2xx range.
    Status(u16),
    /// The body was not the JSON shape the endpoint promises.
    Decode(String),
    /// A 2xx payload that reports failure, carrying the server's message.
    Rejected(String),
    /// The request body could not be assembled.
    Body(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(detail) => write!(f, "Network error: {detail}"),
            ApiError::Status(code) => write!(f, "HTTP error! status: {code}"),
            ApiError::Decode(detail) => write!(f, "Unexpected response: {detail}"),
            ApiError::Rejected(message) => f.write_str(message),
            ApiError::Body(detail) => write!(f, "Could not read form: {detail}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reads_like_a_fetch_failure() {
        assert_eq!(ApiError::Status(500).to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn rejected_error_is_the_server_message() {
        let err = ApiError::Rejected("Subject and class name required".to_string());
        assert_eq!(err.to_string(), "Subject and class name required");
    }
}
