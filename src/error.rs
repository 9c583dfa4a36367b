use std::fmt;

use reqwest::StatusCode;

/// Broad error category, stable enough to match on for recovery flow.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// Invalid input or configuration.
    Validation,
    /// Transport-level failure before a response was obtained.
    Transport,
    /// Non-2xx HTTP response.
    Status,
    /// 2xx response whose envelope carried a non-zero exchange code.
    Api,
    /// Response body that could not be decoded.
    Decode,
}

/// Error type for all fallible operations in this crate.
#[derive(Debug)]
pub struct Error {
    kind: Kind,
    message: String,
    status: Option<StatusCode>,
    body: Option<String>,
    code: Option<i64>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub(crate) fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
            code: None,
            source: None,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(Kind::Validation, message)
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::new(Kind::Decode, message)
    }

    pub(crate) fn status(status: StatusCode, body: String) -> Self {
        let mut error = Self::new(Kind::Status, format!("http status {status}"));
        error.status = Some(status);
        error.body = Some(body);
        error
    }

    pub(crate) fn api(code: i64, message: String) -> Self {
        let mut error = Self::new(Kind::Api, format!("exchange error {code}: {message}"));
        error.code = Some(code);
        error
    }

    /// Which broad category this error falls into.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// HTTP status, when the server responded with a non-2xx code.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.status
    }

    /// Raw response body retained from a non-2xx response.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Exchange-level error code from the response envelope.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        self.code
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        let mut error = Self::new(Kind::Transport, format!("transport failure: {source}"));
        error.source = Some(Box::new(source));
        error
    }
}

impl From<url::ParseError> for Error {
    fn from(source: url::ParseError) -> Self {
        let mut error = Self::new(Kind::Validation, format!("invalid url: {source}"));
        error.source = Some(Box::new(source));
        error
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        let mut error = Self::new(Kind::Decode, format!("malformed response: {source}"));
        error.source = Some(Box::new(source));
        error
    }
}
