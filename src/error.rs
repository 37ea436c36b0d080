//! Error type shared by every session operation.

use thiserror::Error;

/// Errors returned by [`Session`](crate::Session) operations.
///
/// Each variant is a distinct failure kind so callers can match on it
/// directly. Variants wrapping an underlying cause expose it through
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP client or an outgoing request could not be constructed.
    #[error("failed to construct request: {0}")]
    BuildRequest(#[source] reqwest::Error),

    /// The request did not complete (connection failure, timeout, ...).
    #[error("request to 10minutemail failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response arrived but its body could not be read.
    #[error("reading response body failed: {0}")]
    ReadBody(#[source] reqwest::Error),

    /// A request body could not be serialized.
    #[error("encoding request body failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// A response body was not the JSON shape we expected.
    #[error("decoding response body failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The session response carried no session cookie.
    #[error("missing session cookie in response")]
    MissingSession,

    /// The server answered 403; usually rate limiting of this host.
    #[error("server is blocking requests from this host; probably rate limited")]
    BlockedByServer,

    /// The configured base URL is not a valid URL.
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Whether this is the 403 rate-limit condition.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Error::BlockedByServer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_is_classified() {
        assert!(Error::BlockedByServer.is_blocked());
        assert!(!Error::MissingSession.is_blocked());
    }

    #[test]
    fn decode_error_keeps_source() {
        let cause = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = Error::Decode(cause);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("decoding response body failed"));
    }

    #[test]
    fn invalid_url_converts() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
