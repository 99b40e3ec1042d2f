use reqwest::StatusCode;
use thiserror::Error;

use crate::protocol::RemoteExceptionResponse;

/// Enum for client errors
#[derive(Debug, Error)]
pub enum Error {
    /// Connection-level fault, unreadable response body, or no host in the
    /// candidate list produced an HTTP response at all
    #[error("network error: {0}")]
    Network(String),
    /// HTTP 400
    #[error("bad request: {0}")]
    BadRequest(String),
    /// HTTP 401
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// HTTP 403 without a more specific remote exception
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// HTTP 404
    #[error("not found: {0}")]
    NotFound(String),
    /// The remote reported `FileAlreadyExistsException`
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// The answering namenode is in standby state. Not retried against
    /// another host: the standby has definitively answered, so callers
    /// wanting standby-to-active retry must reissue themselves
    #[error("namenode is in standby state")]
    Standby,
    /// HTTP 500 without a more specific remote exception
    #[error("server error: {0}")]
    ServerError(String),
    /// Any other HTTP status >= 400
    #[error("HTTP code: {code}\n Message: {message}")]
    Remote { code: u16, message: String },
    /// Malformed request construction. A configuration error, never retried
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

/// Maps an HTTP error status plus the raw response body to an [`Error`].
///
/// The body is decoded as a `RemoteException` payload on a best-effort basis:
/// a decodable payload refines 403 into [`Error::Standby`]/[`Error::AlreadyExists`]
/// and 500 into [`Error::AlreadyExists`], anything else falls back to the
/// status-only mapping. A decode failure is never itself an error.
pub(crate) fn classify_error(status: StatusCode, body: &str) -> Error {
    let remote = serde_json::from_str::<RemoteExceptionResponse>(body)
        .ok()
        .map(|r| r.remote_exception);

    let message = remote
        .as_ref()
        .and_then(|r| serde_json::to_string(r).ok())
        .unwrap_or_else(|| body.to_owned());

    let exception = remote.as_ref().map(|r| r.exception.as_str());

    match status.as_u16() {
        400 => Error::BadRequest(message),
        401 => Error::Unauthorized(message),
        403 => match exception {
            Some("StandbyException") => Error::Standby,
            Some("FileAlreadyExistsException") => Error::AlreadyExists(message),
            _ => Error::Forbidden(message),
        },
        500 => match exception {
            Some("FileAlreadyExistsException") => Error::AlreadyExists(message),
            _ => Error::ServerError(message),
        },
        404 => Error::NotFound(message),
        code => Error::Remote {
            code,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(code: u16, body: &str) -> Error {
        classify_error(StatusCode::from_u16(code).unwrap(), body)
    }

    const STANDBY: &str = r#"{"RemoteException": {"exception": "StandbyException"}}"#;
    const EXISTS: &str = r#"{"RemoteException": {"exception": "FileAlreadyExistsException"}}"#;
    const OTHER: &str = r#"{"RemoteException": {"exception": "OtherException"}}"#;

    #[test]
    fn status_only_mapping() {
        assert!(matches!(classify(400, "{}"), Error::BadRequest(_)));
        assert!(matches!(classify(401, "{}"), Error::Unauthorized(_)));
        assert!(matches!(classify(403, "{}"), Error::Forbidden(_)));
        assert!(matches!(classify(404, "{}"), Error::NotFound(_)));
        assert!(matches!(classify(500, "{}"), Error::ServerError(_)));
        assert!(matches!(classify(501, "{}"), Error::Remote { code: 501, .. }));
        assert!(matches!(classify(502, ""), Error::Remote { code: 502, .. }));
    }

    #[test]
    fn unparseable_body_falls_back_to_status() {
        assert!(matches!(classify(403, "not a json"), Error::Forbidden(_)));
        assert!(matches!(classify(500, "not a json"), Error::ServerError(_)));
    }

    #[test]
    fn remote_exception_refines_403() {
        assert!(matches!(classify(403, STANDBY), Error::Standby));
        assert!(matches!(classify(403, EXISTS), Error::AlreadyExists(_)));
        assert!(matches!(classify(403, OTHER), Error::Forbidden(_)));
    }

    #[test]
    fn remote_exception_refines_500() {
        assert!(matches!(classify(500, EXISTS), Error::AlreadyExists(_)));
        assert!(matches!(classify(500, OTHER), Error::ServerError(_)));
    }

    #[test]
    fn standby_only_applies_to_403() {
        assert!(matches!(classify(500, STANDBY), Error::ServerError(_)));
    }

    #[test]
    fn message_carries_serialized_remote_exception() {
        let body = r#"{"RemoteException": {"exception": "OtherException", "message": "boom"}}"#;
        match classify(403, body) {
            Error::Forbidden(message) => {
                assert!(message.contains("OtherException"));
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn message_falls_back_to_raw_body() {
        match classify(404, "plain text") {
            Error::NotFound(message) => assert_eq!(message, "plain text"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
