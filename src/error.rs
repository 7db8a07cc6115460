use reqwest::StatusCode;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while building or sending Deta Base requests.
#[derive(Debug, Error)]
pub enum Error {
    /// The service answered with a non-success status.
    ///
    /// `errors` carries the service's own error messages, unmodified.
    #[error("deta base responded with {status}: {errors:?}")]
    Api {
        /// The HTTP status of the response.
        status: StatusCode,
        /// The `errors` list of the response body, if any.
        errors: Vec<String>,
    },
    /// The request was sent on a client without an open session.
    #[error("client has not been opened yet")]
    ClientClosed,
    /// Two conditions of the same conjunction target the same `field?operator`.
    #[error("conflicting conditions on `{0}` in the same conjunction")]
    ConflictingCondition(String),
    /// The project key cannot be sent as a header value.
    #[error("project key contains characters that are not valid in a header")]
    InvalidProjectKey,
    /// An expiry duration points outside the representable calendar.
    #[error("expiry in {0} is out of range")]
    ExpiryOutOfRange(chrono::Duration),
    /// Transport-level failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// Serialization or deserialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// A field was read from an item that does not hold it.
    #[error("item has no field `{0}`")]
    MissingField(String),
    /// No project key was passed and `DETA_PROJECT_KEY` is not set.
    #[error("no project key provided, pass one to the client or set `DETA_PROJECT_KEY`")]
    MissingProjectKey,
    /// An item did not serialize to a JSON object.
    #[error("items must serialize to a JSON object, got `{0}`")]
    NotAnObject(serde_json::Value),
    /// An update could not be applied to the local copy of an item.
    #[error("cannot apply update to `{path}`: {reason}")]
    Projection {
        /// The dotted attribute path of the update.
        path: String,
        /// What went wrong.
        reason: String,
    },
    /// The Base was not registered on the client.
    #[error("base `{0}` is not registered on this client")]
    UnregisteredBase(String),
    /// The configured host could not be turned into a request URL.
    #[error("invalid url: {0}")]
    Url(String),
}
