//! Error types for the myenergi client.

use thiserror::Error;

/// Primary error type for all myenergi API operations.
///
/// The stable taxonomy callers should branch on is `WrongCredentials`,
/// `Timeout` and `Api`; the remaining variants carry transport and decode
/// failures that are not part of the server contract.
#[derive(Error, Debug)]
pub enum MyenergiError {
    /// The API rejected the credentials: HTTP 401 on either path, or a
    /// hub-path response missing the authoritative-host header (the server
    /// omits it only when Digest credentials are bad).
    #[error("myenergi rejected the credentials")]
    WrongCredentials,

    /// Transport-level timeout, chained from the underlying cause.
    #[error("request to the myenergi API timed out")]
    Timeout {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any non-2xx status other than 401, carrying the status code.
    #[error("myenergi API error (status {status})")]
    Api { status: u16 },

    /// A dispatch path was used without its credential set.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The identity provider could not produce a usable session.
    #[error("identity provider error: {0}")]
    Identity(String),

    /// Non-timeout failure inside the HTTP client.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-timeout failure inside the Digest transport layer.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A 200 body that was not the JSON it claimed to be.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MyenergiError {
    /// Classify a plain HTTP-client failure: timeouts anywhere in the
    /// source chain become `Timeout`, everything else stays `Network`.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if chain_has_timeout(&err) {
            Self::Timeout {
                source: Box::new(err),
            }
        } else {
            Self::Network(err)
        }
    }

    /// Classify a Digest-transport failure. The Digest layer's error type
    /// does not expose a source chain, so the wrapped HTTP-client error has
    /// to be pulled out by destructuring before the timeout check.
    pub(crate) fn from_digest(err: diqwest::error::Error) -> Self {
        match err {
            diqwest::error::Error::Reqwest(inner) => Self::from_reqwest(inner),
            other => Self::Transport(Box::new(other)),
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this error is a transport timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Walk the source chain looking for a timeout.
///
/// `reqwest::Error::is_timeout` only inspects its immediate cause, so a
/// timeout buried under a decode-phase wrapper (stalled 200 body) needs the
/// whole chain checked, at every reqwest node and at raw I/O errors.
fn chain_has_timeout(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        if e.downcast_ref::<reqwest::Error>()
            .is_some_and(|re| re.is_timeout())
        {
            return true;
        }
        if e.downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut)
        {
            return true;
        }
        current = e.source();
    }
    false
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, MyenergiError>;
