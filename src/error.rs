//! Error types for the cookie engine.
//!
//! Policy failures are distinct variants so callers can discriminate a
//! malformed header from a supercookie attempt from a scope violation.

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by [`CookieJar`](crate::jar::CookieJar) operations.
#[derive(Error, Debug)]
pub enum CookieError {
    /// The `Set-Cookie` line could not be parsed.
    #[error("failed to parse Set-Cookie header")]
    Parse,

    /// The cookie's domain has no registrable parent; accepting it would
    /// scope the cookie to a public suffix.
    #[error("cookie domain is a public suffix: {0}")]
    PublicSuffix(String),

    /// The cookie's `Domain` attribute does not cover the request host.
    #[error("cookie domain {domain} does not domain-match request host {host}")]
    DomainMismatch { host: String, domain: String },

    /// An `HttpOnly` cookie was set, or would be replaced, from a
    /// non-HTTP context.
    #[error("HttpOnly cookie rejected in non-HTTP context")]
    HttpOnlyRejected,

    /// Propagated verbatim from the backing store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The jar could not be serialized or deserialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// I/O failure while persisting or loading a jar.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for jar operations.
pub type CookieResult<T> = Result<T, CookieError>;
