//! The storage seam between the jar's policy engine and its backing
//! store.
//!
//! A store is a keyed bag of cookies indexed by the `(domain, path, key)`
//! identity triple. The jar performs all RFC 6265 filtering itself;
//! [`CookieStore::find_cookies`] only has to return a superset of the
//! matching cookies, cheaply. Optional capabilities have default
//! implementations: `update` falls back to `put`, and a store that cannot
//! enumerate simply makes jar serialization fail cleanly.

use std::fmt;

use thiserror::Error;

use crate::cookie::Cookie;

/// Errors raised by a cookie store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store cannot enumerate its contents; jar serialization is
    /// unavailable on top of it.
    #[error("store does not support enumeration")]
    EnumerationUnsupported,

    /// A cookie without its full `(domain, path, key)` identity reached
    /// the store. The jar always completes the identity before `put`.
    #[error("cookie is missing its (domain, path, key) identity")]
    MissingIdentity,

    /// Backend-specific failure (disk, database, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Backing storage for a [`CookieJar`](crate::jar::CookieJar).
///
/// Implementations use interior mutability; every method takes `&self` so
/// a store can be shared behind an `Arc`.
pub trait CookieStore: Send + Sync + fmt::Debug {
    /// Look up one cookie by its identity triple.
    fn find(&self, domain: &str, path: &str, key: &str) -> Result<Option<Cookie>, StoreError>;

    /// Retrieve candidate cookies for a request host.
    ///
    /// Must include every cookie stored under any domain in
    /// [`permute_domain`](crate::canon::permute_domain)`(domain)` and,
    /// when `path` is given, at least every such cookie whose stored path
    /// path-matches it. Returning more is fine; the jar re-filters.
    fn find_cookies(&self, domain: &str, path: Option<&str>) -> Result<Vec<Cookie>, StoreError>;

    /// Insert a cookie. Overwriting an existing identity is a caller
    /// error; the jar routes replacements through [`Self::update`].
    fn put(&self, cookie: Cookie) -> Result<(), StoreError>;

    /// Replace `old` with `new` (identical identity). The default
    /// delegates to `put`; the engine never relies on atomic replace.
    fn update(&self, old: &Cookie, new: Cookie) -> Result<(), StoreError> {
        let _ = old;
        self.put(new)
    }

    /// Delete the cookie with the given identity, if present.
    fn remove(&self, domain: &str, path: &str, key: &str) -> Result<(), StoreError>;

    /// Drop every cookie.
    fn remove_all(&self) -> Result<(), StoreError>;

    /// Enumerate every stored cookie, for jar serialization.
    fn get_all(&self) -> Result<Vec<Cookie>, StoreError> {
        Err(StoreError::EnumerationUnsupported)
    }

    /// Informational name recorded in serialized jars.
    fn store_kind(&self) -> &'static str {
        "CookieStore"
    }
}
