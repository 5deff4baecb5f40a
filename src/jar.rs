//! The cookie jar: RFC 6265's storage model (S5.3) and retrieval
//! algorithm (S5.4) on top of a pluggable [`CookieStore`].
//!
//! The jar owns policy; the store only indexes. `set_cookie` binds a
//! parsed cookie to its request context (host-only, default-path),
//! enforces the public-suffix and HttpOnly rules, and preserves creation
//! bookkeeping across replacements. `get_cookies` filters candidates by
//! host, path, security context, and expiry, evicting expired cookies as
//! it goes, and orders the survivors longest-path-first.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::canon::{canonical_domain, default_path, domain_match, path_match, registrable_parent};
use crate::cookie::{cookie_compare, Cookie, ExpiryTime};
use crate::error::{CookieError, CookieResult};
use crate::memory::MemoryCookieStore;
use crate::parse::parse_set_cookie;
use crate::store::{CookieStore, StoreError};

/// Jar-wide policy switches.
#[derive(Debug, Clone, Copy)]
pub struct JarConfig {
    /// Refuse cookies whose domain is itself a public suffix.
    pub reject_public_suffixes: bool,
    /// Parse `Set-Cookie` lines in loose mode unless a call overrides it.
    pub loose_mode: bool,
}

impl Default for JarConfig {
    fn default() -> Self {
        Self {
            reject_public_suffixes: true,
            loose_mode: false,
        }
    }
}

/// Options for [`CookieJar::set_cookie`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SetCookieOptions {
    /// `Some(false)` marks a non-HTTP context (e.g. script access);
    /// `HttpOnly` cookies are then refused. Defaults to HTTP.
    pub http: Option<bool>,
    /// Override the jar's loose-mode setting for this call.
    pub loose: Option<bool>,
    /// Swallow policy failures: the call returns `Ok(None)` instead of
    /// an error. Store failures still propagate.
    pub ignore_error: bool,
    /// The current time; defaults to the wall clock.
    pub now: Option<OffsetDateTime>,
}

/// Options for [`CookieJar::get_cookies`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GetCookieOptions {
    /// Non-HTTP callers (`Some(false)`) do not see `HttpOnly` cookies.
    pub http: Option<bool>,
    /// Override the secure-channel deduction from the URL scheme.
    pub secure: Option<bool>,
    /// The current time; defaults to the wall clock.
    pub now: Option<OffsetDateTime>,
    /// `Some(false)` disables expiry eviction during retrieval.
    pub expire: Option<bool>,
    /// Ignore the path filter and return cookies for every path.
    pub all_paths: bool,
    /// `Some(false)` returns cookies in store order instead of
    /// [`cookie_compare`] order.
    pub sort: Option<bool>,
}

/// Serialized form of a jar: configuration plus one JSON record per
/// cookie. `creationIndex` is never included; import mints fresh values
/// in insertion order.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedJar {
    pub store_type: Option<String>,
    pub reject_public_suffixes: bool,
    pub cookies: Vec<serde_json::Value>,
}

/// A cookie jar with RFC 6265 set/get policy.
#[derive(Debug)]
pub struct CookieJar {
    store: Arc<dyn CookieStore>,
    reject_public_suffixes: bool,
    loose: bool,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// A jar over a fresh [`MemoryCookieStore`] with default policy.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryCookieStore::new()))
    }

    pub fn with_store(store: Arc<dyn CookieStore>) -> Self {
        Self::with_config(store, JarConfig::default())
    }

    pub fn with_config(store: Arc<dyn CookieStore>, config: JarConfig) -> Self {
        Self {
            store,
            reject_public_suffixes: config.reject_public_suffixes,
            loose: config.loose_mode,
        }
    }

    /// The backing store. Useful for direct imports that bypass policy,
    /// such as deserialization.
    pub fn store(&self) -> &Arc<dyn CookieStore> {
        &self.store
    }

    fn policy_fail(
        &self,
        err: CookieError,
        options: &SetCookieOptions,
    ) -> CookieResult<Option<Cookie>> {
        if options.ignore_error {
            Ok(None)
        } else {
            Err(err)
        }
    }

    /// Parse a `Set-Cookie` line and store it against `url`.
    ///
    /// Returns the cookie as stored, or `Ok(None)` when `ignore_error`
    /// swallowed a policy failure.
    pub fn set_cookie(
        &self,
        header: &str,
        url: &Url,
        options: &SetCookieOptions,
    ) -> CookieResult<Option<Cookie>> {
        let loose = options.loose.unwrap_or(self.loose);
        match parse_set_cookie(header, loose) {
            Some(cookie) => self.set(cookie, url, options),
            None => {
                tracing::debug!(header = %header, "unparseable Set-Cookie line");
                self.policy_fail(CookieError::Parse, options)
            }
        }
    }

    /// Store an already-parsed cookie against `url`, applying the
    /// storage model of RFC 6265 S5.3.
    pub fn set(
        &self,
        mut cookie: Cookie,
        url: &Url,
        options: &SetCookieOptions,
    ) -> CookieResult<Option<Cookie>> {
        let host = url.host_str().and_then(canonical_domain);
        let Some(host) = host else {
            return self.policy_fail(
                CookieError::DomainMismatch {
                    host: String::new(),
                    domain: cookie.domain.clone().unwrap_or_default(),
                },
                options,
            );
        };
        let http = options.http.unwrap_or(true);
        let now = options.now.unwrap_or_else(OffsetDateTime::now_utc);

        // S5.3 step 5: no cookie may scope itself to a public suffix.
        if self.reject_public_suffixes {
            if let Some(domain) = cookie.domain.clone() {
                let no_parent = canonical_domain(&domain)
                    .map_or(true, |d| registrable_parent(&d).is_none());
                if no_parent {
                    tracing::debug!(domain = %domain, "rejecting cookie: domain is a public suffix");
                    return self.policy_fail(CookieError::PublicSuffix(domain), options);
                }
            }
        }

        // S5.3 step 6: bind the cookie to a domain, or to the host alone.
        if let Some(domain) = cookie.domain.clone() {
            let matched = cookie
                .canonicalized_domain()
                .filter(|cdomain| domain_match(&host, cdomain));
            let Some(cdomain) = matched else {
                tracing::debug!(host = %host, domain = %domain, "rejecting cookie: domain mismatch");
                return self.policy_fail(CookieError::DomainMismatch { host, domain }, options);
            };
            cookie.domain = Some(cdomain);
            if cookie.host_only.is_none() {
                cookie.host_only = Some(false);
            }
        } else {
            cookie.host_only = Some(true);
            cookie.domain = Some(host.clone());
        }

        // S5.3 step 7: default-path when the attribute was absent/bad.
        if !cookie.path.as_deref().is_some_and(|p| p.starts_with('/')) {
            cookie.path = Some(default_path(url.path()).to_string());
            cookie.path_is_default = Some(true);
        }

        // S5.3 step 10: non-HTTP contexts may not create HttpOnly cookies.
        if !http && cookie.http_only {
            tracing::debug!(key = %cookie.key, "rejecting HttpOnly cookie from non-HTTP context");
            return self.policy_fail(CookieError::HttpOnlyRejected, options);
        }

        let Some(domain) = cookie.domain.clone() else {
            return Err(StoreError::MissingIdentity.into());
        };
        let Some(path) = cookie.path.clone() else {
            return Err(StoreError::MissingIdentity.into());
        };

        match self.store.find(&domain, &path, &cookie.key)? {
            Some(old) => {
                // S5.3 step 11.2: nor may they replace one.
                if !http && old.http_only {
                    tracing::debug!(key = %cookie.key, "refusing to replace HttpOnly cookie from non-HTTP context");
                    return self.policy_fail(CookieError::HttpOnlyRejected, options);
                }
                cookie.creation = old.creation;
                cookie.creation_index = old.creation_index;
                cookie.last_accessed = Some(now);
                self.store.update(&old, cookie.clone())?;
            }
            None => {
                cookie.creation = Some(now);
                cookie.last_accessed = Some(now);
                self.store.put(cookie.clone())?;
            }
        }
        Ok(Some(cookie))
    }

    /// Retrieve the cookies that should accompany a request to `url`,
    /// per RFC 6265 S5.4: scope-filtered, expiry-evicted, and ordered
    /// longest-path-first.
    pub fn get_cookies(&self, url: &Url, options: &GetCookieOptions) -> CookieResult<Vec<Cookie>> {
        let Some(host) = url.host_str().and_then(canonical_domain) else {
            return Ok(Vec::new());
        };
        let req_path = match url.path() {
            "" => "/",
            p => p,
        };
        let http = options.http.unwrap_or(true);
        let secure = options
            .secure
            .unwrap_or_else(|| matches!(url.scheme(), "https" | "wss"));
        let expire = options.expire.unwrap_or(true);
        let now = options.now.unwrap_or_else(OffsetDateTime::now_utc);

        let path_filter = if options.all_paths {
            None
        } else {
            Some(req_path)
        };
        let candidates = self.store.find_cookies(&host, path_filter)?;

        let mut results = Vec::new();
        for cookie in candidates {
            let host_ok = if cookie.host_only == Some(true) {
                cookie.domain.as_deref() == Some(host.as_str())
            } else {
                cookie
                    .domain
                    .as_deref()
                    .is_some_and(|d| domain_match(&host, d))
            };
            if !host_ok {
                continue;
            }
            if !options.all_paths
                && !cookie.path.as_deref().is_some_and(|p| path_match(req_path, p))
            {
                continue;
            }
            if cookie.secure && !secure {
                continue;
            }
            if cookie.http_only && !http {
                continue;
            }
            if expire && cookie.expiry_time(None) <= ExpiryTime::At(now) {
                // Eviction failures must not block the request.
                if let (Some(d), Some(p)) = (cookie.domain.as_deref(), cookie.path.as_deref()) {
                    let _ = self.store.remove(d, p, &cookie.key);
                }
                continue;
            }
            results.push(cookie);
        }

        if options.sort.unwrap_or(true) {
            results.sort_by(cookie_compare);
        }

        for cookie in &mut results {
            let untouched = cookie.clone();
            cookie.last_accessed = Some(now);
            let _ = self.store.update(&untouched, cookie.clone());
        }
        Ok(results)
    }

    /// The `Cookie:` request header value for `url`.
    pub fn get_cookie_string(&self, url: &Url, options: &GetCookieOptions) -> CookieResult<String> {
        let cookies = self.get_cookies(url, options)?;
        Ok(cookies
            .iter()
            .map(Cookie::cookie_string)
            .collect::<Vec<_>>()
            .join("; "))
    }

    /// Each matching cookie rendered in its full `Set-Cookie` form.
    pub fn get_set_cookie_strings(
        &self,
        url: &Url,
        options: &GetCookieOptions,
    ) -> CookieResult<Vec<String>> {
        let cookies = self.get_cookies(url, options)?;
        Ok(cookies.iter().map(Cookie::to_string).collect())
    }

    /// Drop every cookie in the jar.
    pub fn remove_all_cookies(&self) -> CookieResult<()> {
        self.store.remove_all()?;
        Ok(())
    }

    /// Snapshot the jar: configuration plus every stored cookie as a JSON
    /// record, in insertion order.
    pub fn serialize(&self) -> CookieResult<SerializedJar> {
        let mut cookies = self.store.get_all().map_err(|e| match e {
            StoreError::EnumerationUnsupported => {
                CookieError::Serialization("store does not support enumeration".into())
            }
            other => CookieError::Store(other),
        })?;
        cookies.sort_by_key(|c| c.creation_index);

        let records = cookies
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CookieError::Serialization(e.to_string()))?;

        Ok(SerializedJar {
            store_type: Some(self.store.store_kind().to_string()),
            reject_public_suffixes: self.reject_public_suffixes,
            cookies: records,
        })
    }

    /// Rebuild a jar from [`Self::serialize`] output. Records that fail
    /// to decode are skipped; the rest enter `store` directly, with
    /// fresh creation indices in insertion order.
    pub fn deserialize(
        serialized: SerializedJar,
        store: Option<Arc<dyn CookieStore>>,
    ) -> CookieResult<CookieJar> {
        let store: Arc<dyn CookieStore> =
            store.unwrap_or_else(|| Arc::new(MemoryCookieStore::new()));
        let jar = CookieJar::with_config(
            store,
            JarConfig {
                reject_public_suffixes: serialized.reject_public_suffixes,
                loose_mode: false,
            },
        );
        for record in serialized.cookies {
            let Ok(cookie) = serde_json::from_value::<Cookie>(record) else {
                continue;
            };
            jar.store.put(cookie)?;
        }
        Ok(jar)
    }

    /// [`Self::deserialize`] from a JSON string.
    pub fn deserialize_json(
        json: &str,
        store: Option<Arc<dyn CookieStore>>,
    ) -> CookieResult<CookieJar> {
        let serialized: SerializedJar =
            serde_json::from_str(json).map_err(|e| CookieError::Serialization(e.to_string()))?;
        Self::deserialize(serialized, store)
    }

    /// Copy this jar into a fresh [`MemoryCookieStore`].
    pub fn clone_jar(&self) -> CookieResult<CookieJar> {
        Self::deserialize(self.serialize()?, None)
    }

    /// Copy this jar into the given store.
    pub fn clone_into(&self, store: Arc<dyn CookieStore>) -> CookieResult<CookieJar> {
        Self::deserialize(self.serialize()?, Some(store))
    }
}
