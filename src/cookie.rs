//! The cookie record and its derived quantities.
//!
//! [`Cookie`] is the semantic form of one `Set-Cookie` line: attribute
//! names are resolved, dates are parsed, and the jar-managed bookkeeping
//! fields (`host_only`, `path_is_default`, `creation`, `last_accessed`)
//! live alongside the wire attributes. Expiry sentinels are real sum
//! types, never magic strings: a session cookie is [`Expiry::Session`],
//! and `Max-Age` keeps its infinities in [`MaxAge`].
//!
//! The JSON form (serde) carries every non-default field under camelCase
//! keys, with instants as RFC 3339 strings and infinities as the literal
//! strings `"Infinity"` / `"-Infinity"`. `creation_index` is process-local
//! and never serialized; decoding mints a fresh one.

use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::canon::{canonical_domain, registrable_parent};
use crate::date::{format_date, parse_date, MAX_DATE};

/// Mints `creation_index` values. Process-wide so that creation-time ties
/// break deterministically across jars.
static COOKIES_CREATED: AtomicU64 = AtomicU64::new(0);

fn next_creation_index() -> u64 {
    COOKIES_CREATED.fetch_add(1, AtomicOrdering::Relaxed) + 1
}

/// The `Expires` attribute: either a concrete instant or the session
/// sentinel (no explicit expiry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// No expiry was given; the cookie lives for the client session.
    #[default]
    Session,
    /// Expires at the given instant.
    At(OffsetDateTime),
}

/// The `Max-Age` attribute. Assigning the infinities through the API is
/// allowed; the parser only ever produces `Seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxAge {
    /// `"Infinity"`: never expires.
    Infinite,
    /// `"-Infinity"`: expired before it was born.
    NegInfinite,
    /// Finite seconds; zero or negative means already expired.
    Seconds(i64),
}

/// An expiry instant extended with both infinities, as computed from
/// `Max-Age` (which wins) or `Expires`.
///
/// Ordered `Past < At(_) < Never`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExpiryTime {
    /// Already expired at every instant.
    Past,
    At(OffsetDateTime),
    /// Never expires.
    Never,
}

/// One cookie, as parsed from `Set-Cookie` and managed by a jar.
///
/// Identity in a store is the `(domain, path, key)` triple. Equality
/// compares every field except `creation_index`, which is a process-local
/// tie-breaker.
#[derive(Debug, Clone)]
pub struct Cookie {
    /// Attribute name; may be empty for a bare-value cookie.
    pub key: String,
    pub value: String,
    pub expires: Expiry,
    /// Takes precedence over `expires` when present.
    pub max_age: Option<MaxAge>,
    /// Canonical domain (lower-case, no leading dot), or `None` before a
    /// jar has bound the cookie to a host.
    pub domain: Option<String>,
    /// Absolute path beginning with `/`; `None` until the jar applies the
    /// default-path rule.
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    /// Unrecognized attributes, verbatim, in order of appearance.
    pub extensions: Vec<String>,
    /// `Some(true)` once a jar accepted the cookie without a `Domain`
    /// attribute; `Some(false)` with one; `None` before acceptance.
    pub host_only: Option<bool>,
    /// Set by the jar when `path` was computed from the request URI.
    pub path_is_default: Option<bool>,
    /// Preserved across updates of the same identity triple.
    pub creation: Option<OffsetDateTime>,
    /// Updated on every successful retrieval.
    pub last_accessed: Option<OffsetDateTime>,
    /// Strictly increasing per construction; breaks `creation` ties in
    /// [`cookie_compare`].
    pub creation_index: u64,
}

impl Default for Cookie {
    fn default() -> Self {
        Self {
            key: String::new(),
            value: String::new(),
            expires: Expiry::Session,
            max_age: None,
            domain: None,
            path: None,
            secure: false,
            http_only: false,
            extensions: Vec::new(),
            host_only: None,
            path_is_default: None,
            creation: Some(OffsetDateTime::now_utc()),
            last_accessed: None,
            creation_index: next_creation_index(),
        }
    }
}

impl PartialEq for Cookie {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.value == other.value
            && self.expires == other.expires
            && self.max_age == other.max_age
            && self.domain == other.domain
            && self.path == other.path
            && self.secure == other.secure
            && self.http_only == other.http_only
            && self.extensions == other.extensions
            && self.host_only == other.host_only
            && self.path_is_default == other.path_is_default
            && self.creation == other.creation
            && self.last_accessed == other.last_accessed
    }
}

impl Eq for Cookie {}

// cookie-octet per RFC 6265 S4.1.1: visible US-ASCII minus DQUOTE,
// comma, semicolon, and backslash.
pub(crate) fn is_cookie_octets(s: &str) -> bool {
    s.bytes()
        .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

fn is_path_value(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, 0x20..=0x3A | 0x3C..=0x7E))
}

impl Cookie {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    /// The `domain` field run through [`canonical_domain`].
    pub fn canonicalized_domain(&self) -> Option<String> {
        self.domain.as_deref().and_then(canonical_domain)
    }

    /// Loose sanity check mirroring RFC 6265 S4.1.1: cookie-octet value,
    /// positive or sentinel `Max-Age`, printable path, and a domain that
    /// is neither a trailing-dot FQDN nor itself a public suffix.
    pub fn validate(&self) -> bool {
        if !is_cookie_octets(&self.value) {
            return false;
        }
        if matches!(self.max_age, Some(MaxAge::Seconds(s)) if s <= 0) {
            return false;
        }
        if let Some(path) = &self.path {
            if !is_path_value(path) {
                return false;
            }
        }
        if let Some(cdomain) = self.canonicalized_domain() {
            if cdomain.ends_with('.') {
                return false;
            }
            if registrable_parent(&cdomain).is_none() {
                return false;
            }
        }
        true
    }

    /// Assign `expires` from an attribute string; unparseable input means
    /// a session cookie.
    pub fn set_expires(&mut self, input: &str) {
        self.expires = match parse_date(input) {
            Some(instant) => Expiry::At(instant),
            None => Expiry::Session,
        };
    }

    /// Time to live relative to `now`. `None` means unbounded; expired
    /// cookies report zero. Without `Max-Age`, a concrete `Expires` in
    /// the past yields a negative duration.
    pub fn ttl(&self, now: OffsetDateTime) -> Option<Duration> {
        match self.max_age {
            Some(MaxAge::Infinite) => None,
            Some(MaxAge::NegInfinite) => Some(Duration::ZERO),
            Some(MaxAge::Seconds(s)) if s <= 0 => Some(Duration::ZERO),
            Some(MaxAge::Seconds(s)) => Some(Duration::seconds(s)),
            None => match self.expires {
                Expiry::Session => None,
                Expiry::At(t) => Some(t - now),
            },
        }
    }

    /// The expiry instant, with `Max-Age` counted from `now`, falling
    /// back to `creation`, then the current time.
    pub fn expiry_time(&self, now: Option<OffsetDateTime>) -> ExpiryTime {
        match self.max_age {
            Some(MaxAge::Infinite) => ExpiryTime::Never,
            Some(MaxAge::NegInfinite) => ExpiryTime::Past,
            Some(MaxAge::Seconds(s)) if s <= 0 => ExpiryTime::Past,
            Some(MaxAge::Seconds(s)) => {
                let base = now
                    .or(self.creation)
                    .unwrap_or_else(OffsetDateTime::now_utc);
                match base.checked_add(Duration::seconds(s)) {
                    Some(t) => ExpiryTime::At(t),
                    None => ExpiryTime::Never,
                }
            }
            None => match self.expires {
                Expiry::Session => ExpiryTime::Never,
                Expiry::At(t) => ExpiryTime::At(t),
            },
        }
    }

    /// [`Self::expiry_time`] collapsed to a concrete instant: unbounded
    /// maps to [`MAX_DATE`], already-expired to the epoch.
    pub fn expiry_date(&self, now: Option<OffsetDateTime>) -> OffsetDateTime {
        match self.expiry_time(now) {
            ExpiryTime::Never => MAX_DATE,
            ExpiryTime::Past => OffsetDateTime::UNIX_EPOCH,
            ExpiryTime::At(t) => t,
        }
    }

    /// Whether the cookie would survive the end of the client session.
    pub fn is_persistent(&self) -> bool {
        self.max_age.is_some() || self.expires != Expiry::Session
    }

    /// The bare `key=value` pair as sent in a `Cookie` request header.
    /// A bare-value cookie renders as just its value.
    pub fn cookie_string(&self) -> String {
        if self.key.is_empty() {
            self.value.clone()
        } else {
            format!("{}={}", self.key, self.value)
        }
    }
}

/// Renders the full `Set-Cookie` form: the pair followed by every
/// non-default attribute.
impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cookie_string())?;
        if let Expiry::At(t) = self.expires {
            write!(f, "; Expires={}", format_date(t))?;
        }
        if let Some(MaxAge::Seconds(s)) = self.max_age {
            write!(f, "; Max-Age={s}")?;
        }
        if let Some(domain) = &self.domain {
            if self.host_only != Some(true) {
                write!(f, "; Domain={domain}")?;
            }
        }
        if let Some(path) = &self.path {
            write!(f, "; Path={path}")?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        if self.http_only {
            write!(f, "; HttpOnly")?;
        }
        for ext in &self.extensions {
            write!(f, "; {ext}")?;
        }
        Ok(())
    }
}

/// The ordering used when emitting a cookie list (RFC 6265 S5.4 step 2):
/// longest path first, then earliest creation, then creation index.
/// A missing `creation` sorts as [`MAX_DATE`].
pub fn cookie_compare(a: &Cookie, b: &Cookie) -> Ordering {
    let a_path = a.path.as_deref().unwrap_or("").len();
    let b_path = b.path.as_deref().unwrap_or("").len();
    b_path
        .cmp(&a_path)
        .then_with(|| {
            let a_time = a.creation.unwrap_or(MAX_DATE);
            let b_time = b.creation.unwrap_or(MAX_DATE);
            a_time.cmp(&b_time)
        })
        .then_with(|| a.creation_index.cmp(&b.creation_index))
}

// JSON shadow of Cookie. Field presence encodes "differs from default".
#[derive(Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct CookieJson {
    #[serde(skip_serializing_if = "String::is_empty")]
    key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_age: Option<MaxAgeJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    secure: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    http_only: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path_is_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_accessed: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MaxAgeJson {
    Num(i64),
    Str(String),
}

fn instant_to_json(t: OffsetDateTime) -> Option<String> {
    t.format(&Rfc3339).ok()
}

fn instant_from_json(s: &str) -> Result<Option<OffsetDateTime>, String> {
    if s == "Infinity" {
        return Ok(None);
    }
    OffsetDateTime::parse(s, &Rfc3339)
        .map(Some)
        .map_err(|e| format!("bad date {s:?}: {e}"))
}

impl From<&Cookie> for CookieJson {
    fn from(c: &Cookie) -> Self {
        CookieJson {
            key: c.key.clone(),
            value: c.value.clone(),
            expires: match c.expires {
                Expiry::Session => None,
                Expiry::At(t) => instant_to_json(t),
            },
            max_age: c.max_age.map(|ma| match ma {
                MaxAge::Infinite => MaxAgeJson::Str("Infinity".into()),
                MaxAge::NegInfinite => MaxAgeJson::Str("-Infinity".into()),
                MaxAge::Seconds(s) => MaxAgeJson::Num(s),
            }),
            domain: c.domain.clone(),
            path: c.path.clone(),
            secure: c.secure,
            http_only: c.http_only,
            extensions: c.extensions.clone(),
            host_only: c.host_only,
            path_is_default: c.path_is_default,
            creation: c.creation.and_then(instant_to_json),
            last_accessed: c.last_accessed.and_then(instant_to_json),
        }
    }
}

impl TryFrom<CookieJson> for Cookie {
    type Error = String;

    fn try_from(j: CookieJson) -> Result<Self, Self::Error> {
        let expires = match j.expires.as_deref() {
            None | Some("Infinity") => Expiry::Session,
            Some(s) => match instant_from_json(s)? {
                Some(t) => Expiry::At(t),
                None => Expiry::Session,
            },
        };
        let max_age = match j.max_age {
            None => None,
            Some(MaxAgeJson::Num(s)) => Some(MaxAge::Seconds(s)),
            Some(MaxAgeJson::Str(s)) => match s.as_str() {
                "Infinity" => Some(MaxAge::Infinite),
                "-Infinity" => Some(MaxAge::NegInfinite),
                other => return Err(format!("bad maxAge {other:?}")),
            },
        };
        let creation = match j.creation.as_deref() {
            None => None,
            Some(s) => instant_from_json(s)?,
        };
        let last_accessed = match j.last_accessed.as_deref() {
            None => None,
            Some(s) => instant_from_json(s)?,
        };
        Ok(Cookie {
            key: j.key,
            value: j.value,
            expires,
            max_age,
            domain: j.domain,
            path: j.path,
            secure: j.secure,
            http_only: j.http_only,
            extensions: j.extensions,
            host_only: j.host_only,
            path_is_default: j.path_is_default,
            creation,
            last_accessed,
            creation_index: next_creation_index(),
        })
    }
}

impl Serialize for Cookie {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CookieJson::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cookie {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = CookieJson::deserialize(deserializer)?;
        Cookie::try_from(json).map_err(serde::de::Error::custom)
    }
}
