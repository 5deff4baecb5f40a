//! Jar persistence - save and load cookies to/from disk.
//!
//! Two formats: the jar's own JSON snapshot (lossless, see
//! [`CookieJar::serialize`]), and the Netscape `cookies.txt` format
//! understood by curl and wget (lossy: it has no HttpOnly column and
//! keeps only whole-second expiry).

use std::fs;
use std::path::Path;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::cookie::{Cookie, Expiry};
use crate::error::{CookieError, CookieResult};
use crate::jar::CookieJar;
use crate::store::CookieStore;

/// Write the jar's JSON snapshot to `path`.
pub fn save_jar(jar: &CookieJar, path: &Path) -> CookieResult<()> {
    let serialized = jar.serialize()?;
    let json = serde_json::to_string_pretty(&serialized)
        .map_err(|e| CookieError::Serialization(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a jar snapshot from `path` into `store` (a fresh in-memory store
/// when `None`).
pub fn load_jar(path: &Path, store: Option<Arc<dyn CookieStore>>) -> CookieResult<CookieJar> {
    let json = fs::read_to_string(path)?;
    CookieJar::deserialize_json(&json, store)
}

/// Export the jar's cookies to Netscape cookie format.
///
/// Each line has the form
/// `domain\tinclude_subdomains\tpath\tsecure\texpiry\tname\tvalue`;
/// session cookies carry expiry `0`.
pub fn export_netscape(jar: &CookieJar, domain_filter: Option<&str>) -> CookieResult<String> {
    let mut lines = vec![
        "# Netscape HTTP Cookie File".to_string(),
        "# https://curl.se/docs/http-cookies.html".to_string(),
        String::new(),
    ];

    for cookie in jar.store().get_all()? {
        let Some(domain) = cookie.domain.as_deref() else {
            continue;
        };
        if let Some(filter) = domain_filter {
            if !domain.contains(filter) && !filter.contains(domain) {
                continue;
            }
        }

        let host_only = cookie.host_only == Some(true);
        let include_subdomains = if host_only { "FALSE" } else { "TRUE" };
        let secure = if cookie.secure { "TRUE" } else { "FALSE" };
        let expiry = if cookie.is_persistent() {
            cookie.expiry_date(None).unix_timestamp()
        } else {
            0
        };

        // non-host-only domains carry the historical leading dot
        let domain = if host_only {
            domain.to_string()
        } else {
            format!(".{domain}")
        };

        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            domain,
            include_subdomains,
            cookie.path.as_deref().unwrap_or("/"),
            secure,
            expiry,
            cookie.key,
            cookie.value,
        ));
    }

    Ok(lines.join("\n"))
}

/// Import Netscape-format cookies into the jar's store, bypassing set
/// policy exactly as deserialization does. Returns the number imported.
pub fn import_netscape(jar: &CookieJar, content: &str) -> CookieResult<usize> {
    let mut count = 0;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 7 {
            continue;
        }

        let host_only = parts[1].eq_ignore_ascii_case("FALSE");
        let secure = parts[3].eq_ignore_ascii_case("TRUE");
        let expiry: i64 = parts[4].parse().unwrap_or(0);
        let expires = if expiry > 0 {
            OffsetDateTime::from_unix_timestamp(expiry)
                .map(Expiry::At)
                .unwrap_or(Expiry::Session)
        } else {
            Expiry::Session
        };

        let cookie = Cookie {
            domain: Some(parts[0].trim_start_matches('.').to_string()),
            path: Some(parts[2].to_string()),
            secure,
            expires,
            host_only: Some(host_only),
            ..Cookie::new(parts[5], parts[6])
        };

        jar.store().put(cookie)?;
        count += 1;
    }

    Ok(count)
}
