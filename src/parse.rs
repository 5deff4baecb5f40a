//! `Set-Cookie` header parsing.
//!
//! Deliberately permissive, per RFC 6265 S5.2: unknown attributes are
//! preserved as extensions, broken `Expires`/`Max-Age`/`Domain` values are
//! dropped rather than fatal, and the only hard rejections are a missing
//! `=` in the name-value pair (strict mode) and control characters in the
//! name or value.
//!
//! Loose mode additionally accepts the `=value` and bare-`value` forms
//! some non-compliant servers emit, yielding an empty key.

use crate::cookie::{Cookie, Expiry, MaxAge};
use crate::date::parse_date;

fn has_control_chars(s: &str) -> bool {
    s.chars().any(|c| ('\u{0000}'..='\u{001f}').contains(&c))
}

// The name=value pair ahead of the first ';'.
fn parse_cookie_pair(pair: &str, loose: bool) -> Option<Cookie> {
    let mut pair = pair;
    let mut first_eq = pair.find('=');
    if loose {
        if first_eq == Some(0) {
            // "=value" form: drop the leading '=' and retry
            pair = &pair[1..];
            first_eq = pair.find('=');
        }
    } else if first_eq.is_none() || first_eq == Some(0) {
        return None;
    }

    let (key, value) = match first_eq {
        None | Some(0) => ("", pair.trim()),
        Some(i) => (pair[..i].trim(), pair[i + 1..].trim()),
    };

    if has_control_chars(key) || has_control_chars(value) {
        return None;
    }

    Some(Cookie::new(key, value))
}

/// Parse one `Set-Cookie` line into a [`Cookie`]. Returns `None` when not
/// even a name-value pair can be extracted.
///
/// The result carries only what the header said; binding to a request
/// context (default path, host-only) happens in
/// [`CookieJar::set_cookie`](crate::jar::CookieJar::set_cookie).
pub fn parse_set_cookie(input: &str, loose: bool) -> Option<Cookie> {
    let input = input.trim();

    let (pair, rest) = match input.find(';') {
        Some(i) => (&input[..i], Some(&input[i + 1..])),
        None => (input, None),
    };
    let mut cookie = parse_cookie_pair(pair, loose)?;
    let Some(rest) = rest else {
        return Some(cookie);
    };

    for av in rest.split(';') {
        let av = av.trim();
        if av.is_empty() {
            continue;
        }
        let (name, value) = match av.find('=') {
            Some(i) => (av[..i].trim().to_lowercase(), Some(av[i + 1..].trim())),
            None => (av.to_lowercase(), None),
        };

        // last occurrence wins for every recognized attribute
        match name.as_str() {
            "expires" => {
                if let Some(v) = value.filter(|v| !v.is_empty()) {
                    if let Some(instant) = parse_date(v) {
                        cookie.expires = Expiry::At(instant);
                    }
                }
            }
            "max-age" => {
                if let Some(v) = value {
                    let digits_only = v
                        .strip_prefix('-')
                        .unwrap_or(v)
                        .bytes()
                        .all(|b| b.is_ascii_digit());
                    if !v.is_empty() && v != "-" && digits_only {
                        if let Ok(seconds) = v.parse::<i64>() {
                            cookie.max_age = Some(MaxAge::Seconds(seconds));
                        }
                    }
                }
            }
            "domain" => {
                if let Some(v) = value {
                    let domain = v.trim_start_matches('.');
                    if !domain.is_empty() {
                        cookie.domain = Some(domain.to_lowercase());
                    }
                }
            }
            "path" => {
                cookie.path = value
                    .filter(|v| v.starts_with('/'))
                    .map(str::to_string);
            }
            "secure" => cookie.secure = true,
            "httponly" => cookie.http_only = true,
            _ => cookie.extensions.push(av.to_string()),
        }
    }

    Some(cookie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::Expiry;
    use time::macros::datetime;

    #[test]
    fn test_basic_pair() {
        let c = parse_set_cookie("foo=bar", false).unwrap();
        assert_eq!(c.key, "foo");
        assert_eq!(c.value, "bar");
        assert_eq!(c.path, None);
        assert_eq!(c.domain, None);
        assert!(!c.secure);
        assert!(!c.http_only);
    }

    #[test]
    fn test_pair_trimming() {
        let c = parse_set_cookie("  foo  =  bar  ", false).unwrap();
        assert_eq!(c.key, "foo");
        assert_eq!(c.value, "bar");
    }

    #[test]
    fn test_strict_requires_equals() {
        assert!(parse_set_cookie("foo", false).is_none());
        assert!(parse_set_cookie("=bar", false).is_none());
        assert!(parse_set_cookie("", false).is_none());
    }

    #[test]
    fn test_loose_mode() {
        let c = parse_set_cookie("=bar", true).unwrap();
        assert_eq!(c.key, "");
        assert_eq!(c.value, "bar");

        let c = parse_set_cookie("bar", true).unwrap();
        assert_eq!(c.key, "");
        assert_eq!(c.value, "bar");

        let c = parse_set_cookie("=foo=bar", true).unwrap();
        assert_eq!(c.key, "foo");
        assert_eq!(c.value, "bar");
    }

    #[test]
    fn test_control_chars_rejected() {
        assert!(parse_set_cookie("foo=b\u{0001}r", false).is_none());
        assert!(parse_set_cookie("f\u{0000}o=bar", false).is_none());
    }

    #[test]
    fn test_attributes() {
        let c = parse_set_cookie(
            "foo=bar; Expires=Wed, 21 Oct 2015 07:28:00 GMT; Max-Age=3600; \
             Domain=.Example.COM; Path=/sub; Secure; HttpOnly",
            false,
        )
        .unwrap();
        assert_eq!(c.expires, Expiry::At(datetime!(2015-10-21 07:28:00 UTC)));
        assert_eq!(c.max_age, Some(MaxAge::Seconds(3600)));
        assert_eq!(c.domain.as_deref(), Some("example.com"));
        assert_eq!(c.path.as_deref(), Some("/sub"));
        assert!(c.secure);
        assert!(c.http_only);
        assert!(c.extensions.is_empty());
    }

    #[test]
    fn test_bad_expires_ignored() {
        let c = parse_set_cookie("foo=bar; Expires=never", false).unwrap();
        assert_eq!(c.expires, Expiry::Session);
    }

    #[test]
    fn test_max_age_forms() {
        let c = parse_set_cookie("foo=bar; Max-Age=0", false).unwrap();
        assert_eq!(c.max_age, Some(MaxAge::Seconds(0)));
        let c = parse_set_cookie("foo=bar; Max-Age=-5", false).unwrap();
        assert_eq!(c.max_age, Some(MaxAge::Seconds(-5)));
        let c = parse_set_cookie("foo=bar; Max-Age=1.5", false).unwrap();
        assert_eq!(c.max_age, None);
        let c = parse_set_cookie("foo=bar; Max-Age=soon", false).unwrap();
        assert_eq!(c.max_age, None);
    }

    #[test]
    fn test_empty_domain_ignored() {
        let c = parse_set_cookie("foo=bar; Domain=", false).unwrap();
        assert_eq!(c.domain, None);
        let c = parse_set_cookie("foo=bar; Domain=.", false).unwrap();
        assert_eq!(c.domain, None);
    }

    #[test]
    fn test_relative_path_dropped() {
        let c = parse_set_cookie("foo=bar; Path=sub", false).unwrap();
        assert_eq!(c.path, None);
        let c = parse_set_cookie("foo=bar; Path=", false).unwrap();
        assert_eq!(c.path, None);
    }

    #[test]
    fn test_last_attribute_wins() {
        let c = parse_set_cookie("foo=bar; Path=/a; Path=/b", false).unwrap();
        assert_eq!(c.path.as_deref(), Some("/b"));
        // a later broken Path resets to the default-path rule
        let c = parse_set_cookie("foo=bar; Path=/a; Path=broken", false).unwrap();
        assert_eq!(c.path, None);
    }

    #[test]
    fn test_extensions_preserved() {
        let c = parse_set_cookie("foo=bar; SameSite=Lax; Partitioned", false).unwrap();
        assert_eq!(c.extensions, vec!["SameSite=Lax", "Partitioned"]);
    }

    #[test]
    fn test_value_with_equals() {
        let c = parse_set_cookie("foo=bar=baz", false).unwrap();
        assert_eq!(c.key, "foo");
        assert_eq!(c.value, "bar=baz");
    }
}
