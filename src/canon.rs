//! Host and path canonicalization primitives.
//!
//! Implements the matching rules of RFC 6265:
//!
//! - domain canonicalization (S5.1.2) including the IDN-to-A-label step
//! - domain-match (S5.1.3)
//! - default-path and path-match (S5.1.4)
//! - the domain/path permutations used by store indices
//!
//! Public Suffix List lookups go through [`registrable_parent`], which wraps
//! Mozilla's list via the `psl` crate. Rejecting cookies whose domain is
//! itself a public suffix prevents supercookie attacks (e.g. a cookie set
//! on `.co.uk`).

use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

use psl::{List, Psl};

/// Canonicalize a host per RFC 6265 S5.1.2.
///
/// Trims whitespace, strips a single leading dot, strips the brackets from
/// an IPv6 literal, transcodes non-ASCII labels to A-labels, and
/// lower-cases the result. Returns `None` when nothing usable remains or
/// the IDN transcoding fails.
pub fn canonical_domain(host: &str) -> Option<String> {
    let mut s = host.trim();
    if let Some(stripped) = s.strip_prefix('.') {
        s = stripped;
    }
    if s.is_empty() {
        return None;
    }

    // `url::Url` reports IPv6 hosts in bracket notation.
    if let Some(inner) = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        if Ipv6Addr::from_str(inner).is_ok() {
            return Some(inner.to_lowercase());
        }
    }

    if s.is_ascii() {
        Some(s.to_lowercase())
    } else {
        idna::domain_to_ascii(s).ok()
    }
}

/// True iff `s` is a valid IPv4 or IPv6 literal (unbracketed).
pub fn is_ip(s: &str) -> bool {
    IpAddr::from_str(s).is_ok()
}

/// Domain-match per RFC 6265 S5.1.3.
///
/// Both arguments must already be canonical (see [`canonical_domain`]).
/// True iff the strings are identical, or `dom` is a dot-bounded proper
/// suffix of `host` and `host` is not an IP literal.
pub fn domain_match(host: &str, dom: &str) -> bool {
    if dom.is_empty() {
        return false;
    }
    if host == dom {
        return true;
    }
    if host.len() <= dom.len() || !host.ends_with(dom) {
        return false;
    }
    if host.as_bytes()[host.len() - dom.len() - 1] != b'.' {
        return false;
    }
    !is_ip(host)
}

/// Default-path per RFC 6265 S5.1.4: the directory part of the request
/// path, or `/` when the path is missing, relative, or has no directory.
pub fn default_path(uri_path: &str) -> &str {
    if uri_path.is_empty() || !uri_path.starts_with('/') {
        return "/";
    }
    match uri_path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &uri_path[..i],
    }
}

/// Path-match per RFC 6265 S5.1.4.
///
/// True iff the paths are identical, or `cookie_path` is a prefix of
/// `req_path` ending at a `/` boundary.
pub fn path_match(req_path: &str, cookie_path: &str) -> bool {
    if req_path == cookie_path {
        return true;
    }
    if !req_path.starts_with(cookie_path) {
        return false;
    }
    cookie_path.ends_with('/') || req_path.as_bytes()[cookie_path.len()] == b'/'
}

/// All path prefixes of `path`, longest first, ending with `/`.
///
/// Stores may use this to enumerate the exact cookie paths that can match
/// a request path without scanning their whole path index.
pub fn permute_path(path: &str) -> Vec<String> {
    if path == "/" {
        return vec!["/".to_string()];
    }
    let mut p = path.strip_suffix('/').unwrap_or(path);
    let mut permutations = vec![p.to_string()];
    while let Some(i) = p.rfind('/') {
        if i == 0 {
            break;
        }
        p = &p[..i];
        permutations.push(p.to_string());
    }
    permutations.push("/".to_string());
    permutations
}

/// `domain` and every parent domain down to (and including) its
/// registrable parent, shortest first.
///
/// Returns `None` when `domain` has no registrable parent, i.e. it is
/// itself a public suffix.
pub fn permute_domain(domain: &str) -> Option<Vec<String>> {
    let parent = registrable_parent(domain)?;
    if parent == domain {
        return Some(vec![domain.to_string()]);
    }

    let prefix = &domain[..domain.len() - parent.len() - 1];
    let mut cur = parent;
    let mut permutations = vec![cur.clone()];
    for label in prefix.rsplit('.') {
        cur = format!("{label}.{cur}");
        permutations.push(cur.clone());
    }
    Some(permutations)
}

/// The registrable domain (eTLD+1) containing `domain`, or `None` when
/// `domain` is itself a public suffix.
///
/// For "sub.example.com" returns "example.com"; for "co.uk" returns
/// `None`.
pub fn registrable_parent(domain: &str) -> Option<String> {
    let lower = domain.to_lowercase();
    List
        .domain(lower.as_bytes())
        .and_then(|d| std::str::from_utf8(d.as_bytes()).ok().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_domain_basic() {
        assert_eq!(canonical_domain("Example.COM"), Some("example.com".into()));
        assert_eq!(canonical_domain(" example.com "), Some("example.com".into()));
        assert_eq!(canonical_domain(".example.com"), Some("example.com".into()));
        assert_eq!(canonical_domain(""), None);
        assert_eq!(canonical_domain("."), None);
    }

    #[test]
    fn test_canonical_domain_idn() {
        assert_eq!(
            canonical_domain("bücher.example"),
            Some("xn--bcher-kva.example".into())
        );
    }

    #[test]
    fn test_canonical_domain_ipv6_brackets() {
        assert_eq!(canonical_domain("[::1]"), Some("::1".into()));
        assert_eq!(canonical_domain("[2001:DB8::1]"), Some("2001:db8::1".into()));
    }

    #[test]
    fn test_is_ip() {
        assert!(is_ip("1.2.3.4"));
        assert!(is_ip("::1"));
        assert!(!is_ip("example.com"));
        assert!(!is_ip("1.2.3.4.5"));
    }

    #[test]
    fn test_domain_match() {
        assert!(domain_match("example.com", "example.com"));
        assert!(domain_match("foo.example.com", "example.com"));
        assert!(!domain_match("barexample.com", "example.com"));
        assert!(!domain_match("example.com", "foo.example.com"));
        assert!(!domain_match("1.2.3.4", "2.3.4"));
        assert!(!domain_match("example.com", ""));
    }

    #[test]
    fn test_default_path() {
        assert_eq!(default_path(""), "/");
        assert_eq!(default_path("x"), "/");
        assert_eq!(default_path("/"), "/");
        assert_eq!(default_path("/a"), "/");
        assert_eq!(default_path("/a/b"), "/a");
        assert_eq!(default_path("/a/b/"), "/a/b");
    }

    #[test]
    fn test_path_match() {
        assert!(path_match("/", "/"));
        assert!(path_match("/a/b", "/a"));
        assert!(path_match("/a/b", "/a/"));
        assert!(path_match("/a/b", "/a/b"));
        assert!(!path_match("/ab", "/a"));
        assert!(!path_match("/a", "/a/b"));
    }

    #[test]
    fn test_permute_path() {
        assert_eq!(permute_path("/"), vec!["/"]);
        assert_eq!(permute_path("/foo"), vec!["/foo", "/"]);
        assert_eq!(permute_path("/foo/bar"), vec!["/foo/bar", "/foo", "/"]);
        assert_eq!(permute_path("/foo/bar/"), vec!["/foo/bar", "/foo", "/"]);
    }

    #[test]
    fn test_permute_domain() {
        assert_eq!(
            permute_domain("foo.bar.example.com"),
            Some(vec![
                "example.com".to_string(),
                "bar.example.com".to_string(),
                "foo.bar.example.com".to_string(),
            ])
        );
        assert_eq!(
            permute_domain("example.com"),
            Some(vec!["example.com".to_string()])
        );
        assert_eq!(permute_domain("com"), None);
    }

    #[test]
    fn test_registrable_parent() {
        assert_eq!(registrable_parent("example.com"), Some("example.com".into()));
        assert_eq!(
            registrable_parent("sub.example.co.uk"),
            Some("example.co.uk".into())
        );
        assert_eq!(registrable_parent("com"), None);
        assert_eq!(registrable_parent("co.uk"), None);
    }
}
