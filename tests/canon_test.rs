//! Canonicalization and Public Suffix List integration tests.

use crumb::canon::{
    canonical_domain, default_path, domain_match, path_match, permute_domain, permute_path,
    registrable_parent,
};

#[test]
fn test_tld_has_no_registrable_parent() {
    assert_eq!(registrable_parent("com"), None);
    assert_eq!(registrable_parent("org"), None);
    assert_eq!(registrable_parent("co.uk"), None);
    assert_eq!(registrable_parent("github.io"), None);
}

#[test]
fn test_registrable_parent_extraction() {
    assert_eq!(
        registrable_parent("www.example.com"),
        Some("example.com".to_string())
    );
    assert_eq!(
        registrable_parent("deep.sub.example.com"),
        Some("example.com".to_string())
    );
    assert_eq!(
        registrable_parent("www.bbc.co.uk"),
        Some("bbc.co.uk".to_string())
    );
    assert_eq!(
        registrable_parent("user.github.io"),
        Some("user.github.io".to_string())
    );
}

#[test]
fn test_domain_match_is_dot_bounded() {
    assert!(domain_match("example.com", "example.com"));
    assert!(domain_match("foo.example.com", "example.com"));
    assert!(domain_match("a.b.example.com", "b.example.com"));
    assert!(!domain_match("barexample.com", "example.com"));
    assert!(!domain_match("example.com", "sub.example.com"));
}

#[test]
fn test_domain_match_never_spans_ip_literals() {
    assert!(domain_match("1.2.3.4", "1.2.3.4"));
    assert!(!domain_match("1.2.3.4", "2.3.4"));
    assert!(!domain_match("::1", "1"));
}

#[test]
fn test_default_path_identities() {
    assert_eq!(default_path(""), "/");
    assert_eq!(default_path("x"), "/");
    assert_eq!(default_path("/"), "/");
    assert_eq!(default_path("/a"), "/");
    assert_eq!(default_path("/a/b"), "/a");
}

#[test]
fn test_path_match_boundaries() {
    assert!(path_match("/a/b", "/a"));
    assert!(path_match("/a/b", "/a/"));
    assert!(!path_match("/ab", "/a"));
    assert!(path_match("/a", "/a"));
    assert!(!path_match("/", "/a"));
}

#[test]
fn test_permutations_cover_lookup_space() {
    // every stored path that can match /a/b/c is in its permutation list
    let perms = permute_path("/a/b/c");
    for p in &perms {
        assert!(path_match("/a/b/c", p), "{p} should match");
    }
    assert_eq!(perms, vec!["/a/b/c", "/a/b", "/a", "/"]);

    // domain permutations stop above the public suffix
    let perms = permute_domain("a.b.example.co.uk").unwrap();
    assert_eq!(
        perms,
        vec!["example.co.uk", "b.example.co.uk", "a.b.example.co.uk"]
    );
    assert!(!perms.iter().any(|d| d == "co.uk"));
}

#[test]
fn test_canonical_domain_forms() {
    assert_eq!(
        canonical_domain(".Sub.Example.COM"),
        Some("sub.example.com".to_string())
    );
    assert_eq!(
        canonical_domain("münchen.de"),
        Some("xn--mnchen-3ya.de".to_string())
    );
    assert_eq!(canonical_domain("[::1]"), Some("::1".to_string()));
    assert_eq!(canonical_domain(""), None);
}
