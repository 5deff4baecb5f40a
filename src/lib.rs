//! # crumb
//!
//! An RFC 6265 cookie engine for Rust.
//!
//! `crumb` parses `Set-Cookie` header values, validates and stores the
//! resulting cookies in a jar with policy enforcement, and emits the
//! correct `Cookie` header for outgoing requests. It implements the RFC's
//! processing model with the commonly-adopted public-suffix extension,
//! with enough fidelity to serve as the cookie subsystem of an HTTP
//! client.
//!
//! ## Features
//!
//! - **Permissive parsing**: the real-world `Set-Cookie` zoo, including
//!   the full RFC 6265 S5.1.1 date algorithm and an opt-in loose mode
//!   for `=value` cookies
//! - **Policy enforcement**: host-only binding, default-path, domain
//!   matching, Secure/HttpOnly scoping, expiry eviction
//! - **Public Suffix List validation**: supercookie attempts (`.com`,
//!   `.co.uk`) are rejected by default
//! - **Pluggable storage**: a [`CookieStore`](store::CookieStore) trait
//!   with an indexed in-memory implementation
//! - **Persistence**: lossless JSON snapshots plus curl-compatible
//!   Netscape `cookies.txt` import/export
//!
//! ## Quick Start
//!
//! ```rust
//! use crumb::jar::CookieJar;
//! use url::Url;
//!
//! let jar = CookieJar::new();
//! let url = Url::parse("https://example.com/login").unwrap();
//!
//! jar.set_cookie("session=abc123; Path=/; HttpOnly", &url, &Default::default())
//!     .unwrap();
//!
//! let header = jar.get_cookie_string(&url, &Default::default()).unwrap();
//! assert_eq!(header, "session=abc123");
//! ```
//!
//! ## Modules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`canon`] | Host/path canonicalization and RFC 6265 matching rules |
//! | [`date`] | Cookie date parsing (S5.1.1) and RFC 1123 formatting |
//! | [`parse`] | `Set-Cookie` line parsing |
//! | [`cookie`] | The cookie record, expiry arithmetic, JSON round-trip |
//! | [`store`] | The storage trait consumed by the jar |
//! | [`memory`] | The default in-memory store |
//! | [`jar`] | The policy engine: set/get state machine and ordering |
//! | [`persistence`] | Disk snapshots and Netscape format |
//!
//! ## Security
//!
//! Cookies scoped to a public suffix would be visible to every
//! registrable domain under it; the jar refuses them unless
//! [`JarConfig::reject_public_suffixes`](jar::JarConfig) is disabled.
//! `HttpOnly` cookies can neither be created nor replaced through a
//! non-HTTP code path.

pub mod canon;
pub mod cookie;
pub mod date;
pub mod error;
pub mod jar;
pub mod memory;
pub mod parse;
pub mod persistence;
pub mod store;
