//! The default in-memory cookie store.
//!
//! A three-level index `domain -> path -> key -> Cookie` gives O(1)
//! identity lookup. Retrieval walks the request host's domain
//! permutations and path-matches within each domain bucket, so the jar
//! never scans unrelated domains.

use std::collections::HashMap;

use dashmap::DashMap;

use crate::canon::{path_match, permute_domain};
use crate::cookie::Cookie;
use crate::store::{CookieStore, StoreError};

type PathIndex = HashMap<String, HashMap<String, Cookie>>;

/// In-memory [`CookieStore`] keyed by `(domain, path, key)`.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    idx: DashMap<String, PathIndex>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for MemoryCookieStore {
    fn find(&self, domain: &str, path: &str, key: &str) -> Result<Option<Cookie>, StoreError> {
        Ok(self
            .idx
            .get(domain)
            .and_then(|paths| paths.get(path).and_then(|keys| keys.get(key)).cloned()))
    }

    fn find_cookies(&self, domain: &str, path: Option<&str>) -> Result<Vec<Cookie>, StoreError> {
        let domains = permute_domain(domain).unwrap_or_else(|| vec![domain.to_string()]);

        let mut results = Vec::new();
        for cur_domain in domains {
            let Some(paths) = self.idx.get(&cur_domain) else {
                continue;
            };
            match path {
                None => {
                    for keys in paths.values() {
                        results.extend(keys.values().cloned());
                    }
                }
                Some(req_path) => {
                    for (cookie_path, keys) in paths.iter() {
                        if path_match(req_path, cookie_path) {
                            results.extend(keys.values().cloned());
                        }
                    }
                }
            }
        }
        Ok(results)
    }

    fn put(&self, cookie: Cookie) -> Result<(), StoreError> {
        let (Some(domain), Some(path)) = (cookie.domain.clone(), cookie.path.clone()) else {
            return Err(StoreError::MissingIdentity);
        };
        self.idx
            .entry(domain)
            .or_default()
            .entry(path)
            .or_default()
            .insert(cookie.key.clone(), cookie);
        Ok(())
    }

    fn remove(&self, domain: &str, path: &str, key: &str) -> Result<(), StoreError> {
        if let Some(mut paths) = self.idx.get_mut(domain) {
            let emptied = match paths.get_mut(path) {
                Some(keys) => {
                    keys.remove(key);
                    keys.is_empty()
                }
                None => false,
            };
            if emptied {
                paths.remove(path);
            }
        }
        Ok(())
    }

    fn remove_all(&self) -> Result<(), StoreError> {
        self.idx.clear();
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<Cookie>, StoreError> {
        let mut all = Vec::new();
        for entry in self.idx.iter() {
            for keys in entry.value().values() {
                all.extend(keys.values().cloned());
            }
        }
        Ok(all)
    }

    fn store_kind(&self) -> &'static str {
        "MemoryCookieStore"
    }
}
