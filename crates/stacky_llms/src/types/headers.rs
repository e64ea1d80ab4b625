use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

/// Extra HTTP headers for a provider request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers {
    inner: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    /// Copy every header of `other` over this one.
    pub fn merge_with(&mut self, other: &Headers) {
        for (k, v) in &other.inner {
            self.inner.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Invalid names or values are skipped.
    pub fn to_reqwest_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in &self.inner {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                map.insert(name, value);
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides() {
        let mut base = Headers::new();
        base.insert("Authorization", "Bearer a");
        base.insert("Content-Type", "application/json");

        let mut custom = Headers::new();
        custom.insert("Authorization", "Bearer b");
        base.merge_with(&custom);

        assert_eq!(base.get("Authorization"), Some("Bearer b"));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_to_reqwest_skips_invalid() {
        let mut headers = Headers::new();
        headers.insert("X-Ok", "yes");
        headers.insert("bad header", "x");
        let map = headers.to_reqwest_headers();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-ok").unwrap(), "yes");
    }
}
