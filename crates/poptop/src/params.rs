//! Query string and form body parsing.
//!
//! Both sources are parsed the same way: pairs split on `&`, key and value
//! split on the first `=`, both percent-decoded. Pairs without `=` and pairs
//! whose decoded value is blank are dropped. Duplicate keys accumulate.

use serde::Serialize;
use std::collections::BTreeMap;

/// Parsed parameters: keys sorted, values in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Vec<String>>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value recorded for `key`, in encounter order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append `value` under `key`.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.push(key, value);
        }
        params
    }
}

/// Parse a raw query string or url-encoded body.
///
/// Returns `None` when there is nothing to parse, and `Some` (possibly
/// empty) when input was present, so "no params" and "all filtered" stay
/// distinguishable.
pub fn parse_params(raw: &str) -> Option<Params> {
    if raw.is_empty() {
        return None;
    }

    let params = raw
        .split('&')
        .filter(|s| !s.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = urlencoding::decode(key).ok()?.into_owned();
            let value = urlencoding::decode(value).ok()?.into_owned();
            if is_blank(&value) {
                None
            } else {
                Some((key, value))
            }
        })
        .collect();

    Some(params)
}

/// Parse a request body; non UTF-8 bodies carry no parameters.
pub fn parse_body(body: &[u8]) -> Option<Params> {
    std::str::from_utf8(body).ok().and_then(parse_params)
}

/// Empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
