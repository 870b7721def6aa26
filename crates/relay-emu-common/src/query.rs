//! ---
//! emu_section: "01-core-functionality"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Query-string decoding shared by the device and store surfaces."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use indexmap::IndexMap;
use url::form_urlencoded;

/// Failure to split a query string into `key=value` pairs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query segment '{0}' is not a key=value pair")]
    MalformedPair(String),
    #[error("query segment '{0}' has an empty key")]
    EmptyKey(String),
}

/// Decoded request arguments, in the order they appeared on the wire.
///
/// Keys and values are percent-decoded (`+` decodes to a space). A repeated key
/// keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs {
    pairs: IndexMap<String, String>,
}

impl QueryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split on `&`, then on `=`, decoding each half.
    ///
    /// Empty segments (`a=1&&b=2`, a trailing `&`) are skipped. A segment without
    /// exactly one `=` is rejected.
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let mut pairs = IndexMap::new();
        for segment in query.split('&') {
            if segment.is_empty() {
                continue;
            }
            let mut halves = segment.split('=');
            let (Some(raw_key), Some(raw_value), None) = (halves.next(), halves.next(), halves.next())
            else {
                return Err(QueryError::MalformedPair(segment.to_owned()));
            };
            let key = decode(raw_key);
            if key.is_empty() {
                return Err(QueryError::EmptyKey(segment.to_owned()));
            }
            pairs.insert(key, decode(raw_value));
        }
        Ok(Self { pairs })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Split a request target into its path and (possibly empty) query.
pub fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    }
}

fn decode(raw: &str) -> String {
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}
