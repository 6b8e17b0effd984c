//! Query-string encoding for the catalogue API
//!
//! MangaDex expects PHP-style flattening: arrays become repeated `key[]`
//! pairs and one-level objects become `key[nested]` pairs. Parameters keep
//! their insertion order on the wire.

use std::fmt;

/// A single scalar parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Value stored under a nested object key
///
/// Only scalars are encoded; anything deeper is dropped when the URL is built.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Object(Vec<(String, Scalar)>),
}

/// Value of a top-level query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Scalar(Scalar),
    Array(Vec<Scalar>),
    Object(Vec<(String, NestedValue)>),
}

/// Ordered query parameter mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace a parameter, keeping its original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: QueryValue) -> &mut Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn scalar(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(key, QueryValue::Scalar(value.into()));
        self
    }

    pub fn array<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(key, QueryValue::Array(values));
        self
    }

    pub fn object<I, K>(mut self, key: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, NestedValue)>,
        K: Into<String>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.insert(key, QueryValue::Object(entries));
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Encode into `k=v&k[]=v&k%5Bn%5D=v` form without the leading `?`
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();

        for (key, value) in &self.entries {
            match value {
                QueryValue::Scalar(scalar) => {
                    pairs.push(format!("{}={}", encode(key), encode_scalar(scalar)));
                }
                QueryValue::Array(values) => {
                    for element in values {
                        pairs.push(format!("{}[]={}", encode(key), encode_scalar(element)));
                    }
                }
                QueryValue::Object(entries) => {
                    for (nested_key, nested_value) in entries {
                        // Lists and objects below the first level are not representable
                        if let NestedValue::Scalar(scalar) = nested_value {
                            let full_key = format!("{}[{}]", key, nested_key);
                            pairs.push(format!("{}={}", encode(&full_key), encode_scalar(scalar)));
                        }
                    }
                }
            }
        }

        pairs.join("&")
    }
}

fn encode(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

fn encode_scalar(scalar: &Scalar) -> String {
    encode(&scalar.to_string())
}

/// Build a fully qualified URL for `endpoint` under `base_url`
pub fn build_url(base_url: &str, endpoint: &str, params: Option<&QueryParams>) -> String {
    let query = params.map(QueryParams::to_query_string).unwrap_or_default();

    if query.is_empty() {
        format!("{}{}", base_url, endpoint)
    } else {
        format!("{}{}?{}", base_url, endpoint, query)
    }
}

/// Append a raw suffix to an already built URL
///
/// A suffix starting with `?` is joined with `&` when the URL already
/// carries a query string.
pub fn append_suffix(url: &str, suffix: &str) -> String {
    match suffix.strip_prefix('?') {
        Some(rest) if url.contains('?') => format!("{}&{}", url, rest),
        _ => format!("{}{}", url, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "https://api.mangadex.org";

    #[test]
    fn test_scalar_array_and_object_flattening() {
        let params = QueryParams::new()
            .scalar("title", "one piece")
            .array("includes", ["cover_art", "author", "artist"])
            .object(
                "order",
                [
                    ("relevance", NestedValue::Scalar("desc".into())),
                    ("year", NestedValue::Scalar(Scalar::Int(2020))),
                    ("tags", NestedValue::List(vec!["a".into()])),
                    (
                        "deep",
                        NestedValue::Object(vec![("x".to_string(), Scalar::Bool(true))]),
                    ),
                ],
            );

        let url = build_url(BASE, "/manga", Some(&params));

        assert_eq!(
            url,
            "https://api.mangadex.org/manga?title=one%20piece\
             &includes[]=cover_art&includes[]=author&includes[]=artist\
             &order%5Brelevance%5D=desc&order%5Byear%5D=2020"
        );
        assert!(!url.contains("tags"));
        assert!(!url.contains("deep"));
    }

    #[test]
    fn test_absent_params_produce_no_query() {
        assert_eq!(build_url(BASE, "/cover/abc", None), "https://api.mangadex.org/cover/abc");
        assert_eq!(
            build_url(BASE, "/cover/abc", Some(&QueryParams::new())),
            "https://api.mangadex.org/cover/abc"
        );
    }

    #[test]
    fn test_empty_array_emits_nothing() {
        let params = QueryParams::new()
            .scalar("limit", 10u32)
            .array("contentRating", Vec::<&str>::new());

        assert_eq!(params.to_query_string(), "limit=10");
    }

    #[test]
    fn test_empty_scalar_still_emitted() {
        let params = QueryParams::new().scalar("title", "");
        assert_eq!(params.to_query_string(), "title=");
    }

    #[test]
    fn test_keys_and_values_are_encoded() {
        let params = QueryParams::new()
            .scalar("a&b", "c=d")
            .array("x y", ["1/2"]);

        assert_eq!(params.to_query_string(), "a%26b=c%3Dd&x%20y[]=1%2F2");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let params = QueryParams::new()
            .scalar("limit", 10u32)
            .scalar("title", "x")
            .scalar("limit", 20u32);

        assert_eq!(params.to_query_string(), "limit=20&title=x");
        assert_eq!(params.get("limit"), Some(&QueryValue::Scalar(Scalar::Int(20))));
    }

    #[test]
    fn test_append_suffix() {
        assert_eq!(append_suffix("https://x/manga?limit=1", "?_=5"), "https://x/manga?limit=1&_=5");
        assert_eq!(append_suffix("https://x/manga", "?_=5"), "https://x/manga?_=5");
        assert_eq!(append_suffix("https://x/manga", ""), "https://x/manga");
    }

    proptest! {
        #[test]
        fn prop_array_pairs_preserve_order(values in proptest::collection::vec("[a-z0-9]{1,8}", 0..10)) {
            let params = QueryParams::new().array("ids", values.clone());
            let query = params.to_query_string();
            let decoded: Vec<String> = query
                .split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| pair.trim_start_matches("ids[]=").to_string())
                .collect();

            prop_assert_eq!(decoded, values);
        }

        #[test]
        fn prop_scalar_values_are_fully_escaped(value in "\\PC{0,16}") {
            let params = QueryParams::new().scalar("q", value.clone());
            let query = params.to_query_string();
            let encoded = query.strip_prefix("q=").unwrap();

            prop_assert!(!encoded.contains('&'));
            prop_assert_eq!(urlencoding::decode(encoded).unwrap().into_owned(), value);
        }
    }
}
