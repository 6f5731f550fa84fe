//! Query parameters sent with list requests.

use std::collections::BTreeMap;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub const PAGE_NUMBER_KEY: &str = "pageNumber";
pub const PAGE_SIZE_KEY: &str = "pageSize";

/// A cleaned, ordered set of query parameters.
///
/// Ordering is stable (`BTreeMap`), so two equal parameter sets always
/// render the same query string and the same cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, ParamValue>);

/// A scalar query value. Nulls never make it in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            ParamValue::Text(s) => s.trim().parse().ok(),
            ParamValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Text(s) => s.parse().ok(),
            ParamValue::Int(_) => None,
        }
    }

    /// Query-string form.
    pub fn render(&self) -> String {
        match self {
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Int(n) => n.to_string(),
            ParamValue::Text(s) => s.clone(),
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(ParamValue::Text(s.clone())),
            Value::Bool(b) => Some(ParamValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(ParamValue::Int)
                .or_else(|| Some(ParamValue::Text(n.to_string()))),
            other => Some(ParamValue::Text(other.to_string())),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

/// Drops every key whose value is `""` or `null`; everything else is kept as is.
///
/// Missing keys are, by construction, already absent.
pub fn clean(raw: &serde_json::Map<String, Value>) -> serde_json::Map<String, Value> {
    raw.iter()
        .filter(|(_, v)| !matches!(v, Value::Null) && v.as_str() != Some(""))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Parses a positive integer, returning `fallback` for anything else.
pub fn to_number(raw: Option<&str>, fallback: u32) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return fallback;
    };
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 1.0 && n <= f64::from(u32::MAX) => n.trunc() as u32,
        _ => fallback,
    }
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds params from a JSON map, applying [`clean`].
    pub fn from_json(raw: &serde_json::Map<String, Value>) -> Self {
        let mut params = Self::new();
        for (key, value) in clean(raw) {
            if let Some(v) = ParamValue::from_json(&value) {
                params.0.insert(key, v);
            }
        }
        params
    }

    pub fn paged(page_number: u32, page_size: u32) -> Self {
        let mut params = Self::new();
        params.insert(PAGE_NUMBER_KEY, page_number);
        params.insert(PAGE_SIZE_KEY, page_size);
        params
    }

    /// Inserts a value. Empty strings remove the key instead.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        match value.into() {
            ParamValue::Text(s) if s.is_empty() => {
                self.0.remove(&key);
            }
            v => {
                self.0.insert(key, v);
            }
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(ParamValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(ParamValue::as_bool)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn page_number(&self) -> u32 {
        self.0
            .get(PAGE_NUMBER_KEY)
            .and_then(ParamValue::as_i64)
            .filter(|n| *n >= 1)
            .map(|n| n.min(i64::from(u32::MAX)) as u32)
            .unwrap_or(DEFAULT_PAGE_NUMBER)
    }

    pub fn page_size(&self) -> u32 {
        self.0
            .get(PAGE_SIZE_KEY)
            .and_then(ParamValue::as_i64)
            .filter(|n| *n >= 1)
            .map(|n| n.min(i64::from(u32::MAX)) as u32)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs for `reqwest::RequestBuilder::query`.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.render()))
            .collect()
    }

    /// Stable `k=v&k=v` rendering used in cache keys and URLs.
    pub fn canonical(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let Some(mut url) = query_base() else {
            return String::new();
        };
        url.query_pairs_mut()
            .extend_pairs(self.0.iter().map(|(k, v)| (k.as_str(), v.render())));
        url.query().unwrap_or_default().to_string()
    }

    /// Parses a `k=v&k=v` string (a leading `?` is ignored). Values stay text.
    pub fn parse_query_string(query: &str) -> BTreeMap<String, String> {
        let Some(mut url) = query_base() else {
            return BTreeMap::new();
        };
        url.set_query(Some(query.trim_start_matches('?')));
        url.query_pairs()
            .filter(|(k, _)| !k.is_empty())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

/// A throwaway URL whose query component does the form encoding.
fn query_base() -> Option<Url> {
    Url::parse("http://localhost/").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_strips_empty_and_null() {
        let raw = json!({"a": "", "b": 0, "c": null, "d": "x"});
        let cleaned = clean(raw.as_object().unwrap());
        assert_eq!(Value::Object(cleaned), json!({"b": 0, "d": "x"}));
    }

    #[test]
    fn test_clean_keeps_false_and_whitespace() {
        let raw = json!({"active": false, "q": " "});
        let cleaned = clean(raw.as_object().unwrap());
        assert_eq!(cleaned.len(), 2);
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(Some("0"), 10), 10);
        assert_eq!(to_number(Some("5"), 10), 5);
        assert_eq!(to_number(None, 10), 10);
        assert_eq!(to_number(Some("-3"), 10), 10);
        assert_eq!(to_number(Some("abc"), 10), 10);
        assert_eq!(to_number(Some("NaN"), 10), 10);
        assert_eq!(to_number(Some("Infinity"), 10), 10);
        assert_eq!(to_number(Some(""), 1), 1);
        assert_eq!(to_number(Some(" 25 "), 10), 25);
        assert_eq!(to_number(Some("2.7"), 1), 2);
    }

    #[test]
    fn test_from_json_drops_empty_values() {
        let raw = json!({"email": "", "department": "Engineering", "pageNumber": 2});
        let params = QueryParams::from_json(raw.as_object().unwrap());
        assert!(!params.contains("email"));
        assert_eq!(params.get_str("department"), Some("Engineering"));
        assert_eq!(params.page_number(), 2);
    }

    #[test]
    fn test_insert_empty_string_removes() {
        let mut params = QueryParams::new().with("search", "rust");
        params.insert("search", "");
        assert!(params.is_empty());
    }

    #[test]
    fn test_canonical_is_order_independent() {
        let a = QueryParams::new().with("b", "2").with("a", "x y");
        let b = QueryParams::new().with("a", "x y").with("b", "2");
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), "a=x+y&b=2");
    }

    #[test]
    fn test_page_defaults() {
        let params = QueryParams::new();
        assert_eq!(params.page_number(), DEFAULT_PAGE_NUMBER);
        assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);
        let params = QueryParams::paged(3, 25);
        assert_eq!(params.page_number(), 3);
        assert_eq!(params.page_size(), 25);
    }

    #[test]
    fn test_canonical_encodes_reserved_characters() {
        let params = QueryParams::new().with("search", "R&D / ops=1");
        let canonical = params.canonical();
        assert_eq!(canonical, "search=R%26D+%2F+ops%3D1");
        let parsed = QueryParams::parse_query_string(&canonical);
        assert_eq!(parsed.get("search").map(String::as_str), Some("R&D / ops=1"));
    }

    #[test]
    fn test_parse_query_string_keeps_unicode() {
        let parsed = QueryParams::parse_query_string("location=S%C3%A3o+Paulo&=orphan");
        assert_eq!(parsed.get("location").map(String::as_str), Some("São Paulo"));
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_parse_query_string_round_trip() {
        let parsed = QueryParams::parse_query_string("?pageNumber=2&search=senior%20dev&x=");
        assert_eq!(parsed.get("pageNumber").map(String::as_str), Some("2"));
        assert_eq!(parsed.get("search").map(String::as_str), Some("senior dev"));
        assert_eq!(parsed.get("x").map(String::as_str), Some(""));
    }
}
