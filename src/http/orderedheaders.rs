use crate::base::neterror::NetError;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::str::FromStr;

/// A header multimap that strictly preserves insertion order.
///
/// Duplicate names are kept as separate entries (`Set-Cookie` relies on
/// this); `insert` is the replacing variant, `append` the accumulating one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedHeaderMap {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl OrderedHeaderMap {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    fn parse_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), NetError> {
        let name_header = HeaderName::from_str(name).map_err(|_| NetError::InvalidHeader)?;
        let value_header = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader)?;
        Ok((name_header, value_header))
    }

    /// Set a header, replacing every existing entry with the same name.
    ///
    /// The first existing entry is updated in place so the header keeps its
    /// original position; later duplicates are dropped.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), NetError> {
        let (name_header, value_header) = Self::parse_pair(name, value)?;

        if let Some(pos) = self.headers.iter().position(|(n, _)| *n == name_header) {
            self.headers[pos].1 = value_header;
            let mut idx = 0;
            self.headers.retain(|(n, _)| {
                let keep = idx <= pos || *n != name_header;
                idx += 1;
                keep
            });
        } else {
            self.headers.push((name_header, value_header));
        }
        Ok(())
    }

    /// Add a header entry without touching existing entries of the same name.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), NetError> {
        let pair = Self::parse_pair(name, value)?;
        self.headers.push(pair);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) {
        if let Ok(target) = HeaderName::from_str(name) {
            self.headers.retain(|(n, _)| *n != target);
        }
    }

    /// First value for `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let target = HeaderName::from_str(name).ok()?;
        self.headers
            .iter()
            .find(|(n, _)| *n == target)
            .map(|(_, v)| v)
    }

    /// First value for `name` as a string, if it is visible ASCII.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    /// Every value for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a HeaderValue> + 'a {
        let target = HeaderName::from_str(name).ok();
        self.headers
            .iter()
            .filter(move |(n, _)| target.as_ref() == Some(n))
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Consumes the map and returns a standard http::HeaderMap.
    pub fn to_header_map(self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers {
            map.append(name, value);
        }
        map
    }
}

impl From<HeaderMap> for OrderedHeaderMap {
    fn from(map: HeaderMap) -> Self {
        let mut headers = Vec::with_capacity(map.len());
        let mut current: Option<HeaderName> = None;
        // HeaderMap yields `None` for repeated values of the previous name.
        for (name, value) in map {
            if let Some(name) = name {
                current = Some(name);
            }
            if let Some(name) = &current {
                headers.push((name.clone(), value));
            }
        }
        Self { headers }
    }
}

impl<'a> IntoIterator for &'a OrderedHeaderMap {
    type Item = &'a (HeaderName, HeaderValue);
    type IntoIter = std::slice::Iter<'a, (HeaderName, HeaderValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}
