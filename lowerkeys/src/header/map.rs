use std::{
    borrow::Cow,
    collections::{hash_map::Entry, HashMap},
    ops::{Deref, Index},
};

use http::header::{InvalidHeaderName, InvalidHeaderValue, ToStrError};
use http::{HeaderName, HeaderValue};
use log::{debug, trace, warn};
use thiserror::Error;

use super::{lowercase, TypedHeader};

/// The plain multi-value header representation: name to ordered values.
///
/// Names in a `RawHeader` may be of any case. [`Header`] is the same shape with
/// every name lower-cased.
pub type RawHeader = HashMap<String, Vec<String>>;

/// A multimap of HTTP headers whose names are always stored in lower-case.
///
/// Every name passed to an accessor is lower-cased before use, so lookups behave
/// case-insensitively. A `Header` dereferences to the underlying [`RawHeader`],
/// which can be handed to anything expecting plain header storage.
///
/// A name mapped to an empty value list is still present (see
/// [`Header::contains_key`]), but [`Header::get`] and [`Header::values`] treat it
/// the same as a missing name.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawHeader", into = "RawHeader"))]
pub struct Header(RawHeader);

/// Two distinct names folded to the same lower-case name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("encountered two keys with identical lower-case representation '{lowercase}': '{first}' and '{second}'")]
pub struct CollisionError {
    pub lowercase: String,
    pub first: String,
    pub second: String,
}

impl CollisionError {
    fn new(lowercase: &str, a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            lowercase: lowercase.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

#[cfg(feature = "otel")]
impl opentelemetry_api::propagation::Extractor for Header {
    /// Get the first value for a key from the Header.
    fn get(&self, key: &str) -> Option<&str> {
        self.values(key).first().map(String::as_str)
    }

    /// Collect all the keys from the Header.
    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

#[cfg(feature = "otel")]
impl opentelemetry_api::propagation::Injector for Header {
    fn set(&mut self, key: &str, value: String) {
        Header::set(self, key, value);
    }
}

fn check_collisions<'a>(raw: &'a RawHeader) -> Result<(), CollisionError> {
    let mut seen: HashMap<Cow<'a, str>, &'a str> = HashMap::with_capacity(raw.len());
    for name in raw.keys() {
        match seen.entry(lowercase(name)) {
            Entry::Occupied(entry) => {
                let err = CollisionError::new(entry.key(), entry.get(), name);
                warn!("{err}");
                return Err(err);
            }
            Entry::Vacant(entry) => {
                entry.insert(name);
            }
        }
    }
    Ok(())
}

/// Re-keys every mixed-case entry of `raw` in place. Values are moved, not copied.
/// `raw` is untouched if two names collide.
fn normalize_keys(raw: &mut RawHeader) -> Result<(), CollisionError> {
    check_collisions(raw)?;
    let renamed = raw
        .keys()
        .filter(|name| matches!(lowercase(name), Cow::Owned(_)))
        .cloned()
        .collect::<Vec<_>>();
    for old_name in &renamed {
        if let Some(values) = raw.remove(old_name) {
            let new_name = old_name.to_ascii_lowercase();
            trace!("renaming header '{old_name}' to '{new_name}'");
            raw.insert(new_name, values);
        }
    }
    if !renamed.is_empty() {
        debug!("lower-cased {} header name(s) in place", renamed.len());
    }
    Ok(())
}

impl Header {
    /// Create an empty `Header`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lowerkeys::Header;
    /// let header = Header::new();
    ///
    /// assert!(header.is_empty());
    /// ```
    pub fn new() -> Self {
        Default::default()
    }

    /// Create an empty `Header` with room for at least `capacity` names.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(HashMap::with_capacity(capacity))
    }

    /// Returns a new `Header` holding a copy of `raw` with every name lower-cased.
    ///
    /// Every value list is duplicated, so later changes to `raw` are not visible
    /// through the returned `Header` and vice versa.
    ///
    /// Fails if two names of `raw` fold to the same lower-case name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lowerkeys::{Header, RawHeader};
    /// let mut raw = RawHeader::new();
    /// raw.insert("Content-Type".to_string(), vec!["foo".to_string()]);
    ///
    /// let header = Header::from_raw(&raw).unwrap();
    /// assert_eq!(header.get("content-type"), "foo");
    /// assert!(header.as_ref().contains_key("content-type"));
    /// assert!(!header.as_ref().contains_key("Content-Type"));
    /// ```
    pub fn from_raw(raw: &RawHeader) -> Result<Self, CollisionError> {
        check_collisions(raw)?;
        let out: RawHeader = raw
            .iter()
            .map(|(name, values)| (lowercase(name).into_owned(), values.clone()))
            .collect();
        debug!("copied {} header name(s) into lower-case header", out.len());
        Ok(Self(out))
    }

    /// Lower-cases every name of `raw` in place and returns it as a `Header`.
    ///
    /// No value is copied: the returned `Header` is a view over the very same
    /// storage, so anything done through it is visible through `raw` once the
    /// borrow ends, and anything later written to `raw` is visible the next time
    /// it is viewed.
    ///
    /// Fails if two names of `raw` fold to the same lower-case name, in which case
    /// `raw` is left as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lowerkeys::{Header, RawHeader};
    /// let mut raw = RawHeader::new();
    /// raw.insert("Content-Type".to_string(), vec!["foo".to_string()]);
    ///
    /// Header::using(&mut raw).unwrap().add("Accept", "*/*");
    ///
    /// assert_eq!(raw["content-type"], ["foo"]);
    /// assert_eq!(raw["accept"], ["*/*"]);
    /// ```
    pub fn using(raw: &mut RawHeader) -> Result<&mut Self, CollisionError> {
        normalize_keys(raw)?;
        // SAFETY: `Header` is `repr(transparent)` over `RawHeader`, and `raw` now upholds the lower-case invariant
        Ok(unsafe { &mut *(raw as *mut RawHeader as *mut Header) })
    }

    /// Gives back the underlying storage.
    pub fn into_inner(self) -> RawHeader {
        self.0
    }

    /// Appends `value` to the values of `name`.
    ///
    /// Values of a name keep the order they were added in.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lowerkeys::Header;
    /// let mut header = Header::new();
    /// header.add("Accept", "text/html");
    /// header.add("ACCEPT", "text/plain");
    ///
    /// assert_eq!(header.values("accept"), ["text/html", "text/plain"]);
    /// ```
    pub fn add(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = lowercase(name.as_ref());
        match self.0.get_mut(&*name) {
            Some(values) => values.push(value.into()),
            None => {
                self.0.insert(name.into_owned(), vec![value.into()]);
            }
        }
    }

    /// Removes `name` and all of its values, returning them.
    ///
    /// Removing a missing name does nothing.
    pub fn del(&mut self, name: impl AsRef<str>) -> Option<Vec<String>> {
        self.0.remove(&*lowercase(name.as_ref()))
    }

    /// Returns the first value of `name`.
    ///
    /// Returns `""` if `name` is missing or has no values. Use [`Header::values`] or
    /// [`Header::contains_key`] to tell those cases apart.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lowerkeys::Header;
    /// let mut header = Header::new();
    /// assert_eq!(header.get("host"), "");
    ///
    /// header.add("Host", "hello");
    /// header.add("host", "world");
    /// assert_eq!(header.get("HOST"), "hello");
    /// ```
    pub fn get(&self, name: &str) -> &str {
        self.values(name)
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Replaces all values of `name` with the single `value`.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = lowercase(name.as_ref());
        match self.0.get_mut(&*name) {
            Some(values) => {
                values.clear();
                values.push(value.into());
            }
            None => {
                self.0.insert(name.into_owned(), vec![value.into()]);
            }
        }
    }

    /// Returns all values of `name`, or an empty slice if it is missing.
    ///
    /// The slice borrows the map's own storage.
    pub fn values(&self, name: &str) -> &[String] {
        self.0
            .get(&*lowercase(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns true if `name` is present, even with no values.
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(&*lowercase(name))
    }

    /// Removes every name, keeping the allocated memory.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns the first value of `name` decoded as a typed header.
    ///
    /// Returns `None` if the header is missing or malformed.
    pub fn get_typed<H: TypedHeader>(&self) -> Option<H> {
        let values = self.values(H::name());
        if values.is_empty() {
            return None;
        }
        H::decode(values).ok()
    }

    /// Replaces all values of a typed header with its encoding.
    pub fn set_typed<H: TypedHeader>(&mut self, header: &H) {
        let name = lowercase(H::name()).into_owned();
        self.0.insert(name, header.encode_to_vec());
    }

    /// Appends the encoding of a typed header.
    pub fn add_typed<H: TypedHeader>(&mut self, header: &H) {
        for value in header.encode_to_vec() {
            self.add(H::name(), value);
        }
    }

    /// An iterator visiting every name-value pair.
    ///
    /// Values of one name are visited in order, names in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().flat_map(|(name, values)| {
            values
                .iter()
                .map(move |value| (name.as_str(), value.as_str()))
        })
    }
}

impl Deref for Header {
    type Target = RawHeader;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<RawHeader> for Header {
    fn as_ref(&self) -> &RawHeader {
        &self.0
    }
}

impl TryFrom<RawHeader> for Header {
    type Error = CollisionError;

    /// Takes ownership of `raw` and lower-cases its names in place.
    fn try_from(mut raw: RawHeader) -> Result<Self, Self::Error> {
        normalize_keys(&mut raw)?;
        Ok(Self(raw))
    }
}

impl From<Header> for RawHeader {
    fn from(value: Header) -> Self {
        value.0
    }
}

impl<K: AsRef<str>, V: Into<String>> Extend<(K, V)> for Header {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.add(name, value);
        }
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Header {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut out = Self::default();
        out.extend(iter);
        out
    }
}

impl Index<&str> for Header {
    type Output = str;

    fn index(&self, index: &str) -> &Self::Output {
        self.values(index)
            .first()
            .map(String::as_str)
            .expect("header missing")
    }
}

impl IntoIterator for Header {
    type Item = (String, Vec<String>);

    type IntoIter = std::collections::hash_map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Header {
    type Item = (&'a String, &'a Vec<String>);

    type IntoIter = std::collections::hash_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Error, Debug)]
pub enum HeaderConvertError {
    #[error("header value not utf8: '{0}'")]
    Utf8(#[from] ToStrError),
    #[error("invalid header name: '{0}'")]
    InvalidName(#[from] InvalidHeaderName),
    #[error("invalid header value: '{0}'")]
    InvalidValue(#[from] InvalidHeaderValue),
}

impl TryFrom<&http::HeaderMap> for Header {
    type Error = HeaderConvertError;

    fn try_from(value: &http::HeaderMap) -> Result<Self, Self::Error> {
        let mut out = Self::with_capacity(value.keys_len());
        for (name, value) in value.iter() {
            out.add(name.as_str(), value.to_str()?);
        }
        Ok(out)
    }
}

impl TryFrom<http::HeaderMap> for Header {
    type Error = HeaderConvertError;

    fn try_from(value: http::HeaderMap) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

impl TryFrom<Header> for http::HeaderMap {
    type Error = HeaderConvertError;

    fn try_from(value: Header) -> Result<Self, Self::Error> {
        let mut out = http::HeaderMap::with_capacity(value.len());
        for (name, values) in value {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            for value in values {
                out.append(&name, HeaderValue::from_str(&value)?);
            }
        }
        Ok(out)
    }
}
