//! HTTP header maps that keep every header name in lower-case.
//!
//! [`Header`] behaves like an ordinary multi-value header map, except that each
//! name is folded to ASCII lower-case on the way in, as HTTP/2 requires.

pub mod header;

pub use header::{
    lowercase, CollisionError, Header, HeaderConvertError, RawHeader, TypedHeader,
};

/// re-export source crate
pub use http;

pub use headers as typed_headers;
