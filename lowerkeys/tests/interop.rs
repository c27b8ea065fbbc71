use lowerkeys::{
    http::{self, HeaderValue},
    typed_headers::{ContentLength, ContentType},
    Header, HeaderConvertError,
};

mod common;
use common::*;

#[test]
fn from_http_header_map() {
    let mut map = http::HeaderMap::new();
    map.append("accept", HeaderValue::from_static("text/html"));
    map.append("accept", HeaderValue::from_static("text/plain"));
    map.insert("host", HeaderValue::from_static("example.com"));

    let header = Header::try_from(&map).unwrap();
    assert_eq!(header.values("ACCEPT"), ["text/html", "text/plain"]);
    assert_eq!(header.get("host"), "example.com");
    assert_eq!(header.len(), 2);
}

#[test]
fn from_http_header_map_non_utf8() {
    let mut map = http::HeaderMap::new();
    map.insert("x-bytes", HeaderValue::from_bytes(&[0xfa, 0xfb]).unwrap());

    assert!(matches!(
        Header::try_from(map),
        Err(HeaderConvertError::Utf8(_))
    ));
}

#[test]
fn into_http_header_map() {
    let header = Header::try_from(raw([
        ("Accept", vec!["text/html", "text/plain"]),
        ("Host", vec!["example.com"]),
    ]))
    .unwrap();

    let map = http::HeaderMap::try_from(header).unwrap();
    let accept = map
        .get_all("accept")
        .iter()
        .map(|x| x.to_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(accept, ["text/html", "text/plain"]);
    assert_eq!(map.get("host").unwrap(), "example.com");
}

#[test]
fn into_http_header_map_invalid() {
    let mut header = Header::new();
    header.add("bad name", "value");
    assert!(matches!(
        http::HeaderMap::try_from(header),
        Err(HeaderConvertError::InvalidName(_))
    ));

    let mut header = Header::new();
    header.add("x-bad-value", "line\nbreak");
    assert!(matches!(
        http::HeaderMap::try_from(header),
        Err(HeaderConvertError::InvalidValue(_))
    ));
}

#[test]
fn typed_headers() {
    let mut header = Header::new();
    header.add("Content-Type", "text/plain");
    header.set_typed(&ContentType::json());
    header.add_typed(&ContentLength(3));

    assert_eq!(header.values("content-type"), ["application/json"]);
    assert_eq!(header.get("Content-Length"), "3");
    assert_eq!(header.get_typed::<ContentType>(), Some(ContentType::json()));
    assert_eq!(header.get_typed::<ContentLength>(), Some(ContentLength(3)));

    header.set("content-length", "not a number");
    assert_eq!(header.get_typed::<ContentLength>(), None);
    header.del("content-length");
    assert_eq!(header.get_typed::<ContentLength>(), None);
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip_normalizes() {
    init_logging();
    let header: Header =
        serde_json::from_str(r#"{"Content-Type":["foo"],"X-Multi":["a","b"]}"#).unwrap();
    assert_eq!(header.get("content-type"), "foo");
    assert_eq!(header.values("x-multi"), ["a", "b"]);
    assert!(!header.as_ref().contains_key("Content-Type"));

    let json = serde_json::to_value(&header).unwrap();
    assert_eq!(json["x-multi"], serde_json::json!(["a", "b"]));
}

#[cfg(feature = "serde")]
#[test]
fn serde_rejects_collisions() {
    let err = serde_json::from_str::<Header>(r#"{"Content-Type":["foo"],"cOnTenT-tYpE":["bar"]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("identical lower-case representation"));
}

#[cfg(feature = "otel")]
#[test]
fn otel_propagation() {
    use opentelemetry_api::propagation::{Extractor, Injector};

    let mut header = Header::new();
    Injector::set(&mut header, "TraceParent", "00-abc-def-01".to_string());
    Injector::set(&mut header, "traceparent", "00-123-456-01".to_string());

    assert_eq!(header.values("traceparent"), ["00-123-456-01"]);
    assert_eq!(Extractor::get(&header, "TRACEPARENT"), Some("00-123-456-01"));
    assert_eq!(Extractor::get(&header, "tracestate"), None);
    assert_eq!(Extractor::keys(&header), ["traceparent"]);
}
