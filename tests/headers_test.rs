use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use nexusnet::base::neterror::NetError;
use nexusnet::http::orderedheaders::OrderedHeaderMap;
use nexusnet::{HttpResponse, Request};
use url::Url;

#[test]
fn test_ordered_headers_insertion_order() {
    let mut map = OrderedHeaderMap::new();

    map.insert("Host", "example.com").unwrap();
    map.insert("Connection", "keep-alive").unwrap();
    map.insert("User-Agent", "Nexus/1.0").unwrap();
    map.insert("Accept", "*/*").unwrap();

    let names: Vec<_> = map.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["host", "connection", "user-agent", "accept"]);

    let header_map = map.to_header_map();
    let mut iter = header_map.iter();
    assert_eq!(iter.next().unwrap().0, "host");
    assert_eq!(iter.next().unwrap().0, "connection");
    assert_eq!(iter.next().unwrap().0, "user-agent");
    assert_eq!(iter.next().unwrap().0, "accept");
}

#[test]
fn test_ordered_headers_update_preserves_order() {
    let mut map = OrderedHeaderMap::new();

    map.insert("A", "1").unwrap();
    map.insert("B", "2").unwrap();
    map.insert("C", "3").unwrap();

    // Update B
    map.insert("B", "22").unwrap();

    let entries: Vec<_> = map
        .iter()
        .map(|(n, v)| (n.as_str(), v.to_str().unwrap()))
        .collect();
    assert_eq!(entries, [("a", "1"), ("b", "22"), ("c", "3")]);
}

#[test]
fn test_insert_collapses_duplicates() {
    let mut map = OrderedHeaderMap::new();
    map.append("X", "1").unwrap();
    map.append("Y", "y").unwrap();
    map.append("X", "2").unwrap();

    map.insert("x", "3").unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get_str("X"), Some("3"));
    assert_eq!(map.iter().next().unwrap().0, "x");
}

#[test]
fn test_set_cookie_values_kept_apart() {
    let mut map = OrderedHeaderMap::new();
    map.append("Set-Cookie", "a=1").unwrap();
    map.append("Set-Cookie", "b=2").unwrap();

    let values: Vec<_> = map
        .get_all("set-cookie")
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(values, ["a=1", "b=2"]);
}

#[test]
fn test_from_header_map_keeps_repeated_values() {
    let mut raw = HeaderMap::new();
    raw.append("set-cookie", "a=1".parse().unwrap());
    raw.append("set-cookie", "b=2".parse().unwrap());
    raw.append("content-type", "text/html".parse().unwrap());

    let map = OrderedHeaderMap::from(raw);
    assert_eq!(map.len(), 3);
    assert_eq!(map.get_all("set-cookie").count(), 2);
    assert_eq!(map.get_str("Content-Type"), Some("text/html"));
}

#[test]
fn test_remove_and_contains() {
    let mut map = OrderedHeaderMap::new();
    map.append("Authorization", "Bearer t").unwrap();
    map.append("Cookie", "a=1").unwrap();
    assert!(map.contains("authorization"));

    map.remove("AUTHORIZATION");
    assert!(!map.contains("authorization"));
    assert_eq!(map.len(), 1);

    // Unparseable names are simply absent.
    map.remove("bad name");
    assert!(!map.contains("bad name"));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_invalid_header_rejected() {
    let mut map = OrderedHeaderMap::new();
    assert_eq!(map.insert("bad name", "v"), Err(NetError::InvalidHeader));
    assert_eq!(map.append("ok", "line\nbreak"), Err(NetError::InvalidHeader));
    assert!(map.is_empty());
}

#[test]
fn test_request_header_order_survives_prepare() {
    let prepared = Request::get("https://example.com/")
        .header("X-First", "1")
        .header("Accept", "text/html")
        .header("X-Last", "2")
        .prepare()
        .unwrap();

    let names: Vec<_> = prepared.headers.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["x-first", "accept", "x-last"]);
}

#[test]
fn test_response_header_lookup_is_case_insensitive() {
    let mut headers = OrderedHeaderMap::new();
    headers.append("Content-Type", "application/json").unwrap();
    let resp = HttpResponse::new(
        StatusCode::OK,
        headers,
        Bytes::from_static(b"[]"),
        Url::parse("https://example.com/").unwrap(),
    );

    assert_eq!(resp.header("content-type"), Some("application/json"));
    assert_eq!(resp.header("CONTENT-TYPE"), Some("application/json"));
    assert_eq!(resp.header("x-missing"), None);
}
