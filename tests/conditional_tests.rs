//! Conditional request handling through the full pipeline
//!
//! Covers ETag quoting, `If-Match` / `If-None-Match`, `If-Modified-Since` /
//! `If-Unmodified-Since` and the `Content-MD5` body check.

mod common;

use std::time::{Duration, UNIX_EPOCH};

use common::fixtures::{self, LAST_MODIFIED_HTTP};
use common::http_helpers::{get, header, json_body, request};
use http::header::HeaderValue;
use http::{Method, StatusCode};
use resource_dispatch::resource::{
    EtagProvider, Handler, LastModifiedProvider, Reply, ResourceType,
};
use resource_dispatch::Dispatcher;
use serde_json::json;

fn dispatcher() -> Dispatcher {
    Dispatcher::from_resources(vec![fixtures::document(), fixtures::upload()]).unwrap()
}

#[test]
fn test_etag_embedded_quotes_are_stripped() {
    let res = ResourceType::new("Quoted", "/q")
        .etag(EtagProvider::new(|_| Ok(Some("a\"b\"c".to_string()))))
        .handler(Method::GET, Handler::new(|_| Ok(Reply::new("x"))));
    let d = Dispatcher::from_resources(vec![res]).unwrap();
    assert_eq!(header(&d.handle(get("/q")), "etag"), Some("\"abc\""));
}

#[test]
fn test_empty_etag_is_absent() {
    let res = ResourceType::new("Blank", "/b")
        .etag(EtagProvider::new(|_| Ok(Some(String::new()))))
        .handler(Method::GET, Handler::new(|_| Ok(Reply::new("x"))));
    let d = Dispatcher::from_resources(vec![res]).unwrap();
    let out = d.handle(request("GET", "/b", &[("if-match", "\"nope\"")], b""));
    assert_eq!(out.status(), StatusCode::OK);
    assert!(out.headers().get("etag").is_none());
}

#[test]
fn test_if_none_match_on_get_is_304() {
    let res = dispatcher().handle(request("GET", "/docs/7", &[("if-none-match", "\"doc-7\"")], b""));
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    assert!(res.body().is_empty());
    assert_eq!(header(&res, "etag"), Some("\"doc-7\""));
    assert_eq!(header(&res, "last-modified"), Some(LAST_MODIFIED_HTTP));
}

#[test]
fn test_if_none_match_list_and_weak_tags() {
    let d = dispatcher();
    let res = d.handle(request("GET", "/docs/7", &[("if-none-match", "\"x\", W/\"doc-7\"")], b""));
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);

    let res = d.handle(request("GET", "/docs/7", &[("if-none-match", "*")], b""));
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);

    let res = d.handle(request("GET", "/docs/7", &[("if-none-match", "\"doc-8\"")], b""));
    assert_eq!(res.status(), StatusCode::OK);
}

#[test]
fn test_if_none_match_on_put_is_412() {
    let res = dispatcher().handle(request("PUT", "/docs/7", &[("if-none-match", "\"doc-7\"")], b""));
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(json_body(&res), json!({ "error": "Precondition failed" }));
    assert_eq!(header(&res, "etag"), Some("\"doc-7\""));
}

#[test]
fn test_if_match() {
    let d = dispatcher();
    let res = d.handle(request("PUT", "/docs/7", &[("if-match", "\"doc-1\"")], b""));
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);

    let res = d.handle(request("PUT", "/docs/7", &[("if-match", "\"doc-1\", \"doc-7\"")], b""));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res), json!({ "stored": "7" }));

    let res = d.handle(request("PUT", "/docs/7", &[("if-match", "*")], b""));
    assert_eq!(res.status(), StatusCode::OK);
}

#[test]
fn test_date_checks_run_only_without_etag_decision() {
    // a matching If-Match decides nothing, so If-Unmodified-Since still applies
    let res = dispatcher().handle(request(
        "PUT",
        "/docs/7",
        &[
            ("if-match", "\"doc-7\""),
            ("if-unmodified-since", "Sat, 05 Nov 1994 08:49:37 GMT"),
        ],
        b"",
    ));
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);

    // a 304 from the ETag wins even when the date says modified
    let res = dispatcher().handle(request(
        "GET",
        "/docs/7",
        &[
            ("if-none-match", "\"doc-7\""),
            ("if-modified-since", "Sat, 05 Nov 1994 08:49:37 GMT"),
        ],
        b"",
    ));
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
}

fn dated() -> Dispatcher {
    let res = ResourceType::new("Dated", "/dated")
        .last_modified(LastModifiedProvider::new(|_| Ok(Some(fixtures::last_modified()))))
        .handler(Method::GET, Handler::new(|_| Ok(Reply::new("x"))))
        .handler(Method::PUT, Handler::new(|_| Ok(Reply::new("y"))));
    Dispatcher::from_resources(vec![res]).unwrap()
}

#[test]
fn test_if_unmodified_since_earlier_is_412() {
    let res = dated().handle(request(
        "PUT",
        "/dated",
        &[("if-unmodified-since", "Sat, 05 Nov 1994 08:49:37 GMT")],
        b"",
    ));
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(header(&res, "last-modified"), Some(LAST_MODIFIED_HTTP));
    assert!(res.headers().get("etag").is_none());

    let res = dated().handle(request("PUT", "/dated", &[("if-unmodified-since", LAST_MODIFIED_HTTP)], b""));
    assert_eq!(res.status(), StatusCode::OK);
}

#[test]
fn test_if_modified_since() {
    let d = dated();
    let res = d.handle(request("GET", "/dated", &[("if-modified-since", LAST_MODIFIED_HTTP)], b""));
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    assert!(res.body().is_empty());

    let res = d.handle(request(
        "GET",
        "/dated",
        &[("if-modified-since", "Sat, 05 Nov 1994 08:49:37 GMT")],
        b"",
    ));
    assert_eq!(res.status(), StatusCode::OK);

    // unparsable dates are ignored
    let res = d.handle(request("GET", "/dated", &[("if-modified-since", "yesterday")], b""));
    assert_eq!(res.status(), StatusCode::OK);
}

#[test]
fn test_sub_second_last_modified() {
    let res = ResourceType::new("Precise", "/p")
        .last_modified(LastModifiedProvider::new(|_| {
            Ok(Some(UNIX_EPOCH + Duration::from_millis(784_111_777_250)))
        }))
        .handler(Method::GET, Handler::new(|_| Ok(Reply::new("x"))));
    let d = Dispatcher::from_resources(vec![res]).unwrap();
    let out = d.handle(request("GET", "/p", &[("if-modified-since", LAST_MODIFIED_HTTP)], b""));
    assert_eq!(out.status(), StatusCode::NOT_MODIFIED);
}

#[test]
fn test_content_md5_mismatch_is_400() {
    let res = dispatcher().handle(request("POST", "/upload", &[("content-md5", "deadbeef")], b"hello"));
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(&res),
        json!({ "error": "The Content-MD5 request header does not match the body." })
    );
}

#[test]
fn test_content_md5_non_text_value_is_400() {
    let req = http::Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-md5", HeaderValue::from_bytes(b"\xe9deadbeef").unwrap())
        .body(b"hello".to_vec())
        .unwrap();
    let res = dispatcher().handle(req);
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(&res),
        json!({ "error": "The Content-MD5 request header does not match the body." })
    );
}

#[test]
fn test_content_md5_match_proceeds() {
    let d = dispatcher();
    let res = d.handle(request(
        "POST",
        "/upload",
        &[("content-md5", "5d41402abc4b2a76b9719d911017c592")],
        b"hello",
    ));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res), json!({ "size": 5 }));

    let res = d.handle(request("POST", "/upload", &[("content-md5", "XUFAKrxLKna5cZ2REBfFkg==")], b"hello"));
    assert_eq!(res.status(), StatusCode::OK);
}

#[test]
fn test_md5_check_runs_after_method_resolution() {
    let res = dispatcher().handle(request("DELETE", "/upload", &[("content-md5", "deadbeef")], b"x"));
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(header(&res, "allow"), Some("POST"));
}
