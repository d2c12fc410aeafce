//! Protocol calls against an httpmock stand-in for the ADT server.

use std::time::Duration;

use adtsync_client::{
    AdtError, AdtSession, CsrfToken, Credentials, ETag, Operation, SessionOptions,
};
use adtsync_core::{ActivationProtocol, TransportRequest};
use httpmock::prelude::*;
use url::Url;

const SOURCE_PATH: &str = "/sap/bc/adt/programs/programs/Z_TEST1/source/main";
// base64("DEVELOPER:secret")
const AUTH: &str = "Basic REVWRUxPUEVSOnNlY3JldA==";

fn session() -> AdtSession {
    AdtSession::new(
        &Credentials::new("DEVELOPER", "secret"),
        &SessionOptions {
            client: "001".to_string(),
            insecure: false,
            timeout: Duration::from_secs(5),
        },
    )
    .expect("session")
}

fn source_url(server: &MockServer) -> Url {
    Url::parse(&server.url(SOURCE_PATH)).expect("url")
}

fn token() -> CsrfToken {
    CsrfToken("tok-123".to_string())
}

fn transport() -> TransportRequest {
    TransportRequest::parse("DEVK900123").expect("corrnr")
}

// ---------------------------------------------------------------------------
// fetch
// ---------------------------------------------------------------------------

#[test]
fn fetch_returns_text_and_etag() {
    let server = MockServer::start();
    let get = server.mock(|when, then| {
        when.method(GET)
            .path(SOURCE_PATH)
            .header("sap-client", "001")
            .header("accept", "text/plain, */*")
            .header("authorization", AUTH);
        then.status(200)
            .header("ETag", "20240101120000001")
            .body("REPORT z_test1.\n");
    });

    let source = session().fetch_source(&source_url(&server)).expect("fetch");
    get.assert();
    assert_eq!(source.text, "REPORT z_test1.\n");
    assert_eq!(source.etag, Some(ETag("20240101120000001".to_string())));
}

#[test]
fn fetch_without_etag_yields_none() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(SOURCE_PATH);
        then.status(200).body("REPORT z_test1.");
    });

    let source = session().fetch_source(&source_url(&server)).expect("fetch");
    assert!(source.etag.is_none());
}

#[test]
fn fetch_not_found_carries_status_and_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(SOURCE_PATH);
        then.status(404).body("Resource Z_TEST1 does not exist");
    });

    let err = session().fetch_source(&source_url(&server)).unwrap_err();
    match &err {
        AdtError::Status {
            operation, status, body, ..
        } => {
            assert_eq!(*operation, Operation::Fetch);
            assert_eq!(*status, 404);
            assert!(body.contains("does not exist"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(err.to_string().starts_with("GET failed 404"));
}

#[test]
fn fetch_against_closed_port_is_a_transport_error() {
    let url = Url::parse("http://127.0.0.1:1/sap/bc/adt/programs/programs/Z/source/main")
        .expect("url");
    let err = session().fetch_source(&url).unwrap_err();
    assert!(matches!(err, AdtError::Transport { .. }), "got: {err}");
}

#[test]
fn error_body_is_truncated() {
    let server = MockServer::start();
    let long = "x".repeat(10_000);
    server.mock(|when, then| {
        when.method(GET).path(SOURCE_PATH);
        then.status(500).body(long.as_str());
    });

    match session().fetch_source(&source_url(&server)).unwrap_err() {
        AdtError::Status { body, .. } => assert_eq!(body.chars().count(), 4000),
        other => panic!("expected status error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// CSRF token
// ---------------------------------------------------------------------------

#[test]
fn csrf_token_is_read_from_response_header() {
    let server = MockServer::start();
    let fetch = server.mock(|when, then| {
        when.method(GET)
            .path(SOURCE_PATH)
            .header("x-csrf-token", "Fetch");
        then.status(200).header("x-csrf-token", "tok-abc").body("");
    });

    let token = session()
        .fetch_csrf_token(&source_url(&server))
        .expect("token");
    fetch.assert();
    assert_eq!(token, CsrfToken("tok-abc".to_string()));
}

#[test]
fn missing_csrf_header_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(SOURCE_PATH);
        then.status(200).body("REPORT z_test1.");
    });

    let err = session()
        .fetch_csrf_token(&source_url(&server))
        .unwrap_err();
    assert!(matches!(err, AdtError::MissingCsrfToken { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// write
// ---------------------------------------------------------------------------

#[test]
fn write_sends_etag_token_and_transport() {
    let server = MockServer::start();
    let put = server.mock(|when, then| {
        when.method(PUT)
            .path(SOURCE_PATH)
            .query_param("corrNr", "DEVK900123")
            .header("x-csrf-token", "tok-123")
            .header("if-match", "etag-1")
            .header("content-type", "text/plain; charset=utf-8")
            .body("REPORT z_test1.\n");
        then.status(200);
    });

    let written = session()
        .write_source(
            &source_url(&server),
            "REPORT z_test1.\n",
            &token(),
            Some(&ETag("etag-1".to_string())),
            &transport(),
        )
        .expect("write");
    put.assert();
    assert_eq!(written.query(), Some("corrNr=DEVK900123"));
}

#[test]
fn write_without_etag_uses_wildcard() {
    let server = MockServer::start();
    let put = server.mock(|when, then| {
        when.method(PUT).path(SOURCE_PATH).header("if-match", "*");
        then.status(204);
    });

    session()
        .write_source(&source_url(&server), "x", &token(), None, &transport())
        .expect("write");
    put.assert();
}

#[test]
fn stale_etag_fails_every_time_with_conflict_text() {
    let server = MockServer::start();
    let put = server.mock(|when, then| {
        when.method(PUT).path(SOURCE_PATH).header("if-match", "stale");
        then.status(412)
            .header("content-type", "application/xml")
            .body("<exc:message>Z_TEST1 is locked in request DEVK900777 of user OTHER</exc:message>");
    });

    let stale = ETag("stale".to_string());
    for _ in 0..2 {
        let err = session()
            .write_source(&source_url(&server), "x", &token(), Some(&stale), &transport())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("PUT failed 412"), "got: {msg}");
        assert!(msg.contains("locked in request DEVK900777"));
        assert!(msg.contains("Response headers:"));
    }
    put.assert_calls(2);
}

// ---------------------------------------------------------------------------
// activation
// ---------------------------------------------------------------------------

#[test]
fn direct_activation_posts_to_object_activation_endpoint() {
    let server = MockServer::start();
    let post = server.mock(|when, then| {
        when.method(POST)
            .path("/sap/bc/adt/programs/programs/Z_TEST1/activation")
            .query_param("corrNr", "DEVK900123")
            .header("x-csrf-token", "tok-123")
            .header("accept", "application/vnd.sap.adt.errors+xml");
        then.status(200);
    });

    session()
        .activate(
            &source_url(&server),
            &token(),
            &transport(),
            ActivationProtocol::Direct,
        )
        .expect("activate");
    post.assert();
}

#[test]
fn service_activation_posts_object_reference_envelope() {
    let server = MockServer::start();
    let post = server.mock(|when, then| {
        when.method(POST)
            .path("/sap/bc/adt/activation")
            .query_param("method", "activate")
            .query_param("corrNr", "DEVK900123")
            .header("x-csrf-token", "tok-123")
            .header(
                "content-type",
                "application/vnd.sap.adt.core.objectreferences+xml; charset=utf-8",
            )
            .body_includes("adtcore:uri=\"/sap/bc/adt/programs/programs/Z_TEST1\"");
        then.status(200);
    });

    let mut url = source_url(&server);
    url.set_query(Some("version=inactive"));
    let target = session()
        .activate(&url, &token(), &transport(), ActivationProtocol::Service)
        .expect("activate");
    post.assert();
    assert_eq!(target.path(), "/sap/bc/adt/activation");
}

#[test]
fn activation_failure_names_target_url() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/sap/bc/adt/activation");
        then.status(500).body("syntax error in line 3");
    });

    let err = session()
        .activate(
            &source_url(&server),
            &token(),
            &transport(),
            ActivationProtocol::Service,
        )
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("ACTIVATION failed 500"), "got: {msg}");
    assert!(msg.contains("/sap/bc/adt/activation?method=activate&corrNr=DEVK900123"));
    assert!(msg.contains("syntax error in line 3"));
    assert!(!msg.contains("Response headers:"));
}
