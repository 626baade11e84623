use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::executor::block_on;

use super::*;
use crate::net::types::UserRecord;
use crate::session::store::{CredentialRecord, CredentialStore, MemoryStore};

// =============================================================
// Test transport
// =============================================================

/// Plays back a scripted sequence of raw responses and records every request
/// it saw.
#[derive(Default)]
struct ScriptedTransport {
    script: RefCell<VecDeque<Result<RawResponse, String>>>,
    seen: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn respond(status: u16, body: &str) -> Rc<Self> {
        let transport = Rc::new(Self::default());
        transport.push(Ok(RawResponse {
            status,
            status_text: String::new(),
            body: body.to_owned(),
        }));
        transport
    }

    fn offline() -> Rc<Self> {
        let transport = Rc::new(Self::default());
        transport.push(Err("connection refused".to_owned()));
        transport
    }

    fn push(&self, outcome: Result<RawResponse, String>) {
        self.script.borrow_mut().push_back(outcome);
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.seen.borrow().clone()
    }
}

impl HttpTransport for Rc<ScriptedTransport> {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, String> {
        self.seen.borrow_mut().push(request);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_owned()))
    }
}

fn test_user() -> UserRecord {
    serde_json::from_value(serde_json::json!({"id": 1, "email": "a@b.com"})).unwrap()
}

fn signed_in_store() -> Rc<MemoryStore> {
    Rc::new(MemoryStore::new(CredentialRecord::signed_in(
        "t1",
        Some("r1".to_owned()),
        test_user(),
    )))
}

fn gateway(
    transport: &Rc<ScriptedTransport>,
    store: &Rc<MemoryStore>,
) -> Gateway<Rc<ScriptedTransport>> {
    Gateway::new("/api/v1", transport.clone(), store.clone())
}

// =============================================================
// interpret_response: success shapes
// =============================================================

#[test]
fn flat_success_body_passes_through() {
    let value = interpret_response(200, "OK", r#"{"id": 1, "name": "Unit 4B"}"#).unwrap();
    assert_eq!(value, serde_json::json!({"id": 1, "name": "Unit 4B"}));
}

#[test]
fn enveloped_success_unwraps_data() {
    let value =
        interpret_response(200, "OK", r#"{"success": true, "data": {"id": 1}}"#).unwrap();
    assert_eq!(value, serde_json::json!({"id": 1}));
}

#[test]
fn envelope_without_boolean_success_is_flat() {
    // `success` as a string is not the envelope; don't guess.
    let value = interpret_response(200, "OK", r#"{"success": "yes", "data": 1}"#).unwrap();
    assert_eq!(value, serde_json::json!({"success": "yes", "data": 1}));
}

#[test]
fn empty_success_body_decodes_as_null() {
    let value = interpret_response(204, "No Content", "").unwrap();
    assert!(value.is_null());
}

#[test]
fn enveloped_failure_on_ok_status_is_an_error() {
    let err = interpret_response(
        200,
        "OK",
        r#"{"success": false, "error": {"code": "E_RATE", "message": "slow down"}}"#,
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unknown);
    assert_eq!(err.message, "slow down");
}

// =============================================================
// interpret_response: HTTP errors
// =============================================================

#[test]
fn http_status_selects_error_kind() {
    let cases = [
        (401, ErrorKind::Unauthorized),
        (403, ErrorKind::Forbidden),
        (404, ErrorKind::NotFound),
        (422, ErrorKind::Validation),
        (500, ErrorKind::ServerError),
        (502, ErrorKind::ServerError),
        (409, ErrorKind::Unknown),
    ];
    for (status, kind) in cases {
        let err = interpret_response(status, "err", "{}").unwrap_err();
        assert_eq!(err.kind, kind, "status {status}");
    }
}

#[test]
fn error_message_comes_from_body_message_field() {
    let err =
        interpret_response(422, "Unprocessable", r#"{"message": "email taken"}"#).unwrap_err();
    assert_eq!(err.message, "email taken");
}

#[test]
fn error_message_falls_back_to_error_field_then_status_text() {
    let err = interpret_response(404, "Not Found", r#"{"error": "gone"}"#).unwrap_err();
    assert_eq!(err.message, "gone");

    let err = interpret_response(404, "Not Found", "{}").unwrap_err();
    assert_eq!(err.message, "Not Found");
}

#[test]
fn blank_status_text_falls_back_to_kind_copy() {
    let err = interpret_response(500, "", "{}").unwrap_err();
    assert_eq!(err.message, ErrorKind::ServerError.user_message());
}

#[test]
fn enveloped_error_carries_message_and_details() {
    let err = interpret_response(
        422,
        "Unprocessable",
        r#"{"success": false, "error": {"code": "E_VAL", "message": "bad phone", "details": {"phone": ["too short"]}}}"#,
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "bad phone");
    assert_eq!(err.details, Some(serde_json::json!({"phone": ["too short"]})));
}

#[test]
fn enveloped_error_without_details_surfaces_code() {
    let err = interpret_response(
        403,
        "Forbidden",
        r#"{"success": false, "error": {"code": "E_ROLE", "message": "no"}}"#,
    )
    .unwrap_err();
    assert_eq!(err.details, Some(serde_json::json!("E_ROLE")));
}

// =============================================================
// interpret_response: malformed bodies
// =============================================================

#[test]
fn unparseable_body_is_malformed_regardless_of_status() {
    for status in [200, 401, 500] {
        let err = interpret_response(status, "x", "<html>nope</html>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedResponse, "status {status}");
    }
}

#[test]
fn malformed_details_keep_a_truncated_snippet() {
    let body = format!("<html>{}</html>", "x".repeat(1000));
    let err = interpret_response(200, "OK", &body).unwrap_err();
    let details = err.details.unwrap();
    let snippet = details["body"].as_str().unwrap();
    assert!(snippet.starts_with("<html>"));
    assert!(snippet.chars().count() <= 257); // 256 + ellipsis
    assert!(snippet.ends_with('…'));
    assert_eq!(details["status"], 200);
}

#[test]
fn short_malformed_body_is_kept_whole() {
    let err = interpret_response(200, "OK", "not json").unwrap_err();
    assert_eq!(err.details.unwrap()["body"], "not json");
}

// =============================================================
// Gateway: token attachment
// =============================================================

#[test]
fn bearer_requests_carry_the_stored_token() {
    let transport = ScriptedTransport::respond(200, "{}");
    let store = signed_in_store();
    let gw = gateway(&transport, &store);

    block_on(gw.request(Method::Get, "/accounts/profile/me/", None, Auth::Bearer)).unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].bearer.as_deref(), Some("t1"));
    assert_eq!(requests[0].url, "/api/v1/accounts/profile/me/");
    assert_eq!(requests[0].method, Method::Get);
}

#[test]
fn anonymous_requests_never_carry_a_token() {
    let transport = ScriptedTransport::respond(200, "{}");
    let store = signed_in_store();
    let gw = gateway(&transport, &store);

    block_on(gw.request(Method::Post, "/auth/login/", None, Auth::Anonymous)).unwrap();

    assert_eq!(transport.requests()[0].bearer, None);
}

// =============================================================
// Gateway: outcome normalization
// =============================================================

#[test]
fn transport_failure_is_network_unavailable() {
    let transport = ScriptedTransport::offline();
    let store = Rc::new(MemoryStore::default());
    let gw = gateway(&transport, &store);

    let err = block_on(gw.request(Method::Get, "/x", None, Auth::Anonymous)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NetworkUnavailable);
    assert_eq!(err.message, "connection refused");
}

#[test]
fn request_as_decodes_typed_values() {
    let transport = ScriptedTransport::respond(
        200,
        r#"{"success": true, "data": {"id": 3, "email": "t@x.com"}}"#,
    );
    let store = Rc::new(MemoryStore::default());
    let gw = gateway(&transport, &store);

    let user: UserRecord =
        block_on(gw.request_as(Method::Get, "/accounts/profile/me/", None, Auth::Anonymous))
            .unwrap();
    assert_eq!(user.id, serde_json::json!(3));
}

#[test]
fn request_as_rejects_mismatched_payloads() {
    // UserRecord requires an id.
    let transport = ScriptedTransport::respond(200, r#"{"email": "t@x.com"}"#);
    let store = Rc::new(MemoryStore::default());
    let gw = gateway(&transport, &store);

    let err = block_on(gw.request_as::<UserRecord>(
        Method::Get,
        "/accounts/profile/me/",
        None,
        Auth::Anonymous,
    ))
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedResponse);
}

// =============================================================
// Gateway: global session expiry
// =============================================================

#[test]
fn unauthorized_from_any_endpoint_clears_the_store() {
    // Scenario D: the 401 comes from a plain business endpoint.
    let transport = ScriptedTransport::respond(401, r#"{"message": "token expired"}"#);
    let store = signed_in_store();
    let gw = gateway(&transport, &store);

    let err =
        block_on(gw.request(Method::Get, "/properties/", None, Auth::Bearer)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(store.get(), CredentialRecord::empty());
}

#[test]
fn expiry_fires_the_registered_handler() {
    let transport = ScriptedTransport::respond(401, "{}");
    let store = signed_in_store();
    let gw = gateway(&transport, &store);

    let fired = Rc::new(Cell::new(0));
    let fired_in_handler = fired.clone();
    gw.set_session_expired_handler(move || fired_in_handler.set(fired_in_handler.get() + 1));

    let _ = block_on(gw.request(Method::Get, "/properties/", None, Auth::Bearer));
    assert_eq!(fired.get(), 1);
}

#[test]
fn expiry_is_idempotent_across_concurrent_failures() {
    // Two in-flight requests can both observe 401; both run the procedure.
    let transport = ScriptedTransport::respond(401, "{}");
    transport.push(Ok(RawResponse {
        status: 401,
        status_text: String::new(),
        body: "{}".to_owned(),
    }));
    let store = signed_in_store();
    let gw = gateway(&transport, &store);

    let fired = Rc::new(Cell::new(0));
    let fired_in_handler = fired.clone();
    gw.set_session_expired_handler(move || fired_in_handler.set(fired_in_handler.get() + 1));

    let _ = block_on(gw.request(Method::Get, "/a", None, Auth::Bearer));
    let _ = block_on(gw.request(Method::Get, "/b", None, Auth::Bearer));

    // The store stays empty and the handler tolerates the repeat.
    assert_eq!(store.get(), CredentialRecord::empty());
    assert_eq!(fired.get(), 2);
}

#[test]
fn non_401_failures_leave_the_store_alone() {
    for (status, body) in [(500, "{}"), (403, "{}"), (422, "{}")] {
        let transport = ScriptedTransport::respond(status, body);
        let store = signed_in_store();
        let gw = gateway(&transport, &store);

        let _ = block_on(gw.request(Method::Get, "/x", None, Auth::Bearer));
        assert!(store.get().is_authenticated(), "status {status}");
    }
}

#[test]
fn network_failure_leaves_the_store_alone() {
    let transport = ScriptedTransport::offline();
    let store = signed_in_store();
    let gw = gateway(&transport, &store);

    let _ = block_on(gw.request(Method::Get, "/x", None, Auth::Bearer));
    assert!(store.get().is_authenticated());
}
