//! Request building and reply handling over real HTTP.

mod support;

use std::time::Duration;

use axum::http::Method;
use radsnap::{ConnectionConfig, HttpVerb, RadClient, RadError, RequestSpec};
use serde_json::{json, Value};
use support::{closed_port, MockServer, URL_PATH};

async fn client_for(server: &MockServer) -> RadClient {
    RadClient::builder()
        .config(server.config())
        .connect()
        .await
        .expect("connect without check")
}

#[tokio::test]
async fn call_posts_quoted_method_with_positional_args() {
    let server = MockServer::start(&[("%22Echo%22/1/bar/True", r#"{"result":["hello"]}"#)]);
    let client = client_for(&server).await;

    let value = client
        .call(RequestSpec::new("Echo").arg(1).arg("bar").arg(true))
        .await
        .expect("echo succeeds");

    assert_eq!(value, Value::String("hello".to_string()));
    let request = server.last();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "%22Echo%22/1/bar/True");
    assert_eq!(request.header("accept"), Some("application/json"));
    assert_eq!(request.header("content-type"), Some("text/plain;charset=UTF-8"));
    assert_eq!(request.header("authorization"), None);
}

#[tokio::test]
async fn credentials_are_sent_as_basic_auth() {
    let server = MockServer::start(&[("%22CheckConnection%22/", r#"{"result":[true]}"#)]);
    let client = RadClient::builder()
        .config(server.config().with_credentials("dsclient", "Ds_1234"))
        .check_connection("CheckConnection")
        .connect()
        .await
        .expect("connection check passes");

    assert_eq!(client.config().auth(), Some(("dsclient", "Ds_1234")));
    assert_eq!(
        server.last().header("authorization"),
        Some("Basic ZHNjbGllbnQ6RHNfMTIzNA==")
    );
}

#[tokio::test]
async fn get_verb_and_unquoted_name_are_honored() {
    let server = MockServer::start(&[("Echo/x", r#"{"result":[42]}"#)]);
    let client = client_for(&server).await;

    let value = client
        .call(RequestSpec::new("Echo").arg("x").unquoted().verb(HttpVerb::Get))
        .await
        .expect("get succeeds");

    assert_eq!(value, json!(42));
    assert_eq!(server.last().method, Method::GET);
}

#[tokio::test]
async fn pass_through_header_and_query_reach_the_server() {
    let server = MockServer::start(&[("%22Echo%22/", r#"{"result":["ok"]}"#)]);
    let client = client_for(&server).await;

    client
        .call(
            RequestSpec::new("Echo")
                .header("X-Trace", "7")
                .query("session", "abc")
                .timeout(Duration::from_secs(5)),
        )
        .await
        .expect("call succeeds");

    let request = server.last();
    assert_eq!(request.header("x-trace"), Some("7"));
    assert_eq!(request.query.as_deref(), Some("session=abc"));
}

#[tokio::test]
async fn caller_cannot_override_fixed_headers() {
    let server = MockServer::start(&[("%22Echo%22/", r#"{"result":["ok"]}"#)]);
    let client = client_for(&server).await;

    client
        .call(
            RequestSpec::new("Echo")
                .header("Accept", "text/html")
                .header("content-type", "application/xml")
                .header("X-Trace", "7"),
        )
        .await
        .expect("call succeeds");

    let request = server.last();
    let accept: Vec<_> = request.headers.get_all("accept").iter().collect();
    let content_type: Vec<_> = request.headers.get_all("content-type").iter().collect();
    assert_eq!(accept, vec!["application/json"]);
    assert_eq!(content_type, vec!["text/plain;charset=UTF-8"]);
    assert_eq!(request.header("x-trace"), Some("7"));
}

#[tokio::test]
async fn backslashes_in_arguments_are_percent_encoded() {
    let server = MockServer::start(&[(
        "%22IDE_Actions_OpenFile%22/c:%5Csrc%5Cunit1.pas",
        r#"{"result":[true]}"#,
    )]);
    let client = client_for(&server).await;

    let spec = RequestSpec::new("IDE_Actions_OpenFile").arg("c:\\src\\unit1.pas");
    assert!(client
        .request_url(&spec)
        .ends_with(&format!("{URL_PATH}/%22IDE_Actions_OpenFile%22/c:\\src\\unit1.pas")));

    assert!(client.call_bool(spec).await.expect("open file"));
}

#[tokio::test]
async fn call_bool_accepts_only_json_true() {
    let server = MockServer::start(&[
        ("%22Yes%22/", r#"{"result":[true]}"#),
        ("%22No%22/", r#"{"result":[false]}"#),
        ("%22Text%22/", r#"{"result":["true"]}"#),
        ("%22One%22/", r#"{"result":[1]}"#),
        ("%22Nothing%22/", r#"{"result":[]}"#),
    ]);
    let client = client_for(&server).await;

    assert!(client.call_bool("Yes").await.expect("yes"));
    assert!(!client.call_bool("No").await.expect("no"));
    assert!(!client.call_bool("Text").await.expect("text"));
    assert!(!client.call_bool("One").await.expect("one"));
    assert!(!client.call_bool("Nothing").await.expect("nothing"));
}

#[tokio::test]
async fn doubly_quoted_payloads_are_repaired() {
    let server = MockServer::start(&[
        (
            "%22IDE_Packages_getPackagesValue%22/PackageNames",
            r#"{"result":["[\"rtl270.bpl\",\"vcl270.bpl\"]"]}"#,
        ),
        (
            "%22IDE_Common_getEnvironment%22/",
            r#"{"result":["{\"ProductIdentifier\":\"Delphi\",\"ParentHandle\":7}"]}"#,
        ),
    ]);
    let client = client_for(&server).await;

    let names = client
        .call(RequestSpec::new("IDE_Packages_getPackagesValue").arg("PackageNames"))
        .await
        .expect("names");
    assert_eq!(names, json!(["rtl270.bpl", "vcl270.bpl"]));

    let env = client
        .call("IDE_Common_getEnvironment")
        .await
        .expect("environment");
    assert_eq!(env, json!({"ProductIdentifier": "Delphi", "ParentHandle": 7}));
}

#[tokio::test]
async fn server_errors_become_error_strings_whatever_the_status() {
    let server = MockServer::start(&[
        ("%22Fails%22/", r#"{"error":"Access violation"}"#),
        ("%22Expired%22/", r#"{"SessionExpired":"Session 12 expired"}"#),
    ]);
    let client = client_for(&server).await;

    assert_eq!(
        client.call("Fails").await.expect("error reply"),
        json!("ERROR: Access violation")
    );
    assert_eq!(
        client.call("Expired").await.expect("expired reply"),
        json!("ERROR: Session 12 expired")
    );
    // the mock answers 404 for anything it does not know
    assert_eq!(
        client.call("Missing").await.expect("404 reply"),
        json!("ERROR: unknown method")
    );
    assert!(!client.call_bool("Missing").await.expect("404 reply"));
}

#[tokio::test]
async fn non_json_bodies_come_back_as_text() {
    let server = MockServer::start(&[("%22Plain%22/", "OK")]);
    let client = client_for(&server).await;

    assert_eq!(client.call("Plain").await.expect("plain"), json!("OK"));
}

#[tokio::test]
async fn malformed_object_is_a_protocol_error() {
    let server = MockServer::start(&[("%22Broken%22/", r#"{"result":[{"Name":}]}"#)]);
    let client = client_for(&server).await;

    let err = client.call("Broken").await.expect_err("must fail");
    assert!(err.is_protocol());
    assert!(matches!(err, RadError::Protocol { ref raw, .. } if raw.contains("\"Name\":")));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let config = ConnectionConfig::new("127.0.0.1", closed_port(), URL_PATH);
    let client = RadClient::builder()
        .config(config)
        .connect()
        .await
        .expect("no check means no request");

    let err = client.call("CheckConnection").await.expect_err("must fail");
    assert!(err.is_transport());
    assert!(matches!(err, RadError::Transport { ref url, .. } if url.ends_with("%22CheckConnection%22/")));
}

#[tokio::test]
async fn failed_connection_check_is_a_config_error() {
    let server = MockServer::start(&[("%22CheckConnection%22/", r#"{"result":[false]}"#)]);

    let err = RadClient::builder()
        .config(server.config())
        .check_connection("CheckConnection")
        .connect()
        .await
        .expect_err("check must fail");

    assert!(err.is_config());
    assert_eq!(server.paths(), vec!["%22CheckConnection%22/".to_string()]);
}

#[tokio::test]
async fn connection_check_uses_the_given_method_name() {
    let server = MockServer::start(&[("%22Ping%22/", r#"{"result":[true]}"#)]);

    let client = RadClient::builder()
        .config(server.config())
        .check_connection("Ping")
        .connect()
        .await
        .expect("ping passes");

    assert!(client.check_connection("Ping").await.expect("second ping"));
    assert_eq!(server.requests().len(), 2);
}
