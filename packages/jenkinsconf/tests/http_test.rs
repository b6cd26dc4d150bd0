//! HTTP transport tests against a local mock server.
//!
//! The transport is blocking, so each test drives it from a blocking task
//! while the mock server runs on the async runtime.

use std::rc::Rc;
use std::time::Duration;

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jenkinsconf::registry::{FreestyleJob, Resolver};
use jenkinsconf::{ConfError, ConfigDocument, HttpOptions, HttpTransport, Server, Transport};

const CONFIG: &str = "<?xml version='1.1' encoding='UTF-8'?>\n<project><description>old</description><builders/><publishers/></project>";

fn fast_options() -> HttpOptions {
    HttpOptions {
        retry_base_delay: Duration::from_millis(10),
        ..HttpOptions::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_and_write_config() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/build/config.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CONFIG))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/job/build/config.xml"))
        .and(header("content-type", "text/xml"))
        .and(body_string_contains("<description>new</description>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base = format!("{}/", mock_server.uri());
    tokio::task::spawn_blocking(move || {
        let server = Server::connect(&base, fast_options()).expect("transport");
        let job = server.job("build").expect("job");
        let freestyle = FreestyleJob::try_from(job.config().plugin().expect("plugin")).expect("freestyle");

        assert_eq!(freestyle.description(), "old");
        freestyle.set_description("new").expect("write");
        assert!(!job.config().is_dirty());
    })
    .await
    .expect("blocking task");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_basic_auth_header() {
    let mock_server = MockServer::start().await;

    // admin:token
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .and(header("authorization", "Basic YWRtaW46dG9rZW4="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"jobs": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base = format!("{}/", mock_server.uri());
    tokio::task::spawn_blocking(move || {
        let server =
            Server::connect(&base, fast_options().with_credentials("admin", "token")).expect("transport");
        assert!(server.jobs().expect("listing").is_empty());
    })
    .await
    .expect("blocking task");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/flaky/config.xml"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/job/flaky/config.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CONFIG))
        .mount(&mock_server)
        .await;

    let base = format!("{}/job/flaky/", mock_server.uri());
    tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&base, fast_options()).expect("transport");
        let text = transport.get_text("config.xml").expect("third attempt succeeds");
        assert!(text.contains("<description>old</description>"));
    })
    .await
    .expect("blocking task");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_retries_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let base = format!("{}/", mock_server.uri());
    tokio::task::spawn_blocking(move || {
        let transport = HttpTransport::new(&base, fast_options()).expect("transport");
        let err = transport.get_text("config.xml").unwrap_err();
        assert!(matches!(err, ConfError::RetriesExhausted { attempts: 3, .. }));
    })
    .await
    .expect("blocking task");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/missing/config.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base = format!("{}/job/missing/", mock_server.uri());
    tokio::task::spawn_blocking(move || {
        let transport: Rc<dyn Transport> =
            Rc::new(HttpTransport::new(&base, fast_options()).expect("transport"));
        let doc = ConfigDocument::new(transport, "config.xml", Resolver::shared());
        let err = doc.plugin().unwrap_err();
        assert!(matches!(err, ConfError::HttpStatus { status: 404, .. }));
        assert!(!doc.is_loaded());
    })
    .await
    .expect("blocking task");
}
