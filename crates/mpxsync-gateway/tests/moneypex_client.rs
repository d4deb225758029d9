//! Integration tests for `MoneypexClient` against a wiremock server.

use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mpxsync_gateway::{MoneypexClient, Operation, TransferError};

const COOKIE: &str = ".AspNetCore.Cookies=test-session";

fn test_client(base_url: &str) -> MoneypexClient {
    MoneypexClient::new(base_url, COOKIE, 5, 5, "mpxsync-test/0.1")
        .expect("client construction should not fail")
}

// ---------------------------------------------------------------------------
// fetch_export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_export_returns_body_bytes() {
    let server = MockServer::start().await;
    let payload = vec![0x50, 0x4b, 0x03, 0x04, 0xde, 0xad];

    Mock::given(method("GET"))
        .and(path("/Product/ExportProducts"))
        .and(query_param("SupplierId", ""))
        .and(query_param("CategoryId", ""))
        .and(query_param("SearchFilter_Name", ""))
        .and(query_param("ProductTypeId", ""))
        .and(header("cookie", COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = test_client(&server.uri())
        .fetch_export()
        .await
        .expect("fetch should succeed");
    assert_eq!(bytes, payload);
}

#[tokio::test]
async fn fetch_export_sends_referer_and_user_agent() {
    let server = MockServer::start().await;
    let referer = format!("{}/Product/Index", server.uri());

    Mock::given(method("GET"))
        .and(path("/Product/ExportProducts"))
        .and(header("referer", referer.as_str()))
        .and(header("user-agent", "mpxsync-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server.uri())
        .fetch_export()
        .await
        .expect("fetch should succeed");
}

#[tokio::test]
async fn fetch_export_server_error_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Product/ExportProducts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_export()
        .await
        .expect_err("500 must fail");
    assert!(
        matches!(
            err,
            TransferError::Status {
                operation: Operation::Fetch,
                status: 500,
                body: None
            }
        ),
        "expected Status 500, got: {err:?}"
    );
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn fetch_export_login_redirect_is_not_followed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Product/ExportProducts"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/Account/Login?ReturnUrl=%2F"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Account/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_export()
        .await
        .expect_err("redirect must fail");
    assert_eq!(err.status(), Some(302));
    assert!(err.is_session_rejected());
}

#[tokio::test]
async fn fetch_export_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Product/ExportProducts"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
        .mount(&server)
        .await;

    let client = MoneypexClient::new(&server.uri(), COOKIE, 1, 1, "mpxsync-test/0.1").unwrap();
    let err = client.fetch_export().await.expect_err("must time out");
    assert!(
        matches!(err, TransferError::Http(ref e) if e.is_timeout()),
        "expected timeout, got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// upload_workbook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_workbook_posts_multipart_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Product/ImportProduct"))
        .and(header("cookie", COOKIE))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(body_string_contains("name=\"File\"; filename=\"ProductImport.xlsx\""))
        .and(body_string_contains(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ))
        .and(body_string_contains("name=\"isAddForSync\""))
        .and(body_string_contains("workbook-bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"success\":true}"))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server.uri())
        .upload_workbook(b"workbook-bytes".to_vec())
        .await
        .expect("upload should succeed");
}

#[tokio::test]
async fn upload_workbook_failure_carries_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Product/ImportProduct"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid template header"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .upload_workbook(b"bad".to_vec())
        .await
        .expect_err("400 must fail");
    match err {
        TransferError::Status {
            operation,
            status,
            body,
        } => {
            assert_eq!(operation, Operation::Upload);
            assert_eq!(status, 400);
            assert_eq!(body.as_deref(), Some("Invalid template header"));
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn upload_workbook_forbidden_is_session_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Product/ImportProduct"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .upload_workbook(Vec::new())
        .await
        .expect_err("403 must fail");
    assert!(err.is_session_rejected());
}
