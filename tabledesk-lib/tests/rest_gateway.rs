//! Integration tests for `RestGateway` against a local stub server.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use tabledesk_lib::error::GatewayError;
use tabledesk_lib::gateway::Gateway;
use tabledesk_lib::gateway::RestGateway;
use tabledesk_lib::gateway::TableName;
use tabledesk_lib::model::Patch;
use tabledesk_lib::model::RowId;
use tabledesk_lib::model::Value;

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    query: String,
    apikey: Option<String>,
    authorization: Option<String>,
    prefer: Option<String>,
    body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

/// Serves every connection with `reply`, recording each request.
async fn stub<F>(reply: F) -> (String, Log)
where
    F: Fn(&Recorded) -> (u16, &'static str) + Send + Sync + 'static,
{
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(reply);

    let server_log = log.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let log = server_log.clone();
            let reply = reply.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let log = log.clone();
                    let reply = reply.clone();
                    async move {
                        let header = |name: &str| {
                            req.headers()
                                .get(name)
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string)
                        };
                        let mut recorded = Recorded {
                            method: req.method().to_string(),
                            path: req.uri().path().to_string(),
                            query: req.uri().query().unwrap_or_default().to_string(),
                            apikey: header("apikey"),
                            authorization: header("authorization"),
                            prefer: header("prefer"),
                            body: String::new(),
                        };
                        let body = req.into_body().collect().await.unwrap().to_bytes();
                        recorded.body = String::from_utf8_lossy(&body).into_owned();

                        let (status, text) = reply(&recorded);
                        log.lock().unwrap().push(recorded);
                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(status)
                                .header("content-type", "application/json")
                                .body(Full::new(Bytes::from(text)))
                                .unwrap(),
                        )
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    (format!("http://{}", addr), log)
}

fn gateway(url: &str) -> RestGateway {
    RestGateway::builder()
        .url(url)
        .api_key("anon-key")
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn events() -> TableName {
    TableName::new("communityEvents").unwrap()
}

fn decoded(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

#[tokio::test]
async fn test_select_sends_projection_and_keys() {
    let (url, log) = stub(|_| {
        (
            200,
            r#"[{"id":2,"name":"Drive","type":{"name":"Food"}},{"id":1,"name":"Class"}]"#,
        )
    })
    .await;

    let rows = gateway(&url).select(&events(), "*, type (name)").await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id(), &RowId::Int(2));
    assert_eq!(rows[1].get_string("name").unwrap(), Some("Class"));

    let request = log.lock().unwrap()[0].clone();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/rest/v1/communityEvents");
    assert_eq!(
        decoded(&request.query),
        vec![("select".to_string(), "*, type (name)".to_string())]
    );
    assert_eq!(request.apikey.as_deref(), Some("anon-key"));
    assert_eq!(request.authorization.as_deref(), Some("Bearer anon-key"));
}

#[tokio::test]
async fn test_select_rejects_row_without_id() {
    let (url, _log) = stub(|_| (200, r#"[{"name":"Drive"}]"#)).await;

    let err = gateway(&url).select(&events(), "*").await.unwrap_err();
    assert!(matches!(err, GatewayError::Parse { .. }), "{err:?}");
}

#[tokio::test]
async fn test_update_returns_echoed_row() {
    let (url, log) = stub(|_| (200, r#"[{"id":1,"name":"Drive","hours":5}]"#)).await;

    let patch = Patch::new().set("name", "Drive").set("hours", 5);
    let row = gateway(&url)
        .update(&events(), &RowId::Int(1), &patch)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.get_int("hours").unwrap(), Some(5));

    let request = log.lock().unwrap()[0].clone();
    assert_eq!(request.method, "PATCH");
    assert_eq!(decoded(&request.query), vec![("id".to_string(), "eq.1".to_string())]);
    assert_eq!(request.prefer.as_deref(), Some("return=representation"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, serde_json::json!({"hours": 5, "name": "Drive"}));
}

#[tokio::test]
async fn test_update_without_echo() {
    let (url, _log) = stub(|_| (204, "")).await;

    let patch = Patch::new().set("hours", Value::Null);
    let echo = gateway(&url)
        .update(&events(), &RowId::Int(1), &patch)
        .await
        .unwrap();
    assert_eq!(echo, None);
}

#[tokio::test]
async fn test_update_matching_nothing_is_not_found() {
    let (url, _log) = stub(|_| (200, "[]")).await;

    let err = gateway(&url)
        .update(&events(), &RowId::Int(9), &Patch::new().set("hours", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn test_delete_by_id() {
    let (url, log) = stub(|_| (204, "")).await;

    gateway(&url).delete(&events(), &RowId::Int(3)).await.unwrap();

    let request = log.lock().unwrap()[0].clone();
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.path, "/rest/v1/communityEvents");
    assert_eq!(decoded(&request.query), vec![("id".to_string(), "eq.3".to_string())]);
}

#[tokio::test]
async fn test_error_body_becomes_http_error() {
    let (url, _log) = stub(|recorded| match recorded.method.as_str() {
        "DELETE" => (
            403,
            r#"{"message":"permission denied for table communityEvents","code":"42501","details":null}"#,
        ),
        _ => (500, "upstream exploded"),
    })
    .await;
    let gateway = gateway(&url);

    let err = gateway.delete(&events(), &RowId::Int(1)).await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(err.error_code(), Some("42501"));
    assert!(err.to_string().contains("permission denied"));

    let err = gateway.select(&events(), "*").await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn test_access_token_overrides_bearer() {
    let (url, log) = stub(|_| (200, "[]")).await;

    let gateway = RestGateway::builder()
        .url(&url)
        .api_key("anon-key")
        .access_token("user-jwt")
        .build()
        .unwrap();
    gateway.select(&events(), "*").await.unwrap();

    let request = log.lock().unwrap()[0].clone();
    assert_eq!(request.apikey.as_deref(), Some("anon-key"));
    assert_eq!(request.authorization.as_deref(), Some("Bearer user-jwt"));
}
