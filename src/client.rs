/*============================================================
  Synavera Project: Partinfo
  Module: partinfo_core::client
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Query the `{db}/_partition/{key}` endpoint of a CouchDB or
    Cloudant server and hand the body to the response mapper.

  Security / Safety Notes:
    Read-only GET requests. Basic-auth credentials come from
    configuration and are never included in errors or logs.

  Dependencies:
    reqwest for HTTP, serde for error bodies, tokio for
    bounded concurrency and backoff.

  Operational Scope:
    Transport collaborator for the CLI; the mapper itself
    performs no I/O.

  Revision History:
    2026-10-19 COD  Implemented partition info client.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Retry with exponential backoff on transient statuses
    - Structured error bodies surfaced to the operator
    - Configurable timeouts and parallelism
============================================================*/

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use urlencoding::encode;

use crate::config::ClientConfig;
use crate::error::{PartinfoError, Result};
use crate::mapper::ResponseMapper;
use crate::partition_info::PartitionInfo;

/// Client for the partition info endpoint.
#[derive(Clone)]
pub struct PartitionClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, Option<String>)>,
    max_retries: usize,
    max_parallel_requests: usize,
}

impl PartitionClient {
    /// Construct a new client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("Partinfo-Core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| PartinfoError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
            max_retries: config.max_retries,
            max_parallel_requests: config.max_parallel_requests.max(1),
        })
    }

    /// Fetch partition info for each key, preserving input order.
    pub async fn fetch_many(&self, database: &str, keys: &[String]) -> Result<Vec<PartitionInfo>> {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_requests));
        let mut tasks = Vec::with_capacity(keys.len());

        for key in keys {
            let client = self.clone();
            let semaphore = semaphore.clone();
            let database = database.to_string();
            let key = key.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| PartinfoError::Runtime("Partition semaphore closed".into()))?;
                client.fetch_partition_info(&database, &key).await
            }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            let info = task
                .await
                .map_err(|err| PartinfoError::Runtime(format!("Partition task failed: {err}")))??;
            results.push(info);
        }
        Ok(results)
    }

    /// Fetch and decode partition info for a single partition key.
    pub async fn fetch_partition_info(&self, database: &str, key: &str) -> Result<PartitionInfo> {
        let url = self.partition_url(database, key)?;
        let mut attempt = 0;
        loop {
            let mut request = self.client.get(&url);
            if let Some((user, password)) = &self.credentials {
                request = request.basic_auth(user, password.as_deref());
            }
            let response = request.send().await.map_err(|err| {
                PartinfoError::Network(format!("Partition request to {url} failed: {err}"))
            })?;
            let status = response.status();

            if status.is_success() {
                let body = response.bytes().await.map_err(|err| {
                    PartinfoError::Network(format!("Failed to read body from {url}: {err}"))
                })?;
                return Ok(ResponseMapper::decode(&body)?);
            }

            attempt += 1;
            if !is_transient(status) || attempt > self.max_retries {
                let body = response.bytes().await.unwrap_or_default();
                return Err(http_error(status, &body));
            }
            sleep(backoff_delay(attempt)).await;
        }
    }

    /// Compose `{base}/{db}/_partition/{key}` with both segments encoded.
    pub fn partition_url(&self, database: &str, key: &str) -> Result<String> {
        if database.trim().is_empty() {
            return Err(PartinfoError::Config("Database name must not be empty".into()));
        }
        if key.is_empty() {
            return Err(PartinfoError::Config("Partition key must not be empty".into()));
        }
        Ok(format!(
            "{}/{}/_partition/{}",
            self.base_url,
            encode(database),
            encode(key)
        ))
    }
}

/// Error document returned by CouchDB-compatible servers.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    reason: Option<String>,
}

fn http_error(status: StatusCode, body: &[u8]) -> PartinfoError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => PartinfoError::Http {
            status: status.as_u16(),
            error: parsed.error,
            reason: parsed.reason,
        },
        Err(_) => PartinfoError::Http {
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
            reason: None,
        },
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn backoff_delay(attempt: usize) -> Duration {
    let exponent = (attempt as u32).min(8);
    Duration::from_millis(200_u64.saturating_mul(1_u64 << exponent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const SCENARIO_BODY: &str =
        r#"{"doc_count":42,"doc_del_count":1,"partition":"p1","sizes":{"active":100,"external":200}}"#;

    /// Serve the canned `(status, body)` responses, one connection each,
    /// recording every request line received.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let head = read_head(&mut stream).await;
                let request_line = head.lines().next().unwrap_or_default().to_string();
                seen.lock().unwrap().push(request_line);
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            }
        });
        (format!("http://{addr}"), requests)
    }

    async fn read_head(stream: &mut TcpStream) -> String {
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = stream.read(&mut buf).await.unwrap();
            if read == 0 {
                break;
            }
            head.extend_from_slice(&buf[..read]);
        }
        String::from_utf8_lossy(&head).into_owned()
    }

    fn client_with_retries(base_url: &str, max_retries: usize) -> PartitionClient {
        let mut client = PartitionClient::new(&ClientConfig {
            base_url: base_url.to_string(),
            timeout: 5,
            max_retries,
            ..ClientConfig::default()
        })
        .unwrap();
        client.client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .no_proxy()
            .build()
            .unwrap();
        client
    }

    fn client(base_url: &str) -> PartitionClient {
        PartitionClient::new(&ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn partition_url_encodes_segments() {
        let client = client("https://example.cloudant.com/");
        assert_eq!(
            client.partition_url("my db", "sensor/1").unwrap(),
            "https://example.cloudant.com/my%20db/_partition/sensor%2F1"
        );
    }

    #[test]
    fn partition_url_rejects_empty_inputs() {
        let client = client("http://localhost:5984");
        assert!(matches!(
            client.partition_url("", "p1"),
            Err(PartinfoError::Config(_))
        ));
        assert!(matches!(
            client.partition_url("db", ""),
            Err(PartinfoError::Config(_))
        ));
    }

    #[test]
    fn zero_parallelism_is_clamped() {
        let client = PartitionClient::new(&ClientConfig {
            max_retries: 0,
            max_parallel_requests: 0,
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.max_retries, 0);
        assert_eq!(client.max_parallel_requests, 1);
    }

    #[test]
    fn http_error_uses_server_error_body() {
        let err = http_error(
            StatusCode::NOT_FOUND,
            br#"{"error":"not_found","reason":"Database does not exist."}"#,
        );
        match err {
            PartinfoError::Http {
                status,
                error,
                reason,
            } => {
                assert_eq!(status, 404);
                assert_eq!(error, "not_found");
                assert_eq!(reason.as_deref(), Some("Database does not exist."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn http_error_falls_back_to_canonical_reason() {
        let err = http_error(StatusCode::BAD_REQUEST, b"<html>nope</html>");
        match err {
            PartinfoError::Http { status, error, .. } => {
                assert_eq!(status, 400);
                assert_eq!(error, "Bad Request");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn transient_statuses_are_retried() {
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient(StatusCode::NOT_FOUND));
        assert!(!is_transient(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_delay(1), Duration::from_millis(400));
        assert_eq!(backoff_delay(2), Duration::from_millis(800));
        assert_eq!(backoff_delay(8), backoff_delay(20));
    }

    #[tokio::test]
    async fn transient_status_is_retried_then_body_decoded() {
        let (base_url, requests) = serve(vec![
            (503, r#"{"error":"service_unavailable","reason":"busy"}"#),
            (200, SCENARIO_BODY),
        ])
        .await;
        let client = client_with_retries(&base_url, 3);

        let info = client.fetch_partition_info("animaldb", "p1").await.unwrap();
        assert_eq!(
            info,
            ResponseMapper::decode(SCENARIO_BODY.as_bytes()).unwrap()
        );
        assert_eq!(
            info.to_string(),
            "PartitionInfo [docCount=42, docDelCount=1, partition=p1, sizes=Sizes [external=200, active=100]]"
        );

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        for line in requests.iter() {
            assert_eq!(line, "GET /animaldb/_partition/p1 HTTP/1.1");
        }
    }

    #[tokio::test]
    async fn not_found_maps_to_http_error_without_retry() {
        let (base_url, requests) = serve(vec![(
            404,
            r#"{"error":"not_found","reason":"Database does not exist."}"#,
        )])
        .await;
        let client = client_with_retries(&base_url, 3);

        let err = client.fetch_partition_info("missing", "p1").await.unwrap_err();
        match err {
            PartinfoError::Http {
                status,
                error,
                reason,
            } => {
                assert_eq!(status, 404);
                assert_eq!(error, "not_found");
                assert_eq!(reason.as_deref(), Some("Database does not exist."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn max_retries_counts_retries_after_the_first_attempt() {
        let (base_url, requests) = serve(vec![
            (503, r#"{"error":"unavailable"}"#),
            (503, r#"{"error":"unavailable"}"#),
        ])
        .await;
        let client = client_with_retries(&base_url, 1);

        let err = client.fetch_partition_info("animaldb", "p1").await.unwrap_err();
        assert!(matches!(err, PartinfoError::Http { status: 503, .. }));
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_success_body_surfaces_decode_error() {
        let (base_url, _requests) = serve(vec![(200, r#"{"doc_count":4"#)]).await;
        let client = client_with_retries(&base_url, 0);

        let err = client.fetch_partition_info("animaldb", "p1").await.unwrap_err();
        assert!(matches!(
            err,
            PartinfoError::Decode(crate::error::DecodeError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn fetch_many_with_no_keys_returns_empty() {
        let client = client("http://localhost:5984");
        let results = client.fetch_many("db", &[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn fetch_rejects_empty_key_before_any_request() {
        let client = client("http://localhost:5984");
        let err = client.fetch_partition_info("db", "").await.unwrap_err();
        assert!(matches!(err, PartinfoError::Config(_)));
    }
}
