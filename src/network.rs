use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::CompareError;
use crate::models::{ComparisonResult, SelectedFile};

/// Everything one comparison call sends.
#[derive(Clone, Debug)]
pub struct CompareRequest {
    pub files: Vec<SelectedFile>,
    pub prompt: String,
}

/// A successful answer of the comparison service. `result` is `None` when
/// the 2xx body carried no usable result.
#[derive(Clone, Debug, PartialEq)]
pub struct CompareOutcome {
    pub comparison_id: Option<String>,
    pub result: Option<ComparisonResult>,
}

/// The external comparison service.
#[async_trait]
pub trait ComparisonClient: Send + Sync {
    async fn compare(&self, request: CompareRequest) -> Result<CompareOutcome, CompareError>;
}

/// `POST {api_base}/compare` as multipart/form-data.
pub struct HttpComparisonClient {
    http: Client,
    endpoint: Url,
}

impl HttpComparisonClient {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, CompareError> {
        let endpoint = compare_endpoint(api_base)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn compare_endpoint(api_base: &str) -> Result<Url, CompareError> {
    let raw = format!("{}/compare", api_base.trim_end_matches('/'));
    let url = Url::parse(&raw).map_err(|e| CompareError::InvalidEndpoint {
        url: api_base.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CompareError::InvalidEndpoint {
            url: api_base.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

fn build_form(request: CompareRequest) -> Result<Form, CompareError> {
    let mut form = Form::new();
    for file in request.files {
        let part = Part::bytes(file.content)
            .file_name(file.name)
            .mime_str(&file.mime_type)?;
        form = form.part("files", part);
    }
    Ok(form.text("prompt", request.prompt))
}

#[async_trait]
impl ComparisonClient for HttpComparisonClient {
    async fn compare(&self, request: CompareRequest) -> Result<CompareOutcome, CompareError> {
        let names: Vec<String> = request.files.iter().map(|f| f.name.clone()).collect();
        info!(endpoint = %self.endpoint, files = ?names, "sending comparison request");

        let form = build_form(request)?;
        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| extract_detail(&v));
            warn!(status = status.as_u16(), detail = ?detail, "comparison service refused the request");
            return Err(CompareError::Status { status: status.as_u16(), detail });
        }

        let body = response.text().await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(parse_success(&value)),
            Err(e) => {
                warn!(error = %e, "success response is not JSON; nothing to show");
                Ok(CompareOutcome { comparison_id: None, result: None })
            }
        }
    }
}

/// Reads the `{ "comparison_id", "result" }` envelope of a 2xx answer.
/// An absent or null `result` is not an error: there is just nothing to show.
pub fn parse_success(body: &Value) -> CompareOutcome {
    let comparison_id = body
        .get("comparison_id")
        .and_then(Value::as_str)
        .map(str::to_string);
    let result = match body.get("result") {
        None | Some(Value::Null) => {
            warn!(comparison_id = ?comparison_id, "success response without result");
            None
        }
        Some(value) => Some(ComparisonResult::from_value(value)),
    };
    CompareOutcome { comparison_id, result }
}

/// The human readable `detail` of an error body. Validation errors come as a
/// list of objects carrying `msg`; those are joined.
pub fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PDF_MIME;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn request() -> CompareRequest {
        CompareRequest {
            files: vec![
                SelectedFile::new("devis-a.pdf", PDF_MIME, b"%PDF-a".to_vec()),
                SelectedFile::new("devis-b.pdf", PDF_MIME, b"%PDF-b".to_vec()),
            ],
            prompt: "Compare les prix".into(),
        }
    }

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.trim()
                    .eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse().ok())?
            })
            .unwrap_or(0)
    }

    /// Answers one request with a canned response and hands back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = header_end(&buf) {
                    let head = String::from_utf8_lossy(&buf[..end]).to_string();
                    if buf.len() >= end + content_length(&head) {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });
        (format!("http://{addr}/api/v1"), handle)
    }

    #[test]
    fn endpoint_appends_compare() {
        let url = compare_endpoint("http://localhost:8000/api/v1/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/compare");
    }

    #[test]
    fn endpoint_rejects_garbage() {
        assert!(matches!(compare_endpoint("not a url"), Err(CompareError::InvalidEndpoint { .. })));
        assert!(matches!(compare_endpoint("ftp://host/api"), Err(CompareError::InvalidEndpoint { .. })));
    }

    #[test]
    fn detail_variants() {
        assert_eq!(extract_detail(&json!({"detail": "fichier invalide"})).as_deref(), Some("fichier invalide"));
        assert_eq!(
            extract_detail(&json!({"detail": [{"msg": "field required"}, {"msg": "too large"}]})).as_deref(),
            Some("field required; too large")
        );
        assert_eq!(extract_detail(&json!({"detail": ""})), None);
        assert_eq!(extract_detail(&json!({"message": "boom"})), None);
        assert_eq!(extract_detail(&json!({"detail": 42})), None);
    }

    #[test]
    fn success_envelope_reads_result_and_id() {
        let outcome = parse_success(&json!({"comparison_id": "abc", "result": {"recommandation": "Devis 1"}}));
        assert_eq!(outcome.comparison_id.as_deref(), Some("abc"));
        assert_eq!(outcome.result.unwrap().recommendation.as_deref(), Some("Devis 1"));
    }

    #[test]
    fn success_envelope_without_result_has_nothing_to_show() {
        assert_eq!(parse_success(&json!({"status": "ok"})).result, None);
        let outcome = parse_success(&json!({"comparison_id": "abc", "result": null}));
        assert_eq!(outcome.comparison_id.as_deref(), Some("abc"));
        assert_eq!(outcome.result, None);
    }

    #[tokio::test]
    async fn posts_two_files_and_prompt_as_multipart() {
        let (base, server) =
            serve_once("200 OK", r#"{"comparison_id":"c-1","result":{"recommandation":"Devis 1"}}"#).await;
        let client = HttpComparisonClient::new(&base, Duration::from_secs(5)).unwrap();

        let outcome = client.compare(request()).await.unwrap();
        assert_eq!(outcome.comparison_id.as_deref(), Some("c-1"));
        assert_eq!(outcome.result.unwrap().recommendation.as_deref(), Some("Devis 1"));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/v1/compare "));
        assert!(raw.to_ascii_lowercase().contains("content-type: multipart/form-data"));
        assert_eq!(raw.matches(r#"name="files""#).count(), 2);
        assert!(raw.contains(r#"filename="devis-a.pdf""#));
        assert!(raw.contains(r#"filename="devis-b.pdf""#));
        assert!(raw.contains(r#"name="prompt""#));
        assert!(raw.contains("Compare les prix"));
    }

    #[tokio::test]
    async fn non_json_success_body_is_an_empty_success() {
        let (base, server) = serve_once("200 OK", "<html>ok</html>").await;
        let client = HttpComparisonClient::new(&base, Duration::from_secs(5)).unwrap();

        let outcome = client.compare(request()).await.unwrap();
        assert_eq!(outcome, CompareOutcome { comparison_id: None, result: None });
        server.await.unwrap();
    }

    #[tokio::test]
    async fn error_status_carries_detail() {
        let (base, server) = serve_once("400 Bad Request", r#"{"detail":"fichier invalide"}"#).await;
        let client = HttpComparisonClient::new(&base, Duration::from_secs(5)).unwrap();

        let err = client.compare(request()).await.unwrap_err();
        assert!(matches!(err, CompareError::Status { status: 400, .. }));
        assert_eq!(err.display_message(), "fichier invalide");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn error_status_without_detail_falls_back() {
        let (base, server) = serve_once("500 Internal Server Error", "oops").await;
        let client = HttpComparisonClient::new(&base, Duration::from_secs(5)).unwrap();

        let err = client.compare(request()).await.unwrap_err();
        assert!(matches!(err, CompareError::Status { status: 500, detail: None }));
        assert_eq!(err.display_message(), crate::error::GENERIC_FAILURE);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = HttpComparisonClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();

        let err = client.compare(request()).await.unwrap_err();
        assert!(matches!(err, CompareError::Transport(_)));
        assert_eq!(err.display_message(), crate::error::GENERIC_FAILURE);
    }
}
