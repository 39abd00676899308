//! Thin REST transport for the firewall simulator backend

use crate::error::{ZeroPassError, ZeroPassResult};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tracing::debug;

/// Header carrying the caller's identity on every request
pub const USER_ID_HEADER: &str = "X-User-ID";

/// Outcome of a connectivity probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub url: String,
    pub reachable: bool,
    pub status: Option<u16>,
    #[serde(with = "humantime_serde")]
    pub latency: Duration,
    pub error: Option<String>,
}

/// JSON-over-HTTP client bound to one base URL
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> ZeroPassResult<Self> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if is_loopback(base_url) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| ZeroPassError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, user_id: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(USER_ID_HEADER, user_id)
    }

    pub async fn get_json<T, Q>(&self, user_id: &str, path: &str, query: Option<&Q>) -> ZeroPassResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut request = self.request(Method::GET, path, user_id);
        if let Some(query) = query {
            request = request.query(query);
        }
        self.send(request).await
    }

    pub async fn post_json<T, B, Q>(
        &self,
        user_id: &str,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> ZeroPassResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        let mut request = self.request(Method::POST, path, user_id);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, user_id: &str, path: &str) -> ZeroPassResult<T> {
        self.send(self.request(Method::DELETE, path, user_id)).await
    }

    /// GET `path` under a hard deadline. Never fails; the outcome is reported.
    pub async fn probe(&self, user_id: &str, path: &str, deadline: Duration) -> ProbeReport {
        let url = self.url(path);
        let started = Instant::now();
        let request = self.request(Method::GET, path, user_id).send();

        let (reachable, status, error) = match tokio::time::timeout(deadline, request).await {
            Ok(Ok(response)) => {
                let status = response.status();
                (
                    status.is_success(),
                    Some(status.as_u16()),
                    (!status.is_success()).then(|| format!("HTTP {}", status)),
                )
            }
            Ok(Err(e)) => (false, None, Some(e.to_string())),
            Err(_) => (
                false,
                None,
                Some(format!("Timed out after {}ms", deadline.as_millis())),
            ),
        };

        ProbeReport {
            url,
            reachable,
            status,
            latency: started.elapsed(),
            error,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ZeroPassResult<T> {
        let response = request.send().await?;
        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> ZeroPassResult<T> {
    let status = response.status();
    let url = response.url().to_string();

    if status.is_success() {
        debug!(%url, status = status.as_u16(), "Backend request succeeded");
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ZeroPassError::Http {
        message: error_detail(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        }),
        status_code: status.as_u16(),
        url: Some(url),
        context: None,
    })
}

fn is_loopback(base_url: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(base_url) else {
        return false;
    };
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

/// Pull the message out of a `{ "detail": ... }` error body
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_extracts_string() {
        assert_eq!(
            error_detail(r#"{"detail": "Rule set not found"}"#).as_deref(),
            Some("Rule set not found")
        );
    }

    #[test]
    fn test_error_detail_stringifies_structured_detail() {
        let detail = error_detail(r#"{"detail": [{"loc": ["body", "id"]}]}"#).unwrap();
        assert!(detail.contains("loc"));
    }

    #[test]
    fn test_error_detail_ignores_non_json() {
        assert_eq!(error_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(error_detail(r#"{"error": "x"}"#), None);
    }

    #[test]
    fn test_loopback_detection() {
        assert!(is_loopback("http://localhost:8000"));
        assert!(is_loopback("http://127.0.0.1:41234"));
        assert!(is_loopback("http://[::1]:8000"));
        assert!(!is_loopback("https://firewall.example.com"));
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = RestClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/rules"), "http://localhost:8000/rules");
    }
}
