// src/fetch/http.rs
// =============================================================================
// The real fetcher: HTTP GET over one shared reqwest client.
//
// Key functionality:
// - One client per run, so connections are pooled and reused
// - Every request carries the configured user-agent
// - Each call picks its own timeout (pages: 10s, downloads: 30s)
// - Non-2xx responses become FetchError::HttpStatus
// - Transport failures are sorted into timeout / refused / DNS / TLS / other
// =============================================================================

use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

use super::{FetchError, FetchResponse, Fetcher};

// Redirect chains longer than this are reported as TooManyRedirects
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the pooled client for one run
    //
    // No client-wide timeout is set here: the caller passes one per request.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = client_builder(user_agent)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }
}

fn client_builder(user_agent: &str) -> ClientBuilder {
    Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError> {
        debug!(url, ?timeout, "GET");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(error_chain(&e))
            }
        })?;

        Ok(FetchResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

// Sorts a reqwest error into one of our FetchError kinds
//
// reqwest does not expose DNS / refused / TLS as distinct flags, so we look
// at the whole error chain text for those.
fn categorize_error(error: reqwest::Error) -> FetchError {
    let chain = error_chain(&error);
    let lowered = chain.to_lowercase();

    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if lowered.contains("dns") || lowered.contains("failed to lookup address") {
        FetchError::Dns
    } else if lowered.contains("connection refused") {
        FetchError::ConnectionRefused
    } else if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl") {
        FetchError::Tls
    } else {
        FetchError::Network(chain)
    }
}

// Joins an error with all of its sources: "outer: inner: innermost"
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    // Same client as production, minus any proxy from the environment,
    // so requests really reach the local test server
    fn test_fetcher() -> HttpFetcher {
        HttpFetcher {
            client: client_builder("pdf-scout-test/1.0").no_proxy().build().unwrap(),
        }
    }

    // Serves exactly one canned HTTP response on a random local port
    //
    // Returns the base URL and a receiver for the raw request text.
    async fn serve_once(response: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
        });

        (format!("http://{}", addr), rx)
    }

    #[tokio::test]
    async fn test_fetch_ok_returns_body_and_sends_user_agent() {
        let (base, request) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\nConnection: close\r\n\r\n<p>hello</p>\n",
        )
        .await;

        let fetcher = test_fetcher();
        let response = fetcher
            .fetch(&format!("{}/docs", base), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "<p>hello</p>\n");

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /docs http/1.1"));
        assert!(request.contains("user-agent: pdf-scout-test/1.0"));
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_http_status_error() {
        let (base, _request) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let fetcher = test_fetcher();
        let err = fetcher
            .fetch(&format!("{}/missing", base), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::HttpStatus(404)));
        assert!(err.is_http_status());
        assert_eq!(err.to_string(), "HTTP 404");
    }

    #[tokio::test]
    async fn test_fetch_refused_connection_is_network_error() {
        // Grab a free port, then close it so nothing is listening there
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = test_fetcher();
        let err = fetcher
            .fetch(&format!("http://{}/", addr), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(!err.is_http_status());
    }

    #[test]
    fn test_http_fetcher_creation() {
        assert!(HttpFetcher::new("pdf-scout-test/1.0").is_ok());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let result = test_fetcher().fetch("not-a-url", Duration::from_secs(1)).await;
        assert!(result.is_err());
    }
}
