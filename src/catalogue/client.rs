//! BnF catalogue client
//!
//! Looks up a digitised document by its ARK through the catalogue's SRU
//! interface. Connection failures, timeouts and server errors are retried
//! with exponential backoff; a lookup that keeps failing is reported as
//! unavailable instead of aborting the run.

use log::{debug, info, warn};
use std::time::Duration;

use super::clean::{clean, CatalogueMetadata};
use super::record::{parse_search_response, MarcRecord};
use crate::config::CatalogueConfig;
use crate::error::Result;

/// Outcome of one catalogue lookup
#[derive(Debug, Clone)]
pub enum CatalogueLookup {
    Found(MarcRecord),
    NotFound,
    /// The catalogue could not be reached or answered with garbage
    Unavailable(String),
}

impl CatalogueLookup {
    pub fn record(&self) -> Option<&MarcRecord> {
        match self {
            CatalogueLookup::Found(record) => Some(record),
            _ => None,
        }
    }

    pub fn metadata(&self) -> CatalogueMetadata {
        clean(self.record())
    }
}

enum RequestFailure {
    Transient(String),
    Permanent(String),
}

impl From<reqwest::Error> for RequestFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
            RequestFailure::Transient(err.to_string())
        } else {
            RequestFailure::Permanent(err.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogueClient {
    http_client: reqwest::Client,
    endpoint: String,
    max_retries: u32,
    backoff: Duration,
}

impl CatalogueClient {
    /// Create a client from the catalogue settings
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &CatalogueConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }

    /// SRU query selecting a document by persistent identifier
    pub fn query_for(ark: &str) -> String {
        format!("(bib.persistentid all \"{ark}\")")
    }

    /// Look up the catalogue record of `ark`.
    pub async fn fetch(&self, ark: &str) -> CatalogueLookup {
        info!("requesting catalogue record for {ark}");
        let mut last_error = String::new();

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_delay(attempt);
                warn!("catalogue lookup for {ark} failed ({last_error}), retrying in {delay:?}");
                tokio::time::sleep(delay).await;
            }

            match self.request(ark).await {
                Ok(body) => return Self::interpret(ark, &body),
                Err(RequestFailure::Transient(message)) => last_error = message,
                Err(RequestFailure::Permanent(message)) => {
                    warn!("catalogue lookup for {ark} failed: {message}");
                    return CatalogueLookup::Unavailable(message);
                }
            }
        }

        warn!(
            "catalogue lookup for {ark} gave up after {} attempts: {last_error}",
            self.max_retries.saturating_add(1)
        );
        CatalogueLookup::Unavailable(last_error)
    }

    /// Delay before retry number `attempt` (from 1), doubling each time.
    fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff.saturating_mul(factor)
    }

    async fn request(&self, ark: &str) -> std::result::Result<String, RequestFailure> {
        let query = Self::query_for(ark);
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("version", "1.2"),
                ("operation", "searchRetrieve"),
                ("query", query.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(RequestFailure::Transient(format!("HTTP {status}")));
        }
        debug!("catalogue answered {status} for {ark}");
        Ok(response.text().await?)
    }

    /// The record count decides between found and not found, whatever the
    /// HTTP status was.
    fn interpret(ark: &str, body: &str) -> CatalogueLookup {
        match parse_search_response(body) {
            Ok(response) => match response.into_record() {
                Some(record) => {
                    info!("found {ark} in the catalogue");
                    CatalogueLookup::Found(record)
                }
                None => {
                    info!("{ark} is not in the catalogue");
                    CatalogueLookup::NotFound
                }
            },
            Err(err) => {
                warn!("unreadable catalogue response for {ark}: {err}");
                CatalogueLookup::Unavailable(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const FOUND: &str = r#"<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/">
        <srw:numberOfRecords>1</srw:numberOfRecords>
        <srw:records><srw:record><srw:recordData>
            <mxc:record xmlns:mxc="info:lc/xmlns/marcxchange-v2">
                <mxc:datafield tag="200"><mxc:subfield code="a">Chroniques</mxc:subfield></mxc:datafield>
            </mxc:record>
        </srw:recordData></srw:record></srw:records>
    </srw:searchRetrieveResponse>"#;

    const NOT_FOUND: &str = r#"<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/">
        <srw:numberOfRecords>0</srw:numberOfRecords>
    </srw:searchRetrieveResponse>"#;

    /// Serve one scripted (status, body) reply per connection, then stop
    /// accepting. Returns the endpoint and the number of requests received.
    async fn scripted_catalogue(replies: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);

        tokio::spawn(async move {
            for (status, body) in replies {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }

                let reply = format!(
                    "HTTP/1.1 {status} Scripted\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}/api/SRU"), requests)
    }

    fn client_for(endpoint: String, max_retries: u32) -> CatalogueClient {
        CatalogueClient::new(&CatalogueConfig {
            endpoint,
            timeout_secs: 5,
            max_retries,
            backoff_ms: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_query() {
        assert_eq!(
            CatalogueClient::query_for("btv1b8452"),
            "(bib.persistentid all \"btv1b8452\")"
        );
    }

    #[test]
    fn test_interpret_zero_records() {
        let body = r#"<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/">
            <srw:numberOfRecords>0</srw:numberOfRecords>
        </srw:searchRetrieveResponse>"#;
        let lookup = CatalogueClient::interpret("x", body);
        assert!(matches!(lookup, CatalogueLookup::NotFound));
        assert!(!lookup.metadata().found);
    }

    #[test]
    fn test_interpret_garbage() {
        let lookup = CatalogueClient::interpret("x", "<html><body>Bad gateway</body></html>");
        assert!(matches!(lookup, CatalogueLookup::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_catalogue_is_unavailable() {
        let config = CatalogueConfig {
            // Discard port: nothing listens there
            endpoint: "http://127.0.0.1:9/api/SRU".to_string(),
            timeout_secs: 2,
            max_retries: 1,
            backoff_ms: 10,
        };
        let client = CatalogueClient::new(&config).unwrap();
        let lookup = client.fetch("btv1b8452").await;
        assert!(matches!(lookup, CatalogueLookup::Unavailable(_)));
        assert!(!lookup.metadata().found);
    }

    #[tokio::test]
    async fn test_server_error_is_retried_until_success() {
        let (endpoint, requests) = scripted_catalogue(vec![(503, ""), (502, ""), (200, FOUND)]).await;
        let lookup = client_for(endpoint, 3).fetch("btv1b8452").await;

        assert_eq!(requests.load(Ordering::SeqCst), 3);
        let record = lookup.record().unwrap();
        assert_eq!(record.first_subfield("200", "a"), Some("Chroniques"));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let (endpoint, requests) = scripted_catalogue(vec![(500, ""); 6]).await;
        let lookup = client_for(endpoint, 2).fetch("btv1b8452").await;

        assert_eq!(requests.load(Ordering::SeqCst), 3);
        assert!(matches!(lookup, CatalogueLookup::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_record_count_decides_whatever_the_status() {
        let (endpoint, requests) = scripted_catalogue(vec![(404, NOT_FOUND)]).await;
        let lookup = client_for(endpoint, 3).fetch("btv1b8452").await;

        assert_eq!(requests.load(Ordering::SeqCst), 1);
        assert!(matches!(lookup, CatalogueLookup::NotFound));

        let (endpoint, _) = scripted_catalogue(vec![(403, FOUND)]).await;
        let lookup = client_for(endpoint, 0).fetch("btv1b8452").await;
        assert!(matches!(lookup, CatalogueLookup::Found(_)));
    }

    #[tokio::test]
    async fn test_unreadable_body_is_not_retried() {
        let (endpoint, requests) =
            scripted_catalogue(vec![(200, "<html>maintenance</html>"), (200, FOUND)]).await;
        let lookup = client_for(endpoint, 3).fetch("btv1b8452").await;

        assert_eq!(requests.load(Ordering::SeqCst), 1);
        assert!(matches!(lookup, CatalogueLookup::Unavailable(_)));
    }

    #[test]
    fn test_retry_delay_doubles_and_saturates() {
        let client = client_for("http://127.0.0.1:9/".to_string(), 3);
        assert_eq!(client.retry_delay(1), Duration::from_millis(1));
        assert_eq!(client.retry_delay(2), Duration::from_millis(2));
        assert_eq!(client.retry_delay(4), Duration::from_millis(8));

        let slow = CatalogueClient::new(&CatalogueConfig {
            backoff_ms: u64::MAX,
            max_retries: u32::MAX,
            ..CatalogueConfig::default()
        })
        .unwrap();
        assert_eq!(slow.retry_delay(u32::MAX), Duration::MAX);
    }
}
