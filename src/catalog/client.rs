//! HTTP client creation and request handling for the catalog.

use anyhow::{anyhow, Result};
use reqwest::header;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, warn};
use url::Url;

use super::types::{CatalogQuery, MAX_RETRIES, REQUEST_TIMEOUT, RETRY_DELAY};
use crate::TARGET_WEB_REQUEST;

/// Create the HTTP client used for catalog requests
pub fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .gzip(true)
        .user_agent(concat!("langpop/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// Builds the URL of one catalog page; query parameters are sorted by name
pub fn page_url(query: &CatalogQuery, page: usize) -> Result<Url> {
    let page = page.to_string();
    let params = [
        ("api_key", query.api_key.as_str()),
        ("page", page.as_str()),
        ("sort", query.sort.as_str()),
    ];
    Url::parse_with_params(&query.base_url, &params)
        .map_err(|e| anyhow!("Invalid catalog URL {}: {}", query.base_url, e))
}

/// Fetches a URL and returns the body, retrying failed or non-success requests
pub async fn fetch_with_retries(client: &reqwest::Client, url: &Url) -> Result<String> {
    let mut attempts = 0;

    loop {
        if attempts >= MAX_RETRIES {
            error!(target: TARGET_WEB_REQUEST, "Max retries reached for URL: {}", url);
            return Err(anyhow!("Giving up on {} after {} attempts", url, MAX_RETRIES));
        }

        debug!(target: TARGET_WEB_REQUEST, "Requesting {}", url);
        match timeout(
            REQUEST_TIMEOUT,
            client
                .get(url.clone())
                .header(header::ACCEPT, "application/xml, text/xml, */*;q=0.9")
                .send(),
        )
        .await
        {
            Ok(Ok(response)) if response.status().is_success() => match response.text().await {
                Ok(body) => {
                    debug!(target: TARGET_WEB_REQUEST, "Received {} bytes from {}", body.len(), url);
                    return Ok(body);
                }
                Err(err) => {
                    error!(target: TARGET_WEB_REQUEST, "Failed to read response body from {}: {}", url, err);
                }
            },
            Ok(Ok(response)) => {
                warn!(target: TARGET_WEB_REQUEST, "Non-success status {} from {}", response.status(), url);
            }
            Ok(Err(err)) => {
                error!(target: TARGET_WEB_REQUEST, "Request to {} failed: {}", url, err);
            }
            Err(_) => {
                error!(target: TARGET_WEB_REQUEST, "Request to {} timed out after {} seconds", url, REQUEST_TIMEOUT.as_secs());
            }
        }

        attempts += 1;
        if attempts < MAX_RETRIES {
            warn!(target: TARGET_WEB_REQUEST, "Retrying {} in {:?}", url, RETRY_DELAY);
            sleep(RETRY_DELAY).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{direct_client, serve};

    #[test]
    fn test_page_url_sorts_and_encodes_params() {
        let query = CatalogQuery {
            base_url: "http://www.ohloh.net/languages.xml".to_string(),
            api_key: "k&y".to_string(),
            sort: "contributors".to_string(),
        };
        let url = page_url(&query, 2).unwrap();
        assert_eq!(
            url.as_str(),
            "http://www.ohloh.net/languages.xml?api_key=k%26y&page=2&sort=contributors"
        );
    }

    #[test]
    fn test_page_url_rejects_bad_base() {
        let query = CatalogQuery {
            base_url: "not a url".to_string(),
            api_key: String::new(),
            sort: "contributors".to_string(),
        };
        assert!(page_url(&query, 1).is_err());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let failures = (0..MAX_RETRIES)
            .map(|_| (500, "boom".to_string()))
            .collect();
        let (base_url, requests) = serve(failures).await;
        let url = Url::parse(&base_url).unwrap();

        let err = fetch_with_retries(&direct_client(), &url)
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains(&format!("after {} attempts", MAX_RETRIES)));
        assert_eq!(requests.lock().unwrap().len(), MAX_RETRIES);
    }

    #[tokio::test]
    async fn test_retries_non_success_status() {
        let (base_url, requests) = serve(vec![
            (503, "busy".to_string()),
            (200, "<response/>".to_string()),
        ])
        .await;
        let url = Url::parse(&base_url).unwrap();

        let body = fetch_with_retries(&direct_client(), &url)
            .await
            .unwrap();
        assert_eq!(body, "<response/>");
        assert_eq!(requests.lock().unwrap().len(), 2);
    }
}
