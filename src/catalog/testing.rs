//! Local HTTP server replaying canned catalog responses.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

/// Serves `responses` in order, one connection each, and records the request targets
///
/// Returns the `languages.xml` URL of the server and the shared list of targets.
pub async fn serve(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/languages.xml", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let head = String::from_utf8_lossy(&head);
            let target = head.split_whitespace().nth(1).unwrap_or_default().to_string();
            seen.lock().unwrap().push(target);

            let response = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });

    (base_url, requests)
}

/// The `page` query parameter of every recorded request target
pub fn requested_pages(requests: &Mutex<Vec<String>>) -> Vec<String> {
    requests
        .lock()
        .unwrap()
        .iter()
        .filter_map(|target| {
            let url = Url::parse(&format!("http://localhost{}", target)).ok()?;
            url.query_pairs()
                .find(|(key, _)| key == "page")
                .map(|(_, value)| value.into_owned())
        })
        .collect()
}

/// A successful catalog page listing `(nice_name, contributors)` pairs
pub fn languages_page(languages: &[(&str, u64)]) -> String {
    let entries: String = languages
        .iter()
        .map(|(name, count)| {
            format!(
                "<language><nice_name>{}</nice_name><contributors>{}</contributors></language>",
                name, count
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><response><status>success</status><items_returned>{}</items_returned><result>{}</result></response>",
        languages.len(),
        entries
    )
}

/// HTTP client that talks to the local server directly, ignoring proxy settings
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
