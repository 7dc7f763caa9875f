//! Paginated catalog fetching.

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use super::client::{fetch_with_retries, page_url};
use super::filter::LanguageTally;
use super::parser::parse_page;
use super::types::{CatalogPage, CatalogQuery, LanguageCount};
use crate::TARGET_WEB_REQUEST;

/// Fetches every catalog page and returns per-language totals, highest first
///
/// Pages are requested in order starting at 1 until one reports zero items.
///
/// # Arguments
/// * `client` - HTTP client
/// * `query` - Catalog address, API key and sort field
///
/// # Returns
/// * `Ok(Vec<LanguageCount>)` - Filtered and aliased totals
/// * `Err` - If a page cannot be fetched or parsed, or the catalog reports an error
pub async fn get_top_languages(
    client: &reqwest::Client,
    query: &CatalogQuery,
) -> Result<Vec<LanguageCount>> {
    let mut tally = LanguageTally::new();
    let mut page_number = 1;

    loop {
        let url = page_url(query, page_number)?;
        info!(target: TARGET_WEB_REQUEST, "request: {}", url);

        let body = fetch_with_retries(client, &url).await?;
        let page = parse_page(&body, &query.sort)?;
        if !absorb_page(&mut tally, &page)? {
            break;
        }

        page_number += 1;
    }

    info!(target: TARGET_WEB_REQUEST, "Collected {} languages from {} pages", tally.len(), page_number - 1);
    Ok(tally.into_ranked())
}

/// Adds one page to the running tally
///
/// # Returns
/// * `Ok(true)` - If the page carried items and the next page should be requested
/// * `Ok(false)` - If the page was empty, ending pagination
/// * `Err` - If the catalog reported an error
pub fn absorb_page(tally: &mut LanguageTally, page: &CatalogPage) -> Result<bool> {
    if let Some(error) = &page.error {
        return Err(anyhow!("Catalog error: {}", error));
    }
    if page.items_returned == 0 {
        return Ok(false);
    }

    for language in &page.languages {
        if !tally.add(language) {
            debug!(target: TARGET_WEB_REQUEST, "Skipping non general-purpose language {}", language.name);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{direct_client, languages_page, requested_pages, serve};
    use crate::catalog::RawLanguage;

    fn query(base_url: String) -> CatalogQuery {
        CatalogQuery {
            base_url,
            api_key: "secret".to_string(),
            sort: "contributors".to_string(),
        }
    }

    fn page(items: &[(&str, u64)]) -> CatalogPage {
        CatalogPage {
            error: None,
            items_returned: items.len(),
            languages: items
                .iter()
                .map(|(name, value)| RawLanguage {
                    name: name.to_string(),
                    value: *value,
                })
                .collect(),
        }
    }

    #[test]
    fn test_absorb_pages_until_empty() {
        let mut tally = LanguageTally::new();
        assert!(absorb_page(&mut tally, &page(&[("Java", 100), ("HTML", 90), ("C/C++", 80)])).unwrap());
        assert!(absorb_page(&mut tally, &page(&[("C++", 15), ("Scheme", 3)])).unwrap());
        assert!(!absorb_page(&mut tally, &page(&[])).unwrap());

        let ranked = tally.into_ranked();
        assert_eq!(
            ranked,
            vec![
                LanguageCount { name: "Java".to_string(), count: 100 },
                LanguageCount { name: "C++".to_string(), count: 95 },
                LanguageCount { name: "Lisp".to_string(), count: 3 },
            ]
        );
    }

    #[test]
    fn test_catalog_error_stops_fetch() {
        let mut tally = LanguageTally::new();
        let failed = CatalogPage {
            error: Some("API key limit exceeded".to_string()),
            ..CatalogPage::default()
        };
        let err = absorb_page(&mut tally, &failed).unwrap_err();
        assert_eq!(err.to_string(), "Catalog error: API key limit exceeded");
        assert!(tally.is_empty());
    }

    #[tokio::test]
    async fn test_fetches_pages_until_empty() {
        let (base_url, requests) = serve(vec![
            (200, languages_page(&[("Java", 100), ("HTML", 90), ("C/C++", 80)])),
            (200, languages_page(&[("C++", 15), ("Scheme", 3)])),
            (200, languages_page(&[])),
        ])
        .await;

        let ranked = get_top_languages(&direct_client(), &query(base_url))
            .await
            .unwrap();

        assert_eq!(requested_pages(&requests), vec!["1", "2", "3"]);
        assert_eq!(
            ranked,
            vec![
                LanguageCount { name: "Java".to_string(), count: 100 },
                LanguageCount { name: "C++".to_string(), count: 95 },
                LanguageCount { name: "Lisp".to_string(), count: 3 },
            ]
        );
    }

    #[tokio::test]
    async fn test_catalog_error_page_stops_run() {
        let (base_url, requests) = serve(vec![
            (200, "<response><error>Invalid api_key</error></response>".to_string()),
            (200, languages_page(&[("Java", 100)])),
        ])
        .await;

        let err = get_top_languages(&direct_client(), &query(base_url))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Catalog error: Invalid api_key");
        assert_eq!(requested_pages(&requests), vec!["1"]);
    }
}
