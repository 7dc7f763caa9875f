//! Type definitions for the catalog module.

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

/// Language listing endpoint of the Ohloh / Open Hub catalog
pub const DEFAULT_CATALOG_URL: &str = "http://www.ohloh.net/languages.xml";

/// Field the catalog sorts by, and the value collected for every language
pub const DEFAULT_SORT_FIELD: &str = "contributors";

/// Everything needed to address one paginated catalog listing
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub base_url: String,
    pub api_key: String,
    pub sort: String,
}

/// A language entry as it appears on one catalog page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLanguage {
    pub name: String,
    pub value: u64,
}

/// One parsed catalog response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    /// Text of the `<error>` element, when the catalog rejected the request
    pub error: Option<String>,
    pub items_returned: usize,
    pub languages: Vec<RawLanguage>,
}

/// Aggregated value for a language after filtering and aliasing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    pub name: String,
    pub count: u64,
}

// Constants
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
#[cfg(not(test))]
pub const RETRY_DELAY: Duration = Duration::from_secs(5);
#[cfg(test)]
pub const RETRY_DELAY: Duration = Duration::from_millis(10);
pub const MAX_RETRIES: usize = 3;
