//! Language catalog module.
//!
//! This module handles fetching, parsing, and aggregating the paginated
//! language listing of the remote catalog.

mod client;
mod fetcher;
mod filter;
mod parser;
#[cfg(test)]
mod testing;
mod types;

pub use self::types::*;

pub use self::client::{create_http_client, page_url};
pub use self::fetcher::{absorb_page, get_top_languages};
pub use self::filter::{canonical_name, LanguageTally, ALIASES, NOT_GENERAL_PROGRAMMING};
pub use self::parser::parse_page;
