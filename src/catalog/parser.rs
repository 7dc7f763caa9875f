//! Parsing of catalog XML responses.

use anyhow::{anyhow, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

use super::types::{CatalogPage, RawLanguage};

/// Parses one `languages.xml` response
///
/// Reads `items_returned`, the `<error>` element if present, and for every
/// `result/language` node its `nice_name` together with the integer value of
/// the element named after the sort field.
///
/// # Arguments
/// * `xml` - Response body
/// * `sort` - Sort field, e.g. `contributors`
///
/// # Returns
/// * `Ok(CatalogPage)` - The parsed page (its `error` is set when the catalog reported one)
/// * `Err` - If the document is malformed or a language lacks a usable value
pub fn parse_page(xml: &str, sort: &str) -> Result<CatalogPage> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page = CatalogPage::default();
    let mut path: Vec<String> = Vec::new();
    let mut error_text: Option<String> = None;
    let mut name: Option<String> = None;
    let mut value: Option<String> = None;

    loop {
        match reader
            .read_event()
            .with_context(|| format!("Malformed catalog XML at byte {}", reader.buffer_position()))?
        {
            Event::Start(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                path.push(tag);
                if is_at(&path, &["error"]) {
                    error_text = Some(String::new());
                } else if is_at(&path, &["result", "language"]) {
                    name = None;
                    value = None;
                }
            }
            Event::Empty(e) => {
                if path.len() == 1 && e.name().as_ref() == b"error" {
                    page.error = Some(String::new());
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?.into_owned();
                capture(&path, sort, text, &mut page, &mut error_text, &mut name, &mut value)?;
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                capture(&path, sort, text, &mut page, &mut error_text, &mut name, &mut value)?;
            }
            Event::End(_) => {
                if is_at(&path, &["error"]) {
                    page.error = error_text.take().map(|s| s.trim().to_string());
                } else if is_at(&path, &["result", "language"]) {
                    page.languages.push(finish_language(name.take(), value.take(), sort)?);
                }
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(page)
}

/// True when the element stack, below the document root, is exactly `rel`
fn is_at(path: &[String], rel: &[&str]) -> bool {
    path.len() == rel.len() + 1 && path[1..].iter().zip(rel).all(|(a, b)| a == b)
}

fn capture(
    path: &[String],
    sort: &str,
    text: String,
    page: &mut CatalogPage,
    error_text: &mut Option<String>,
    name: &mut Option<String>,
    value: &mut Option<String>,
) -> Result<()> {
    if let Some(err) = error_text.as_mut() {
        if !err.is_empty() {
            err.push(' ');
        }
        err.push_str(&text);
    } else if is_at(path, &["items_returned"]) {
        page.items_returned = text
            .trim()
            .parse()
            .with_context(|| format!("Invalid items_returned: {}", text))?;
    } else if is_at(path, &["result", "language", "nice_name"]) {
        *name = Some(text);
    } else if is_at(path, &["result", "language", sort]) {
        *value = Some(text);
    }
    Ok(())
}

fn finish_language(name: Option<String>, value: Option<String>, sort: &str) -> Result<RawLanguage> {
    let name = name.ok_or_else(|| anyhow!("Catalog language without nice_name"))?;
    let value = value
        .ok_or_else(|| anyhow!("Language {} has no {} value", name, sort))?
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Language {} has a non-integer {} value", name, sort))?;
    Ok(RawLanguage { name, value })
}
