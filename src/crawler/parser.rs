//! HTML page processor
//!
//! This module turns a fetched HTML body into:
//! - The page's visible text (script and style content removed)
//! - The set of outbound links worth following

use crate::url::LinkFilter;
use scraper::{Html, Node, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ProcessedPage {
    /// Visible text, one phrase per line
    pub text: String,

    /// Normalized outbound links, deduplicated
    pub links: BTreeSet<String>,
}

/// Processes an HTML document
///
/// # Text Extraction
///
/// All text nodes outside `<script>` and `<style>` are concatenated, then every
/// line is trimmed and split on runs of two spaces. Empty pieces are dropped and
/// the rest are joined with newlines.
///
/// # Link Extraction
///
/// Every `<a href>` is passed through `filter`; rejected hrefs are dropped
/// silently.
///
/// # Arguments
///
/// * `body` - The decoded HTML document
/// * `page_url` - The URL the body came from, used to resolve relative links
/// * `filter` - The crawl's link filter
///
/// # Example
///
/// ```
/// use site_archiver::crawler::process_page;
/// use site_archiver::url::LinkFilter;
/// use url::Url;
///
/// let html = r#"<html><body><p>Hi</p><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let page = process_page(html, &page_url, &LinkFilter::new("example.com", true));
/// assert!(page.links.contains("https://example.com/page"));
/// ```
pub fn process_page(body: &str, page_url: &Url, filter: &LinkFilter) -> ProcessedPage {
    let document = Html::parse_document(body);

    ProcessedPage {
        text: extract_text(&document),
        links: extract_links(&document, page_url, filter),
    }
}

/// Returns true for elements whose text is never shown
fn is_hidden_element(name: &str) -> bool {
    name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")
}

/// Extracts the visible text of the document
fn extract_text(document: &Html) -> String {
    let mut raw = String::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |element| is_hidden_element(element.name()))
        });

        if !hidden {
            raw.push_str(text);
        }
    }

    collapse_whitespace(&raw)
}

/// Trims every line, breaks lines on double spaces and drops empty pieces
fn collapse_whitespace(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts all followable links from the document
fn extract_links(document: &Html, page_url: &Url, filter: &LinkFilter) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            match filter.normalize(href, page_url) {
                Ok(url) => {
                    links.insert(url.to_string());
                }
                Err(e) => {
                    tracing::trace!("Dropping link {:?} on {}: {}", href, page_url, e);
                }
            }
        }
    }

    links
}
