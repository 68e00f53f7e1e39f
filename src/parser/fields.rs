use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::selectors;
use crate::error::ItemError;
use crate::record::{NOT_AVAILABLE, NO_REVIEWS};

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Text of the first element under `container` matching `selector`, with
/// whitespace collapsed. Empty text counts as absent.
fn first_text(container: &ElementRef, selector: &Selector) -> Option<String> {
    let element = container.select(selector).next()?;
    let raw: String = element.text().collect();
    let text = WS_RE.replace_all(raw.trim(), " ").into_owned();
    (!text.is_empty()).then_some(text)
}

// ── Required fields: absence aborts the entry ──

pub fn title(container: &ElementRef) -> Result<String, ItemError> {
    first_text(container, &selectors::TITLE).ok_or(ItemError::MissingTitle)
}

pub fn product_url(container: &ElementRef, origin: &str) -> Result<String, ItemError> {
    let link = container
        .select(&selectors::LINK)
        .next()
        .ok_or(ItemError::MissingLink)?;
    let href = link
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(ItemError::MissingHref)?;
    Ok(absolute_url(origin, href))
}

// ── Optional fields: absence becomes a sentinel ──

pub fn price(container: &ElementRef) -> String {
    first_text(container, &selectors::PRICE).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Leading token of the rating phrase ("4.7 out of 5 stars" -> "4.7").
pub fn rating(container: &ElementRef) -> String {
    first_text(container, &selectors::RATING)
        .and_then(|t| t.split_whitespace().next().map(str::to_string))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn reviews(container: &ElementRef) -> String {
    first_text(container, &selectors::REVIEWS).unwrap_or_else(|| NO_REVIEWS.to_string())
}

fn absolute_url(origin: &str, href: &str) -> String {
    if href.starts_with("https://") || href.starts_with("http://") {
        return href.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{}{}", origin, href)
    } else {
        format!("{}/{}", origin, href)
    }
}
