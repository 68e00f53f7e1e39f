pub mod fields;
pub mod selectors;

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::error::ItemError;
use crate::record::ProductRecord;

/// Records pulled from one listing page, plus how many entries were dropped.
#[derive(Debug, Default)]
pub struct PageExtraction {
    pub records: Vec<ProductRecord>,
    pub containers: usize,
    pub skipped: usize,
}

/// Parse a listing page and extract every entry independently. A broken
/// entry is skipped; its siblings are kept in discovery order.
pub fn extract_page(html: &str, origin: &str) -> PageExtraction {
    let document = Html::parse_document(html);
    let mut out = PageExtraction::default();

    for (index, container) in document.select(&selectors::RESULT).enumerate() {
        out.containers += 1;
        match extract_item(&container, origin) {
            Ok(record) => out.records.push(record),
            Err(e) => {
                out.skipped += 1;
                debug!("Skipping entry {}: {}", index, e);
            }
        }
    }
    out
}

pub fn extract_item(container: &ElementRef, origin: &str) -> Result<ProductRecord, ItemError> {
    let name = fields::title(container)?;
    let price = fields::price(container);
    let rating = fields::rating(container);
    let reviews = fields::reviews(container);
    let url = fields::product_url(container, origin)?;

    Ok(ProductRecord {
        name,
        price,
        rating,
        reviews,
        url,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{NOT_AVAILABLE, NO_REVIEWS};

    const ORIGIN: &str = "https://www.amazon.com";

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn search_page_entries_in_order() {
        let page = extract_page(&fixture("search_page"), ORIGIN);
        assert_eq!(page.containers, 3);
        assert_eq!(page.skipped, 0);
        let names: Vec<&str> = page.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Logitech MX Master 3S Wireless Mouse",
                "Anker USB C Hub, 7-in-1 Adapter",
                "Keychron K2 Mechanical Keyboard"
            ]
        );
    }

    #[test]
    fn search_page_fields() {
        let page = extract_page(&fixture("search_page"), ORIGIN);
        let first = &page.records[0];
        assert_eq!(first.price, "99.");
        assert_eq!(first.rating, "4.7");
        assert_eq!(first.reviews, "12,408");
        assert_eq!(first.url, "https://www.amazon.com/dp/B09HM94VDS");
    }

    #[test]
    fn chrome_outside_containers_ignored() {
        let page = extract_page(&fixture("search_page"), ORIGIN);
        assert!(page.records.iter().all(|r| r.name != "Results"));
    }

    #[test]
    fn title_less_entry_skipped_sibling_kept() {
        let page = extract_page(&fixture("missing_title"), ORIGIN);
        assert_eq!(page.containers, 2);
        assert_eq!(page.skipped, 1);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].name, "Sony WH-1000XM5 Headphones");
    }

    #[test]
    fn missing_optional_markers_become_sentinels() {
        let page = extract_page(&fixture("partial_fields"), ORIGIN);
        assert_eq!(page.records.len(), 1);
        let r = &page.records[0];
        assert_eq!(r.name, "Generic Phone Stand");
        assert_eq!(r.price, NOT_AVAILABLE);
        assert_eq!(r.rating, NOT_AVAILABLE);
        assert_eq!(r.reviews, NO_REVIEWS);
        assert_eq!(r.url, "https://www.amazon.com/dp/B0STAND01");
    }

    #[test]
    fn entry_without_link_skipped() {
        let html = r#"
            <div data-component-type="s-search-result">
              <h2><span class="a-text-normal">No Link Widget</span></h2>
              <span class="a-price-whole">10.</span>
            </div>
            <div data-component-type="s-search-result">
              <a class="a-link-normal"><span class="a-text-normal">Hrefless Widget</span></a>
            </div>
            <div data-component-type="s-search-result">
              <a class="a-link-normal" href="/dp/B0OK"><span class="a-text-normal">Good Widget</span></a>
            </div>"#;
        let page = extract_page(html, ORIGIN);
        assert_eq!(page.skipped, 2);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].name, "Good Widget");
    }

    #[test]
    fn item_errors_name_the_missing_marker() {
        let html = r#"<div data-component-type="s-search-result">
              <a class="a-link-normal"><span class="a-text-normal">Hrefless</span></a>
            </div>"#;
        let document = Html::parse_document(html);
        let container = document.select(&selectors::RESULT).next().unwrap();
        assert_eq!(extract_item(&container, ORIGIN), Err(ItemError::MissingHref));
    }

    #[test]
    fn whitespace_in_title_collapsed() {
        let html = r#"<div data-component-type="s-search-result">
              <a class="a-link-normal" href="/dp/B0WS">
                <span class="a-text-normal">
                  Multi
                  Line   Title
                </span></a>
            </div>"#;
        let page = extract_page(html, ORIGIN);
        assert_eq!(page.records[0].name, "Multi Line Title");
    }

    #[test]
    fn page_without_containers_is_empty() {
        let page = extract_page("<html><body><p>captcha</p></body></html>", ORIGIN);
        assert!(page.records.is_empty());
        assert_eq!(page.containers, 0);
    }
}
