//! Structural markers of the search-results listing. Update these when the
//! source changes its markup; extraction degrades to sentinels until then.

use std::sync::LazyLock;

use scraper::Selector;

fn compile(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// One listing entry, as opposed to ads, banners and page chrome.
pub static RESULT: LazyLock<Selector> =
    LazyLock::new(|| compile(r#"div[data-component-type="s-search-result"]"#));

pub static TITLE: LazyLock<Selector> = LazyLock::new(|| compile("span.a-text-normal"));
pub static PRICE: LazyLock<Selector> = LazyLock::new(|| compile("span.a-price-whole"));
/// Alt text of the star icon, e.g. "4.7 out of 5 stars".
pub static RATING: LazyLock<Selector> = LazyLock::new(|| compile("span.a-icon-alt"));
pub static REVIEWS: LazyLock<Selector> = LazyLock::new(|| compile("span.a-size-base"));
pub static LINK: LazyLock<Selector> = LazyLock::new(|| compile("a.a-link-normal"));
