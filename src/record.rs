use serde::{Deserialize, Serialize};

/// Placeholder for a price or rating that could not be read.
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for a missing review count.
pub const NO_REVIEWS: &str = "0";

/// Column order of the persisted artifact.
pub const HEADER: [&str; 5] = ["name", "price", "rating", "reviews", "url"];

/// One product entry from a listing page. All fields stay text as displayed
/// by the source; nothing is parsed into numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub price: String,
    pub rating: String,
    pub reviews: String,
    pub url: String,
}

impl ProductRecord {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        rating: impl Into<String>,
        reviews: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        ProductRecord {
            name: name.into(),
            price: price.into(),
            rating: rating.into(),
            reviews: reviews.into(),
            url: url.into(),
        }
    }

    /// Fields in `HEADER` order.
    pub fn as_row(&self) -> [&str; 5] {
        [
            self.name.as_str(),
            self.price.as_str(),
            self.rating.as_str(),
            self.reviews.as_str(),
            self.url.as_str(),
        ]
    }
}
