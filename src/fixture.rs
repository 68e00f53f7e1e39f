use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::record::ProductRecord;

const SAMPLE_URL: &str = "https://www.amazon.com/dp/B08N5KWB9H";

/// Named record list served in test mode instead of scraping.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub name: String,
    pub records: Vec<ProductRecord>,
}

impl Fixture {
    /// Built-in sample of eight representative products.
    pub fn sample() -> Self {
        let rows = [
            ("Apple MacBook Pro 13-inch", "1299.99", "4.7", "2,345"),
            ("Samsung Galaxy S21 Ultra", "1199.99", "4.6", "1,890"),
            ("Sony WH-1000XM4 Wireless Headphones", "349.99", "4.8", "3,567"),
            ("Nintendo Switch OLED", "349.99", "4.9", "4,123"),
            ("Canon EOS R5 Camera", "3899.99", "4.7", "890"),
            ("Dyson V15 Detect Absolute", "699.99", "4.8", "2,456"),
            ("Apple AirPods Pro", "249.99", "4.7", "5,678"),
            ("Samsung 65\" QLED 4K Smart TV", "1499.99", "4.6", "1,234"),
        ];
        Fixture {
            name: "sample".to_string(),
            records: rows
                .into_iter()
                .map(|(name, price, rating, reviews)| {
                    ProductRecord::new(name, price, rating, reviews, SAMPLE_URL)
                })
                .collect(),
        }
    }

    /// Load a fixture from JSON: `{"name": "...", "records": [{...}, ...]}`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid fixture {:?}", path))
    }

    pub fn from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::sample()),
        }
    }
}
