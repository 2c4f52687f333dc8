use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::comparison::Site;
use crate::ConfigError;

/// A product tracked on both storefronts. Identity is `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub amazon_url: String,
    pub flipkart_url: String,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        amazon_url: impl Into<String>,
        flipkart_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amazon_url: amazon_url.into(),
            flipkart_url: flipkart_url.into(),
        }
    }

    #[must_use]
    pub fn url_for(&self, site: Site) -> &str {
        match site {
            Site::Amazon => &self.amazon_url,
            Site::Flipkart => &self.flipkart_url,
        }
    }

    /// Product name with spaces replaced by underscores, used in screenshot
    /// file names (`amazon_Apple_MacBook_Air_M1.png`).
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.name.replace(' ', "_")
    }
}

/// An ordered, validated, immutable list of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
}

impl Catalog {
    /// Builds a catalog, rejecting blank or duplicate names and non-HTTP URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first offending entry.
    pub fn new(products: Vec<Product>) -> Result<Self, ConfigError> {
        validate_products(&products)?;
        Ok(Self { products })
    }

    /// The catalog compiled into the binary.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            products: vec![
                Product::new(
                    "Samsung Galaxy S22 Ultra",
                    "https://www.amazon.in/Samsung-Smartphone-Titanium-Storage-without/dp/B0CT5BJC16/",
                    "https://www.flipkart.com/samsung-galaxy-s24-ultra-5g-titanium-black-256-gb/p/itm20b685e30271b?pid=MOBH3P4UM6ACEC2M&lid=LSTMOBH3P4UM6ACEC2MPVUFW8&marketplace=FLIPKART",
                ),
                Product::new(
                    "Apple MacBook Air M1",
                    "https://www.amazon.in/Apple-MacBook-Chip-13-inch-256GB/dp/B08N5W4NNB/",
                    "https://www.flipkart.com/apple-macbook-air-m2-8-gb-256-gb-ssd-mac-os-monterey-mlxy3hn-a/p/itm6533ea968a81e?pid=COMGFB2GWHPVFMJW&lid=LSTCOMGFB2GWHPVFMJWKVXDUX&marketplace=FLIPKART",
                ),
            ],
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Load and validate a catalog from a YAML file of the form
/// `products: [{ name, amazon_url, flipkart_url }]`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CatalogFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CatalogFileParse)?;

    Catalog::new(file.products)
}

fn validate_products(products: &[Product]) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for product in products {
        if product.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(product.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product name: '{}'",
                product.name
            )));
        }

        for site in Site::ALL {
            let url = product.url_for(site);
            if !is_http_url(url) {
                return Err(ConfigError::Validation(format!(
                    "product '{}' has invalid {} URL \"{url}\"",
                    product.name,
                    site.display_name()
                )));
            }
        }
    }

    Ok(())
}

/// An absolute `http`/`https` URL with a host.
pub(crate) fn is_http_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    })
}
