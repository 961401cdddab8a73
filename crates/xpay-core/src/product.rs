//! # Product Catalog
//!
//! Products sold from the landing page.
//! Loaded from `config/products.toml`.

use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, PaymentResult};
use crate::price::{format_price, is_valid_amount, MAX_AMOUNT};

/// Product id of the toolkit sold on the landing page
pub const FAQ_TOOLKIT_ID: &str = "faq-toolkit-v1";

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier (e.g., "faq-toolkit-v1")
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Price in cents
    pub price: i64,

    /// Pre-launch price shown struck through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<i64>,

    /// Whether this product is active and available for purchase
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create a new one-time purchase product
    pub fn one_time(id: impl Into<String>, name: impl Into<String>, price: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            regular_price: None,
            active: true,
        }
    }

    /// The FAQ AI Toolkit at its launch price
    pub fn faq_toolkit() -> Self {
        Self::one_time(FAQ_TOOLKIT_ID, "FAQ AI Toolkit - Complete Package", 4500)
            .with_description("Generate, organize and publish FAQ content with AI")
            .with_regular_price(45000)
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set regular price
    pub fn with_regular_price(mut self, cents: i64) -> Self {
        self.regular_price = Some(cents);
        self
    }

    /// Format for display (e.g., "$45.00")
    pub fn display_price(&self) -> String {
        format_price(self.price)
    }

    /// Percentage saved against the regular price, rounded down
    pub fn discount_percent(&self) -> Option<u8> {
        let regular = self.regular_price?;
        if !is_valid_amount(self.price) || !is_valid_amount(regular) || self.price >= regular {
            return None;
        }
        let saved = regular.checked_sub(self.price)?.checked_mul(100)?;
        u8::try_from(saved / regular).ok()
    }

    /// Reject prices the checkout could never charge
    pub fn validate(&self) -> PaymentResult<()> {
        if !is_valid_amount(self.price) {
            return Err(PaymentError::Validation(format!(
                "{}: price must be between 1 and {} cents",
                self.id, MAX_AMOUNT
            )));
        }
        if let Some(regular) = self.regular_price {
            if !is_valid_amount(regular) {
                return Err(PaymentError::Validation(format!(
                    "{}: regular_price must be between 1 and {} cents",
                    self.id, MAX_AMOUNT
                )));
            }
        }
        Ok(())
    }
}

/// Product catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Catalog with only the FAQ AI Toolkit
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.add(Product::faq_toolkit());
        catalog
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Get all active products
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    /// Load catalog from TOML string. Every price must be chargeable.
    pub fn from_toml(toml_str: &str) -> PaymentResult<Self> {
        let catalog: Self =
            toml::from_str(toml_str).map_err(|e| PaymentError::Configuration(e.to_string()))?;
        for product in &catalog.products {
            product.validate()?;
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faq_toolkit() {
        let product = Product::faq_toolkit();
        assert_eq!(product.id, FAQ_TOOLKIT_ID);
        assert_eq!(product.display_price(), "$45.00");
        assert_eq!(product.discount_percent(), Some(90));
    }

    #[test]
    fn test_catalog_from_toml() {
        let catalog = ProductCatalog::from_toml(
            r#"
            [[products]]
            id = "faq-toolkit-v1"
            name = "FAQ AI Toolkit"
            price = 4500
            regular_price = 45000

            [[products]]
            id = "faq-toolkit-beta"
            name = "FAQ AI Toolkit Beta"
            price = 1000
            active = false
            "#,
        )
        .unwrap();

        assert_eq!(catalog.products.len(), 2);
        assert_eq!(catalog.get("faq-toolkit-v1").unwrap().price, 4500);
        assert_eq!(catalog.active_products().count(), 1);
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_no_discount_without_regular_price() {
        assert_eq!(Product::one_time("p", "P", 100).discount_percent(), None);
    }

    #[test]
    fn test_no_discount_for_unchargeable_prices() {
        let negative = Product::one_time("p", "P", -1000).with_regular_price(10);
        assert_eq!(negative.discount_percent(), None);

        let huge = Product::one_time("p", "P", 1).with_regular_price(i64::MAX);
        assert_eq!(huge.discount_percent(), None);

        let tiny = Product::one_time("p", "P", 1).with_regular_price(MAX_AMOUNT);
        assert_eq!(tiny.discount_percent(), Some(99));
    }

    #[test]
    fn test_catalog_rejects_bad_prices() {
        for body in [
            "[[products]]\nid = \"free\"\nname = \"Free\"\nprice = 0",
            "[[products]]\nid = \"neg\"\nname = \"Neg\"\nprice = -1000\nregular_price = 10",
            "[[products]]\nid = \"big\"\nname = \"Big\"\nprice = 100\nregular_price = 1000000",
        ] {
            assert!(matches!(
                ProductCatalog::from_toml(body),
                Err(PaymentError::Validation(_))
            ));
        }

        assert!(matches!(
            ProductCatalog::from_toml("products = 3"),
            Err(PaymentError::Configuration(_))
        ));
    }
}
