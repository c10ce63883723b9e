//! Normalized refurbished-store product record
//!
//! A `Product` is built exactly once per decoded grid tile and never mutated
//! afterwards; fields are read through accessors.

use serde::{Deserialize, Serialize};

/// One product entry from a refurbished listing grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: String,
    name: String,
    family: String,
    color: String,
    capacity: String,
    price: f64,
    original_price: f64,
    #[serde(rename = "imageURL")]
    image_url: String,
    #[serde(rename = "storeURL")]
    store_url: String,
    locale: String,
    category: String,
}

/// Field bundle used to construct a [`Product`]
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
    pub id: String,
    pub name: String,
    pub family: String,
    pub color: String,
    pub capacity: String,
    pub price: f64,
    pub original_price: f64,
    pub image_url: String,
    pub store_url: String,
    pub locale: String,
    pub category: String,
}

impl Product {
    /// Build an immutable product from its fields
    #[must_use]
    pub fn new(fields: ProductFields) -> Self {
        let ProductFields {
            id,
            name,
            family,
            color,
            capacity,
            price,
            original_price,
            image_url,
            store_url,
            locale,
            category,
        } = fields;

        Self {
            id,
            name,
            family,
            color,
            capacity,
            price,
            original_price,
            image_url,
            store_url,
            locale,
            category,
        }
    }

    /// Store part number (SKU)
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Refurbished model family, empty when the tile had no dimensions
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn capacity(&self) -> &str {
        &self.capacity
    }

    #[must_use]
    pub const fn price(&self) -> f64 {
        self.price
    }

    /// Price before discount; equal to `price` when there is none
    #[must_use]
    pub const fn original_price(&self) -> f64 {
        self.original_price
    }

    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    #[must_use]
    pub fn store_url(&self) -> &str {
        &self.store_url
    }

    /// Locale of the task that produced this record (empty in URL mode)
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Category of the task that produced this record (empty in URL mode)
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }
}

/// Drop everything from the first `?` on
#[must_use]
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Derive a display name from a product detail URL
///
/// Takes the trailing path segment (query removed), strips `prefix` when
/// present and turns hyphens into spaces:
/// `.../Refurbished-iPad-Pro-11?x=1` becomes `iPad Pro 11`.
#[must_use]
pub fn name_from_details_url(url: &str, prefix: &str) -> String {
    let path = strip_query(url).trim_end_matches('/');
    let segment = path.rsplit('/').next().unwrap_or(path);
    let segment = segment.strip_prefix(prefix).unwrap_or(segment);

    segment.replace('-', " ")
}
