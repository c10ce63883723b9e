//! Product grid decoder
//!
//! Maps a repaired bootstrap fragment onto normalized [`Product`] records.
//! Decoding is schema-typed: a wrong value type anywhere in a tile fails the
//! whole fragment with `ParsingError::Decode`, while absent or `null` parts
//! fall back to defaults.

use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::bootstrap_extractor::BootstrapFragment;
use super::config::ParsingConfig;
use super::{ContextualParser, ParseContext, ParsingError, ParsingResult};
use crate::domain::product::{Product, ProductFields, name_from_details_url, strip_query};

/// Explicit `null` decodes like an absent key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize)]
struct GridBootstrap {
    #[serde(default, deserialize_with = "null_as_default")]
    tiles: Vec<GridTile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridTile {
    #[serde(default, deserialize_with = "null_as_default")]
    part_number: String,
    #[serde(default)]
    filters: Option<TileFilters>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    product_details_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    price: TilePrice,
    #[serde(default, deserialize_with = "null_as_default")]
    image: TileImage,
}

#[derive(Debug, Default, Deserialize)]
struct TileFilters {
    #[serde(default)]
    dimensions: Option<TileDimensions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TileDimensions {
    #[serde(default)]
    refurb_clear_model: Option<String>,
    #[serde(default)]
    dimension_color: Option<String>,
    #[serde(default)]
    dimension_capacity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TilePrice {
    #[serde(default, deserialize_with = "null_as_default")]
    seo_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    original_product_amount: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TileImage {
    #[serde(default, deserialize_with = "null_as_default")]
    src_set: TileSrcSet,
}

#[derive(Debug, Default, Deserialize)]
struct TileSrcSet {
    #[serde(default, deserialize_with = "null_as_default")]
    src: String,
}

/// Decoder for the refurbished product grid
#[derive(Debug, Clone)]
pub struct ProductGridParser {
    name_prefix: String,
}

impl ProductGridParser {
    /// Create a decoder with the default name prefix
    pub fn new() -> Self {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> Self {
        Self {
            name_prefix: config.name_prefix.clone(),
        }
    }

    /// Decode `fragment` and tag every product with `locale` and `category`
    pub fn decode(
        &self,
        fragment: &BootstrapFragment,
        locale: &str,
        category: &str,
    ) -> ParsingResult<Vec<Product>> {
        self.parse_with_context(fragment, &ParseContext::new(locale, category))
    }

    fn tile_to_product(&self, tile: GridTile, context: &ParseContext) -> Product {
        let name = match tile.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => name_from_details_url(&tile.product_details_url, &self.name_prefix),
        };

        let dimensions = tile
            .filters
            .and_then(|filters| filters.dimensions)
            .unwrap_or_default();

        Product::new(ProductFields {
            id: tile.part_number,
            name,
            family: dimensions.refurb_clear_model.unwrap_or_default(),
            color: dimensions.dimension_color.unwrap_or_default(),
            capacity: dimensions.dimension_capacity.unwrap_or_default(),
            price: tile.price.seo_price,
            original_price: tile.price.original_product_amount,
            image_url: strip_query(&tile.image.src_set.src).to_string(),
            store_url: strip_query(&tile.product_details_url).to_string(),
            locale: context.locale.clone(),
            category: context.category.clone(),
        })
    }
}

impl Default for ProductGridParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextualParser for ProductGridParser {
    type Input = BootstrapFragment;
    type Output = Vec<Product>;
    type Context = ParseContext;

    fn parse_with_context(
        &self,
        fragment: &BootstrapFragment,
        context: &ParseContext,
    ) -> ParsingResult<Vec<Product>> {
        let grid: GridBootstrap =
            serde_json::from_str(fragment.as_str()).map_err(|e| ParsingError::decode(&e))?;

        let products: Vec<Product> = grid
            .tiles
            .into_iter()
            .map(|tile| self.tile_to_product(tile, context))
            .collect();

        debug!(
            "Decoded {} products (locale='{}', category='{}', source={:?})",
            products.len(),
            context.locale,
            context.category,
            context.source_url
        );

        Ok(products)
    }
}
