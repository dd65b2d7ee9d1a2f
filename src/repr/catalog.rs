//! Tag, property, unit and product representations.

use super::MediaUrl;
use crate::models::{ProductGraph, PropertyGraph, Tag, UnitGraph};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// A tag is represented by its bare name.
pub fn tag(tag: &Tag) -> String {
    tag.name.clone()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PropertyValueRepr {
    pub id: i64,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PropertyRepr {
    pub name: String,
    pub values: Vec<PropertyValueRepr>,
}

pub fn property(graph: &PropertyGraph) -> PropertyRepr {
    PropertyRepr {
        name: graph.property.name.clone(),
        values: graph
            .values
            .iter()
            .map(|v| PropertyValueRepr {
                id: v.id,
                value: v.value.clone(),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UnitPropertyRepr {
    pub name: String,
    pub value: String,
}

pub fn unit_properties(graph: &UnitGraph) -> Vec<UnitPropertyRepr> {
    graph
        .values
        .iter()
        .map(|v| UnitPropertyRepr {
            name: v.property_name.clone(),
            value: v.value.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UnitRepr {
    pub sku: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub properties: Vec<UnitPropertyRepr>,
    /// Empty, never null, when the unit has no images.
    pub images: Vec<String>,
    pub num_in_stock: i32,
}

pub fn unit(graph: &UnitGraph, media: &MediaUrl) -> UnitRepr {
    UnitRepr {
        sku: graph.unit.sku.clone(),
        price: graph.unit.price,
        properties: unit_properties(graph),
        images: graph.images.iter().map(|img| media.url(&img.image)).collect(),
        num_in_stock: graph.unit.num_in_stock,
    }
}

/// Lowest and highest unit price. Both null for a product without units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PriceRange {
    #[schema(value_type = Option<String>)]
    pub min: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub max: Option<Decimal>,
}

pub fn price_range(units: &[UnitGraph]) -> PriceRange {
    let prices = units.iter().map(|u| u.unit.price);
    PriceRange {
        min: prices.clone().min(),
        max: prices.max(),
    }
}

/// Image of the first unit that has any: its main image if flagged, else its first.
pub fn product_image(graph: &ProductGraph, media: &MediaUrl) -> Option<String> {
    graph
        .units
        .iter()
        .find(|u| !u.images.is_empty())
        .and_then(UnitGraph::preferred_image)
        .map(|img| media.url(&img.image))
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductListRepr {
    pub id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub prices: PriceRange,
    pub image: Option<String>,
}

pub fn product_list(graph: &ProductGraph, media: &MediaUrl) -> ProductListRepr {
    ProductListRepr {
        id: graph.product.id,
        title: graph.product.title.clone(),
        tags: graph.tags.iter().map(tag).collect(),
        prices: price_range(&graph.units),
        image: product_image(graph, media),
    }
}

/// List fields extended with the description and every unit.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductDetailRepr {
    #[serde(flatten)]
    pub base: ProductListRepr,
    pub description: String,
    pub units: Vec<UnitRepr>,
}

pub fn product_detail(graph: &ProductGraph, media: &MediaUrl) -> ProductDetailRepr {
    ProductDetailRepr {
        base: product_list(graph, media),
        description: graph.product.description.clone(),
        units: graph.units.iter().map(|u| unit(u, media)).collect(),
    }
}
