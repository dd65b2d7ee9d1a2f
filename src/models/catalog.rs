//! Catalog records: products, their units (variants), tags, properties and images.

use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Tag {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Property {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PropertyValue {
    pub id: i64,
    pub property_id: i64,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Unit {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    pub price: Decimal,
    pub num_in_stock: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UnitImage {
    pub id: i64,
    pub unit_id: i64,
    /// Storage path relative to the media root.
    pub image: String,
    pub is_main: bool,
}

/// A property value attached to a unit, joined with its property's name.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct NamedValue {
    pub unit_id: i64,
    pub property_name: String,
    pub value: String,
}

/// A unit with its attached values and images, both in id order.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitGraph {
    pub unit: Unit,
    pub values: Vec<NamedValue>,
    pub images: Vec<UnitImage>,
}

impl UnitGraph {
    /// The main-flagged image, else the first one.
    pub fn preferred_image(&self) -> Option<&UnitImage> {
        self.images
            .iter()
            .find(|img| img.is_main)
            .or_else(|| self.images.first())
    }
}

/// A unit loaded together with the title of the product it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitWithProduct {
    pub product_title: String,
    pub unit: UnitGraph,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductGraph {
    pub product: Product,
    pub tags: Vec<Tag>,
    pub units: Vec<UnitGraph>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGraph {
    pub property: Property,
    pub values: Vec<PropertyValue>,
}
