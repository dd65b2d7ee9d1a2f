//! Order and cart representations.

use super::catalog::{unit_properties, UnitPropertyRepr};
use super::MediaUrl;
use crate::models::{OrderGraph, OrderLine, OrderSummary, UnitWithProduct};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderListRepr {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub units_num: i64,
}

pub fn order_list(summary: &OrderSummary) -> OrderListRepr {
    OrderListRepr {
        id: summary.order.id,
        created_at: summary.order.created_at,
        units_num: summary.units_num,
    }
}

/// Unit as embedded in an order line or a cart entry.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UnitForOrderRepr {
    pub title: String,
    pub properties: Vec<UnitPropertyRepr>,
    pub image: Option<String>,
    pub product_id: i64,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub sku: String,
}

/// Uses the unit's current price.
pub fn unit_for_order(item: &UnitWithProduct, media: &MediaUrl) -> UnitForOrderRepr {
    UnitForOrderRepr {
        title: item.product_title.clone(),
        properties: unit_properties(&item.unit),
        image: item.unit.preferred_image().map(|img| media.url(&img.image)),
        product_id: item.unit.unit.product_id,
        price: item.unit.unit.price,
        sku: item.unit.unit.sku.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderUnitRepr {
    pub quantity: i32,
    pub status: String,
    pub unit: UnitForOrderRepr,
}

/// The embedded unit carries the price recorded at purchase, not the current one.
pub fn order_unit(line: &OrderLine, media: &MediaUrl) -> OrderUnitRepr {
    let mut unit = unit_for_order(&line.unit, media);
    unit.price = line.order_unit.unit_price;
    OrderUnitRepr {
        quantity: line.order_unit.quantity,
        status: line.order_unit.status.label().to_string(),
        unit,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderDetailRepr {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub units: Vec<OrderUnitRepr>,
}

pub fn order_detail(graph: &OrderGraph, media: &MediaUrl) -> OrderDetailRepr {
    OrderDetailRepr {
        id: graph.order.id,
        created_at: graph.order.created_at,
        name: graph.order.name.clone(),
        address: graph.order.address.clone(),
        phone: graph.order.phone.clone(),
        units: graph.lines.iter().map(|l| order_unit(l, media)).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartUnitRepr {
    pub quantity: i32,
    pub unit: UnitForOrderRepr,
}

pub fn cart_unit(quantity: i32, item: &UnitWithProduct, media: &MediaUrl) -> CartUnitRepr {
    CartUnitRepr {
        quantity,
        unit: unit_for_order(item, media),
    }
}
