//! Order records. `OrderUnit::unit_price` is the price at purchase time.

use crate::models::catalog::UnitWithProduct;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Order {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Canceled,
}

#[derive(Error, Debug)]
#[error("unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    /// Stored form.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }

    /// Human-readable form shown to clients.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "canceled" => Ok(OrderStatus::Canceled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = UnknownStatus;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderUnit {
    pub id: i64,
    pub order_id: i64,
    pub unit_id: i64,
    pub quantity: i32,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderSummary {
    #[sqlx(flatten)]
    pub order: Order,
    pub units_num: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub order_unit: OrderUnit,
    pub unit: UnitWithProduct,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderGraph {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// A validated order about to be written. Unit prices are read at insert time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub unit_id: i64,
    pub quantity: i32,
}
