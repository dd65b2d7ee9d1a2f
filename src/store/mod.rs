//! Persistence seam. Handlers and services only see `ShopStore`; `PgStore` backs
//! it with PostgreSQL and `MemoryStore` keeps everything in process.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::models::{
    Group, NewOrder, NewSeller, NewUser, OrderGraph, OrderSummary, Permission, ProductGraph,
    PropertyGraph, Seller, Tag, User, UnitWithProduct,
};
use async_trait::async_trait;

/// Message reported against `email` when an account with that email exists.
pub const DUPLICATE_EMAIL: &str = "user with this email already exists.";

#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Cheap liveness probe of the backing storage.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list_products(&self) -> Result<Vec<ProductGraph>, AppError>;
    async fn product(&self, id: i64) -> Result<Option<ProductGraph>, AppError>;
    async fn list_tags(&self) -> Result<Vec<Tag>, AppError>;
    async fn list_properties(&self) -> Result<Vec<PropertyGraph>, AppError>;
    async fn unit_by_sku(&self, sku: &str) -> Result<Option<UnitWithProduct>, AppError>;

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, AppError>;
    async fn order(&self, id: i64) -> Result<Option<OrderGraph>, AppError>;
    /// Writes the order and its lines atomically, copying each unit's current
    /// price into the line. Returns the new order id.
    async fn create_order(&self, order: &NewOrder) -> Result<i64, AppError>;

    async fn email_taken(&self, email: &str) -> Result<bool, AppError>;
    /// Creates the user, its group memberships and, when given, the linked seller
    /// in one unit of work. A duplicate email is a validation error on `email`.
    async fn create_account(
        &self,
        user: &NewUser,
        group_ids: &[i64],
        seller: Option<&NewSeller>,
    ) -> Result<(User, Option<Seller>), AppError>;

    /// Get-or-create by unique name. Safe under concurrent callers.
    async fn get_or_create_group(&self, name: &str) -> Result<Group, AppError>;
    async fn permission_by_codename(&self, codename: &str) -> Result<Option<Permission>, AppError>;
    /// Idempotent.
    async fn grant_permission(&self, group_id: i64, permission_id: i64) -> Result<(), AppError>;
}
