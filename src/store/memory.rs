//! In-process store. Rows live in insertion (= id) order behind one lock; unique
//! constraints mirror the PostgreSQL schema.

use super::{ShopStore, DUPLICATE_EMAIL};
use crate::error::AppError;
use crate::migration::permission_codenames;
use crate::models::{
    Group, NamedValue, NewOrder, NewSeller, NewUser, Order, OrderGraph, OrderLine, OrderStatus,
    OrderSummary, OrderUnit, Permission, Product, ProductGraph, Property, PropertyGraph,
    PropertyValue, Seller, Tag, Unit, UnitGraph, UnitImage, UnitWithProduct, User,
};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    next_id: i64,
    products: Vec<Product>,
    tags: Vec<Tag>,
    properties: Vec<Property>,
    property_values: Vec<PropertyValue>,
    units: Vec<Unit>,
    /// (unit_id, value_id)
    unit_values: Vec<(i64, i64)>,
    unit_images: Vec<UnitImage>,
    orders: Vec<Order>,
    order_units: Vec<OrderUnit>,
    users: Vec<User>,
    groups: Vec<Group>,
    permissions: Vec<Permission>,
    /// (group_id, permission_id)
    group_permissions: Vec<(i64, i64)>,
    /// (user_id, group_id)
    user_groups: Vec<(i64, i64)>,
    sellers: Vec<Seller>,
}

impl Tables {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn unit_graph(&self, unit: &Unit) -> UnitGraph {
        let values = self
            .unit_values
            .iter()
            .filter(|(unit_id, _)| *unit_id == unit.id)
            .filter_map(|(_, value_id)| self.property_values.iter().find(|pv| pv.id == *value_id))
            .filter_map(|pv| {
                self.properties
                    .iter()
                    .find(|p| p.id == pv.property_id)
                    .map(|p| (pv.id, p.name.clone(), pv.value.clone()))
            });
        let mut values: Vec<(i64, String, String)> = values.collect();
        values.sort_by_key(|(id, _, _)| *id);
        UnitGraph {
            unit: unit.clone(),
            values: values
                .into_iter()
                .map(|(_, property_name, value)| NamedValue {
                    unit_id: unit.id,
                    property_name,
                    value,
                })
                .collect(),
            images: self
                .unit_images
                .iter()
                .filter(|img| img.unit_id == unit.id)
                .cloned()
                .collect(),
        }
    }

    fn unit_with_product(&self, unit: &Unit) -> UnitWithProduct {
        UnitWithProduct {
            product_title: self
                .products
                .iter()
                .find(|p| p.id == unit.product_id)
                .map(|p| p.title.clone())
                .unwrap_or_default(),
            unit: self.unit_graph(unit),
        }
    }

    fn product_graph(&self, product: &Product) -> ProductGraph {
        ProductGraph {
            product: product.clone(),
            tags: self
                .tags
                .iter()
                .filter(|t| t.product_id == product.id)
                .cloned()
                .collect(),
            units: self
                .units
                .iter()
                .filter(|u| u.product_id == product.id)
                .map(|u| self.unit_graph(u))
                .collect(),
        }
    }
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with the full permission catalogue seeded.
    pub fn new() -> Self {
        let codenames = permission_codenames();
        let refs: Vec<&str> = codenames.iter().map(String::as_str).collect();
        Self::with_permissions(&refs)
    }

    /// Empty store whose permission catalogue holds exactly `codenames`.
    pub fn with_permissions(codenames: &[&str]) -> Self {
        let mut tables = Tables::default();
        for codename in codenames {
            let id = tables.id();
            tables.permissions.push(Permission {
                id,
                codename: codename.to_string(),
            });
        }
        Self {
            tables: RwLock::new(tables),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_product(&self, title: &str, description: &str) -> i64 {
        let mut t = self.write();
        let id = t.id();
        t.products.push(Product {
            id,
            title: title.into(),
            description: description.into(),
        });
        id
    }

    pub fn add_tag(&self, product_id: i64, name: &str) -> i64 {
        let mut t = self.write();
        let id = t.id();
        t.tags.push(Tag {
            id,
            product_id,
            name: name.into(),
        });
        id
    }

    pub fn add_property(&self, name: &str) -> i64 {
        let mut t = self.write();
        let id = t.id();
        t.properties.push(Property { id, name: name.into() });
        id
    }

    pub fn add_property_value(&self, property_id: i64, value: &str) -> i64 {
        let mut t = self.write();
        let id = t.id();
        t.property_values.push(PropertyValue {
            id,
            property_id,
            value: value.into(),
        });
        id
    }

    pub fn add_unit(&self, product_id: i64, sku: &str, price: Decimal, num_in_stock: i32) -> i64 {
        let mut t = self.write();
        let id = t.id();
        t.units.push(Unit {
            id,
            product_id,
            sku: sku.into(),
            price,
            num_in_stock,
        });
        id
    }

    pub fn attach_value(&self, unit_id: i64, value_id: i64) {
        let mut t = self.write();
        if !t.unit_values.contains(&(unit_id, value_id)) {
            t.unit_values.push((unit_id, value_id));
        }
    }

    pub fn add_image(&self, unit_id: i64, image: &str, is_main: bool) -> i64 {
        let mut t = self.write();
        let id = t.id();
        t.unit_images.push(UnitImage {
            id,
            unit_id,
            image: image.into(),
            is_main,
        });
        id
    }

    pub fn users(&self) -> Vec<User> {
        self.read().users.clone()
    }

    pub fn sellers(&self) -> Vec<Seller> {
        self.read().sellers.clone()
    }

    /// Reprice a unit in place. Returns false when no unit has that sku.
    pub fn set_unit_price(&self, sku: &str, price: Decimal) -> bool {
        let mut t = self.write();
        match t.units.iter_mut().find(|u| u.sku == sku) {
            Some(unit) => {
                unit.price = price;
                true
            }
            None => false,
        }
    }

    pub fn groups(&self) -> Vec<Group> {
        self.read().groups.clone()
    }

    pub fn user_groups(&self, user_id: i64) -> Vec<Group> {
        let t = self.read();
        t.groups
            .iter()
            .filter(|g| t.user_groups.contains(&(user_id, g.id)))
            .cloned()
            .collect()
    }

    pub fn group_permissions(&self, group_id: i64) -> Vec<Permission> {
        let t = self.read();
        t.permissions
            .iter()
            .filter(|p| t.group_permissions.contains(&(group_id, p.id)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ShopStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<ProductGraph>, AppError> {
        let t = self.read();
        Ok(t.products.iter().map(|p| t.product_graph(p)).collect())
    }

    async fn product(&self, id: i64) -> Result<Option<ProductGraph>, AppError> {
        let t = self.read();
        Ok(t.products.iter().find(|p| p.id == id).map(|p| t.product_graph(p)))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        Ok(self.read().tags.clone())
    }

    async fn list_properties(&self) -> Result<Vec<PropertyGraph>, AppError> {
        let t = self.read();
        Ok(t.properties
            .iter()
            .map(|property| PropertyGraph {
                property: property.clone(),
                values: t
                    .property_values
                    .iter()
                    .filter(|v| v.property_id == property.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn unit_by_sku(&self, sku: &str) -> Result<Option<UnitWithProduct>, AppError> {
        let t = self.read();
        Ok(t.units.iter().find(|u| u.sku == sku).map(|u| t.unit_with_product(u)))
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, AppError> {
        let t = self.read();
        Ok(t.orders
            .iter()
            .map(|order| OrderSummary {
                order: order.clone(),
                units_num: t.order_units.iter().filter(|ou| ou.order_id == order.id).count() as i64,
            })
            .collect())
    }

    async fn order(&self, id: i64) -> Result<Option<OrderGraph>, AppError> {
        let t = self.read();
        let Some(order) = t.orders.iter().find(|o| o.id == id) else {
            return Ok(None);
        };
        let mut lines = Vec::new();
        for order_unit in t.order_units.iter().filter(|ou| ou.order_id == id) {
            let unit = t
                .units
                .iter()
                .find(|u| u.id == order_unit.unit_id)
                .ok_or_else(|| AppError::NotFound(format!("unit {}", order_unit.unit_id)))?;
            lines.push(OrderLine {
                order_unit: order_unit.clone(),
                unit: t.unit_with_product(unit),
            });
        }
        Ok(Some(OrderGraph {
            order: order.clone(),
            lines,
        }))
    }

    async fn create_order(&self, new: &NewOrder) -> Result<i64, AppError> {
        let mut t = self.write();
        // Resolve every line before writing anything so a bad line leaves no trace.
        let mut priced = Vec::with_capacity(new.lines.len());
        for line in &new.lines {
            let unit = t
                .units
                .iter()
                .find(|u| u.id == line.unit_id)
                .ok_or_else(|| AppError::NotFound(format!("unit {}", line.unit_id)))?;
            priced.push((line, unit.price));
        }
        let order_id = t.id();
        t.orders.push(Order {
            id: order_id,
            name: new.name.clone(),
            address: new.address.clone(),
            phone: new.phone.clone(),
            created_at: Utc::now(),
        });
        for (line, unit_price) in priced {
            let id = t.id();
            t.order_units.push(OrderUnit {
                id,
                order_id,
                unit_id: line.unit_id,
                quantity: line.quantity,
                status: OrderStatus::Pending,
                unit_price,
            });
        }
        Ok(order_id)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.read().users.iter().any(|u| u.email == email))
    }

    async fn create_account(
        &self,
        user: &NewUser,
        group_ids: &[i64],
        seller: Option<&NewSeller>,
    ) -> Result<(User, Option<Seller>), AppError> {
        let mut t = self.write();
        if t.users.iter().any(|u| u.email == user.email || u.username == user.username) {
            return Err(AppError::invalid("email", DUPLICATE_EMAIL));
        }
        let id = t.id();
        let created = User {
            id,
            email: user.email.clone(),
            username: user.username.clone(),
            password: user.password_hash.clone(),
        };
        t.users.push(created.clone());
        for group_id in group_ids {
            if !t.user_groups.contains(&(id, *group_id)) {
                t.user_groups.push((id, *group_id));
            }
        }
        let seller = seller.map(|s| {
            let seller_id = t.id();
            let row = Seller {
                id: seller_id,
                user_id: id,
                name: s.name.clone(),
                address: s.address.clone(),
            };
            t.sellers.push(row.clone());
            row
        });
        Ok((created, seller))
    }

    async fn get_or_create_group(&self, name: &str) -> Result<Group, AppError> {
        let mut t = self.write();
        if let Some(group) = t.groups.iter().find(|g| g.name == name) {
            return Ok(group.clone());
        }
        let id = t.id();
        let group = Group { id, name: name.into() };
        t.groups.push(group.clone());
        Ok(group)
    }

    async fn permission_by_codename(&self, codename: &str) -> Result<Option<Permission>, AppError> {
        Ok(self.read().permissions.iter().find(|p| p.codename == codename).cloned())
    }

    async fn grant_permission(&self, group_id: i64, permission_id: i64) -> Result<(), AppError> {
        let mut t = self.write();
        if !t.group_permissions.contains(&(group_id, permission_id)) {
            t.group_permissions.push((group_id, permission_id));
        }
        Ok(())
    }
}
