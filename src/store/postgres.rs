//! PostgreSQL-backed store. All tables live in the schema named by `Settings::schema`.

use super::{ShopStore, DUPLICATE_EMAIL};
use crate::error::{AppError, ConfigError};
use crate::models::{
    Group, NamedValue, NewOrder, NewSeller, NewUser, Order, OrderGraph, OrderLine, OrderSummary,
    OrderUnit, Permission, Product, ProductGraph, Property, PropertyGraph, PropertyValue, Seller,
    Tag, Unit, UnitGraph, UnitImage, UnitWithProduct, User,
};
use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, PgPool};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// Schema-qualified table name, e.g. "restshop.units".
    fn t(&self, table: &str) -> String {
        format!("{}.{}", self.schema, table)
    }

    async fn unit_graphs(&self, units: Vec<Unit>) -> Result<Vec<UnitGraph>, AppError> {
        if units.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = units.iter().map(|u| u.id).collect();

        let sql = format!(
            "SELECT uv.unit_id, p.name AS property_name, pv.value
             FROM {} uv
             JOIN {} pv ON pv.id = uv.value_id
             JOIN {} p ON p.id = pv.property_id
             WHERE uv.unit_id = ANY($1)
             ORDER BY pv.id",
            self.t("unit_values"),
            self.t("property_values"),
            self.t("properties")
        );
        tracing::debug!(sql = %sql, "query");
        let values: Vec<NamedValue> = sqlx::query_as(&sql).bind(&ids).fetch_all(&self.pool).await?;

        let sql = format!(
            "SELECT id, unit_id, image, is_main FROM {} WHERE unit_id = ANY($1) ORDER BY id",
            self.t("unit_images")
        );
        tracing::debug!(sql = %sql, "query");
        let images: Vec<UnitImage> = sqlx::query_as(&sql).bind(&ids).fetch_all(&self.pool).await?;

        let mut values_by_unit: HashMap<i64, Vec<NamedValue>> = HashMap::new();
        for v in values {
            values_by_unit.entry(v.unit_id).or_default().push(v);
        }
        let mut images_by_unit: HashMap<i64, Vec<UnitImage>> = HashMap::new();
        for img in images {
            images_by_unit.entry(img.unit_id).or_default().push(img);
        }

        Ok(units
            .into_iter()
            .map(|unit| UnitGraph {
                values: values_by_unit.remove(&unit.id).unwrap_or_default(),
                images: images_by_unit.remove(&unit.id).unwrap_or_default(),
                unit,
            })
            .collect())
    }

    async fn product_graphs(&self, products: Vec<Product>) -> Result<Vec<ProductGraph>, AppError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();

        let sql = format!(
            "SELECT id, product_id, name FROM {} WHERE product_id = ANY($1) ORDER BY id",
            self.t("tags")
        );
        let tags: Vec<Tag> = sqlx::query_as(&sql).bind(&ids).fetch_all(&self.pool).await?;

        let sql = format!(
            "SELECT id, product_id, sku, price, num_in_stock FROM {} WHERE product_id = ANY($1) ORDER BY id",
            self.t("units")
        );
        let units: Vec<Unit> = sqlx::query_as(&sql).bind(&ids).fetch_all(&self.pool).await?;
        let units = self.unit_graphs(units).await?;

        let mut tags_by_product: HashMap<i64, Vec<Tag>> = HashMap::new();
        for tag in tags {
            tags_by_product.entry(tag.product_id).or_default().push(tag);
        }
        let mut units_by_product: HashMap<i64, Vec<UnitGraph>> = HashMap::new();
        for unit in units {
            units_by_product.entry(unit.unit.product_id).or_default().push(unit);
        }

        Ok(products
            .into_iter()
            .map(|product| ProductGraph {
                tags: tags_by_product.remove(&product.id).unwrap_or_default(),
                units: units_by_product.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }

    async fn units_with_product(&self, units: Vec<Unit>) -> Result<Vec<UnitWithProduct>, AppError> {
        if units.is_empty() {
            return Ok(Vec::new());
        }
        let product_ids: Vec<i64> = units.iter().map(|u| u.product_id).collect();
        let sql = format!("SELECT id, title FROM {} WHERE id = ANY($1)", self.t("products"));
        let titles: HashMap<i64, String> = sqlx::query_as::<_, (i64, String)>(&sql)
            .bind(&product_ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .collect();
        let graphs = self.unit_graphs(units).await?;
        Ok(graphs
            .into_iter()
            .map(|unit| UnitWithProduct {
                product_title: titles.get(&unit.unit.product_id).cloned().unwrap_or_default(),
                unit,
            })
            .collect())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl ShopStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<ProductGraph>, AppError> {
        let sql = format!("SELECT id, title, description FROM {} ORDER BY id", self.t("products"));
        tracing::debug!(sql = %sql, "query");
        let products: Vec<Product> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        self.product_graphs(products).await
    }

    async fn product(&self, id: i64) -> Result<Option<ProductGraph>, AppError> {
        let sql = format!("SELECT id, title, description FROM {} WHERE id = $1", self.t("products"));
        let product: Option<Product> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        match product {
            Some(p) => Ok(self.product_graphs(vec![p]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        let sql = format!("SELECT id, product_id, name FROM {} ORDER BY id", self.t("tags"));
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_properties(&self) -> Result<Vec<PropertyGraph>, AppError> {
        let sql = format!("SELECT id, name FROM {} ORDER BY id", self.t("properties"));
        let properties: Vec<Property> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        let sql = format!("SELECT id, property_id, value FROM {} ORDER BY id", self.t("property_values"));
        let values: Vec<PropertyValue> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        let mut by_property: HashMap<i64, Vec<PropertyValue>> = HashMap::new();
        for v in values {
            by_property.entry(v.property_id).or_default().push(v);
        }
        Ok(properties
            .into_iter()
            .map(|property| PropertyGraph {
                values: by_property.remove(&property.id).unwrap_or_default(),
                property,
            })
            .collect())
    }

    async fn unit_by_sku(&self, sku: &str) -> Result<Option<UnitWithProduct>, AppError> {
        let sql = format!(
            "SELECT id, product_id, sku, price, num_in_stock FROM {} WHERE sku = $1",
            self.t("units")
        );
        let unit: Option<Unit> = sqlx::query_as(&sql).bind(sku).fetch_optional(&self.pool).await?;
        match unit {
            Some(u) => Ok(self.units_with_product(vec![u]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, AppError> {
        let sql = format!(
            "SELECT o.id, o.name, o.address, o.phone, o.created_at, COUNT(ou.id) AS units_num
             FROM {} o
             LEFT JOIN {} ou ON ou.order_id = o.id
             GROUP BY o.id
             ORDER BY o.id",
            self.t("orders"),
            self.t("order_units")
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn order(&self, id: i64) -> Result<Option<OrderGraph>, AppError> {
        let sql = format!(
            "SELECT id, name, address, phone, created_at FROM {} WHERE id = $1",
            self.t("orders")
        );
        let order: Option<Order> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        let Some(order) = order else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT id, order_id, unit_id, quantity, status, unit_price FROM {} WHERE order_id = $1 ORDER BY id",
            self.t("order_units")
        );
        let order_units: Vec<OrderUnit> = sqlx::query_as(&sql).bind(id).fetch_all(&self.pool).await?;

        let unit_ids: Vec<i64> = order_units.iter().map(|ou| ou.unit_id).collect();
        let sql = format!(
            "SELECT id, product_id, sku, price, num_in_stock FROM {} WHERE id = ANY($1) ORDER BY id",
            self.t("units")
        );
        let units: Vec<Unit> = sqlx::query_as(&sql).bind(&unit_ids).fetch_all(&self.pool).await?;
        let units: HashMap<i64, UnitWithProduct> = self
            .units_with_product(units)
            .await?
            .into_iter()
            .map(|u| (u.unit.unit.id, u))
            .collect();

        let mut lines = Vec::with_capacity(order_units.len());
        for order_unit in order_units {
            let unit = units
                .get(&order_unit.unit_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("unit {}", order_unit.unit_id)))?;
            lines.push(OrderLine { order_unit, unit });
        }
        Ok(Some(OrderGraph { order, lines }))
    }

    async fn create_order(&self, new: &NewOrder) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "INSERT INTO {} (name, address, phone) VALUES ($1, $2, $3) RETURNING id",
            self.t("orders")
        );
        let (order_id,): (i64,) = sqlx::query_as(&sql)
            .bind(&new.name)
            .bind(&new.address)
            .bind(&new.phone)
            .fetch_one(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO {} (order_id, unit_id, quantity, status, unit_price)
             SELECT $1, u.id, $2, $3, u.price FROM {} u WHERE u.id = $4",
            self.t("order_units"),
            self.t("units")
        );
        for line in &new.lines {
            let result = sqlx::query(&sql)
                .bind(order_id)
                .bind(line.quantity)
                .bind(crate::models::OrderStatus::Pending.as_str())
                .bind(line.unit_id)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() != 1 {
                return Err(AppError::NotFound(format!("unit {}", line.unit_id)));
            }
        }
        tx.commit().await?;
        Ok(order_id)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, AppError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE email = $1)", self.t("users"));
        let (exists,): (bool,) = sqlx::query_as(&sql).bind(email).fetch_one(&self.pool).await?;
        Ok(exists)
    }

    async fn create_account(
        &self,
        user: &NewUser,
        group_ids: &[i64],
        seller: Option<&NewSeller>,
    ) -> Result<(User, Option<Seller>), AppError> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "INSERT INTO {} (email, username, password) VALUES ($1, $2, $3)
             RETURNING id, email, username, password",
            self.t("users")
        );
        let created: User = sqlx::query_as(&sql)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::invalid("email", DUPLICATE_EMAIL)
                } else {
                    AppError::Db(e)
                }
            })?;

        let sql = format!(
            "INSERT INTO {} (user_id, group_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            self.t("user_groups")
        );
        for group_id in group_ids {
            sqlx::query(&sql).bind(created.id).bind(*group_id).execute(&mut *tx).await?;
        }

        let seller = match seller {
            Some(s) => {
                let sql = format!(
                    "INSERT INTO {} (user_id, name, address) VALUES ($1, $2, $3)
                     RETURNING id, user_id, name, address",
                    self.t("sellers")
                );
                let row: Seller = sqlx::query_as(&sql)
                    .bind(created.id)
                    .bind(&s.name)
                    .bind(&s.address)
                    .fetch_one(&mut *tx)
                    .await?;
                Some(row)
            }
            None => None,
        };
        tx.commit().await?;
        Ok((created, seller))
    }

    async fn get_or_create_group(&self, name: &str) -> Result<Group, AppError> {
        let sql = format!(
            "INSERT INTO {} (name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
            self.t("groups")
        );
        sqlx::query(&sql).bind(name).execute(&self.pool).await?;
        let sql = format!("SELECT id, name FROM {} WHERE name = $1", self.t("groups"));
        Ok(sqlx::query_as(&sql).bind(name).fetch_one(&self.pool).await?)
    }

    async fn permission_by_codename(&self, codename: &str) -> Result<Option<Permission>, AppError> {
        let sql = format!("SELECT id, codename FROM {} WHERE codename = $1", self.t("permissions"));
        Ok(sqlx::query_as(&sql).bind(codename).fetch_optional(&self.pool).await?)
    }

    async fn grant_permission(&self, group_id: i64, permission_id: i64) -> Result<(), AppError> {
        let sql = format!(
            "INSERT INTO {} (group_id, permission_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            self.t("group_permissions")
        );
        sqlx::query(&sql).bind(group_id).bind(permission_id).execute(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let Some((admin, db_name)) = admin_options(database_url)? else {
        return Ok(());
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Options for the `postgres` maintenance database plus the target database name.
/// None when the URL names no database or names `postgres` itself.
fn admin_options(database_url: &str) -> Result<Option<(PgConnectOptions, String)>, ConfigError> {
    let opts = PgConnectOptions::from_str(database_url).map_err(|e| ConfigError::Env {
        name: "DATABASE_URL",
        reason: e.to_string(),
    })?;
    let db_name = match opts.get_database() {
        Some(name) if !name.is_empty() && name != "postgres" => name.to_string(),
        _ => return Ok(None),
    };
    Ok(Some((opts.database("postgres"), db_name)))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
