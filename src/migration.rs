//! Shop schema DDL and the permission catalogue. Every statement is idempotent
//! (IF NOT EXISTS / ON CONFLICT DO NOTHING), so this runs on every start.

use crate::error::AppError;
use sqlx::PgPool;

/// Entities that carry add/change/delete/view permissions.
pub const PERMISSION_ENTITIES: &[&str] = &[
    "product",
    "unit",
    "unitimage",
    "tag",
    "property",
    "propertyvalue",
    "order",
    "orderunit",
    "seller",
];

pub const PERMISSION_ACTIONS: &[&str] = &["add", "change", "delete", "view"];

/// Every codename the catalogue is seeded with, `<action>_<entity>`.
pub fn permission_codenames() -> Vec<String> {
    PERMISSION_ENTITIES
        .iter()
        .flat_map(|entity| {
            PERMISSION_ACTIONS
                .iter()
                .map(move |action| format!("{}_{}", action, entity))
        })
        .collect()
}

fn table_ddl(schema: &str) -> Vec<String> {
    let t = |name: &str| format!("{}.{}", schema, name);
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT ''
            )",
            t("products")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                product_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                name TEXT NOT NULL
            )",
            t("tags"),
            t("products")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL
            )",
            t("properties")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                property_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                value TEXT NOT NULL
            )",
            t("property_values"),
            t("properties")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                product_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                sku TEXT NOT NULL UNIQUE,
                price NUMERIC(10, 2) NOT NULL,
                num_in_stock INTEGER NOT NULL DEFAULT 0 CHECK (num_in_stock >= 0)
            )",
            t("units"),
            t("products")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                unit_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                value_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                PRIMARY KEY (unit_id, value_id)
            )",
            t("unit_values"),
            t("units"),
            t("property_values")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                unit_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                image TEXT NOT NULL,
                is_main BOOLEAN NOT NULL DEFAULT FALSE
            )",
            t("unit_images"),
            t("units")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                phone TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            t("orders")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                order_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                unit_id BIGINT NOT NULL REFERENCES {} (id),
                quantity INTEGER NOT NULL CHECK (quantity >= 1),
                status TEXT NOT NULL DEFAULT 'pending',
                unit_price NUMERIC(10, 2) NOT NULL
            )",
            t("order_units"),
            t("orders"),
            t("units")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
            )",
            t("users")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            )",
            t("groups")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                codename TEXT NOT NULL UNIQUE
            )",
            t("permissions")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                group_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                permission_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                PRIMARY KEY (group_id, permission_id)
            )",
            t("group_permissions"),
            t("groups"),
            t("permissions")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                user_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                group_id BIGINT NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, group_id)
            )",
            t("user_groups"),
            t("users"),
            t("groups")
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL UNIQUE REFERENCES {} (id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                address TEXT NOT NULL
            )",
            t("sellers"),
            t("users")
        ),
    ]
}

/// Create the schema, all shop tables, and seed the permission catalogue.
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
        .execute(pool)
        .await?;
    for ddl in table_ddl(schema) {
        tracing::debug!(sql = %ddl, "migration");
        sqlx::query(&ddl).execute(pool).await?;
    }

    let insert_permission = format!(
        "INSERT INTO {}.permissions (codename) VALUES ($1) ON CONFLICT (codename) DO NOTHING",
        schema
    );
    for codename in permission_codenames() {
        sqlx::query(&insert_permission)
            .bind(&codename)
            .execute(pool)
            .await?;
    }
    tracing::info!(schema, "migrations applied");
    Ok(())
}
