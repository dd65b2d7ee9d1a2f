//! restshop: catalog, cart, order and sign-up REST backend.

pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod openapi;
pub mod repr;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{AppError, ConfigError, FieldErrors};
pub use migration::apply_migrations;
pub use repr::MediaUrl;
pub use routes::{assemble, build_app, common_routes, COMMON, SUB_APPS};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, ShopStore};
