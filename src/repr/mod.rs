//! Entity → API representation. Every function here is pure: it only reads the
//! loaded graph it is given and never touches the store.

pub mod account;
pub mod catalog;
pub mod order;

pub use account::{SellerRepr, UserRepr};
pub use catalog::{
    price_range, product_detail, product_image, product_list, property, tag, unit, unit_properties,
    PriceRange, ProductDetailRepr, ProductListRepr, PropertyRepr, PropertyValueRepr, UnitPropertyRepr,
    UnitRepr,
};
pub use order::{
    cart_unit, order_detail, order_list, order_unit, unit_for_order, CartUnitRepr, OrderDetailRepr,
    OrderListRepr, OrderUnitRepr, UnitForOrderRepr,
};

/// Public base URL for stored media files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrl(String);

impl MediaUrl {
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into())
    }

    /// Join the base with a storage path using exactly one slash.
    pub fn url(&self, path: &str) -> String {
        let base = self.0.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

impl Default for MediaUrl {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MEDIA_URL)
    }
}
