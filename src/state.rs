//! Shared application state for all routes.

use crate::repr::MediaUrl;
use crate::store::ShopStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ShopStore>,
    pub media: MediaUrl,
}

impl AppState {
    pub fn new(store: Arc<dyn ShopStore>, media: MediaUrl) -> Self {
        Self { store, media }
    }
}
