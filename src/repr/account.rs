//! Account representations. Passwords are write-only and never appear here.

use crate::models::{Seller, User};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserRepr {
    pub email: String,
}

impl From<&User> for UserRepr {
    fn from(user: &User) -> Self {
        Self { email: user.email.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SellerRepr {
    pub email: String,
    pub name: String,
    pub address: String,
}

impl SellerRepr {
    pub fn new(user: &User, seller: &Seller) -> Self {
        Self {
            email: user.email.clone(),
            name: seller.name.clone(),
            address: seller.address.clone(),
        }
    }
}
