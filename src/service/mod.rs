//! Request-side logic: validation, cart checks, order placement and sign-up.

pub mod accounts;
pub mod cart;
pub mod orders;
pub mod password;
mod validation;

pub use accounts::{create_seller, create_user, ensure_staff_group, SellerInput, UserInput, STAFF_GROUP, STAFF_PERMISSIONS};
pub use cart::{check_cart_unit, CartUnitInput, CheckedCartUnit};
pub use orders::{place_order, OrderInput};
pub use validation::{is_valid_email, Validator};
