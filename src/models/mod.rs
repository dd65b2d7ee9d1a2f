//! Persisted entity records and the object graphs loaded for representation.

pub mod account;
pub mod catalog;
pub mod order;

pub use account::{Group, NewSeller, NewUser, Permission, Seller, User};
pub use catalog::{
    NamedValue, Product, ProductGraph, Property, PropertyGraph, PropertyValue, Tag, Unit, UnitGraph,
    UnitImage, UnitWithProduct,
};
pub use order::{
    NewOrder, NewOrderLine, Order, OrderGraph, OrderLine, OrderStatus, OrderSummary, OrderUnit,
};
