//! Accounts, permission groups and sellers.

use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// PHC-formatted argon2 hash; never plaintext.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Permission {
    pub id: i64,
    pub codename: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Seller {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSeller {
    pub name: String,
    pub address: String,
}
