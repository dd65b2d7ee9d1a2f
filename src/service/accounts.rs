//! Account and seller sign-up, and the shared "Staff" permission group.

use super::password::hash_password;
use super::validation::Validator;
use crate::error::{AppError, ConfigError};
use crate::models::{Group, NewSeller, NewUser, Seller, User};
use crate::store::{ShopStore, DUPLICATE_EMAIL};
use serde::Deserialize;
use utoipa::ToSchema;

pub const STAFF_GROUP: &str = "Staff";

/// Permissions every seller receives through the Staff group.
pub const STAFF_PERMISSIONS: &[&str] = &[
    "add_unit",
    "change_unit",
    "delete_unit",
    "add_product",
    "change_product",
    "delete_product",
    "add_unitimage",
    "change_unitimage",
    "delete_unitimage",
    "add_orderunit",
    "change_orderunit",
    "delete_orderunit",
    "change_order",
    "add_property",
    "add_propertyvalue",
];

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SellerInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Get or create the Staff group and make sure it holds every staff permission.
/// A codename missing from the catalogue is a configuration error, not a user error.
pub async fn ensure_staff_group(store: &dyn ShopStore) -> Result<Group, AppError> {
    let group = store.get_or_create_group(STAFF_GROUP).await?;
    for codename in STAFF_PERMISSIONS {
        let permission = store
            .permission_by_codename(codename)
            .await?
            .ok_or_else(|| ConfigError::MissingPermission(codename.to_string()))?;
        store.grant_permission(group.id, permission.id).await?;
    }
    Ok(group)
}

/// Email and password checks shared by both sign-up flows.
async fn credentials(
    store: &dyn ShopStore,
    v: &mut Validator,
    email: &Option<String>,
    password: &Option<String>,
) -> Result<Option<NewUser>, AppError> {
    let email = v.email("email", email);
    let password = v.required_untrimmed("password", password);
    let Some(email) = email else {
        return Ok(None);
    };
    if store.email_taken(email).await? {
        v.add("email", DUPLICATE_EMAIL);
        return Ok(None);
    }
    let Some(password) = password else {
        return Ok(None);
    };
    Ok(Some(NewUser {
        email: email.to_string(),
        username: email.to_string(),
        password_hash: hash_password(password)?,
    }))
}

/// Create a plain account. The username is the email.
pub async fn create_user(store: &dyn ShopStore, input: &UserInput) -> Result<User, AppError> {
    let mut v = Validator::new();
    let new_user = credentials(store, &mut v, &input.email, &input.password).await?;
    let Some(new_user) = new_user else {
        return Err(AppError::Validation(v.into_errors()));
    };
    let (user, _) = store.create_account(&new_user, &[], None).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok(user)
}

/// Create an account in the Staff group with its linked seller record.
pub async fn create_seller(store: &dyn ShopStore, input: &SellerInput) -> Result<(User, Seller), AppError> {
    let mut v = Validator::new();
    let new_user = credentials(store, &mut v, &input.email, &input.password).await?;
    let name = v.required("name", &input.name).map(String::from);
    let address = v.required("address", &input.address).map(String::from);
    let (Some(new_user), Some(name), Some(address)) = (new_user, name, address) else {
        return Err(AppError::Validation(v.into_errors()));
    };

    let staff = ensure_staff_group(store).await?;
    let (user, seller) = store
        .create_account(&new_user, &[staff.id], Some(&NewSeller { name, address }))
        .await?;
    let seller = seller.ok_or_else(|| AppError::NotFound(format!("seller for user {}", user.id)))?;
    tracing::info!(user_id = user.id, seller_id = seller.id, "seller created");
    Ok((user, seller))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::password::verify_password;
    use crate::store::MemoryStore;

    fn seller_input(email: &str) -> SellerInput {
        SellerInput {
            email: Some(email.into()),
            password: Some("s3cret-pass".into()),
            name: Some("Acme".into()),
            address: Some("1 Market Sq".into()),
        }
    }

    #[tokio::test]
    async fn user_password_is_hashed_and_username_is_email() {
        let store = MemoryStore::new();
        let user = create_user(
            &store,
            &UserInput {
                email: Some("ann@example.com".into()),
                password: Some("hunter22".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(user.username, "ann@example.com");
        assert_ne!(user.password, "hunter22");
        assert!(verify_password("hunter22", &store.users()[0].password));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_before_hashing() {
        let store = MemoryStore::new();
        let input = UserInput {
            email: Some("dup@example.com".into()),
            password: Some("pw".into()),
        };
        create_user(&store, &input).await.unwrap();
        match create_user(&store, &input).await.unwrap_err() {
            AppError::Validation(errors) => assert_eq!(errors.get("email").unwrap(), [DUPLICATE_EMAIL]),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn two_sellers_share_one_fully_permissioned_staff_group() {
        let store = MemoryStore::new();
        let (first, _) = create_seller(&store, &seller_input("one@example.com")).await.unwrap();
        let (second, _) = create_seller(&store, &seller_input("two@example.com")).await.unwrap();

        let groups = store.groups();
        let staff: Vec<_> = groups.iter().filter(|g| g.name == STAFF_GROUP).collect();
        assert_eq!(staff.len(), 1);

        let mut codenames: Vec<String> = store
            .group_permissions(staff[0].id)
            .into_iter()
            .map(|p| p.codename)
            .collect();
        codenames.sort();
        let mut expected: Vec<String> = STAFF_PERMISSIONS.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(codenames, expected);

        for user in [first, second] {
            assert_eq!(store.user_groups(user.id), vec![staff[0].clone()]);
        }
        assert_eq!(store.sellers().len(), 2);
    }

    #[tokio::test]
    async fn missing_permission_is_a_config_error() {
        let store = MemoryStore::with_permissions(&["add_unit", "change_unit"]);
        let err = create_seller(&store, &seller_input("x@example.com")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::MissingPermission(ref codename)) if codename == "delete_unit"
        ));
        assert!(store.users().is_empty());
    }

    #[tokio::test]
    async fn seller_fields_are_required() {
        let store = MemoryStore::new();
        let input = SellerInput {
            email: Some("not-an-email".into()),
            ..SellerInput::default()
        };
        match create_seller(&store, &input).await.unwrap_err() {
            AppError::Validation(errors) => {
                assert_eq!(errors.get("email").unwrap(), [super::super::validation::INVALID_EMAIL]);
                assert!(errors.get("password").is_some());
                assert!(errors.get("name").is_some());
                assert!(errors.get("address").is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_password_is_blank_not_missing() {
        let store = MemoryStore::new();
        for (password, message) in [
            (None, super::super::validation::REQUIRED),
            (Some(String::new()), super::super::validation::BLANK),
        ] {
            let input = UserInput {
                email: Some("ada@example.com".into()),
                password,
            };
            match create_user(&store, &input).await.unwrap_err() {
                AppError::Validation(errors) => assert_eq!(errors.get("password").unwrap(), [message]),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(store.users().is_empty());
    }

    #[tokio::test]
    async fn password_whitespace_is_kept() {
        let store = MemoryStore::new();
        let input = UserInput {
            email: Some("ada@example.com".into()),
            password: Some("  spaced  ".into()),
        };
        let user = create_user(&store, &input).await.unwrap();
        assert!(verify_password("  spaced  ", &user.password));
        assert!(!verify_password("spaced", &user.password));
    }
}
