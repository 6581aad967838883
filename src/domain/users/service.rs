//! Users service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::Db,
    domain::users::{
        errors::UsersServiceError,
        models::{NewUser, PaymentMethod, ShippingAddress, User, UserUuid},
        repository::SqliteUsersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct SqliteUsersService {
    db: Db,
    repository: SqliteUsersRepository,
}

impl SqliteUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: SqliteUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for SqliteUsersService {
    async fn create_user(&self, user: NewUser) -> Result<User, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_user(&mut tx, user, Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_user(&self, user: UserUuid) -> Result<User, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self
            .repository
            .find_user(&mut tx, user)
            .await?
            .ok_or(UsersServiceError::NotFound)?;

        tx.commit().await?;

        Ok(user)
    }

    async fn set_shipping_address(
        &self,
        user: UserUuid,
        address: ShippingAddress,
    ) -> Result<(), UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .repository
            .set_shipping_address(&mut tx, user, &address, Timestamp::now())
            .await?;

        if rows_affected == 0 {
            return Err(UsersServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn set_payment_method(
        &self,
        user: UserUuid,
        method: PaymentMethod,
    ) -> Result<(), UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .repository
            .set_payment_method(&mut tx, user, method, Timestamp::now())
            .await?;

        if rows_affected == 0 {
            return Err(UsersServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Creates a new account.
    async fn create_user(&self, user: NewUser) -> Result<User, UsersServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<User, UsersServiceError>;

    /// Stores the user's shipping address for checkout.
    async fn set_shipping_address(
        &self,
        user: UserUuid,
        address: ShippingAddress,
    ) -> Result<(), UsersServiceError>;

    /// Stores the user's preferred payment method for checkout.
    async fn set_payment_method(
        &self,
        user: UserUuid,
        method: PaymentMethod,
    ) -> Result<(), UsersServiceError>;
}
