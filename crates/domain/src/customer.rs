//! Users and their delivery addresses.

use common::{AddressId, Page, Role, UserId};
use store::{AddressRecord, NewAddress, NewUser, Store, UnitOfWork, UserChanges, UserRecord};

use crate::error::{DomainError, Entity, StoreResultExt};
use crate::validation::{optional_text, require_email, require_text};

const MAX_NAME: usize = 100;
const MAX_HASH: usize = 255;
const MAX_ADDRESS_LINE: usize = 255;

/// Request to register a user. The password arrives already hashed.
#[derive(Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl std::fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct UserService<S: Store> {
    store: S,
}

impl<S: Store> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a user. A taken email is a conflict.
    #[tracing::instrument(skip(self))]
    pub async fn create_user(&self, cmd: CreateUser) -> Result<UserRecord, DomainError> {
        require_text("name", &cmd.name, MAX_NAME)?;
        require_email(&cmd.email)?;
        require_text("password_hash", &cmd.password_hash, MAX_HASH)?;

        let mut tx = self.store.begin().await.context("user repo: begin")?;
        let user = tx
            .insert_user(&NewUser {
                name: cmd.name,
                email: cmd.email,
                password_hash: cmd.password_hash,
                role: cmd.role,
            })
            .await
            .conflict_on_constraint("user repo: create", "email is already registered")?;
        tx.commit().await.context("user repo: commit")?;

        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> Result<UserRecord, DomainError> {
        let mut tx = self.store.begin().await.context("user repo: begin")?;
        tx.find_user(id)
            .await
            .context("user repo: find")?
            .ok_or_else(|| DomainError::not_found(Entity::User, id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, DomainError> {
        let mut tx = self.store.begin().await.context("user repo: begin")?;
        tx.find_user_by_email(email)
            .await
            .context("user repo: find by email")?
            .ok_or_else(|| DomainError::not_found(Entity::User, email))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self, page: Page) -> Result<Vec<UserRecord>, DomainError> {
        let mut tx = self.store.begin().await.context("user repo: begin")?;
        tx.list_users(page).await.context("user repo: list")
    }

    #[tracing::instrument(skip(self, changes))]
    pub async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<UserRecord, DomainError> {
        if changes.name.is_none() && changes.password_hash.is_none() {
            return Err(DomainError::validation("no user fields to update"));
        }
        optional_text("name", changes.name.as_deref(), MAX_NAME)?;
        optional_text("password_hash", changes.password_hash.as_deref(), MAX_HASH)?;

        let mut tx = self.store.begin().await.context("user repo: begin")?;
        let user = tx
            .update_user(id, &changes)
            .await
            .context("user repo: update")?
            .ok_or_else(|| DomainError::not_found(Entity::User, id))?;
        tx.commit().await.context("user repo: commit")?;
        Ok(user)
    }

    /// Deletes a user without addresses or orders.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), DomainError> {
        let mut tx = self.store.begin().await.context("user repo: begin")?;
        let deleted = tx
            .delete_user(id)
            .await
            .conflict_on_constraint("user repo: delete", "user still has addresses or orders")?;
        if !deleted {
            return Err(DomainError::not_found(Entity::User, id));
        }
        tx.commit().await.context("user repo: commit")
    }
}

/// Addresses. Mutations can be scoped to an owner; another user's address
/// then looks missing.
#[derive(Clone)]
pub struct AddressService<S: Store> {
    store: S,
}

impl<S: Store> AddressService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_address(
        &self,
        user_id: UserId,
        line: &str,
    ) -> Result<AddressRecord, DomainError> {
        require_text("address", line, MAX_ADDRESS_LINE)?;

        let mut tx = self.store.begin().await.context("address repo: begin")?;
        tx.find_user(user_id)
            .await
            .context("address repo: find user")?
            .ok_or_else(|| DomainError::not_found(Entity::User, user_id))?;
        let address = tx
            .insert_address(&NewAddress {
                user_id,
                line: line.to_owned(),
            })
            .await
            .context("address repo: create")?;
        tx.commit().await.context("address repo: commit")?;
        Ok(address)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_address(
        &self,
        id: AddressId,
        owner: Option<UserId>,
        line: &str,
    ) -> Result<AddressRecord, DomainError> {
        require_text("address", line, MAX_ADDRESS_LINE)?;

        let mut tx = self.store.begin().await.context("address repo: begin")?;
        Self::find_owned(&mut tx, id, owner).await?;
        let address = tx
            .update_address(id, line)
            .await
            .context("address repo: update")?
            .ok_or_else(|| DomainError::not_found(Entity::Address, id))?;
        tx.commit().await.context("address repo: commit")?;
        Ok(address)
    }

    /// Deletes an address no order is delivered to.
    #[tracing::instrument(skip(self))]
    pub async fn delete_address(
        &self,
        id: AddressId,
        owner: Option<UserId>,
    ) -> Result<(), DomainError> {
        let mut tx = self.store.begin().await.context("address repo: begin")?;
        Self::find_owned(&mut tx, id, owner).await?;
        let deleted = tx
            .delete_address(id)
            .await
            .conflict_on_constraint("address repo: delete", "address is used by orders")?;
        if !deleted {
            return Err(DomainError::not_found(Entity::Address, id));
        }
        tx.commit().await.context("address repo: commit")
    }

    #[tracing::instrument(skip(self))]
    pub async fn addresses_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AddressRecord>, DomainError> {
        let mut tx = self.store.begin().await.context("address repo: begin")?;
        tx.find_user(user_id)
            .await
            .context("address repo: find user")?
            .ok_or_else(|| DomainError::not_found(Entity::User, user_id))?;
        tx.list_addresses_for_user(user_id)
            .await
            .context("address repo: list for user")
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_addresses(&self, page: Page) -> Result<Vec<AddressRecord>, DomainError> {
        let mut tx = self.store.begin().await.context("address repo: begin")?;
        tx.list_addresses(page).await.context("address repo: list")
    }

    async fn find_owned(
        tx: &mut S::Tx,
        id: AddressId,
        owner: Option<UserId>,
    ) -> Result<AddressRecord, DomainError> {
        tx.find_address(id)
            .await
            .context("address repo: find")?
            .filter(|address| owner.is_none_or(|owner| address.user_id == owner))
            .ok_or_else(|| DomainError::not_found(Entity::Address, id))
    }
}
