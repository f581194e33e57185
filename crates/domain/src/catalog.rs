//! Product catalogue and inventory locations.

use std::sync::Arc;
use std::time::Duration;

use cache::{CacheGateway, DEFAULT_TTL, Invalidation, invalidate, keys, read_through};
use common::{InventoryId, Money, Page, ProductId};
use store::{InventoryRecord, NewProduct, ProductChanges, ProductRecord, Store, UnitOfWork};

use crate::error::{DomainError, Entity, StoreResultExt};
use crate::stock;
use crate::validation::{optional_text, require_text};

const MAX_NAME: usize = 100;
const MAX_DESCRIPTION: usize = 255;
const MAX_LOCATION: usize = 100;

/// Request to add a product to the catalogue.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub inventory_id: InventoryId,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub description: String,
    pub image: String,
}

impl CreateProduct {
    fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name, MAX_NAME)?;
        if !self.price.is_positive() {
            return Err(DomainError::validation("price must be greater than zero"));
        }
        if self.stock < 0 {
            return Err(DomainError::validation("stock must not be negative"));
        }
        if self.description.chars().count() > MAX_DESCRIPTION {
            return Err(DomainError::validation(format!(
                "description must be at most {MAX_DESCRIPTION} characters"
            )));
        }
        Ok(())
    }
}

fn validate_changes(changes: &ProductChanges) -> Result<(), DomainError> {
    if changes.inventory_id.is_none()
        && changes.name.is_none()
        && changes.price.is_none()
        && changes.description.is_none()
    {
        return Err(DomainError::validation("no product fields to update"));
    }
    optional_text("name", changes.name.as_deref(), MAX_NAME)?;
    if let Some(price) = changes.price
        && !price.is_positive()
    {
        return Err(DomainError::validation("price must be greater than zero"));
    }
    if let Some(description) = &changes.description
        && description.chars().count() > MAX_DESCRIPTION
    {
        return Err(DomainError::validation(format!(
            "description must be at most {MAX_DESCRIPTION} characters"
        )));
    }
    Ok(())
}

/// Product catalogue with cached reads.
///
/// Every mutation drops the product's own entry and all listing pages.
#[derive(Clone)]
pub struct ProductService<S: Store> {
    store: S,
    cache: Arc<dyn CacheGateway>,
    ttl: Duration,
}

impl<S: Store> ProductService<S> {
    pub fn new(store: S, cache: Arc<dyn CacheGateway>) -> Self {
        Self {
            store,
            cache,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<ProductRecord, DomainError> {
        cmd.validate()?;

        let mut tx = self.store.begin().await.context("product repo: begin")?;
        tx.find_inventory(cmd.inventory_id)
            .await
            .context("product repo: find inventory")?
            .ok_or_else(|| DomainError::not_found(Entity::Inventory, cmd.inventory_id))?;
        let product = tx
            .insert_product(&NewProduct {
                inventory_id: cmd.inventory_id,
                name: cmd.name,
                price: cmd.price,
                stock: cmd.stock,
                description: cmd.description,
                image: cmd.image,
            })
            .await
            .context("product repo: create")?;
        tx.commit().await.context("product repo: commit")?;

        self.invalidate_product(product.id).await;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<ProductRecord, DomainError> {
        read_through(self.cache.as_ref(), &keys::product(id), self.ttl, || async move {
            let mut tx = self.store.begin().await.context("product repo: begin")?;
            tx.find_product(id)
                .await
                .context("product repo: find")?
                .ok_or_else(|| DomainError::not_found(Entity::Product, id))
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, page: Page) -> Result<Vec<ProductRecord>, DomainError> {
        let page = page.normalized();
        read_through(self.cache.as_ref(), &keys::product_page(page), self.ttl, || async move {
            let mut tx = self.store.begin().await.context("product repo: begin")?;
            tx.list_products(page).await.context("product repo: list")
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<ProductRecord, DomainError> {
        validate_changes(&changes)?;

        let mut tx = self.store.begin().await.context("product repo: begin")?;
        if let Some(inventory_id) = changes.inventory_id {
            tx.find_inventory(inventory_id)
                .await
                .context("product repo: find inventory")?
                .ok_or_else(|| DomainError::not_found(Entity::Inventory, inventory_id))?;
        }
        let product = tx
            .update_product(id, &changes)
            .await
            .context("product repo: update")?
            .ok_or_else(|| DomainError::not_found(Entity::Product, id))?;
        tx.commit().await.context("product repo: commit")?;

        self.invalidate_product(id).await;
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_image(&self, id: ProductId, image: String) -> Result<ProductRecord, DomainError> {
        require_text("image", &image, MAX_DESCRIPTION)?;

        let mut tx = self.store.begin().await.context("product repo: begin")?;
        let product = tx
            .set_product_image(id, &image)
            .await
            .context("product repo: set image")?
            .ok_or_else(|| DomainError::not_found(Entity::Product, id))?;
        tx.commit().await.context("product repo: commit")?;

        self.invalidate_product(id).await;
        Ok(product)
    }

    /// Deletes a product that no order refers to.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), DomainError> {
        let mut tx = self.store.begin().await.context("product repo: begin")?;
        let deleted = tx
            .delete_product(id)
            .await
            .conflict_on_constraint("product repo: delete", "product is referenced by orders")?;
        if !deleted {
            return Err(DomainError::not_found(Entity::Product, id));
        }
        tx.commit().await.context("product repo: commit")?;

        self.invalidate_product(id).await;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Adds stock through the ledger. Returns the product after the change.
    #[tracing::instrument(skip(self))]
    pub async fn add_stock(&self, id: ProductId, qty: u32) -> Result<ProductRecord, DomainError> {
        let mut tx = self.store.begin().await.context("product repo: begin")?;
        let remaining = stock::increment(&mut tx, id, qty).await?;
        let product = self.reload_product(&mut tx, id).await?;
        tx.commit().await.context("product repo: commit")?;

        self.invalidate_product(id).await;
        tracing::info!(product_id = %id, qty, remaining, "stock added");
        Ok(product)
    }

    /// Takes stock out through the ledger. Fails without change when short.
    #[tracing::instrument(skip(self))]
    pub async fn reduce_stock(&self, id: ProductId, qty: u32) -> Result<ProductRecord, DomainError> {
        let mut tx = self.store.begin().await.context("product repo: begin")?;
        let remaining = stock::decrement(&mut tx, id, qty).await?;
        let product = self.reload_product(&mut tx, id).await?;
        tx.commit().await.context("product repo: commit")?;

        self.invalidate_product(id).await;
        tracing::info!(product_id = %id, qty, remaining, "stock reduced");
        Ok(product)
    }

    async fn reload_product(
        &self,
        tx: &mut S::Tx,
        id: ProductId,
    ) -> Result<ProductRecord, DomainError> {
        tx.find_product(id)
            .await
            .context("product repo: find")?
            .ok_or_else(|| DomainError::not_found(Entity::Product, id))
    }

    async fn invalidate_product(&self, id: ProductId) {
        invalidate(
            self.cache.as_ref(),
            &[Invalidation::product(id), Invalidation::product_pages()],
        )
        .await;
    }
}

/// Inventory locations products are stocked in.
#[derive(Clone)]
pub struct InventoryService<S: Store> {
    store: S,
}

impl<S: Store> InventoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_inventory(&self, location: &str) -> Result<InventoryRecord, DomainError> {
        require_text("location", location, MAX_LOCATION)?;

        let mut tx = self.store.begin().await.context("inventory repo: begin")?;
        let inventory = tx
            .insert_inventory(location)
            .await
            .context("inventory repo: create")?;
        tx.commit().await.context("inventory repo: commit")?;
        Ok(inventory)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_inventory(&self, id: InventoryId) -> Result<InventoryRecord, DomainError> {
        let mut tx = self.store.begin().await.context("inventory repo: begin")?;
        tx.find_inventory(id)
            .await
            .context("inventory repo: find")?
            .ok_or_else(|| DomainError::not_found(Entity::Inventory, id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_inventories(&self, page: Page) -> Result<Vec<InventoryRecord>, DomainError> {
        let mut tx = self.store.begin().await.context("inventory repo: begin")?;
        tx.list_inventories(page)
            .await
            .context("inventory repo: list")
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_inventory(
        &self,
        id: InventoryId,
        location: &str,
    ) -> Result<InventoryRecord, DomainError> {
        require_text("location", location, MAX_LOCATION)?;

        let mut tx = self.store.begin().await.context("inventory repo: begin")?;
        let inventory = tx
            .update_inventory(id, location)
            .await
            .context("inventory repo: update")?
            .ok_or_else(|| DomainError::not_found(Entity::Inventory, id))?;
        tx.commit().await.context("inventory repo: commit")?;
        Ok(inventory)
    }

    /// Deletes a location that no product is stocked in.
    #[tracing::instrument(skip(self))]
    pub async fn delete_inventory(&self, id: InventoryId) -> Result<(), DomainError> {
        let mut tx = self.store.begin().await.context("inventory repo: begin")?;
        let deleted = tx.delete_inventory(id).await.conflict_on_constraint(
            "inventory repo: delete",
            "inventory still holds products",
        )?;
        if !deleted {
            return Err(DomainError::not_found(Entity::Inventory, id));
        }
        tx.commit().await.context("inventory repo: commit")
    }
}
