//! Stock ledger.
//!
//! The only place product stock is moved. Both operations run inside the
//! caller's unit of work and first take a row lock on the product, so a
//! missing product and a short one are told apart the same way everywhere.

use common::ProductId;
use store::UnitOfWork;

use crate::error::{DomainError, Entity, StoreResultExt};

/// Takes `qty` out of stock. Returns the stock left.
///
/// Fails with [`DomainError::InsufficientStock`] when fewer than `qty` units
/// are available; nothing is changed in that case.
pub async fn decrement<U: UnitOfWork>(
    uow: &mut U,
    product_id: ProductId,
    qty: u32,
) -> Result<i64, DomainError> {
    if qty == 0 {
        return Err(DomainError::validation("qty must be greater than zero"));
    }

    let available = uow
        .lock_product_stock(product_id)
        .await
        .context("stock ledger: lock")?
        .ok_or_else(|| DomainError::not_found(Entity::Product, product_id))?;

    let changed = uow
        .decrement_stock(product_id, i64::from(qty))
        .await
        .context("stock ledger: decrement")?;
    if changed == 0 {
        return Err(DomainError::InsufficientStock {
            product_id,
            requested: qty,
            available,
        });
    }

    metrics::counter!("stock_decrements_total").increment(1);
    Ok(available - i64::from(qty))
}

/// Puts `qty` back into stock. Returns the new stock level.
pub async fn increment<U: UnitOfWork>(
    uow: &mut U,
    product_id: ProductId,
    qty: u32,
) -> Result<i64, DomainError> {
    if qty == 0 {
        return Err(DomainError::validation("qty must be greater than zero"));
    }

    let available = uow
        .lock_product_stock(product_id)
        .await
        .context("stock ledger: lock")?
        .ok_or_else(|| DomainError::not_found(Entity::Product, product_id))?;

    let restored = available
        .checked_add(i64::from(qty))
        .ok_or_else(|| DomainError::validation("stock level out of range"))?;

    uow.increment_stock(product_id, i64::from(qty))
        .await
        .context("stock ledger: increment")?;

    Ok(restored)
}

#[cfg(test)]
mod tests {
    use common::Money;
    use store::{InMemoryStore, NewProduct, Store};

    use super::*;

    async fn product_with_stock(store: &InMemoryStore, stock: i64) -> ProductId {
        let mut tx = store.begin().await.unwrap();
        let inventory = tx.insert_inventory("Main").await.unwrap();
        let product = tx
            .insert_product(&NewProduct {
                inventory_id: inventory.id,
                name: "Widget".into(),
                price: Money::from_units(10),
                stock,
                description: String::new(),
                image: String::new(),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        product.id
    }

    #[tokio::test]
    async fn decrement_returns_remaining_stock() {
        let store = InMemoryStore::new();
        let product = product_with_stock(&store, 5).await;

        let mut tx = store.begin().await.unwrap();
        assert_eq!(decrement(&mut tx, product, 2).await.unwrap(), 3);
        assert_eq!(decrement(&mut tx, product, 3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn decrement_reports_available_quantity_when_short() {
        let store = InMemoryStore::new();
        let product = product_with_stock(&store, 1).await;

        let mut tx = store.begin().await.unwrap();
        let err = decrement(&mut tx, product, 2).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            }
        ));
        assert_eq!(tx.lock_product_stock(product).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let store = InMemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let err = decrement(&mut tx, ProductId::new(404), 1).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound {
                entity: Entity::Product,
                ..
            }
        ));

        let err = increment(&mut tx, ProductId::new(404), 1).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let store = InMemoryStore::new();
        let product = product_with_stock(&store, 1).await;

        let mut tx = store.begin().await.unwrap();
        assert_eq!(decrement(&mut tx, product, 0).await.unwrap_err().kind(), "validation");
        assert_eq!(increment(&mut tx, product, 0).await.unwrap_err().kind(), "validation");
    }

    #[tokio::test]
    async fn increment_adds_to_stock() {
        let store = InMemoryStore::new();
        let product = product_with_stock(&store, 1).await;

        let mut tx = store.begin().await.unwrap();
        assert_eq!(increment(&mut tx, product, 4).await.unwrap(), 5);
    }
}
