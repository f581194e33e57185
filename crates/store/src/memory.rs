use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{
    AddressId, InventoryId, LineItemId, Money, OrderId, OrderStatus, Page, PaymentId, ProductId,
    UserId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    Result, StoreError,
    records::{
        AddressRecord, InventoryRecord, LineItemRecord, NewAddress, NewLineItem, NewOrder,
        NewPayment, NewProduct, NewUser, OrderRecord, PaymentChanges, PaymentRecord,
        ProductChanges, ProductRecord, StatusChanges, UserChanges, UserRecord,
    },
    store::{Store, UnitOfWork},
};

/// In-memory store for tests and database-less runs.
///
/// Mirrors the PostgreSQL schema rules: unique emails, unique
/// (order, product) pairs, non-negative stock and RESTRICT on every foreign
/// key. Units of work are serialized by a single writer lock and operate on a
/// private copy of the state that replaces the shared one on commit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<InMemoryTx> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(InMemoryTx { guard, work })
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<UserId, UserRecord>,
    addresses: BTreeMap<AddressId, AddressRecord>,
    inventories: BTreeMap<InventoryId, InventoryRecord>,
    products: BTreeMap<ProductId, ProductRecord>,
    orders: BTreeMap<OrderId, OrderRecord>,
    line_items: BTreeMap<LineItemId, LineItemRecord>,
    payments: BTreeMap<PaymentId, PaymentRecord>,
    sequences: HashMap<&'static str, i64>,
}

impl MemoryState {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }

    fn live_order(&self, id: OrderId) -> Option<&OrderRecord> {
        self.orders.get(&id).filter(|o| o.deleted_at.is_none())
    }
}

fn paginate<'a, T: Clone + 'a>(rows: impl Iterator<Item = &'a T>, page: Page) -> Vec<T> {
    let page = page.normalized();
    rows.skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

fn restrict(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation(constraint.to_owned())
}

/// A unit of work over [`InMemoryStore`].
pub struct InMemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

#[async_trait]
impl UnitOfWork for InMemoryTx {
    async fn insert_user(&mut self, user: &NewUser) -> Result<UserRecord> {
        if self.work.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".into()));
        }
        let now = Utc::now();
        let record = UserRecord {
            id: UserId::new(self.work.next_id("users")),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        self.work.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user(&mut self, id: UserId) -> Result<Option<UserRecord>> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self.work.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(
        &mut self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<UserRecord>> {
        let Some(user) = self.work.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(hash) = &changes.password_hash {
            user.password_hash = hash.clone();
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&mut self, id: UserId) -> Result<bool> {
        if self.work.addresses.values().any(|a| a.user_id == id) {
            return Err(restrict("addresses_user_id_fkey"));
        }
        if self.work.orders.values().any(|o| o.user_id == id) {
            return Err(restrict("orders_user_id_fkey"));
        }
        Ok(self.work.users.remove(&id).is_some())
    }

    async fn list_users(&mut self, page: Page) -> Result<Vec<UserRecord>> {
        Ok(paginate(self.work.users.values(), page))
    }

    async fn insert_address(&mut self, address: &NewAddress) -> Result<AddressRecord> {
        if !self.work.users.contains_key(&address.user_id) {
            return Err(restrict("addresses_user_id_fkey"));
        }
        let now = Utc::now();
        let record = AddressRecord {
            id: AddressId::new(self.work.next_id("addresses")),
            user_id: address.user_id,
            line: address.line.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.addresses.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_address(&mut self, id: AddressId) -> Result<Option<AddressRecord>> {
        Ok(self.work.addresses.get(&id).cloned())
    }

    async fn update_address(
        &mut self,
        id: AddressId,
        line: &str,
    ) -> Result<Option<AddressRecord>> {
        let Some(address) = self.work.addresses.get_mut(&id) else {
            return Ok(None);
        };
        address.line = line.to_owned();
        address.updated_at = Utc::now();
        Ok(Some(address.clone()))
    }

    async fn delete_address(&mut self, id: AddressId) -> Result<bool> {
        if self.work.orders.values().any(|o| o.address_id == id) {
            return Err(restrict("orders_address_id_fkey"));
        }
        Ok(self.work.addresses.remove(&id).is_some())
    }

    async fn list_addresses_for_user(&mut self, user_id: UserId) -> Result<Vec<AddressRecord>> {
        Ok(self
            .work
            .addresses
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_addresses(&mut self, page: Page) -> Result<Vec<AddressRecord>> {
        Ok(paginate(self.work.addresses.values(), page))
    }

    async fn insert_inventory(&mut self, location: &str) -> Result<InventoryRecord> {
        let now = Utc::now();
        let record = InventoryRecord {
            id: InventoryId::new(self.work.next_id("inventories")),
            location: location.to_owned(),
            created_at: now,
            updated_at: now,
        };
        self.work.inventories.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_inventory(&mut self, id: InventoryId) -> Result<Option<InventoryRecord>> {
        Ok(self.work.inventories.get(&id).cloned())
    }

    async fn update_inventory(
        &mut self,
        id: InventoryId,
        location: &str,
    ) -> Result<Option<InventoryRecord>> {
        let Some(inventory) = self.work.inventories.get_mut(&id) else {
            return Ok(None);
        };
        inventory.location = location.to_owned();
        inventory.updated_at = Utc::now();
        Ok(Some(inventory.clone()))
    }

    async fn delete_inventory(&mut self, id: InventoryId) -> Result<bool> {
        if self.work.products.values().any(|p| p.inventory_id == id) {
            return Err(restrict("products_inventory_id_fkey"));
        }
        Ok(self.work.inventories.remove(&id).is_some())
    }

    async fn list_inventories(&mut self, page: Page) -> Result<Vec<InventoryRecord>> {
        Ok(paginate(self.work.inventories.values(), page))
    }

    async fn insert_product(&mut self, product: &NewProduct) -> Result<ProductRecord> {
        if !self.work.inventories.contains_key(&product.inventory_id) {
            return Err(restrict("products_inventory_id_fkey"));
        }
        if product.stock < 0 {
            return Err(StoreError::CheckViolation(
                "products_stock_non_negative".into(),
            ));
        }
        if !product.price.is_positive() {
            return Err(StoreError::CheckViolation("products_price_positive".into()));
        }
        let now = Utc::now();
        let record = ProductRecord {
            id: ProductId::new(self.work.next_id("products")),
            inventory_id: product.inventory_id,
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            description: product.description.clone(),
            image: product.image.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.products.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_product(&mut self, id: ProductId) -> Result<Option<ProductRecord>> {
        Ok(self.work.products.get(&id).cloned())
    }

    async fn update_product(
        &mut self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<ProductRecord>> {
        if let Some(inventory_id) = changes.inventory_id
            && !self.work.inventories.contains_key(&inventory_id)
        {
            return Err(restrict("products_inventory_id_fkey"));
        }
        if let Some(price) = changes.price
            && !price.is_positive()
        {
            return Err(StoreError::CheckViolation("products_price_positive".into()));
        }
        let Some(product) = self.work.products.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(inventory_id) = changes.inventory_id {
            product.inventory_id = inventory_id;
        }
        if let Some(name) = &changes.name {
            product.name = name.clone();
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(description) = &changes.description {
            product.description = description.clone();
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn set_product_image(
        &mut self,
        id: ProductId,
        image: &str,
    ) -> Result<Option<ProductRecord>> {
        let Some(product) = self.work.products.get_mut(&id) else {
            return Ok(None);
        };
        product.image = image.to_owned();
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&mut self, id: ProductId) -> Result<bool> {
        if self.work.line_items.values().any(|i| i.product_id == id) {
            return Err(restrict("order_products_product_id_fkey"));
        }
        Ok(self.work.products.remove(&id).is_some())
    }

    async fn list_products(&mut self, page: Page) -> Result<Vec<ProductRecord>> {
        Ok(paginate(self.work.products.values(), page))
    }

    async fn lock_product_stock(&mut self, id: ProductId) -> Result<Option<i64>> {
        // The writer lock held by this unit of work already excludes others.
        Ok(self.work.products.get(&id).map(|p| p.stock))
    }

    async fn decrement_stock(&mut self, id: ProductId, qty: i64) -> Result<u64> {
        match self.work.products.get_mut(&id) {
            Some(product) if product.stock >= qty => {
                product.stock -= qty;
                product.updated_at = Utc::now();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn increment_stock(&mut self, id: ProductId, qty: i64) -> Result<u64> {
        let Some(product) = self.work.products.get_mut(&id) else {
            return Ok(0);
        };
        let stock = match product.stock.checked_add(qty) {
            Some(stock) if stock >= 0 => stock,
            Some(_) => {
                return Err(StoreError::CheckViolation(
                    "products_stock_non_negative".into(),
                ));
            }
            None => return Err(StoreError::CheckViolation("products_stock_range".into())),
        };
        product.stock = stock;
        product.updated_at = Utc::now();
        Ok(1)
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderRecord> {
        if !self.work.users.contains_key(&order.user_id) {
            return Err(restrict("orders_user_id_fkey"));
        }
        if !self.work.addresses.contains_key(&order.address_id) {
            return Err(restrict("orders_address_id_fkey"));
        }
        let now = Utc::now();
        let record = OrderRecord {
            id: OrderId::new(self.work.next_id("orders")),
            user_id: order.user_id,
            address_id: order.address_id,
            amount_pay: Money::zero(),
            status_order: order.status_order,
            status_delivery: order.status_delivery,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.work.orders.insert(record.id, record.clone());
        Ok(record)
    }

    async fn insert_line_items(
        &mut self,
        order_id: OrderId,
        items: &[NewLineItem],
    ) -> Result<Vec<LineItemRecord>> {
        if !self.work.orders.contains_key(&order_id) {
            return Err(restrict("order_products_order_id_fkey"));
        }
        let mut inserted: Vec<LineItemRecord> = Vec::with_capacity(items.len());
        let now = Utc::now();
        for item in items {
            if !self.work.products.contains_key(&item.product_id) {
                return Err(restrict("order_products_product_id_fkey"));
            }
            if item.qty == 0 {
                return Err(StoreError::CheckViolation(
                    "order_products_qty_positive".into(),
                ));
            }
            let duplicate = self
                .work
                .line_items
                .values()
                .chain(inserted.iter())
                .any(|i| i.order_id == order_id && i.product_id == item.product_id);
            if duplicate {
                return Err(StoreError::UniqueViolation(
                    "order_products_order_product_key".into(),
                ));
            }
            inserted.push(LineItemRecord {
                id: LineItemId::new(self.work.next_id("order_products")),
                order_id,
                product_id: item.product_id,
                qty: item.qty,
                unit_price: item.unit_price,
                created_at: now,
            });
        }
        for record in &inserted {
            self.work.line_items.insert(record.id, record.clone());
        }
        Ok(inserted)
    }

    async fn set_order_amount(&mut self, id: OrderId, amount: Money) -> Result<()> {
        if let Some(order) = self.work.orders.get_mut(&id) {
            order.amount_pay = amount;
            order.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<OrderRecord>> {
        Ok(self.work.live_order(id).cloned())
    }

    async fn find_order_in(
        &mut self,
        id: OrderId,
        statuses: &[OrderStatus],
    ) -> Result<Option<OrderRecord>> {
        Ok(self
            .work
            .live_order(id)
            .filter(|o| statuses.contains(&o.status_order))
            .cloned())
    }

    async fn update_order_address(
        &mut self,
        id: OrderId,
        address_id: AddressId,
    ) -> Result<Option<OrderRecord>> {
        if !self.work.addresses.contains_key(&address_id) {
            return Err(restrict("orders_address_id_fkey"));
        }
        let Some(order) = self
            .work
            .orders
            .get_mut(&id)
            .filter(|o| o.deleted_at.is_none())
        else {
            return Ok(None);
        };
        order.address_id = address_id;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn update_order_status(
        &mut self,
        id: OrderId,
        changes: &StatusChanges,
    ) -> Result<Option<OrderRecord>> {
        let Some(order) = self
            .work
            .orders
            .get_mut(&id)
            .filter(|o| o.deleted_at.is_none())
        else {
            return Ok(None);
        };
        if let Some(status) = changes.status_order {
            order.status_order = status;
        }
        if let Some(status) = changes.status_delivery {
            order.status_delivery = status;
        }
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn soft_delete_order(&mut self, id: OrderId) -> Result<bool> {
        match self
            .work
            .orders
            .get_mut(&id)
            .filter(|o| o.deleted_at.is_none())
        {
            Some(order) => {
                order.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn line_items_for_order(&mut self, order_id: OrderId) -> Result<Vec<LineItemRecord>> {
        Ok(self
            .work
            .line_items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn list_orders(&mut self, page: Page) -> Result<Vec<OrderRecord>> {
        Ok(paginate(
            self.work.orders.values().filter(|o| o.deleted_at.is_none()),
            page,
        ))
    }

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<PaymentRecord> {
        if !self.work.orders.contains_key(&payment.order_id) {
            return Err(restrict("payments_order_id_fkey"));
        }
        let now = Utc::now();
        let record = PaymentRecord {
            id: PaymentId::new(self.work.next_id("payments")),
            order_id: payment.order_id,
            image: payment.image.clone(),
            status: payment.status,
            created_at: now,
            updated_at: now,
        };
        self.work.payments.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_payment(&mut self, id: PaymentId) -> Result<Option<PaymentRecord>> {
        Ok(self.work.payments.get(&id).cloned())
    }

    async fn find_latest_payment_for_order(
        &mut self,
        order_id: OrderId,
    ) -> Result<Option<PaymentRecord>> {
        Ok(self
            .work
            .payments
            .values()
            .rev()
            .find(|p| p.order_id == order_id)
            .cloned())
    }

    async fn update_payment(
        &mut self,
        id: PaymentId,
        changes: &PaymentChanges,
    ) -> Result<Option<PaymentRecord>> {
        let Some(payment) = self.work.payments.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            payment.status = status;
        }
        if let Some(image) = &changes.image {
            payment.image = image.clone();
        }
        payment.updated_at = Utc::now();
        Ok(Some(payment.clone()))
    }

    async fn delete_payment(&mut self, id: PaymentId) -> Result<bool> {
        Ok(self.work.payments.remove(&id).is_some())
    }

    async fn list_payments(&mut self, page: Page) -> Result<Vec<PaymentRecord>> {
        Ok(paginate(self.work.payments.values(), page))
    }

    async fn commit(self) -> Result<()> {
        let InMemoryTx { mut guard, work } = self;
        *guard = work;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::{DeliveryStatus, PaymentStatus, Role};

    use super::*;

    async fn seed(store: &InMemoryStore) -> (UserRecord, AddressRecord, ProductRecord) {
        let mut tx = store.begin().await.unwrap();
        let user = tx
            .insert_user(&NewUser {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password_hash: "hash".into(),
                role: Role::Customer,
            })
            .await
            .unwrap();
        let address = tx
            .insert_address(&NewAddress {
                user_id: user.id,
                line: "1 Main St".into(),
            })
            .await
            .unwrap();
        let inventory = tx.insert_inventory("Warehouse A").await.unwrap();
        let product = tx
            .insert_product(&NewProduct {
                inventory_id: inventory.id,
                name: "Widget".into(),
                price: Money::from_units(10),
                stock: 5,
                description: "A widget".into(),
                image: String::new(),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        (user, address, product)
    }

    fn new_order(user: &UserRecord, address: &AddressRecord) -> NewOrder {
        NewOrder {
            user_id: user.id,
            address_id: address.id,
            status_order: OrderStatus::Waiting,
            status_delivery: DeliveryStatus::Waiting,
        }
    }

    #[tokio::test]
    async fn dropping_unit_of_work_rolls_back() {
        let store = InMemoryStore::new();
        let (_, _, product) = seed(&store).await;

        {
            let mut tx = store.begin().await.unwrap();
            assert_eq!(tx.decrement_stock(product.id, 2).await.unwrap(), 1);
        }

        let mut tx = store.begin().await.unwrap();
        let stored = tx.find_product(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 5);
    }

    #[tokio::test]
    async fn decrement_refuses_to_go_negative() {
        let store = InMemoryStore::new();
        let (_, _, product) = seed(&store).await;

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.decrement_stock(product.id, 6).await.unwrap(), 0);
        assert_eq!(tx.decrement_stock(product.id, 5).await.unwrap(), 1);
        assert_eq!(tx.lock_product_stock(product.id).await.unwrap(), Some(0));
        assert_eq!(tx.decrement_stock(ProductId::new(99), 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn increment_rejects_stock_overflow() {
        let store = InMemoryStore::new();
        let (_, _, product) = seed(&store).await;

        let mut tx = store.begin().await.unwrap();
        let err = tx.increment_stock(product.id, i64::MAX).await.unwrap_err();
        assert!(matches!(err, StoreError::CheckViolation(ref c) if c == "products_stock_range"));
        assert_eq!(tx.lock_product_stock(product.id).await.unwrap(), Some(5));

        let err = tx.increment_stock(product.id, -6).await.unwrap_err();
        assert!(matches!(err, StoreError::CheckViolation(_)));
        assert_eq!(tx.increment_stock(product.id, 3).await.unwrap(), 1);
        assert_eq!(tx.lock_product_stock(product.id).await.unwrap(), Some(8));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let store = InMemoryStore::new();
        seed(&store).await;

        let mut tx = store.begin().await.unwrap();
        let err = tx
            .insert_user(&NewUser {
                name: "Other".into(),
                email: "ada@example.com".into(),
                password_hash: "hash".into(),
                role: Role::Admin,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(c) if c == "users_email_key"));
    }

    #[tokio::test]
    async fn deletes_are_restricted_by_references() {
        let store = InMemoryStore::new();
        let (user, address, product) = seed(&store).await;

        let mut tx = store.begin().await.unwrap();
        let order = tx.insert_order(&new_order(&user, &address)).await.unwrap();
        tx.insert_line_items(
            order.id,
            &[NewLineItem {
                product_id: product.id,
                qty: 1,
                unit_price: product.price,
            }],
        )
        .await
        .unwrap();

        assert!(matches!(
            tx.delete_user(user.id).await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
        assert!(matches!(
            tx.delete_address(address.id).await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
        assert!(matches!(
            tx.delete_product(product.id).await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
        assert!(matches!(
            tx.delete_inventory(product.inventory_id).await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
    }

    #[tokio::test]
    async fn line_items_are_unique_per_order_and_product() {
        let store = InMemoryStore::new();
        let (user, address, product) = seed(&store).await;

        let mut tx = store.begin().await.unwrap();
        let order = tx.insert_order(&new_order(&user, &address)).await.unwrap();
        let item = NewLineItem {
            product_id: product.id,
            qty: 1,
            unit_price: product.price,
        };
        let err = tx
            .insert_line_items(order.id, &[item.clone(), item])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        assert!(tx.line_items_for_order(order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn soft_deleted_orders_are_invisible() {
        let store = InMemoryStore::new();
        let (user, address, _) = seed(&store).await;

        let mut tx = store.begin().await.unwrap();
        let order = tx.insert_order(&new_order(&user, &address)).await.unwrap();
        assert!(tx.soft_delete_order(order.id).await.unwrap());
        assert!(!tx.soft_delete_order(order.id).await.unwrap());

        assert!(tx.find_order(order.id).await.unwrap().is_none());
        assert!(
            tx.find_order_in(order.id, &[OrderStatus::Waiting])
                .await
                .unwrap()
                .is_none()
        );
        assert!(tx.list_orders(Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scoped_lookup_filters_by_status() {
        let store = InMemoryStore::new();
        let (user, address, _) = seed(&store).await;

        let mut tx = store.begin().await.unwrap();
        let order = tx.insert_order(&new_order(&user, &address)).await.unwrap();
        tx.update_order_status(
            order.id,
            &StatusChanges {
                status_order: Some(OrderStatus::Confirmed),
                status_delivery: None,
            },
        )
        .await
        .unwrap();

        assert!(
            tx.find_order_in(order.id, &[OrderStatus::Waiting])
                .await
                .unwrap()
                .is_none()
        );
        let found = tx
            .find_order_in(order.id, &[OrderStatus::Waiting, OrderStatus::Confirmed])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.status_delivery, DeliveryStatus::Waiting);
    }

    #[tokio::test]
    async fn latest_payment_wins() {
        let store = InMemoryStore::new();
        let (user, address, _) = seed(&store).await;

        let mut tx = store.begin().await.unwrap();
        let order = tx.insert_order(&new_order(&user, &address)).await.unwrap();
        for image in ["first.png", "second.png"] {
            tx.insert_payment(&NewPayment {
                order_id: order.id,
                image: image.into(),
                status: PaymentStatus::Waiting,
            })
            .await
            .unwrap();
        }

        let latest = tx
            .find_latest_payment_for_order(order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.image, "second.png");
    }

    #[tokio::test]
    async fn list_respects_page_bounds() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        for n in 0..15 {
            tx.insert_inventory(&format!("Site {n}")).await.unwrap();
        }

        let second = tx.list_inventories(Page::new(2, 10)).await.unwrap();
        assert_eq!(second.len(), 5);
        assert_eq!(second[0].location, "Site 10");
    }
}
