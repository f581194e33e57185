use async_trait::async_trait;
use common::{
    AddressId, InventoryId, Money, OrderId, OrderStatus, Page, PaymentId, ProductId, UserId,
};

use crate::{
    Result,
    records::{
        AddressRecord, InventoryRecord, LineItemRecord, NewAddress, NewLineItem, NewOrder,
        NewPayment, NewProduct, NewUser, OrderRecord, PaymentChanges, PaymentRecord,
        ProductChanges, ProductRecord, StatusChanges, UserChanges, UserRecord,
    },
};

/// Entry point to the persistence backend.
///
/// Every read and write goes through a [`UnitOfWork`] obtained from
/// [`Store::begin`]. Handles are cheap to clone and shared between tasks.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    type Tx: UnitOfWork;

    /// Opens a transaction.
    async fn begin(&self) -> Result<Self::Tx>;
}

/// A single transaction against the backend.
///
/// Writes become visible to other units of work only after [`commit`].
/// Dropping a unit of work without committing rolls it back.
///
/// Lookups of orders never return soft-deleted rows. Single-row updates
/// return `None` when the target row does not exist, and deletes return
/// whether a row was removed.
///
/// [`commit`]: UnitOfWork::commit
#[async_trait]
pub trait UnitOfWork: Send {
    // Users

    async fn insert_user(&mut self, user: &NewUser) -> Result<UserRecord>;

    async fn find_user(&mut self, id: UserId) -> Result<Option<UserRecord>>;

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<UserRecord>>;

    async fn update_user(&mut self, id: UserId, changes: &UserChanges)
    -> Result<Option<UserRecord>>;

    async fn delete_user(&mut self, id: UserId) -> Result<bool>;

    async fn list_users(&mut self, page: Page) -> Result<Vec<UserRecord>>;

    // Addresses

    async fn insert_address(&mut self, address: &NewAddress) -> Result<AddressRecord>;

    async fn find_address(&mut self, id: AddressId) -> Result<Option<AddressRecord>>;

    async fn update_address(&mut self, id: AddressId, line: &str) -> Result<Option<AddressRecord>>;

    async fn delete_address(&mut self, id: AddressId) -> Result<bool>;

    async fn list_addresses_for_user(&mut self, user_id: UserId) -> Result<Vec<AddressRecord>>;

    async fn list_addresses(&mut self, page: Page) -> Result<Vec<AddressRecord>>;

    // Inventory locations

    async fn insert_inventory(&mut self, location: &str) -> Result<InventoryRecord>;

    async fn find_inventory(&mut self, id: InventoryId) -> Result<Option<InventoryRecord>>;

    async fn update_inventory(
        &mut self,
        id: InventoryId,
        location: &str,
    ) -> Result<Option<InventoryRecord>>;

    async fn delete_inventory(&mut self, id: InventoryId) -> Result<bool>;

    async fn list_inventories(&mut self, page: Page) -> Result<Vec<InventoryRecord>>;

    // Products

    async fn insert_product(&mut self, product: &NewProduct) -> Result<ProductRecord>;

    async fn find_product(&mut self, id: ProductId) -> Result<Option<ProductRecord>>;

    async fn update_product(
        &mut self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<ProductRecord>>;

    async fn set_product_image(
        &mut self,
        id: ProductId,
        image: &str,
    ) -> Result<Option<ProductRecord>>;

    async fn delete_product(&mut self, id: ProductId) -> Result<bool>;

    async fn list_products(&mut self, page: Page) -> Result<Vec<ProductRecord>>;

    /// Reads a product's stock and holds a row lock on it until the unit of
    /// work ends. `None` when the product does not exist.
    async fn lock_product_stock(&mut self, id: ProductId) -> Result<Option<i64>>;

    /// Subtracts `qty` only if at least `qty` is in stock. Returns the number
    /// of rows changed, so `0` means the product is missing or short.
    async fn decrement_stock(&mut self, id: ProductId, qty: i64) -> Result<u64>;

    /// Adds `qty` to the stock. Returns the number of rows changed.
    async fn increment_stock(&mut self, id: ProductId, qty: i64) -> Result<u64>;

    // Orders

    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderRecord>;

    /// Inserts all line items of an order in one statement, preserving order.
    async fn insert_line_items(
        &mut self,
        order_id: OrderId,
        items: &[NewLineItem],
    ) -> Result<Vec<LineItemRecord>>;

    async fn set_order_amount(&mut self, id: OrderId, amount: Money) -> Result<()>;

    async fn find_order(&mut self, id: OrderId) -> Result<Option<OrderRecord>>;

    /// Finds an order only if its order status is one of `statuses`, and
    /// locks the row until the unit of work ends.
    ///
    /// A writer that committed first is observed: if it moved the order out
    /// of `statuses`, this returns `None`.
    async fn find_order_in(
        &mut self,
        id: OrderId,
        statuses: &[OrderStatus],
    ) -> Result<Option<OrderRecord>>;

    async fn update_order_address(
        &mut self,
        id: OrderId,
        address_id: AddressId,
    ) -> Result<Option<OrderRecord>>;

    async fn update_order_status(
        &mut self,
        id: OrderId,
        changes: &StatusChanges,
    ) -> Result<Option<OrderRecord>>;

    async fn soft_delete_order(&mut self, id: OrderId) -> Result<bool>;

    async fn line_items_for_order(&mut self, order_id: OrderId) -> Result<Vec<LineItemRecord>>;

    async fn list_orders(&mut self, page: Page) -> Result<Vec<OrderRecord>>;

    // Payments

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<PaymentRecord>;

    async fn find_payment(&mut self, id: PaymentId) -> Result<Option<PaymentRecord>>;

    /// The most recently created payment of an order.
    async fn find_latest_payment_for_order(
        &mut self,
        order_id: OrderId,
    ) -> Result<Option<PaymentRecord>>;

    async fn update_payment(
        &mut self,
        id: PaymentId,
        changes: &PaymentChanges,
    ) -> Result<Option<PaymentRecord>>;

    async fn delete_payment(&mut self, id: PaymentId) -> Result<bool>;

    async fn list_payments(&mut self, page: Page) -> Result<Vec<PaymentRecord>>;

    /// Makes every write of this unit of work durable.
    async fn commit(self) -> Result<()>;
}
