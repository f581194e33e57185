use std::str::FromStr;

use async_trait::async_trait;
use common::{
    AddressId, InventoryId, LineItemId, Money, OrderId, OrderStatus, Page, PaymentId, ProductId,
    UserId,
};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction, postgres::PgRow};

use crate::{
    Result, StoreError,
    records::{
        AddressRecord, InventoryRecord, LineItemRecord, NewAddress, NewLineItem, NewOrder,
        NewPayment, NewProduct, NewUser, OrderRecord, PaymentChanges, PaymentRecord,
        ProductChanges, ProductRecord, StatusChanges, UserChanges, UserRecord,
    },
    store::{Store, UnitOfWork},
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";
const ADDRESS_COLUMNS: &str = "id, user_id, line, created_at, updated_at";
const INVENTORY_COLUMNS: &str = "id, location, created_at, updated_at";
const PRODUCT_COLUMNS: &str =
    "id, inventory_id, name, price_cents, stock, description, image, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, user_id, address_id, amount_pay_cents, status_order, \
     status_delivery, created_at, updated_at, deleted_at";
const LINE_ITEM_COLUMNS: &str = "id, order_id, product_id, qty, unit_price_cents, created_at";
const PAYMENT_COLUMNS: &str = "id, order_id, image, status, created_at, updated_at";

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    type Tx = PostgresTx;

    async fn begin(&self) -> Result<PostgresTx> {
        let tx = self.pool.begin().await?;
        Ok(PostgresTx { tx })
    }
}

/// A unit of work backed by a PostgreSQL transaction.
pub struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

fn parse_column<T: FromStr>(row: &PgRow, column: &'static str) -> Result<T> {
    let value: String = row.try_get(column)?;
    value
        .parse()
        .map_err(|_| StoreError::Corrupt { column, value })
}

fn qty_column(row: &PgRow) -> Result<u32> {
    let qty: i64 = row.try_get("qty")?;
    u32::try_from(qty).map_err(|_| StoreError::Corrupt {
        column: "qty",
        value: qty.to_string(),
    })
}

fn row_to_user(row: PgRow) -> Result<UserRecord> {
    Ok(UserRecord {
        id: UserId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: parse_column(&row, "role")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_address(row: PgRow) -> Result<AddressRecord> {
    Ok(AddressRecord {
        id: AddressId::new(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        line: row.try_get("line")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_inventory(row: PgRow) -> Result<InventoryRecord> {
    Ok(InventoryRecord {
        id: InventoryId::new(row.try_get("id")?),
        location: row.try_get("location")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_product(row: PgRow) -> Result<ProductRecord> {
    Ok(ProductRecord {
        id: ProductId::new(row.try_get("id")?),
        inventory_id: InventoryId::new(row.try_get("inventory_id")?),
        name: row.try_get("name")?,
        price: Money::from_cents(row.try_get("price_cents")?),
        stock: row.try_get("stock")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_order(row: PgRow) -> Result<OrderRecord> {
    Ok(OrderRecord {
        id: OrderId::new(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        address_id: AddressId::new(row.try_get("address_id")?),
        amount_pay: Money::from_cents(row.try_get("amount_pay_cents")?),
        status_order: parse_column(&row, "status_order")?,
        status_delivery: parse_column(&row, "status_delivery")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

fn row_to_line_item(row: PgRow) -> Result<LineItemRecord> {
    Ok(LineItemRecord {
        id: LineItemId::new(row.try_get("id")?),
        order_id: OrderId::new(row.try_get("order_id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        qty: qty_column(&row)?,
        unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_payment(row: PgRow) -> Result<PaymentRecord> {
    Ok(PaymentRecord {
        id: PaymentId::new(row.try_get("id")?),
        order_id: OrderId::new(row.try_get("order_id")?),
        image: row.try_get("image")?,
        status: parse_column(&row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UnitOfWork for PostgresTx {
    async fn insert_user(&mut self, user: &NewUser) -> Result<UserRecord> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?;

        row_to_user(row)
    }

    async fn find_user(&mut self, id: UserId) -> Result<Option<UserRecord>> {
        sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?
            .map(row_to_user)
            .transpose()
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<UserRecord>> {
        sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(row_to_user)
            .transpose()
    }

    async fn update_user(
        &mut self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<UserRecord>> {
        sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(changes.name.as_deref())
        .bind(changes.password_hash.as_deref())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?
        .map(row_to_user)
        .transpose()
    }

    async fn delete_user(&mut self, id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::classify)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&mut self, page: Page) -> Result<Vec<UserRecord>> {
        let page = page.normalized();
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn insert_address(&mut self, address: &NewAddress) -> Result<AddressRecord> {
        let row = sqlx::query(&format!(
            "INSERT INTO addresses (user_id, line) VALUES ($1, $2) RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(address.user_id.as_i64())
        .bind(&address.line)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?;

        row_to_address(row)
    }

    async fn find_address(&mut self, id: AddressId) -> Result<Option<AddressRecord>> {
        sqlx::query(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_address)
        .transpose()
    }

    async fn update_address(
        &mut self,
        id: AddressId,
        line: &str,
    ) -> Result<Option<AddressRecord>> {
        sqlx::query(&format!(
            "UPDATE addresses SET line = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(line)
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_address)
        .transpose()
    }

    async fn delete_address(&mut self, id: AddressId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::classify)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_addresses_for_user(&mut self, user_id: UserId) -> Result<Vec<AddressRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id.as_i64())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_address).collect()
    }

    async fn list_addresses(&mut self, page: Page) -> Result<Vec<AddressRecord>> {
        let page = page.normalized();
        let rows = sqlx::query(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_address).collect()
    }

    async fn insert_inventory(&mut self, location: &str) -> Result<InventoryRecord> {
        let row = sqlx::query(&format!(
            "INSERT INTO inventories (location) VALUES ($1) RETURNING {INVENTORY_COLUMNS}"
        ))
        .bind(location)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?;

        row_to_inventory(row)
    }

    async fn find_inventory(&mut self, id: InventoryId) -> Result<Option<InventoryRecord>> {
        sqlx::query(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventories WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_inventory)
        .transpose()
    }

    async fn update_inventory(
        &mut self,
        id: InventoryId,
        location: &str,
    ) -> Result<Option<InventoryRecord>> {
        sqlx::query(&format!(
            "UPDATE inventories SET location = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {INVENTORY_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(location)
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_inventory)
        .transpose()
    }

    async fn delete_inventory(&mut self, id: InventoryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inventories WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::classify)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_inventories(&mut self, page: Page) -> Result<Vec<InventoryRecord>> {
        let page = page.normalized();
        let rows = sqlx::query(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventories ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_inventory).collect()
    }

    async fn insert_product(&mut self, product: &NewProduct) -> Result<ProductRecord> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (inventory_id, name, price_cents, stock, description, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.inventory_id.as_i64())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(product.stock)
        .bind(&product.description)
        .bind(&product.image)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?;

        row_to_product(row)
    }

    async fn find_product(&mut self, id: ProductId) -> Result<Option<ProductRecord>> {
        sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_product)
        .transpose()
    }

    async fn update_product(
        &mut self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<ProductRecord>> {
        sqlx::query(&format!(
            r#"
            UPDATE products
            SET inventory_id = COALESCE($2, inventory_id),
                name = COALESCE($3, name),
                price_cents = COALESCE($4, price_cents),
                description = COALESCE($5, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(changes.inventory_id.map(|i| i.as_i64()))
        .bind(changes.name.as_deref())
        .bind(changes.price.map(|p| p.cents()))
        .bind(changes.description.as_deref())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?
        .map(row_to_product)
        .transpose()
    }

    async fn set_product_image(
        &mut self,
        id: ProductId,
        image: &str,
    ) -> Result<Option<ProductRecord>> {
        sqlx::query(&format!(
            "UPDATE products SET image = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(image)
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_product)
        .transpose()
    }

    async fn delete_product(&mut self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::classify)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&mut self, page: Page) -> Result<Vec<ProductRecord>> {
        let page = page.normalized();
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_product).collect()
    }

    async fn lock_product_stock(&mut self, id: ProductId) -> Result<Option<i64>> {
        let stock: Option<i64> =
            sqlx::query_scalar("SELECT stock FROM products WHERE id = $1 FOR UPDATE")
                .bind(id.as_i64())
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(stock)
    }

    async fn decrement_stock(&mut self, id: ProductId, qty: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE products SET stock = stock - $2, updated_at = NOW() \
             WHERE id = $1 AND stock >= $2",
        )
        .bind(id.as_i64())
        .bind(qty)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?;
        Ok(result.rows_affected())
    }

    async fn increment_stock(&mut self, id: ProductId, qty: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(qty)
        .execute(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?;
        Ok(result.rows_affected())
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderRecord> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (user_id, address_id, status_order, status_delivery)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.user_id.as_i64())
        .bind(order.address_id.as_i64())
        .bind(order.status_order.as_str())
        .bind(order.status_delivery.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?;

        row_to_order(row)
    }

    async fn insert_line_items(
        &mut self,
        order_id: OrderId,
        items: &[NewLineItem],
    ) -> Result<Vec<LineItemRecord>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO order_products (order_id, product_id, qty, unit_price_cents) ",
        );
        builder.push_values(items, |mut row, item| {
            row.push_bind(order_id.as_i64())
                .push_bind(item.product_id.as_i64())
                .push_bind(i64::from(item.qty))
                .push_bind(item.unit_price.cents());
        });
        builder.push(format!(" RETURNING {LINE_ITEM_COLUMNS}"));

        let rows = builder
            .build()
            .fetch_all(&mut *self.tx)
            .await
            .map_err(StoreError::classify)?;

        let mut records = rows
            .into_iter()
            .map(row_to_line_item)
            .collect::<Result<Vec<_>>>()?;
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn set_order_amount(&mut self, id: OrderId, amount: Money) -> Result<()> {
        sqlx::query("UPDATE orders SET amount_pay_cents = $2, updated_at = NOW() WHERE id = $1")
            .bind(id.as_i64())
            .bind(amount.cents())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_order(&mut self, id: OrderId) -> Result<Option<OrderRecord>> {
        sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_order)
        .transpose()
    }

    async fn find_order_in(
        &mut self,
        id: OrderId,
        statuses: &[OrderStatus],
    ) -> Result<Option<OrderRecord>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_owned()).collect();
        sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE id = $1 AND deleted_at IS NULL AND status_order = ANY($2) \
             FOR UPDATE"
        ))
        .bind(id.as_i64())
        .bind(statuses)
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_order)
        .transpose()
    }

    async fn update_order_address(
        &mut self,
        id: OrderId,
        address_id: AddressId,
    ) -> Result<Option<OrderRecord>> {
        sqlx::query(&format!(
            "UPDATE orders SET address_id = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(address_id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?
        .map(row_to_order)
        .transpose()
    }

    async fn update_order_status(
        &mut self,
        id: OrderId,
        changes: &StatusChanges,
    ) -> Result<Option<OrderRecord>> {
        sqlx::query(&format!(
            r#"
            UPDATE orders
            SET status_order = COALESCE($2, status_order),
                status_delivery = COALESCE($3, status_delivery),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(changes.status_order.map(|s| s.as_str()))
        .bind(changes.status_delivery.map(|s| s.as_str()))
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_order)
        .transpose()
    }

    async fn soft_delete_order(&mut self, id: OrderId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE orders SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i64())
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn line_items_for_order(&mut self, order_id: OrderId) -> Result<Vec<LineItemRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {LINE_ITEM_COLUMNS} FROM order_products WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id.as_i64())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_line_item).collect()
    }

    async fn list_orders(&mut self, page: Page) -> Result<Vec<OrderRecord>> {
        let page = page.normalized();
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE deleted_at IS NULL \
             ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_order).collect()
    }

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<PaymentRecord> {
        let row = sqlx::query(&format!(
            "INSERT INTO payments (order_id, image, status) VALUES ($1, $2, $3) \
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(payment.order_id.as_i64())
        .bind(&payment.image)
        .bind(payment.status.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(StoreError::classify)?;

        row_to_payment(row)
    }

    async fn find_payment(&mut self, id: PaymentId) -> Result<Option<PaymentRecord>> {
        sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_payment)
        .transpose()
    }

    async fn find_latest_payment_for_order(
        &mut self,
        order_id: OrderId,
    ) -> Result<Option<PaymentRecord>> {
        sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = $1 ORDER BY id DESC LIMIT 1"
        ))
        .bind(order_id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_payment)
        .transpose()
    }

    async fn update_payment(
        &mut self,
        id: PaymentId,
        changes: &PaymentChanges,
    ) -> Result<Option<PaymentRecord>> {
        sqlx::query(&format!(
            r#"
            UPDATE payments
            SET status = COALESCE($2, status),
                image = COALESCE($3, image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.image.as_deref())
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_payment)
        .transpose()
    }

    async fn delete_payment(&mut self, id: PaymentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_payments(&mut self, page: Page) -> Result<Vec<PaymentRecord>> {
        let page = page.normalized();
        let rows = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(row_to_payment).collect()
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
