//! Key scheme shared by readers and invalidators.

use common::{OrderId, Page, ProductId};

/// Prefix shared by every cached order listing page.
pub const ORDER_PAGES: &str = "orders:page";

/// Prefix shared by every cached product listing page.
pub const PRODUCT_PAGES: &str = "products:page";

pub fn order(id: OrderId) -> String {
    format!("orders:{id}")
}

pub fn order_page(page: Page) -> String {
    format!("{ORDER_PAGES}={}:size={}", page.page, page.page_size)
}

pub fn product(id: ProductId) -> String {
    format!("products:{id}")
}

pub fn product_page(page: Page) -> String {
    format!("{PRODUCT_PAGES}={}:size={}", page.page, page.page_size)
}
