//! Integration tests for the API server on the in-memory store.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use api::routes::AppState;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use cache::InMemoryCache;
use common::{AddressId, InventoryId, Money, ProductId, Role, UserId};
use domain::{CreateProduct, CreateUser};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::InMemoryStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

type Caller = Option<(UserId, &'static str)>;

struct Shop {
    app: Router,
    state: Arc<AppState<InMemoryStore>>,
    admin: Caller,
    customer: Caller,
    customer_id: UserId,
    address: AddressId,
    inventory: InventoryId,
}

impl Shop {
    async fn new() -> Self {
        let state = api::create_state(
            InMemoryStore::new(),
            Arc::new(InMemoryCache::new()),
            Duration::from_secs(60),
        );
        let app = api::create_app(state.clone(), get_metrics_handle());

        let admin = register(&state, "Admin", "admin@example.com", Role::Admin).await;
        let customer_id = register(&state, "Ana", "ana@example.com", Role::Customer).await;
        let address = state
            .addresses
            .create_address(customer_id, "Jl. Merdeka 1")
            .await
            .unwrap()
            .id;
        let inventory = state
            .inventories
            .create_inventory("Warehouse A")
            .await
            .unwrap()
            .id;

        Self {
            app,
            state,
            admin: Some((admin, "admin")),
            customer: Some((customer_id, "customer")),
            customer_id,
            address,
            inventory,
        }
    }

    async fn product(&self, price_cents: i64, stock: i64) -> ProductId {
        self.state
            .products
            .create_product(CreateProduct {
                inventory_id: self.inventory,
                name: format!("Product {price_cents}/{stock}"),
                price: Money::from_cents(price_cents),
                stock,
                description: String::new(),
                image: String::new(),
            })
            .await
            .unwrap()
            .id
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        caller: Caller,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((user_id, role)) = caller {
            builder = builder
                .header("x-user-id", user_id.to_string())
                .header("x-user-role", role);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn place_order(&self, items: Value) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/orders",
            self.customer,
            Some(json!({ "address_id": self.address, "items": items })),
        )
        .await
    }

    async fn stock_of(&self, product: ProductId) -> i64 {
        let (status, json) = self
            .send("GET", &format!("/products/{product}"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        json["stock"].as_i64().unwrap()
    }
}

async fn register(
    state: &AppState<InMemoryStore>,
    name: &str,
    email: &str,
    role: Role,
) -> UserId {
    state
        .users
        .create_user(CreateUser {
            name: name.into(),
            email: email.into(),
            password_hash: "$2b$10$hash".into(),
            role,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_health_check() {
    let shop = Shop::new().await;

    let (status, json) = shop.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let shop = Shop::new().await;

    let response = shop
        .app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_create_order_takes_stock() {
    let shop = Shop::new().await;
    let product = shop.product(1000, 5).await;

    let (status, json) = shop
        .place_order(json!([{ "product_id": product, "qty": 2 }]))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["amount_pay"], 2000);
    assert_eq!(json["status_order"], "waiting");
    assert_eq!(json["status_delivery"], "waiting");
    assert_eq!(json["user"]["id"], shop.customer_id.as_i64());
    assert_eq!(json["items"][0]["qty"], 2);
    assert_eq!(json["items"][0]["unit_price"], 1000);
    assert_eq!(shop.stock_of(product).await, 3);
}

#[tokio::test]
async fn test_insufficient_stock_leaves_stock_untouched() {
    let shop = Shop::new().await;
    let plenty = shop.product(1000, 5).await;
    let sold_out = shop.product(500, 0).await;

    let (status, json) = shop
        .place_order(json!([
            { "product_id": plenty, "qty": 2 },
            { "product_id": sold_out, "qty": 1 }
        ]))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Insufficient stock"));
    assert_eq!(shop.stock_of(plenty).await, 5);

    let (_, orders) = shop.send("GET", "/orders", shop.admin, None).await;
    assert_eq!(orders.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_order_rejections() {
    let shop = Shop::new().await;

    let (status, _) = shop.place_order(json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = shop
        .place_order(json!([{ "product_id": 999, "qty": 1 }]))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("Product"));

    let (status, _) = shop
        .send(
            "POST",
            "/orders",
            None,
            Some(json!({ "address_id": shop.address, "items": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_order_to_foreign_address_is_rejected() {
    let shop = Shop::new().await;
    let product = shop.product(1000, 5).await;
    let other = register(&shop.state, "Budi", "budi@example.com", Role::Customer).await;

    let (status, _) = shop
        .send(
            "POST",
            "/orders",
            Some((other, "customer")),
            Some(json!({
                "address_id": shop.address,
                "items": [{ "product_id": product, "qty": 1 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(shop.stock_of(product).await, 5);
}

#[tokio::test]
async fn test_orders_of_other_customers_are_hidden() {
    let shop = Shop::new().await;
    let product = shop.product(1000, 5).await;
    let (_, order) = shop
        .place_order(json!([{ "product_id": product, "qty": 1 }]))
        .await;
    let uri = format!("/orders/{}", order["id"]);
    let other = register(&shop.state, "Budi", "budi@example.com", Role::Customer).await;

    let (status, _) = shop.send("GET", &uri, Some((other, "customer")), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = shop.send("GET", &uri, shop.customer, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = shop.send("GET", &uri, shop.admin, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], order["id"]);
}

#[tokio::test]
async fn test_address_change_only_while_waiting() {
    let shop = Shop::new().await;
    let product = shop.product(1000, 5).await;
    let second = shop
        .state
        .addresses
        .create_address(shop.customer_id, "Jl. Sudirman 2")
        .await
        .unwrap();
    let (_, order) = shop
        .place_order(json!([{ "product_id": product, "qty": 1 }]))
        .await;
    let id = order["id"].as_i64().unwrap();

    let (status, json) = shop
        .send(
            "PUT",
            &format!("/orders/{id}/address"),
            shop.customer,
            Some(json!({ "address_id": second.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["address"]["line"], "Jl. Sudirman 2");

    let (status, json) = shop
        .send(
            "PUT",
            &format!("/orders/{id}/status"),
            shop.admin,
            Some(json!({ "status_order": "confirmed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status_order"], "confirmed");

    let (status, _) = shop
        .send(
            "PUT",
            &format!("/orders/{id}/address"),
            shop.customer,
            Some(json!({ "address_id": shop.address })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_updates() {
    let shop = Shop::new().await;
    let product = shop.product(1000, 5).await;
    let (_, order) = shop
        .place_order(json!([{ "product_id": product, "qty": 1 }]))
        .await;
    let uri = format!("/orders/{}/status", order["id"]);

    let (status, _) = shop
        .send("PUT", &uri, shop.customer, Some(json!({ "status_order": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = shop
        .send("PUT", &uri, shop.admin, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let confirm = json!({ "status_order": "confirmed", "status_delivery": "on_process" });
    let (status, json) = shop.send("PUT", &uri, shop.admin, Some(confirm.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status_delivery"], "on_process");

    let (status, _) = shop.send("PUT", &uri, shop.admin, Some(confirm)).await;
    assert_eq!(status, StatusCode::OK, "re-applying the same statuses is accepted");

    let (status, json) = shop
        .send("PUT", &uri, shop.admin, Some(json!({ "status_order": "waiting" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_canceled_order_cannot_be_updated() {
    let shop = Shop::new().await;
    let product = shop.product(1000, 5).await;
    let (_, order) = shop
        .place_order(json!([{ "product_id": product, "qty": 1 }]))
        .await;
    let uri = format!("/orders/{}/status", order["id"]);

    let (status, _) = shop
        .send("PUT", &uri, shop.admin, Some(json!({ "status_order": "canceled" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = shop
        .send("PUT", &uri, shop.admin, Some(json!({ "status_order": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_order_disappears() {
    let shop = Shop::new().await;
    let product = shop.product(1000, 5).await;
    let (_, order) = shop
        .place_order(json!([{ "product_id": product, "qty": 1 }]))
        .await;
    let uri = format!("/orders/{}", order["id"]);

    let (status, _) = shop.send("DELETE", &uri, shop.customer, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = shop.send("DELETE", &uri, shop.admin, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(json, Value::Null);

    let (status, _) = shop.send("GET", &uri, shop.admin, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_flow() {
    let shop = Shop::new().await;
    let product = shop.product(1000, 5).await;
    let (_, order) = shop
        .place_order(json!([{ "product_id": product, "qty": 1 }]))
        .await;
    let order_id = order["id"].as_i64().unwrap();

    let (status, payment) = shop
        .send(
            "POST",
            "/payments",
            shop.customer,
            Some(json!({ "order_id": order_id, "image_path": "receipts/1.png" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["status"], "waiting");
    assert_eq!(payment["order_id"], order_id);

    let status_uri = format!("/orders/{order_id}/payment/status");
    let (status, _) = shop
        .send("PUT", &status_uri, shop.customer, Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = shop
        .send("PUT", &status_uri, shop.admin, Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "confirmed");

    let (status, json) = shop
        .send("GET", &format!("/orders/{order_id}/payment"), shop.customer, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], payment["id"]);
    assert_eq!(json["status"], "confirmed");

    let (_, order) = shop
        .send("GET", &format!("/orders/{order_id}"), shop.admin, None)
        .await;
    assert_eq!(order["status_order"], "waiting", "payment status is independent");
}

#[tokio::test]
async fn test_payment_for_missing_order() {
    let shop = Shop::new().await;

    let (status, json) = shop
        .send(
            "POST",
            "/payments",
            shop.admin,
            Some(json!({ "order_id": 404, "image_path": "receipts/x.png" })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("Order"));
}

#[tokio::test]
async fn test_user_registration() {
    let shop = Shop::new().await;
    let body = json!({
        "name": "Citra",
        "email": "citra@example.com",
        "password_hash": "$2b$10$other"
    });

    let (status, json) = shop.send("POST", "/users", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["role"], "customer");
    assert!(json.get("password_hash").is_none());

    let (status, _) = shop.send("POST", "/users", None, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let admin_body = json!({
        "name": "Dewi",
        "email": "dewi@example.com",
        "password_hash": "$2b$10$admin",
        "role": "admin"
    });
    let (status, _) = shop
        .send("POST", "/users", None, Some(admin_body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = shop
        .send("POST", "/users", shop.customer, Some(admin_body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = shop
        .send("POST", "/users", shop.admin, Some(admin_body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_customers_only_see_their_own_account() {
    let shop = Shop::new().await;
    let other = register(&shop.state, "Budi", "budi@example.com", Role::Customer).await;

    let (status, _) = shop
        .send("GET", &format!("/users/{other}"), shop.customer, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = shop
        .send(
            "GET",
            &format!("/users/{}/addresses", shop.customer_id),
            shop.customer,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (status, _) = shop
        .send(
            "PUT",
            &format!("/addresses/{}", shop.address),
            Some((other, "customer")),
            Some(json!({ "address": "Somewhere else" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = shop.send("GET", "/users", shop.customer, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_catalogue_admin_endpoints() {
    let shop = Shop::new().await;
    let body = json!({
        "inventory_id": shop.inventory,
        "name": "Kopi",
        "price": 2500,
        "stock": 10
    });

    let (status, _) = shop
        .send("POST", "/products", shop.customer, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, product) = shop.send("POST", "/products", shop.admin, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = product["id"].as_i64().unwrap();

    let (status, json) = shop
        .send(
            "PUT",
            &format!("/products/{id}/stock/reduce"),
            shop.admin,
            Some(json!({ "qty": 11 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Insufficient stock"));

    let (status, json) = shop
        .send(
            "PUT",
            &format!("/products/{id}/stock/add"),
            shop.admin,
            Some(json!({ "qty": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stock"], 15);

    let (_, order) = shop
        .place_order(json!([{ "product_id": id, "qty": 1 }]))
        .await;
    assert_eq!(order["amount_pay"], 2500);

    let (status, _) = shop
        .send("DELETE", &format!("/products/{id}"), shop.admin, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = shop
        .send(
            "DELETE",
            &format!("/inventories/{}", shop.inventory),
            shop.admin,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_orders_paging() {
    let shop = Shop::new().await;
    let product = shop.product(100, 10).await;
    for _ in 0..3 {
        let (status, _) = shop
            .place_order(json!([{ "product_id": product, "qty": 1 }]))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, json) = shop
        .send("GET", "/orders?page=2&page_size=2", shop.admin, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (status, json) = shop.send("GET", "/orders", shop.admin, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_invalid_order_id_format() {
    let shop = Shop::new().await;

    let (status, _) = shop.send("GET", "/orders/abc", shop.admin, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
