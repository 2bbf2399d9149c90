use actix_web::{
    http::{Method, StatusCode},
    test,
    web::{self, ServiceConfig},
    App,
};
use chrono::{Duration, Utc};
use payment_gateways::GatewayRouter;
use serde_json::Value;
use sm_common::{Naira, Secret};
use solemate_engine::{
    db_types::{NewProduct, NewVariant},
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::ProductCatalog,
    AddressBookApi,
    CartApi,
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::AuthConfig,
    routes,
};

pub const TEST_JWT_SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new(TEST_JWT_SECRET.to_string()) }
}

pub fn issue_token(claims: &JwtClaims) -> String {
    TokenIssuer::new(&test_auth_config()).issue_token(claims).expect("Error issuing token")
}

pub fn shopper_claims() -> JwtClaims {
    JwtClaims {
        sub: "user-1".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Obi".to_string(),
        email: "ada@example.com".to_string(),
        exp: (Utc::now() + Duration::days(1)).timestamp(),
    }
}

pub fn shopper_token() -> String {
    issue_token(&shopper_claims())
}

/// One migrated, empty database plus a gateway router, shared by every request in a test.
pub struct TestContext {
    pub db: SqliteDatabase,
    pub gateways: GatewayRouter,
}

impl TestContext {
    pub async fn new(gateways: GatewayRouter) -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
        Self { db, gateways }
    }

    pub async fn seed_catalog(&self) {
        let product = NewProduct {
            id: "air-strider".to_string(),
            name: "Air Strider".to_string(),
            variants: vec![
                NewVariant { id: "us-9".to_string(), size: "US 9".to_string(), price: Naira::from(2500), stock: 10 },
                NewVariant { id: "us-10".to_string(), size: "US 10".to_string(), price: Naira::from(1500), stock: 3 },
            ],
        };
        self.db.upsert_product(product).await.expect("Error seeding catalog");
    }

    /// Registers the full `/api` surface against this context's stores and gateways. The
    /// notification hook is left unwired; mail delivery has its own tests.
    pub fn configure(&self) -> impl Fn(&mut ServiceConfig) + Clone {
        let db = self.db.clone();
        let gateways = self.gateways.clone();
        move |cfg: &mut ServiceConfig| {
            let order_flow_api = OrderFlowApi::new(db.clone(), gateways.clone(), EventProducers::default());
            cfg.app_data(web::Data::new(order_flow_api))
                .app_data(web::Data::new(CartApi::new(db.clone())))
                .app_data(web::Data::new(AddressBookApi::new(db.clone())))
                .app_data(web::Data::new(TokenIssuer::new(&test_auth_config())))
                .service(
                    web::scope("/api")
                        .service(routes::orders::initialize_order)
                        .service(routes::orders::my_orders)
                        .service(routes::orders::order_by_number)
                        .service(routes::payments::initialize_payment)
                        .service(routes::payments::verify_payment)
                        .service(routes::cart::add_to_cart)
                        .service(routes::cart::get_cart)
                        .service(routes::cart::increase_item_qty)
                        .service(routes::cart::decrease_item_qty)
                        .service(routes::cart::remove_item_from_cart)
                        .service(routes::cart::clear_cart)
                        .service(routes::addresses::create_address)
                        .service(routes::addresses::my_addresses)
                        .service(routes::addresses::address_by_id),
                );
        }
    }
}

pub async fn send_request<F>(
    configure: F,
    method: Method,
    token: Option<&str>,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value)
where
    F: FnOnce(&mut ServiceConfig),
{
    let app = test::init_service(App::new().configure(configure)).await;
    let mut req = test::TestRequest::with_uri(path).method(method);
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }
    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn get(ctx: &TestContext, token: Option<&str>, path: &str) -> (StatusCode, Value) {
    send_request(ctx.configure(), Method::GET, token, path, None).await
}

pub async fn post(ctx: &TestContext, token: Option<&str>, path: &str, body: Value) -> (StatusCode, Value) {
    send_request(ctx.configure(), Method::POST, token, path, Some(body)).await
}

pub async fn patch(ctx: &TestContext, token: Option<&str>, path: &str, body: Value) -> (StatusCode, Value) {
    send_request(ctx.configure(), Method::PATCH, token, path, Some(body)).await
}

pub async fn delete(ctx: &TestContext, token: Option<&str>, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_request(ctx.configure(), Method::DELETE, token, path, body).await
}

/// Creates an address through the API and returns its id.
pub async fn create_address(ctx: &TestContext, token: &str) -> i64 {
    let (status, body) = post(
        ctx,
        Some(token),
        "/api/addresses",
        serde_json::json!({
            "address": "12 Allen Avenue",
            "city": "Ikeja",
            "state": "Lagos",
            "postal_code": "100271",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "address creation failed: {body}");
    body["data"]["address"]["id"].as_i64().expect("address id missing")
}

/// Fills the cart to a ₦5000 total (2 × ₦2500) and initializes an order, returning the order
/// number.
pub async fn checkout_ready(ctx: &TestContext, token: &str) -> String {
    ctx.seed_catalog().await;
    let (status, body) = post(
        ctx,
        Some(token),
        "/api/cart/items",
        serde_json::json!({ "product_id": "air-strider", "variant_id": "us-9", "quantity": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "add-to-cart failed: {body}");
    let address_id = create_address(ctx, token).await;
    let (status, body) = post(
        ctx,
        Some(token),
        "/api/orders/initialize",
        serde_json::json!({ "address_id": address_id, "delivery_mode": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "order initialization failed: {body}");
    body["data"]["order"]["order_number"].as_str().expect("order number missing").to_string()
}
