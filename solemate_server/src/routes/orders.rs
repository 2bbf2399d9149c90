use actix_web::{get, post, web, HttpResponse};
use log::*;
use serde_json::json;
use solemate_engine::{db_types::OrderId, OrderFlowApi, SqliteDatabase};

use crate::{auth::JwtClaims, data_objects::InitializeOrderRequest, errors::ServerError};

/// Step 1 of checkout: create an order from the caller's address and current cart.
#[post("/orders/initialize")]
pub async fn initialize_order(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<SqliteDatabase>>,
    body: web::Json<InitializeOrderRequest>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST initialize order for user {}", claims.sub);
    let user = claims.user_info();
    let order = api.initialize_order(&user, body.address_id, body.delivery_mode).await?;
    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "Order initialized. Awaiting payment.",
        "data": { "order": order },
    })))
}

#[get("/orders")]
pub async fn my_orders(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for user {}", claims.sub);
    let user = claims.user_info();
    let orders = api.orders_for_user(&user).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "results": orders.len(),
        "data": { "orders": orders },
    })))
}

#[get("/orders/{order_number}")]
pub async fn order_by_number(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<SqliteDatabase>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServerError> {
    let order_number = OrderId(path.into_inner());
    debug!("💻️ GET order {order_number} for user {}", claims.sub);
    let user = claims.user_info();
    let order = api.order_by_number(&user, &order_number).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": { "order": order },
    })))
}
