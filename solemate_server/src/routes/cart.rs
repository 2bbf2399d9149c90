use actix_web::{delete, get, patch, post, web, HttpResponse};
use log::*;
use serde_json::json;
use solemate_engine::{db_types::Cart, CartApi, SqliteDatabase};

use crate::{
    auth::JwtClaims,
    data_objects::{AddItemRequest, CartItemSelector},
    errors::ServerError,
};

fn cart_payload(cart: &Cart) -> serde_json::Value {
    json!({ "length": cart.len(), "cart": cart })
}

#[post("/cart/items")]
pub async fn add_to_cart(
    claims: JwtClaims,
    api: web::Data<CartApi<SqliteDatabase>>,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST add {}/{} to cart for user {}", body.product_id, body.variant_id, claims.sub);
    let cart = api.add_item(&claims.sub, &body.product_id, &body.variant_id, body.quantity).await?;
    let added = cart
        .items
        .iter()
        .find(|i| i.product_id == body.product_id && i.variant_id == body.variant_id)
        .map(|i| format!("{} (Size: {})", i.product_name, i.size))
        .unwrap_or_else(|| body.product_id.clone());
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("{added} added to cart successfully"),
        "data": cart_payload(&cart),
    })))
}

#[get("/cart")]
pub async fn get_cart(
    claims: JwtClaims,
    api: web::Data<CartApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    match api.get_cart(&claims.sub).await? {
        Some(cart) => Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": cart_payload(&cart) }))),
        None => Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": "Cart is empty",
            "data": { "length": 0, "cart": { "items": [], "total": 0 } },
        }))),
    }
}

#[patch("/cart/items/increase")]
pub async fn increase_item_qty(
    claims: JwtClaims,
    api: web::Data<CartApi<SqliteDatabase>>,
    body: web::Json<CartItemSelector>,
) -> Result<HttpResponse, ServerError> {
    let cart = api.increase_quantity(&claims.sub, &body.product_id, &body.variant_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": cart_payload(&cart) })))
}

#[patch("/cart/items/decrease")]
pub async fn decrease_item_qty(
    claims: JwtClaims,
    api: web::Data<CartApi<SqliteDatabase>>,
    body: web::Json<CartItemSelector>,
) -> Result<HttpResponse, ServerError> {
    let cart = api.decrease_quantity(&claims.sub, &body.product_id, &body.variant_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": cart_payload(&cart) })))
}

#[delete("/cart/items")]
pub async fn remove_item_from_cart(
    claims: JwtClaims,
    api: web::Data<CartApi<SqliteDatabase>>,
    body: web::Json<CartItemSelector>,
) -> Result<HttpResponse, ServerError> {
    let cart = api.remove_item(&claims.sub, &body.product_id, &body.variant_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": cart_payload(&cart) })))
}

#[delete("/cart")]
pub async fn clear_cart(
    claims: JwtClaims,
    api: web::Data<CartApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    api.clear_cart(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "message": "Cart cleared" })))
}
