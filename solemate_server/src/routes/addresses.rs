use actix_web::{get, post, web, HttpResponse};
use log::*;
use serde_json::json;
use solemate_engine::{db_types::NewAddress, AddressBookApi, SqliteDatabase};

use crate::{auth::JwtClaims, errors::ServerError};

#[post("/addresses")]
pub async fn create_address(
    claims: JwtClaims,
    api: web::Data<AddressBookApi<SqliteDatabase>>,
    body: web::Json<NewAddress>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new address for user {}", claims.sub);
    let address = api.create_address(&claims.sub, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "success", "data": { "address": address } })))
}

#[get("/addresses")]
pub async fn my_addresses(
    claims: JwtClaims,
    api: web::Data<AddressBookApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let addresses = api.list_addresses(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "results": addresses.len(),
        "data": { "addresses": addresses },
    })))
}

#[get("/addresses/{id}")]
pub async fn address_by_id(
    claims: JwtClaims,
    api: web::Data<AddressBookApi<SqliteDatabase>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError> {
    let address = api.find_address(path.into_inner(), &claims.sub).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": { "address": address } })))
}
