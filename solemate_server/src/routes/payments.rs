use actix_web::{get, post, web, HttpResponse};
use log::*;
use payment_gateways::PaymentMethod;
use serde_json::json;
use sm_common::Naira;
use solemate_engine::{db_types::OrderId, OrderFlowApi, SqliteDatabase};

use crate::{
    auth::JwtClaims,
    data_objects::{InitializePaymentRequest, VerifyPaymentParams},
    errors::ServerError,
};

/// Step 2 of checkout: start a remote charge with the selected provider. The claimed amount
/// is cross-checked against the caller's live cart total before any provider call is made.
#[post("/payments/initialize")]
pub async fn initialize_payment(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<SqliteDatabase>>,
    body: web::Json<InitializePaymentRequest>,
) -> Result<HttpResponse, ServerError> {
    let method = PaymentMethod::from_code(body.method).map_err(|e| ServerError::ValidationError(e.to_string()))?;
    debug!("💻️ POST initialize payment ({method}) for order {} by user {}", body.order_id, claims.sub);
    let user = claims.user_info();
    let result = api
        .initialize_payment(&user, &OrderId(body.order_id.clone()), Naira::from(body.amount), method, &body.email)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "data": {
            "accessData": result.access_data,
            "paymentId": result.payment_id,
            "reference": result.reference,
            "method": result.method.code(),
        },
    })))
}

/// Step 3 of checkout: ask the provider for the charge's ground truth and reconcile local
/// state with it. This endpoint serves both the browser redirect and the provider callback,
/// and is safe to repeat: a second confirmation of the same charge is a no-op.
#[get("/payments/verify")]
pub async fn verify_payment(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<SqliteDatabase>>,
    query: web::Query<VerifyPaymentParams>,
) -> Result<HttpResponse, ServerError> {
    let method =
        query.method.parse::<PaymentMethod>().map_err(|e| ServerError::ValidationError(e.to_string()))?;
    debug!("💻️ GET verify payment {} ({method}) requested by user {}", query.reference, claims.sub);
    let verified = api.verify_payment(method, &query.reference).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payment verified and order updated",
        "data": { "payment": verified.payment, "order": verified.order, "providerResponse": verified.outcome },
    })))
}
