//! Request handler definitions
//!
//! Handlers stay thin: extract the verified caller identity, hand the request to the engine
//! API, translate the result into the `{status, message?, data}` envelope. Anything that
//! blocks (database, provider calls) is awaited, never performed synchronously, so worker
//! threads keep serving other requests.
use actix_web::{get, HttpResponse, Responder};
use log::trace;

pub mod addresses;
pub mod cart;
pub mod orders;
pub mod payments;

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}
