use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use payment_gateways::GatewayRouter;
use solemate_engine::{events::EventProducers, AddressBookApi, CartApi, OrderFlowApi, SqliteDatabase};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    integrations::mailer::create_mailer_event_handlers,
    routes::{addresses, cart, health, orders, payments},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateways = GatewayRouter::from_config(&config.gateways)
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_mailer_event_handlers(config.mailer.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, gateways, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateways: GatewayRouter,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let order_flow_api = OrderFlowApi::new(db.clone(), gateways.clone(), producers.clone());
        let cart_api = CartApi::new(db.clone());
        let address_api = AddressBookApi::new(db.clone());
        let token_issuer = TokenIssuer::new(&config.auth);
        // Everything except the health check requires a valid bearer token; the JwtClaims
        // extractor on each handler enforces it.
        let api_scope = web::scope("/api")
            .service(orders::initialize_order)
            .service(orders::my_orders)
            .service(orders::order_by_number)
            .service(payments::initialize_payment)
            .service(payments::verify_payment)
            .service(cart::add_to_cart)
            .service(cart::get_cart)
            .service(cart::increase_item_qty)
            .service(cart::decrease_item_qty)
            .service(cart::remove_item_from_cart)
            .service(cart::clear_cart)
            .service(addresses::create_address)
            .service(addresses::my_addresses)
            .service(addresses::address_by_id);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("solemate::access_log"))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(address_api))
            .app_data(web::Data::new(token_issuer))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
