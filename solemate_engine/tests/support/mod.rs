//! Shared test harness: a scripted in-memory payment provider pair, a hook that counts
//! confirmation notifications, and a fresh migrated SQLite database per test.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use payment_gateways::{
    ChargeOutcome,
    ChargeRequest,
    ChargeStatus,
    GatewayError,
    GatewayRouter,
    InitializedCharge,
    PaymentMethod,
    PaymentGateway,
};
use sm_common::Naira;
use solemate_engine::{
    db_types::{NewProduct, NewVariant, UserInfo},
    events::{EventHandlers, EventHooks},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::ProductCatalog,
    AddressBookApi,
    CartApi,
    OrderFlowApi,
    SqliteDatabase,
};

/// What the scripted provider will answer for a given reference.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedCharge {
    pub status: ChargeStatus,
    pub amount: Naira,
}

/// Shared state standing in for the remote provider's ledger.
#[derive(Default)]
pub struct ProviderScript {
    charges: Mutex<HashMap<String, ScriptedCharge>>,
    fail_initialization: Mutex<bool>,
    issued: AtomicUsize,
}

impl ProviderScript {
    /// Script the outcome the provider will report for `reference`.
    pub fn report(&self, reference: &str, status: ChargeStatus, amount: i64) {
        self.charges
            .lock()
            .unwrap()
            .insert(reference.to_string(), ScriptedCharge { status, amount: Naira::from(amount) });
    }

    /// Make the next `initialize_charge` calls fail as if the provider rejected them.
    pub fn fail_initialization(&self, fail: bool) {
        *self.fail_initialization.lock().unwrap() = fail;
    }
}

/// A gateway that answers from the script instead of the network.
pub struct ScriptedGateway {
    method: PaymentMethod,
    script: Arc<ProviderScript>,
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    fn method(&self) -> PaymentMethod {
        self.method
    }

    async fn initialize_charge(&self, request: &ChargeRequest) -> Result<InitializedCharge, GatewayError> {
        if *self.script.fail_initialization.lock().unwrap() {
            return Err(GatewayError::Rejected { status: 401, message: "Invalid secret key".to_string() });
        }
        // Paystack issues its own references; Korapay echoes the merchant's.
        let reference = match self.method {
            PaymentMethod::Paystack => format!("PSK{:06}", self.script.issued.fetch_add(1, Ordering::SeqCst)),
            PaymentMethod::Korapay => request.reference.clone(),
        };
        Ok(InitializedCharge {
            provider: self.method,
            reference,
            access: serde_json::json!({ "checkout_url": "https://checkout.test/session" }),
        })
    }

    async fn verify_charge(&self, reference: &str) -> Result<ChargeOutcome, GatewayError> {
        let charges = self.script.charges.lock().unwrap();
        let scripted = charges
            .get(reference)
            .copied()
            .unwrap_or(ScriptedCharge { status: ChargeStatus::Failed, amount: Naira::from(0) });
        Ok(ChargeOutcome {
            provider: self.method,
            reference: reference.to_string(),
            status: scripted.status,
            amount: Some(scripted.amount),
            paid_at: scripted.status.is_success().then(Utc::now),
            raw: serde_json::json!({ "status": scripted.status, "reference": reference }),
        })
    }
}

pub struct TestHarness {
    pub db: SqliteDatabase,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub carts: CartApi<SqliteDatabase>,
    pub addresses: AddressBookApi<SqliteDatabase>,
    pub script: Arc<ProviderScript>,
    pub notifications: Arc<AtomicUsize>,
}

impl TestHarness {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");

        let script = Arc::new(ProviderScript::default());
        let router = GatewayRouter::new(
            Arc::new(ScriptedGateway { method: PaymentMethod::Paystack, script: script.clone() }),
            Arc::new(ScriptedGateway { method: PaymentMethod::Korapay, script: script.clone() }),
        );

        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = notifications.clone();
        let mut hooks = EventHooks::default();
        hooks.on_order_confirmed(move |_ev| {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });
        let handlers = EventHandlers::new(8, hooks);
        let producers = handlers.producers();
        handlers.start_handlers().await;

        let orders = OrderFlowApi::new(db.clone(), router, producers);
        let carts = CartApi::new(db.clone());
        let addresses = AddressBookApi::new(db.clone());
        Self { db, orders, carts, addresses, script, notifications }
    }

    /// Seeds the catalog with one product in two sizes and returns its id.
    pub async fn seed_catalog(&self) -> String {
        let product = NewProduct {
            id: "air-strider".to_string(),
            name: "Air Strider".to_string(),
            variants: vec![
                NewVariant { id: "us-9".to_string(), size: "US 9".to_string(), price: Naira::from(2500), stock: 10 },
                NewVariant { id: "us-10".to_string(), size: "US 10".to_string(), price: Naira::from(1500), stock: 3 },
            ],
        };
        self.db.upsert_product(product).await.expect("Error seeding catalog");
        "air-strider".to_string()
    }

    pub fn shopper(&self) -> UserInfo {
        UserInfo {
            user_id: "user-1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    /// The notification hook runs on a spawned task; give it a moment to drain.
    pub async fn settle(&self) {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    pub fn notifications_sent(&self) -> usize {
        self.notifications.load(Ordering::SeqCst)
    }
}
