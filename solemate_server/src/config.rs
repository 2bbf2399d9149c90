use std::env;

use log::*;
use payment_gateways::GatewayConfig;
use rand::{distributions::Alphanumeric, Rng};
use sm_common::Secret;

use crate::errors::ServerError;

const DEFAULT_SOLEMATE_HOST: &str = "127.0.0.1";
const DEFAULT_SOLEMATE_PORT: u16 = 8480;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Connection details for the two payment providers.
    pub gateways: GatewayConfig,
    /// Transactional mail relay used for order confirmations.
    pub mailer: MailerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SOLEMATE_HOST.to_string(),
            port: DEFAULT_SOLEMATE_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            gateways: GatewayConfig::default(),
            mailer: MailerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SOLEMATE_HOST").ok().unwrap_or_else(|| DEFAULT_SOLEMATE_HOST.into());
        let port = env::var("SOLEMATE_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SOLEMATE_PORT. {e} Using the default, \
                         {DEFAULT_SOLEMATE_PORT}, instead."
                    );
                    DEFAULT_SOLEMATE_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SOLEMATE_PORT);
        let database_url = env::var("SOLEMATE_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SOLEMATE_DATABASE_URL is not set. Please set it to the URL for the store database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let gateways = GatewayConfig::from_env_or_default();
        let mailer = MailerConfig::from_env_or_default();
        Self { host, port, database_url, auth, gateways, mailer }
    }
}

//-------------------------------------------------  AuthConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 secret used to verify (and, for tooling and tests, issue) bearer tokens.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ SOLEMATE_JWT_SECRET has not been set. I'm using a random value for this session. Tokens will \
             not survive a restart, and every running instance must share the same secret. DO NOT operate on \
             production like this. 🚨️🚨️🚨️"
        );
        let secret: String = rand::thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("SOLEMATE_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [SOLEMATE_JWT_SECRET]")))?;
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "SOLEMATE_JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}

//-------------------------------------------------  MailerConfig  ----------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct MailerConfig {
    /// Base URL of the HTTP mail relay, e.g. "https://api.mailrelay.example/v1".
    pub api_url: String,
    pub api_key: Secret<String>,
    /// From address on confirmation mails.
    pub sender: String,
}

impl MailerConfig {
    pub fn from_env_or_default() -> Self {
        let api_url = env::var("SOLEMATE_MAIL_API_URL").unwrap_or_else(|_| {
            warn!("🪛️ SOLEMATE_MAIL_API_URL is not set. Order confirmation mails will not be delivered.");
            String::default()
        });
        let api_key = Secret::new(env::var("SOLEMATE_MAIL_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ SOLEMATE_MAIL_API_KEY is not set. Order confirmation mails will not be delivered.");
            String::default()
        }));
        let sender = env::var("SOLEMATE_MAIL_SENDER").unwrap_or_else(|_| {
            warn!("🪛️ SOLEMATE_MAIL_SENDER is not set. Using a placeholder sender address.");
            "orders@solemate.example".to_string()
        });
        Self { api_url, api_key, sender }
    }
}
