//! Bearer-token authentication.
//!
//! The server trusts a signed HS256 JWT whose claims carry the caller's identity. There is no
//! login endpoint here; tokens are issued by the identity service (and by [`TokenIssuer`] in
//! tests and back-office tooling). Handlers receive the verified identity by taking
//! [`JwtClaims`] as an extractor argument.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use solemate_engine::db_types::UserInfo;

use crate::{config::AuthConfig, errors::ServerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user id.
    pub sub: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Expiry, seconds since the epoch. Validated on decode.
    pub exp: i64,
}

impl JwtClaims {
    pub fn user_info(&self) -> UserInfo {
        UserInfo {
            user_id: self.sub.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Verifies inbound bearer tokens, and signs new ones for tooling and tests.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self { encoding_key: EncodingKey::from_secret(secret), decoding_key: DecodingKey::from_secret(secret) }
    }

    pub fn issue_token(&self, claims: &JwtClaims) -> Result<String, ServerError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ServerError::Unspecified(format!("Could not sign access token. {e}")))
    }

    pub fn decode_token(&self, token: &str) -> Result<JwtClaims, ServerError> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("💻️ Rejected bearer token: {e}");
                ServerError::CouldNotDeserializeAuthToken
            })
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = extract_claims(req);
        ready(claims)
    }
}

fn extract_claims(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::InitializeError("TokenIssuer is not configured".to_string()))?;
    let header = req.headers().get(AUTHORIZATION).ok_or(ServerError::CouldNotDeserializeAuthToken)?;
    let header = header.to_str().map_err(|_| ServerError::CouldNotDeserializeAuthToken)?;
    let token = header.strip_prefix("Bearer ").ok_or(ServerError::CouldNotDeserializeAuthToken)?;
    issuer.decode_token(token)
}

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};
    use sm_common::Secret;

    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig { jwt_secret: Secret::new("0123456789abcdef0123456789abcdef".to_string()) })
    }

    fn claims(expires_in: Duration) -> JwtClaims {
        JwtClaims {
            sub: "user-1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: "ada@example.com".to_string(),
            exp: (Utc::now() + expires_in).timestamp(),
        }
    }

    #[test]
    fn tokens_round_trip() {
        let issuer = issuer();
        let token = issuer.issue_token(&claims(Duration::hours(1))).unwrap();
        let decoded = issuer.decode_token(&token).unwrap();
        assert_eq!(decoded.sub, "user-1");
        assert_eq!(decoded.user_info().email, "ada@example.com");
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issuer = issuer();
        let token = issuer.issue_token(&claims(Duration::hours(-2))).unwrap();
        assert!(issuer.decode_token(&token).is_err());
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let issuer = issuer();
        let mut token = issuer.issue_token(&claims(Duration::hours(1))).unwrap();
        let len = token.len();
        token.replace_range(len - 6..len - 1, "AAAAA");
        assert!(issuer.decode_token(&token).is_err());
    }
}
