//! JWT token issuing and verification

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

use crate::domain::DomainError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the user's email)
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        let expires = now + ttl;
        // `exp` has second granularity; a positive TTL rounds up so it never
        // lands on the current second
        let round_up = ttl > Duration::zero() && expires.timestamp_subsec_nanos() > 0;
        let exp = expires.timestamp() + i64::from(round_up);

        Self {
            sub: subject.into(),
            iat: now.timestamp(),
            exp,
        }
    }

    /// A token is expired from its `exp` second onwards
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token has no subject")]
    MissingSubject,

    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Configuration for the token service
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub algorithm: Algorithm,
    pub ttl: Duration,
}

impl Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[hidden]")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenConfig {
    pub fn new(
        secret: impl Into<String>,
        algorithm: &str,
        expire_minutes: i64,
    ) -> Result<Self, DomainError> {
        let secret = secret.into();

        if secret.is_empty() {
            return Err(DomainError::configuration("auth.secret_key must not be empty"));
        }

        Ok(Self {
            secret,
            algorithm: parse_algorithm(algorithm)?,
            ttl: Duration::minutes(expire_minutes),
        })
    }
}

/// Parse a configured algorithm name; only HMAC algorithms are accepted
pub fn parse_algorithm(name: &str) -> Result<Algorithm, DomainError> {
    match name.parse::<Algorithm>() {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(DomainError::configuration(format!(
            "Unsupported JWT algorithm '{}'. Use HS256, HS384 or HS512.",
            name
        ))),
    }
}

/// Issues and verifies signed, time-limited bearer tokens
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Issue a token for `subject`, valid for `ttl` or the configured default
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, TokenError> {
        let claims = Claims::new(subject, ttl.unwrap_or(self.config.ttl));

        Ok(encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Verify a token and return its subject
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })?
            .claims;

        // The library accepts `exp == now`; expiry here is exclusive.
        if claims.is_expired() {
            return Err(TokenError::Expired);
        }

        if claims.sub.is_empty() {
            return Err(TokenError::MissingSubject);
        }

        Ok(claims.sub)
    }

    pub fn default_ttl(&self) -> Duration {
        self.config.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_service(secret: &str) -> TokenService {
        TokenService::new(TokenConfig::new(secret, "HS256", 30).unwrap())
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_service("test-secret");

        let token = service.issue("alice@example.com", None).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(service.verify(&token).unwrap(), "alice@example.com");
    }

    #[test]
    fn test_default_ttl_is_configured_minutes() {
        let service = create_service("test-secret");
        assert_eq!(service.default_ttl(), Duration::minutes(30));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = create_service("secret-one")
            .issue("alice@example.com", None)
            .unwrap();

        let result = create_service("secret-two").verify(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_zero_ttl_is_already_expired() {
        let service = create_service("test-secret");

        let token = service
            .issue("alice@example.com", Some(Duration::zero()))
            .unwrap();
        assert!(matches!(service.verify(&token), Err(TokenError::Expired)));

        let token = service
            .issue("alice@example.com", Some(Duration::minutes(-5)))
            .unwrap();
        assert!(matches!(service.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_sub_second_ttl_is_valid_until_it_elapses() {
        let service = create_service("test-secret");

        let token = service
            .issue("alice@example.com", Some(Duration::milliseconds(500)))
            .unwrap();
        assert_eq!(service.verify(&token).unwrap(), "alice@example.com");

        std::thread::sleep(std::time::Duration::from_millis(2000));
        assert!(matches!(service.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let service = create_service("test-secret");

        let token = service
            .issue("alice@example.com", Some(Duration::seconds(1)))
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));

        assert!(matches!(service.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_malformed_token() {
        let service = create_service("test-secret");

        assert!(service.verify("not-a-token").is_err());
        assert!(service.verify("").is_err());
    }

    #[test]
    fn test_empty_subject_is_rejected() {
        let service = create_service("test-secret");

        let token = service.issue("", None).unwrap();
        assert!(matches!(
            service.verify(&token),
            Err(TokenError::MissingSubject)
        ));
    }

    #[test]
    fn test_algorithm_mismatch_is_rejected() {
        let hs512 = TokenService::new(TokenConfig::new("test-secret", "HS512", 30).unwrap());
        let token = hs512.issue("alice@example.com", None).unwrap();

        assert_eq!(hs512.verify(&token).unwrap(), "alice@example.com");
        assert!(create_service("test-secret").verify(&token).is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(TokenConfig::new("", "HS256", 30).is_err());
        assert!(TokenConfig::new("secret", "RS256", 30).is_err());
        assert!(TokenConfig::new("secret", "nope", 30).is_err());
        assert_eq!(
            TokenConfig::new("secret", "HS384", 30).unwrap().algorithm,
            Algorithm::HS384
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let service = create_service("super-secret-value");
        let debug = format!("{:?}", service);

        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("[hidden]"));
    }
}
