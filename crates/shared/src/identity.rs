//! Identity token verification.
//!
//! Authentication is delegated to an external identity provider. The backend
//! only verifies the tokens it issues: RS256 against the provider's public
//! key in production, HS256 with a shared secret for local development.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for identity token operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Claims carried by identity-provider tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Subject (provider user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Application role assigned by the provider (e.g. "admin").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Signing algorithm accepted by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAlgorithm {
    Rs256,
    Hs256,
}

impl std::str::FromStr for TokenAlgorithm {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RS256" => Ok(TokenAlgorithm::Rs256),
            "HS256" => Ok(TokenAlgorithm::Hs256),
            other => Err(IdentityError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl From<TokenAlgorithm> for Algorithm {
    fn from(algorithm: TokenAlgorithm) -> Self {
        match algorithm {
            TokenAlgorithm::Rs256 => Algorithm::RS256,
            TokenAlgorithm::Hs256 => Algorithm::HS256,
        }
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Verifies identity tokens issued by the external provider.
#[derive(Clone)]
pub struct IdentityVerifier {
    decoding_key: DecodingKey,
    algorithm: TokenAlgorithm,
    leeway_secs: u64,
    issuer: Option<String>,
    audience: Option<String>,
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("algorithm", &self.algorithm)
            .field("leeway_secs", &self.leeway_secs)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl IdentityVerifier {
    /// Creates a verifier for RS256 tokens from the provider's PEM public key.
    pub fn from_rsa_pem(public_key_pem: &str) -> Result<Self, IdentityError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| IdentityError::InvalidKey(format!("Invalid public key: {}", e)))?;
        Ok(Self::with_key(decoding_key, TokenAlgorithm::Rs256))
    }

    /// Creates a verifier for HS256 tokens signed with a shared secret.
    pub fn from_secret(secret: &str) -> Result<Self, IdentityError> {
        if secret.is_empty() {
            return Err(IdentityError::InvalidKey(
                "Shared secret must not be empty".to_string(),
            ));
        }
        Ok(Self::with_key(
            DecodingKey::from_secret(secret.as_bytes()),
            TokenAlgorithm::Hs256,
        ))
    }

    fn with_key(decoding_key: DecodingKey, algorithm: TokenAlgorithm) -> Self {
        Self {
            decoding_key,
            algorithm,
            leeway_secs: DEFAULT_LEEWAY_SECS,
            issuer: None,
            audience: None,
        }
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn algorithm(&self) -> TokenAlgorithm {
        self.algorithm
    }

    /// Validates a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, IdentityError> {
        let mut validation = Validation::new(self.algorithm.into());
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        match &self.audience {
            Some(audience) => validation.set_audience(&[audience.as_str()]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        let token_data = decode::<IdentityClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidIssuer
                | jsonwebtoken::errors::ErrorKind::InvalidAudience => IdentityError::InvalidToken,
                _ => IdentityError::DecodingError(e.to_string()),
            })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(IdentityError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

/// Signs claims with a shared secret using HS256.
///
/// Mirrors what a development identity provider hands out; production tokens
/// are minted by the provider itself.
pub fn sign_with_secret(claims: &IdentityClaims, secret: &str) -> Result<String, IdentityError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| IdentityError::EncodingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    const SECRET: &str = "test_secret_key_for_identity_testing_12345";

    fn claims(expires_in: Duration) -> IdentityClaims {
        let now = Utc::now();
        IdentityClaims {
            sub: "user-123".to_string(),
            exp: (now + expires_in).timestamp(),
            iat: Some(now.timestamp()),
            name: Some("Ana".to_string()),
            email: None,
            role: None,
        }
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = IdentityVerifier::from_secret(SECRET).unwrap();
        let token = sign_with_secret(&claims(Duration::minutes(5)), SECRET).unwrap();
        let decoded = verifier.verify(&token).unwrap();
        assert_eq!(decoded.sub, "user-123");
        assert_eq!(decoded.name.as_deref(), Some("Ana"));
        assert!(decoded.role.is_none());
    }

    #[test]
    fn test_expired_token() {
        let verifier = IdentityVerifier::from_secret(SECRET).unwrap().with_leeway(0);
        let token = sign_with_secret(&claims(Duration::minutes(-10)), SECRET).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(IdentityError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let verifier = IdentityVerifier::from_secret("another-secret").unwrap();
        let token = sign_with_secret(&claims(Duration::minutes(5)), SECRET).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(IdentityError::InvalidToken)
        ));
    }

    #[test]
    fn test_malformed_token() {
        let verifier = IdentityVerifier::from_secret(SECRET).unwrap();
        assert!(verifier.verify("not_a_jwt").is_err());
    }

    #[test]
    fn test_empty_subject_rejected() {
        let verifier = IdentityVerifier::from_secret(SECRET).unwrap();
        let mut c = claims(Duration::minutes(5));
        c.sub = " ".to_string();
        let token = sign_with_secret(&c, SECRET).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(IdentityError::InvalidToken)
        ));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            IdentityVerifier::from_secret(""),
            Err(IdentityError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("rs256".parse::<TokenAlgorithm>().unwrap(), TokenAlgorithm::Rs256);
        assert_eq!("HS256".parse::<TokenAlgorithm>().unwrap(), TokenAlgorithm::Hs256);
        assert!("none".parse::<TokenAlgorithm>().is_err());
    }

    #[test]
    fn test_invalid_rsa_key() {
        assert!(matches!(
            IdentityVerifier::from_rsa_pem("not a pem"),
            Err(IdentityError::InvalidKey(_))
        ));
    }
}
