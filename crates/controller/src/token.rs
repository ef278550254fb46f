//! Access token issuing and verification
//!
//! Tokens are HS256 signed JWTs which carry the user id and expire a
//! fixed 30 minutes after they were issued.
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use db_storage::users::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of issued access tokens
const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 30;

/// Why a presented access token was rejected
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("malformed JWT ({0})")]
    InvalidJwt(String),
    #[error("the JWT claims are invalid")]
    InvalidClaims,
    #[error("the JWT expired ({0})")]
    Expired(String),
    #[error("the JWT signature does not match")]
    InvalidSignature,
}

/// Claims carried by every access token issued by this service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (the user's email)
    pub sub: String,
    /// Id of the user the token was issued for
    pub user_id: UserId,
    /// Role of the user, currently always `user`
    pub role: String,
    /// Expiry timestamp, serialized as unix seconds
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

/// Issues and verifies the access tokens of this service
///
/// Both keys are derived from the same shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Create a signed access token for the given user
    pub fn issue(&self, sub: &str, user_id: UserId) -> Result<String> {
        let exp = Utc::now() + Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES);

        self.sign(AccessTokenClaims {
            sub: sub.into(),
            user_id,
            role: "user".into(),
            exp,
        })
    }

    fn sign(&self, claims: AccessTokenClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign access token")
    }

    /// Checks signature and claims of a raw JWT and returns its claims
    ///
    /// The expiry is validated manually so an expired token maps to
    /// [`VerifyError::Expired`] instead of a generic validation error.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, VerifyError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // checked manually below
        validation.validate_exp = false;

        let token =
            decode::<AccessTokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                log::warn!("Rejecting access token, {}", e);

                match e.kind() {
                    ErrorKind::InvalidSignature => VerifyError::InvalidSignature,
                    ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                        VerifyError::InvalidClaims
                    }
                    _ => VerifyError::InvalidJwt(e.to_string()),
                }
            })?;

        if Utc::now() > token.claims.exp {
            let msg = format!("token expired at {}", token.claims.exp);
            log::warn!("{}", msg);
            return Err(VerifyError::Expired(msg));
        }

        Ok(token.claims)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn issue_and_verify_roundtrip() {
        let service = TokenService::new("cloud9");

        let token = service.issue("alice@example.org", UserId::from(7)).unwrap();

        let claims = service
            .verify(&token)
            .expect("Freshly issued token failed to verify");

        assert_eq!(claims.sub, "alice@example.org");
        assert_eq!(claims.user_id, UserId::from(7));
        assert_eq!(claims.role, "user");
        assert!(claims.exp > Utc::now());
    }

    #[test]
    fn expired_token() {
        let service = TokenService::new("cloud9");

        let token = service
            .sign(AccessTokenClaims {
                sub: "alice@example.org".into(),
                user_id: UserId::from(7),
                role: "user".into(),
                exp: Utc::now() - Duration::minutes(5),
            })
            .unwrap();

        let err = service.verify(&token).unwrap_err();

        assert!(matches!(err, VerifyError::Expired(_)), "got {:?}", err);
    }

    #[test]
    fn bad_signature() {
        let service = TokenService::new("cloud9");
        let other = TokenService::new("definitely-not-cloud9");

        let token = service.issue("alice@example.org", UserId::from(7)).unwrap();

        assert_eq!(other.verify(&token).unwrap_err(), VerifyError::InvalidSignature);
    }
}
