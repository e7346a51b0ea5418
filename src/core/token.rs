use crate::utils::error::TokenError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of every issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 identity tokens with a single process-wide secret.
///
/// The secret is fixed at construction; there is no runtime rotation and no
/// revocation list.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    pub fn issue(&self, identity: &str) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            username: identity.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// 驗證成功回傳 token 內的使用者名稱
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        // exp 由下方自行比較，才能用呼叫端給的時間且不套用 leeway
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                // 其他 HMAC 演算法簽的 token 視同簽章不符
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if now.timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-signing-secret";

    #[test]
    fn test_issued_token_verifies_immediately() {
        let service = TokenService::new(SECRET);
        let token = service.issue("admin").unwrap();

        assert_eq!(service.verify(&token).unwrap(), "admin");
    }

    #[test]
    fn test_token_expires_after_24_hours() {
        let service = TokenService::new(SECRET);
        let issued_at = Utc::now();
        let token = service.issue_at("admin", issued_at).unwrap();
        let expires_at = issued_at + Duration::hours(TOKEN_TTL_HOURS);

        assert_eq!(service.verify_at(&token, expires_at).unwrap(), "admin");
        assert_eq!(
            service.verify_at(&token, expires_at + Duration::seconds(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_token_issued_yesterday_is_expired_now() {
        let service = TokenService::new(SECRET);
        let token = service
            .issue_at("admin", Utc::now() - Duration::hours(25))
            .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_from_other_secret_has_invalid_signature() {
        let issuer = TokenService::new(b"some-other-secret");
        let verifier = TokenService::new(SECRET);
        let token = issuer.issue("admin").unwrap();

        assert_eq!(verifier.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_token_signed_with_other_algorithm_has_invalid_signature() {
        let claims = Claims {
            username: "admin".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(
            TokenService::new(SECRET).verify(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let service = TokenService::new(SECRET);

        assert_eq!(service.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(service.verify(""), Err(TokenError::Malformed));
        assert_eq!(service.verify("a.b.c"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_claims_carry_issue_and_expiry() {
        let service = TokenService::new(SECRET);
        let now = Utc::now();
        let token = service.issue_at("alice", now).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<Claims>(&token, &DecodingKey::from_secret(SECRET), &validation)
            .unwrap()
            .claims;

        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }
}
