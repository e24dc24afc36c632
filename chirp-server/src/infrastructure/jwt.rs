use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::settings::JwtVerification;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("invalid verification key")]
    Key(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

/// Session claims issued by the identity provider. `sub` is the user id.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) exp: i64,
}

/// Verifies session tokens; issuing them is the identity provider's job.
pub(crate) struct JwtService {
    key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtService {
    const LEEWAY_SECONDS: u64 = 10;

    pub(crate) fn new(verification: &JwtVerification) -> Result<Self, JwtError> {
        let (key, algorithm) = match verification {
            JwtVerification::RsaPublicKey(pem) => (
                DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(JwtError::Key)?,
                Algorithm::RS256,
            ),
            JwtVerification::Secret(secret) => {
                (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
        };

        Ok(Self { key, algorithm })
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = Self::LEEWAY_SECONDS;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            decode::<Claims>(token, &self.key, &validation).map_err(JwtError::Decode)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    use super::Claims;

    pub(crate) const TEST_SECRET: &str = "test-secret-test-secret-test-secret!";

    pub(crate) fn issue_token(sub: &str, ttl: Duration) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .expect("token must encode")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::JwtService;
    use super::test_support::{TEST_SECRET, issue_token};
    use crate::infrastructure::settings::JwtVerification;

    fn service(secret: &str) -> JwtService {
        JwtService::new(&JwtVerification::Secret(secret.to_string())).expect("key must load")
    }

    #[test]
    fn verifies_token_and_exposes_subject() {
        let token = issue_token("user_2abc", Duration::minutes(5));
        let claims = service(TEST_SECRET)
            .verify_token(&token)
            .expect("token must verify");
        assert_eq!(claims.sub, "user_2abc");
    }

    #[test]
    fn rejects_expired_token() {
        let token = issue_token("user_2abc", Duration::minutes(-5));
        assert!(service(TEST_SECRET).verify_token(&token).is_err());
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = issue_token("user_2abc", Duration::minutes(5));
        assert!(
            service("another-secret-another-secret-another")
                .verify_token(&token)
                .is_err()
        );
    }

    #[test]
    fn invalid_rsa_pem_fails_to_load() {
        let result = JwtService::new(&JwtVerification::RsaPublicKey("not a pem".to_string()));
        assert!(result.is_err());
    }
}
