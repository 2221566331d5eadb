use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TOKEN_DURATION_SECS: i64 = 24 * 3600; // 24 hours

/// JWT Claims stored in the token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

/// JWT service for creating and verifying tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Mint a token for a user id. The identity collaborator issues
    /// tokens in production; this mirrors its shape for dev tooling.
    pub fn create_token(&self, user_id: Uuid) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(TOKEN_DURATION_SECS);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a token. Returns claims if valid and not expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

/// Extract the bearer token from an Authorization header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new("test-secret-key", "cluetrail".to_string())
    }

    #[test]
    fn roundtrip_token() {
        let svc = test_service();
        let user = Uuid::new_v4();
        let token = svc.create_token(user).unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.to_string());
        assert_eq!(claims.iss, "cluetrail");
    }

    #[test]
    fn rejects_invalid_token() {
        let svc = test_service();
        assert!(svc.verify_token("garbage").is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let svc1 = JwtService::new("secret-a", "cluetrail".to_string());
        let svc2 = JwtService::new("secret-b", "cluetrail".to_string());
        let token = svc1.create_token(Uuid::new_v4()).unwrap();
        assert!(svc2.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_wrong_issuer() {
        let svc1 = JwtService::new("secret", "cluetrail".to_string());
        let svc2 = JwtService::new("secret", "someone-else".to_string());
        let token = svc1.create_token(Uuid::new_v4()).unwrap();
        assert!(svc2.verify_token(&token).is_err());
    }

    #[test]
    fn token_expiry_is_24h() {
        let svc = test_service();
        let token = svc.create_token(Uuid::new_v4()).unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn parse_bearer_header() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("Bearer   abc123"), Some("abc123"));
        assert_eq!(bearer_token("Basic abc123"), None);
        assert_eq!(bearer_token("abc123"), None);
    }
}
