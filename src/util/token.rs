use crate::core::Error;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ========================// Claims //======================== //

/// The Claims of JWT token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub user_id: i64,
    pub email: String,
    pub exp: i64,
}

impl Claims {
    /// Create a new Claims for a user with the given expiration
    pub fn new(user_id: i64, email: &str, duration: Duration) -> Self {
        let exp = Utc::now() + duration;
        Self {
            id: Uuid::new_v4(),
            user_id,
            email: email.to_owned(),
            exp: exp.timestamp(),
        }
    }
}

// ========================// JwtToken //======================== //

/// Creates and verifies JWT tokens with a shared secret
pub struct JwtToken {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtToken {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn create(&self, claims: &Claims) -> Result<String, Error> {
        encode(&Header::default(), claims, &self.encoding).map_err(|_| Error::TokenCreation)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let token_data =
            decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
                match e.into_kind() {
                    ErrorKind::ExpiredSignature => Error::ExpiredToken,
                    _ => Error::Unauthorized,
                }
            })?;
        Ok(token_data.claims)
    }
}

// ============================== // tests // ============================== //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::common;

    fn new_jwt() -> JwtToken {
        JwtToken::new(&common::random_string(32))
    }

    #[test]
    fn verify_token() {
        let jwt = new_jwt();

        let claims1 = Claims::new(120, "john@example.com", Duration::minutes(10));
        let token = jwt.create(&claims1).expect("failed to create token");

        let claims2 = jwt.verify(&token).expect("failed to decode token");

        assert_eq!(claims1.id, claims2.id);
        assert_eq!(claims1.user_id, claims2.user_id);
        assert_eq!(claims1.email, claims2.email);
        assert_eq!(claims1.exp, claims2.exp);
    }

    #[test]
    fn expired_token() {
        let jwt = new_jwt();

        let claims1 = Claims::new(120, "john@example.com", Duration::seconds(-61));
        let token = jwt.create(&claims1).expect("failed to create token");

        let res = jwt.verify(&token);

        assert!(res.is_err());
        assert_eq!(
            res.err().unwrap().to_string(),
            Error::ExpiredToken.to_string()
        );
    }

    #[test]
    fn invalid_token() {
        let jwt = new_jwt();

        let claims1 = Claims::new(120, "john@example.com", Duration::minutes(10));
        let mut token = jwt.create(&claims1).expect("failed to create token");

        let start = token.len() - 3;
        token.replace_range(start.., "098");

        let res = jwt.verify(&token);
        assert!(res.is_err());
        assert_eq!(
            res.err().unwrap().to_string(),
            Error::Unauthorized.to_string()
        );
    }
}
