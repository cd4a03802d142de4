use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::Error};

use crate::models::Claims;

/// Checks signature and expiry of a token issued by the identity service.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}
