//! Cookie session tokens.
//!
//! Native login issues a signed JWT carried in the session cookie. The token
//! embeds everything permission checks need, so authenticated requests do not
//! touch the users table; role changes take effect when the token is reissued.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    api::models::users::{CurrentUser, Role},
    config::Config,
    errors::Error,
    types::UserId,
};

/// Claims embedded in a session token.
///
/// `sub` is the user id; `exp`/`iat` are unix timestamps. Expiry comes from
/// `auth.security.jwt_expiry`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,
    pub email: String,
    pub username: String,
    pub roles: Vec<Role>,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    fn issue(user: &CurrentUser, config: &Config) -> Self {
        let now = Utc::now();

        Self {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            roles: user.roles.clone(),
            is_admin: user.is_admin,
            exp: (now + config.auth.security.jwt_expiry).timestamp(),
            iat: now.timestamp(),
        }
    }
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            username: claims.username,
            roles: claims.roles,
            is_admin: claims.is_admin,
            // Display name is not part of the claims
            display_name: None,
        }
    }
}

fn signing_secret(config: &Config) -> Result<&str, Error> {
    config.secret_key.as_deref().ok_or_else(|| Error::Internal {
        operation: "issue session token: secret_key is not configured".to_string(),
    })
}

/// Sign a session token for the user
pub fn create_session_token(user: &CurrentUser, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::issue(user, config);
    let key = EncodingKey::from_secret(signing_secret(config)?.as_bytes());

    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("sign session token: {e}"),
    })
}

/// Verify a session token and recover the user it was issued to.
///
/// Anything wrong with the presented token (bad signature, expired, not a
/// JWT at all) is an authentication failure; only key or codec trouble on
/// our side surfaces as an internal error.
pub fn verify_session_token(token: &str, config: &Config) -> Result<CurrentUser, Error> {
    let key = DecodingKey::from_secret(signing_secret(config)?.as_bytes());

    let token_data = decode::<SessionClaims>(token, &key, &Validation::default()).map_err(|e| {
        use jsonwebtoken::errors::ErrorKind::*;
        match e.kind() {
            InvalidToken | InvalidSignature | ExpiredSignature | ImmatureSignature | MissingRequiredClaim(_)
            | Base64(_) | InvalidAlgorithm => Error::Unauthenticated { message: None },
            _ => Error::Internal {
                operation: format!("verify session token: {e}"),
            },
        }
    })?;

    Ok(CurrentUser::from(token_data.claims))
}
