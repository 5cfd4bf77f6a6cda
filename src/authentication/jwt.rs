use chrono::Duration;
use chrono::Local;
use hmac::{Hmac, Mac};
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

use crate::database::schema::User;
use crate::error::Error;
use crate::schema::{UserRole, Uuid};

use super::permissions::ActionType;

/// HMAC-SHA256 key sessions are signed and verified with.
#[derive(Clone)]
pub struct SessionKey {
    key: Hmac<Sha256>,
}

impl SessionKey {
    pub fn new(secret: &[u8]) -> Result<Self, Error> {
        let key = Hmac::new_from_slice(secret)
            .map_err(|e| Error::Config(format!("Invalid session secret: {e}")))?;
        Ok(Self { key })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(id: Uuid, username: String, role: UserRole, lifetime: Duration) -> Self {
        let now = Local::now();
        let iat = now.timestamp();
        let exp = (now + lifetime).timestamp();

        Self {
            user_id: id,
            username,
            role,
            iat,
            exp,
        }
    }
}

/// The caller identity every action takes explicitly.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl SessionData {
    pub fn authenticate(&self, action: ActionType) -> Result<(), Error> {
        if !action.authenticate(self) {
            return Err(Error::Unauthorized(String::from(
                "You don't have permission to perform this action",
            )));
        }
        Ok(())
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<JwtSessionData> for SessionData {
    fn from(value: JwtSessionData) -> Self {
        SessionData {
            user_id: value.user_id,
            username: value.username,
            role: value.role,
        }
    }
}

impl From<&User> for SessionData {
    fn from(value: &User) -> Self {
        SessionData {
            user_id: value.id,
            username: value.username.to_owned(),
            role: value.role.to_owned(),
        }
    }
}

pub fn generate_jwt_session(
    key: &SessionKey,
    user: &User,
    lifetime: Duration,
) -> Result<String, Error> {
    let claims = JwtSessionData::new(
        user.id,
        user.username.to_owned(),
        user.role.to_owned(),
        lifetime,
    );

    claims
        .sign_with_key(&key.key)
        .map_err(|e| Error::InvalidSession(format!("Could not sign token: {e}")))
}

pub fn verify_jwt_session(key: &SessionKey, token: &str) -> Result<SessionData, Error> {
    let session: JwtSessionData = token
        .verify_with_key(&key.key)
        .map_err(|_| Error::InvalidSession(String::from("Invalid token")))?;

    let now = Local::now().timestamp();
    if (session.exp - now).is_negative() {
        return Err(Error::InvalidSession(String::from("Token expired")));
    }

    Ok(session.into())
}
