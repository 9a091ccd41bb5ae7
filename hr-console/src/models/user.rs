use crate::utils::jwt::JwtClaims;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Identity snapshot of the signed-in account.
///
/// Fields the console does not interpret (email, last_login, ...) are kept
/// in `extra` so the persisted snapshot round-trips what the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Display name: the employee's name when the profile is linked.
    pub fn display_name(&self) -> &str {
        self.employee
            .as_ref()
            .and_then(|e| e.get("name"))
            .and_then(Value::as_str)
            .unwrap_or(&self.username)
    }
}

impl From<&JwtClaims> for User {
    fn from(claims: &JwtClaims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username.clone(),
            role: claims.role,
            employee: None,
            extra: Map::new(),
        }
    }
}

/// Body of `POST /auth/login` on success.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Body of `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user: User,
    #[serde(default)]
    pub employee: Option<Value>,
}

/// Editable subset of the employee profile.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.address.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateOutcome {
    pub message: String,
    #[serde(default)]
    pub updated_fields: Vec<String>,
}
