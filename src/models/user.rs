//! User directory model and token claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// Caller role, as asserted by the external identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Librarian,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Librarian => "librarian",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(Role::Member),
            "librarian" => Some(Role::Librarian),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Librarian | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Directory entry from database. The server never creates or mutates these;
/// account lifecycle belongs to the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Verified claims from an externally-issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User id
    pub sub: i32,
    pub name: String,
    pub role: Role,
    /// Branches a librarian may act on; unused for members and admins
    #[serde(default)]
    pub library_ids: Vec<i32>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a JWT token (used by tests and tooling; issuance is normally
    /// the identity provider's job)
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    // Authorization checks

    /// Librarian or admin
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Staff role required".to_string()))
        }
    }

    /// Admin only
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin role required".to_string()))
        }
    }

    /// Staff action on a specific branch: admins are unscoped, librarians
    /// must have the branch in their scope set
    pub fn require_library_scope(&self, library_id: i32) -> Result<(), AppError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::Librarian if self.library_ids.contains(&library_id) => Ok(()),
            Role::Librarian => Err(AppError::Forbidden(format!(
                "Library {} is outside your assigned scope",
                library_id
            ))),
            Role::Member => Err(AppError::Forbidden("Staff role required".to_string())),
        }
    }

    /// The caller themselves, or staff scoped to the branch when given
    pub fn require_self_or_scope(
        &self,
        user_id: i32,
        library_id: Option<i32>,
    ) -> Result<(), AppError> {
        if self.sub == user_id {
            return Ok(());
        }
        match library_id {
            Some(id) => self.require_library_scope(id),
            None => self.require_staff(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, library_ids: Vec<i32>) -> UserClaims {
        UserClaims {
            sub: 7,
            name: "Test".to_string(),
            role,
            library_ids,
            exp: 4102444800,
            iat: 0,
        }
    }

    #[test]
    fn admin_is_unscoped() {
        assert!(claims(Role::Admin, vec![]).require_library_scope(3).is_ok());
    }

    #[test]
    fn librarian_scope_is_enforced() {
        let c = claims(Role::Librarian, vec![1, 2]);
        assert!(c.require_library_scope(2).is_ok());
        assert!(matches!(
            c.require_library_scope(3),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn member_is_never_staff() {
        let c = claims(Role::Member, vec![1]);
        assert!(c.require_staff().is_err());
        assert!(c.require_library_scope(1).is_err());
        assert!(c.require_self_or_scope(7, None).is_ok());
        assert!(c.require_self_or_scope(8, None).is_err());
    }

    #[test]
    fn token_roundtrip() {
        let c = claims(Role::Librarian, vec![4]);
        let token = c.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.sub, 7);
        assert_eq!(parsed.role, Role::Librarian);
        assert_eq!(parsed.library_ids, vec![4]);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }
}
