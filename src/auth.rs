use crate::error::{AppError, AppResult};
use crate::models::Role;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actions guarded by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Create, edit or delete purchases and sells
    ManageLedger,
    /// Write products, brands, categories and firms
    ManageCatalog,
    /// Create users
    ManageUsers,
}

impl Role {
    /// Whether this role may perform `permission`
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::ManageLedger => matches!(self, Role::Admin | Role::Staff | Role::User),
            Permission::ManageCatalog => matches!(self, Role::Admin | Role::Staff),
            Permission::ManageUsers => matches!(self, Role::Admin),
        }
    }
}

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
}

impl Session {
    /// Fail with `Forbidden` unless the session's role grants `permission`
    pub fn require(&self, permission: Permission) -> AppResult<()> {
        if self.role.allows(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role {} may not perform {:?}",
                self.role.as_str(),
                permission
            )))
        }
    }
}

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies session tokens (HS256 JWTs)
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl SessionKeys {
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token valid for `ttl_secs` from `issued_at` (unix seconds)
    pub fn issue(&self, user_id: Uuid, role: Role, issued_at: i64) -> AppResult<String> {
        let claims = Claims {
            sub: user_id,
            role,
            iat: issued_at,
            exp: issued_at + self.ttl_secs,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify a token's signature and expiry against the system clock
    pub fn verify(&self, token: &str) -> AppResult<Session> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            AppError::Unauthorized(match e.kind() {
                ErrorKind::ExpiredSignature => "Session expired".to_string(),
                _ => format!("Invalid session token: {}", e),
            })
        })?;

        Ok(Session {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(header: &str) -> AppResult<&str> {
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .unwrap_or_default();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Missing bearer token".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn keys() -> SessionKeys {
        SessionKeys::new("secret", 3600)
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    #[test]
    fn test_issue_and_verify() {
        let user_id = Uuid::new_v4();
        let token = keys().issue(user_id, Role::Staff, now()).unwrap();

        let session = keys().verify(&token).unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.role, Role::Staff);
    }

    #[test]
    fn test_expired_token() {
        let token = keys()
            .issue(Uuid::new_v4(), Role::User, now() - 3601)
            .unwrap();
        let err = keys().verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Session expired"));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = keys().issue(Uuid::new_v4(), Role::User, now()).unwrap();
        let admin = keys().issue(Uuid::new_v4(), Role::Admin, now()).unwrap();

        // Admin claims spliced under the user token's signature
        let user_parts: Vec<&str> = token.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);
        assert!(keys().verify(&forged).is_err());
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = SessionKeys::new("other", 3600)
            .issue(Uuid::new_v4(), Role::Admin, now())
            .unwrap();
        assert!(matches!(
            keys().verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(keys().verify("not-a-token").is_err());
    }

    #[test]
    fn test_permissions() {
        assert!(Role::User.allows(Permission::ManageLedger));
        assert!(!Role::Coordinator.allows(Permission::ManageLedger));
        assert!(!Role::User.allows(Permission::ManageCatalog));
        assert!(Role::Staff.allows(Permission::ManageCatalog));
        assert!(!Role::Staff.allows(Permission::ManageUsers));

        let session = Session {
            user_id: Uuid::new_v4(),
            role: Role::Coordinator,
        };
        assert!(matches!(
            session.require(Permission::ManageLedger),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc").unwrap(), "abc");
        assert!(extract_bearer_token("Basic abc").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
    }
}
