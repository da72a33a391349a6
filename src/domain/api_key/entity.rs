//! API Key entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ApiKeyValidationError;

/// Permission granted to an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// List and fetch estate records
    Read,
    /// Create, replace and delete estate records
    Write,
    /// Manage API keys under `/admin`
    Admin,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Permission {
    type Err = ApiKeyValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "admin" => Ok(Self::Admin),
            other => Err(ApiKeyValidationError::UnknownPermission(other.to_string())),
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// API Key entity
///
/// Only a hash of the key is kept; the plain key is handed out once at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKey {
    id: Uuid,
    /// Leading characters of the plain key, for display
    key_prefix: String,
    /// `sha256$<base64url digest>` of the plain key
    key_hash: String,
    user_id: String,
    permissions: Vec<Permission>,
    is_active: bool,
    /// None = never expires
    expires_at: Option<DateTime<Utc>>,
    last_used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Create a new active key with read permission and no expiry
    pub fn new(
        key_prefix: impl Into<String>,
        key_hash: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            key_prefix: key_prefix.into(),
            key_hash: key_hash.into(),
            user_id: user_id.into(),
            permissions: vec![Permission::Read],
            is_active: true,
            expires_at: None,
            last_used_at: None,
            created_at: Utc::now(),
        }
    }

    /// Set permissions (duplicates are dropped, order kept)
    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        let mut unique = Vec::new();

        for permission in permissions {
            if !unique.contains(&permission) {
                unique.push(permission);
            }
        }

        self.permissions = unique;
        self
    }

    /// Set expiration
    pub fn with_expiration(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    // Restorers used when loading from storage

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn with_last_used_at(mut self, last_used_at: Option<DateTime<Utc>>) -> Self {
        self.last_used_at = last_used_at;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    // Getters

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn key_hash(&self) -> &str {
        &self.key_hash
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // Status checks

    /// Usable while active and either without expiry or expiring after `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    /// Check if the key is currently valid and usable
    pub fn is_valid(&self) -> bool {
        self.is_usable_at(Utc::now())
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    // Mutators

    /// Record key usage
    pub fn record_usage(&mut self) {
        self.last_used_at = Some(Utc::now());
    }

    /// Permanently disable the key
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_api_key() -> ApiKey {
        ApiKey::new("ek_abcdefgh", "sha256$hash", "user-1")
    }

    #[test]
    fn test_permission_parsing() {
        assert_eq!("read".parse::<Permission>().unwrap(), Permission::Read);
        assert_eq!(" Admin ".parse::<Permission>().unwrap(), Permission::Admin);
        assert!("delete".parse::<Permission>().is_err());
    }

    #[test]
    fn test_permission_serialization() {
        let json = serde_json::to_string(&vec![Permission::Read, Permission::Write]).unwrap();
        assert_eq!(json, r#"["read","write"]"#);
    }

    #[test]
    fn test_api_key_defaults() {
        let key = create_test_api_key();

        assert!(key.is_active());
        assert!(key.is_valid());
        assert_eq!(key.permissions(), &[Permission::Read]);
        assert!(key.expires_at().is_none());
        assert!(key.last_used_at().is_none());
    }

    #[test]
    fn test_with_permissions_removes_duplicates() {
        let key = create_test_api_key().with_permissions([
            Permission::Write,
            Permission::Read,
            Permission::Write,
        ]);

        assert_eq!(key.permissions(), &[Permission::Write, Permission::Read]);
        assert!(key.has_permission(Permission::Read));
        assert!(!key.has_permission(Permission::Admin));
    }

    #[test]
    fn test_expiry_boundaries() {
        let now = Utc::now();

        let future = create_test_api_key().with_expiration(Some(now + Duration::days(1)));
        assert!(future.is_usable_at(now));

        let past = create_test_api_key().with_expiration(Some(now - Duration::seconds(1)));
        assert!(!past.is_usable_at(now));

        let exactly_now = create_test_api_key().with_expiration(Some(now));
        assert!(!exactly_now.is_usable_at(now));
    }

    #[test]
    fn test_deactivated_key_is_not_usable() {
        let mut key = create_test_api_key();
        key.deactivate();

        assert!(!key.is_active());
        assert!(!key.is_valid());
    }

    #[test]
    fn test_api_key_record_usage() {
        let mut key = create_test_api_key();

        key.record_usage();
        assert!(key.last_used_at().is_some());
    }
}
