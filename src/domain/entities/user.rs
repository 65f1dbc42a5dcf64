//! User profile entity.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Role granting full administrative access.
pub const SYSTEM_ADMIN_ROLE: &str = "system_admin";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    id: UserId,
    username: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    nickname: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    locale: String,
    #[serde(default)]
    roles: String,
    #[serde(default)]
    delete_at: i64,
}

impl UserProfile {
    #[must_use]
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            nickname: String::new(),
            email: String::new(),
            locale: String::new(),
            roles: String::new(),
            delete_at: 0,
        }
    }

    #[must_use]
    pub fn with_name(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = nickname.into();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    #[must_use]
    pub fn with_roles(mut self, roles: impl Into<String>) -> Self {
        self.roles = roles.into();
        self
    }

    #[must_use]
    pub const fn with_delete_at(mut self, delete_at: i64) -> Self {
        self.delete_at = delete_at;
        self
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    #[must_use]
    pub const fn delete_at(&self) -> i64 {
        self.delete_at
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.delete_at == 0
    }

    /// Returns "First Last", trimmed when either half is missing.
    #[must_use]
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.split_whitespace().any(|r| r == role)
    }

    #[must_use]
    pub fn is_system_admin(&self) -> bool {
        self.has_role(SYSTEM_ADMIN_ROLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_variants() {
        let user = UserProfile::new("u1", "jdoe").with_name("John", "Doe");
        assert_eq!(user.full_name(), "John Doe");

        let first_only = UserProfile::new("u2", "j").with_name("John", "");
        assert_eq!(first_only.full_name(), "John");

        assert_eq!(UserProfile::new("u3", "x").full_name(), "");
    }

    #[test]
    fn test_active_and_roles() {
        let admin = UserProfile::new("u1", "admin").with_roles("system_user system_admin");
        assert!(admin.is_system_admin());
        assert!(admin.is_active());

        let gone = UserProfile::new("u2", "gone").with_delete_at(5);
        assert!(!gone.is_active());
    }
}
