//! Team member model.

use super::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub role: UserRole,
}

impl User {
    /// Creates a member-role user with a generated initials avatar.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            avatar: avatar_url(&name),
            name,
            email: email.into(),
            role: UserRole::Member,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Builds the avatar URL for a display name.
pub fn avatar_url(name: &str) -> String {
    format!(
        "{AVATAR_BASE_URL}?name={}&background=random",
        urlencoding::encode(name)
    )
}
