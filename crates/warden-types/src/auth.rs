//! Authentication audit types

use serde::{Deserialize, Serialize};

/// Action tag recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// New identity registered
    UserRegister,
    /// Password did not match
    LoginFailed,
    /// All refresh tokens for the actor revoked
    Logout,
    /// Identity soft-deleted by its owner or an admin
    UserDelete,
}

impl AuditAction {
    /// Tag stored in the audit table
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegister => "user_register",
            Self::LoginFailed => "login_failed",
            Self::Logout => "logout",
            Self::UserDelete => "user_delete",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
