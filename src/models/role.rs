use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A named role in the assignable-role catalog. Authorization itself
/// checks the role strings embedded in a user's token, so deleting a
/// role here does not revoke it from already-issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateRole {
    pub name: String,
}

impl CreateRole {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Name is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRole {
    pub name: Option<String>,
}
