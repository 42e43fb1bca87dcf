use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SuperAdmin,
    StoreAdmin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SuperAdmin",
            Role::StoreAdmin => "StoreAdmin",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SuperAdmin" => Ok(Role::SuperAdmin),
            "StoreAdmin" => Ok(Role::StoreAdmin),
            "User" => Ok(Role::User),
            other => Err(DomainError::Unauthorized(format!("unknown role '{other}'"))),
        }
    }
}

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageCart,
    PlaceOrder,
    ViewOwnOrders,
    ReviewOrders,
    ViewStoreOrders,
    ViewAllOrders,
    ViewReports,
}

impl Permission {
    pub fn allows(self, role: Role) -> bool {
        use Permission::*;
        use Role::*;

        match self {
            ManageCart | ViewOwnOrders => true,
            PlaceOrder => role == User,
            ReviewOrders | ViewStoreOrders | ViewReports => matches!(role, SuperAdmin | StoreAdmin),
            ViewAllOrders => role == SuperAdmin,
        }
    }
}

/// Identity of the authenticated caller, passed explicitly into every
/// service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: Uuid,
    pub role: Role,
    pub store_id: Option<Uuid>,
}

impl CallerContext {
    pub fn new(user_id: Uuid, role: Role, store_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            role,
            store_id,
        }
    }

    pub fn authorize(&self, permission: Permission) -> Result<(), DomainError> {
        if permission.allows(self.role) {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    /// SuperAdmins reach every store; StoreAdmins only the one in their token.
    pub fn ensure_store_access(&self, store_id: Uuid) -> Result<(), DomainError> {
        match self.role {
            Role::SuperAdmin => Ok(()),
            Role::StoreAdmin if self.store_id == Some(store_id) => Ok(()),
            _ => Err(DomainError::Forbidden),
        }
    }

    pub fn require_store(&self) -> Result<Uuid, DomainError> {
        self.store_id.ok_or(DomainError::Forbidden)
    }
}
