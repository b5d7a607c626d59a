//! Tenancy actors and roles

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a user within a business
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    Salesperson,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Salesperson => "salesperson",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            "salesperson" => Some(Role::Salesperson),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller on whose behalf a ledger or analytics operation runs.
///
/// Every query is filtered by `business_id`; salesperson actors are further
/// restricted to the records they authored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub business_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(business_id: Uuid, user_id: Uuid, role: Role) -> Self {
        Self {
            business_id,
            user_id,
            role,
        }
    }

    /// User id to filter records by, if this actor only sees its own records
    pub fn record_scope(&self) -> Option<Uuid> {
        match self.role {
            Role::Salesperson => Some(self.user_id),
            Role::Owner | Role::Admin => None,
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self.role, Role::Owner | Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salesperson_is_scoped_to_own_records() {
        let me = Uuid::new_v4();
        let actor = Actor::new(Uuid::new_v4(), me, Role::Salesperson);
        assert_eq!(actor.record_scope(), Some(me));
        assert!(!actor.is_manager());
    }

    #[test]
    fn owner_sees_whole_business() {
        let actor = Actor::new(Uuid::new_v4(), Uuid::new_v4(), Role::Owner);
        assert_eq!(actor.record_scope(), None);
        assert!(actor.is_manager());
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Owner, Role::Admin, Role::Salesperson] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("cashier"), None);
    }
}
