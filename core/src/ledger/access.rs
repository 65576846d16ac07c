//! Access Control
//!
//! ```text
//!            bind (owner)              unbind (owner)
//!  Unbound ───────────────▶ Bound(id) ───────────────▶ Unbound
//!     ▲                        │
//!     └── bind again ──────────┘  RoleAlreadyBound
//! ```
//!
//! The owner is fixed at construction and is the only identity allowed to
//! bootstrap accounts or move a controller slot.

use serde::{Deserialize, Serialize};
use shade_account::AccountId;
use std::fmt;

use crate::error::{LedgerError, LedgerResult};

/// A controller slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerRole {
    Burn,
    Mint,
}

impl ControllerRole {
    pub const ALL: [ControllerRole; 2] = [ControllerRole::Burn, ControllerRole::Mint];

    /// Storage key
    pub fn key(self) -> &'static [u8] {
        match self {
            ControllerRole::Burn => b"burn_controller",
            ControllerRole::Mint => b"mint_controller",
        }
    }
}

impl fmt::Display for ControllerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerRole::Burn => f.write_str("burn controller"),
            ControllerRole::Mint => f.write_str("mint controller"),
        }
    }
}

/// Any privileged identity a call can require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Controller(ControllerRole),
}

impl From<ControllerRole> for Role {
    fn from(role: ControllerRole) -> Self {
        Role::Controller(role)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => f.write_str("owner"),
            Role::Controller(role) => role.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleSlot {
    #[default]
    Unbound,
    Bound(AccountId),
}

impl RoleSlot {
    pub fn holder(&self) -> Option<AccountId> {
        match self {
            RoleSlot::Unbound => None,
            RoleSlot::Bound(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessController {
    owner: AccountId,
    burn: RoleSlot,
    mint: RoleSlot,
}

impl AccessController {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            burn: RoleSlot::Unbound,
            mint: RoleSlot::Unbound,
        }
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn slot(&self, role: ControllerRole) -> RoleSlot {
        match role {
            ControllerRole::Burn => self.burn,
            ControllerRole::Mint => self.mint,
        }
    }

    fn slot_mut(&mut self, role: ControllerRole) -> &mut RoleSlot {
        match role {
            ControllerRole::Burn => &mut self.burn,
            ControllerRole::Mint => &mut self.mint,
        }
    }

    pub fn require_owner(&self, caller: &AccountId) -> LedgerResult<()> {
        if *caller != self.owner {
            return Err(LedgerError::Authorization {
                caller: *caller,
                role: Role::Owner,
            });
        }
        Ok(())
    }

    /// Calls through an unbound slot are always rejected
    pub fn require(&self, caller: &AccountId, role: ControllerRole) -> LedgerResult<()> {
        match self.slot(role) {
            RoleSlot::Bound(holder) if holder == *caller => Ok(()),
            _ => Err(LedgerError::Authorization {
                caller: *caller,
                role: role.into(),
            }),
        }
    }

    /// Unbound -> Bound, owner only
    pub fn bind(
        &mut self,
        caller: &AccountId,
        role: ControllerRole,
        holder: AccountId,
    ) -> LedgerResult<()> {
        self.require_owner(caller)?;
        let slot = self.slot_mut(role);
        if let RoleSlot::Bound(current) = *slot {
            return Err(LedgerError::RoleAlreadyBound {
                role,
                holder: current,
            });
        }
        *slot = RoleSlot::Bound(holder);
        Ok(())
    }

    /// Bound -> Unbound, owner only. Returns the previous slot.
    pub fn unbind(&mut self, caller: &AccountId, role: ControllerRole) -> LedgerResult<RoleSlot> {
        self.require_owner(caller)?;
        Ok(std::mem::take(self.slot_mut(role)))
    }

    /// Reinstate a slot without authorization (startup reload, rollback)
    pub(crate) fn restore(&mut self, role: ControllerRole, slot: RoleSlot) {
        *self.slot_mut(role) = slot;
    }
}
