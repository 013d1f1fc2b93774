//! Channel permission bits and overwrites.

use crate::{RoleId, UserId};
use serde::{Deserialize, Serialize};

/// A Discord permission bitset.
///
/// Only the bits the relay inspects are named.
///
/// ```
/// use herald_core::Permissions;
///
/// let perms = Permissions::VIEW_CHANNEL | Permissions::new(1 << 11);
/// assert!(perms.contains(Permissions::VIEW_CHANNEL));
/// assert!(!perms.contains(Permissions::ADMINISTRATOR));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::From,
)]
#[serde(transparent)]
pub struct Permissions(u64);

impl Permissions {
    /// No permissions.
    pub const NONE: Self = Self(0);
    /// Bypasses every overwrite.
    pub const ADMINISTRATOR: Self = Self(1 << 3);
    /// View a channel (and, for voice rooms, see who is in it).
    pub const VIEW_CHANNEL: Self = Self(1 << 10);

    /// Wrap raw permission bits.
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw permission bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every bit in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Apply an overwrite: `(self & !deny) | allow`.
    pub const fn overwrite(self, allow: Self, deny: Self) -> Self {
        Self((self.0 & !deny.0) | allow.0)
    }
}

impl std::ops::BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Who a permission overwrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverwriteTarget {
    /// Every member holding the role
    Role(RoleId),
    /// A single member
    Member(UserId),
}

/// A channel-level permission overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    /// Role or member the overwrite applies to
    pub target: OverwriteTarget,
    /// Bits explicitly granted
    pub allow: Permissions,
    /// Bits explicitly revoked
    pub deny: Permissions,
}
