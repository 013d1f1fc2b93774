//! Platform identifiers.
//!
//! Discord snowflakes are `u64`; each kind of object gets its own newtype so
//! a room id can never be passed where a user id is expected.

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw snowflake.
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// The raw snowflake.
            pub const fn get(self) -> u64 {
                self.0
            }
        }
    };
}

snowflake!(
    /// Guild (community) identifier.
    GuildId
);
snowflake!(
    /// Channel identifier: text channels, voice rooms and threads share one id space.
    ChannelId
);
snowflake!(
    /// User identifier.
    UserId
);
snowflake!(
    /// Role identifier. The @everyone role has the same id as its guild.
    RoleId
);
snowflake!(
    /// Message identifier.
    MessageId
);

impl GuildId {
    /// The guild's @everyone role.
    ///
    /// ```
    /// use herald_core::{GuildId, RoleId};
    ///
    /// assert_eq!(GuildId::new(5).everyone_role(), RoleId::new(5));
    /// ```
    pub const fn everyone_role(self) -> RoleId {
        RoleId(self.0)
    }
}
