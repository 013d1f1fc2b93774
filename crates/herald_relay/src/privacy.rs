//! Voice room privacy.
//!
//! A room is private when the guild's @everyone role, after the room's own
//! overwrite for it, cannot view the room.

use herald_core::{OverwriteTarget, Permissions, RoleId, UserId, VoiceRoom};

/// Privacy of a voice room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomPrivacy {
    /// Everyone can view the room; alerts go to the public channel
    Public,
    /// Only some members can view the room; alerts go to a private thread
    Private,
}

/// Resolve the @everyone role's permissions in a room.
///
/// `None` when the room is missing the base permissions or the overwrite list.
pub fn everyone_view_permissions(room: &VoiceRoom) -> Option<Permissions> {
    let base = room.everyone_permissions?;
    if base.contains(Permissions::ADMINISTRATOR) {
        return Some(Permissions::new(u64::MAX));
    }

    let everyone = OverwriteTarget::Role(room.guild_id.everyone_role());
    let resolved = match room
        .overwrites
        .as_ref()?
        .iter()
        .find(|overwrite| overwrite.target == everyone)
    {
        Some(overwrite) => base.overwrite(overwrite.allow, overwrite.deny),
        None => base,
    };
    Some(resolved)
}

/// Classify a room, treating unresolvable permissions as public.
///
/// # Examples
///
/// ```
/// use herald_core::{
///     ChannelId, GuildId, OverwriteTarget, PermissionOverwrite, Permissions, RoleId, VoiceRoom,
/// };
/// use herald_relay::{RoomPrivacy, classify_room};
///
/// let guild = GuildId::new(1);
/// let room = VoiceRoom {
///     id: ChannelId::new(2),
///     guild_id: guild,
///     name: "Staff".into(),
///     everyone_permissions: Some(Permissions::VIEW_CHANNEL),
///     overwrites: Some(vec![PermissionOverwrite {
///         target: OverwriteTarget::Role(RoleId::new(1)),
///         allow: Permissions::NONE,
///         deny: Permissions::VIEW_CHANNEL,
///     }]),
/// };
/// assert_eq!(classify_room(&room), RoomPrivacy::Private);
/// ```
pub fn classify_room(room: &VoiceRoom) -> RoomPrivacy {
    match everyone_view_permissions(room) {
        Some(perms) if perms.contains(Permissions::VIEW_CHANNEL) => RoomPrivacy::Public,
        Some(_) => RoomPrivacy::Private,
        None => {
            tracing::warn!(
                room_id = %room.id,
                room = %room.name,
                "Cannot resolve @everyone permissions, treating room as public"
            );
            RoomPrivacy::Public
        }
    }
}

/// VIEW_CHANNEL overwrites of a room, split by target and direction.
///
/// The @everyone overwrite is left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerOverwrites {
    /// Roles explicitly allowed to view
    pub allow_roles: Vec<RoleId>,
    /// Members explicitly allowed to view
    pub allow_members: Vec<UserId>,
    /// Roles explicitly denied
    pub deny_roles: Vec<RoleId>,
    /// Members explicitly denied
    pub deny_members: Vec<UserId>,
}

impl ViewerOverwrites {
    /// Extract the view overwrites of `room`.
    pub fn of(room: &VoiceRoom) -> Self {
        let everyone = room.guild_id.everyone_role();
        let mut found = Self::default();

        for overwrite in room.overwrites.iter().flatten() {
            let allows = overwrite.allow.contains(Permissions::VIEW_CHANNEL);
            let denies = overwrite.deny.contains(Permissions::VIEW_CHANNEL);
            match overwrite.target {
                OverwriteTarget::Role(role) if role == everyone => {}
                OverwriteTarget::Role(role) => {
                    if allows {
                        found.allow_roles.push(role);
                    }
                    if denies {
                        found.deny_roles.push(role);
                    }
                }
                OverwriteTarget::Member(user) => {
                    if allows {
                        found.allow_members.push(user);
                    }
                    if denies {
                        found.deny_members.push(user);
                    }
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::{ChannelId, GuildId, PermissionOverwrite};

    const GUILD: GuildId = GuildId::new(1);

    fn room(base: Option<Permissions>, overwrites: Option<Vec<PermissionOverwrite>>) -> VoiceRoom {
        VoiceRoom {
            id: ChannelId::new(2),
            guild_id: GUILD,
            name: "Lounge".to_string(),
            everyone_permissions: base,
            overwrites,
        }
    }

    fn role_overwrite(role: u64, allow: Permissions, deny: Permissions) -> PermissionOverwrite {
        PermissionOverwrite {
            target: OverwriteTarget::Role(RoleId::new(role)),
            allow,
            deny,
        }
    }

    #[test]
    fn base_permissions_decide_without_overwrites() {
        assert_eq!(
            classify_room(&room(Some(Permissions::VIEW_CHANNEL), Some(vec![]))),
            RoomPrivacy::Public
        );
        assert_eq!(
            classify_room(&room(Some(Permissions::NONE), Some(vec![]))),
            RoomPrivacy::Private
        );
    }

    #[test]
    fn everyone_overwrite_can_grant_or_revoke() {
        let revoked = room(
            Some(Permissions::VIEW_CHANNEL),
            Some(vec![role_overwrite(1, Permissions::NONE, Permissions::VIEW_CHANNEL)]),
        );
        assert_eq!(classify_room(&revoked), RoomPrivacy::Private);

        let granted = room(
            Some(Permissions::NONE),
            Some(vec![role_overwrite(1, Permissions::VIEW_CHANNEL, Permissions::NONE)]),
        );
        assert_eq!(classify_room(&granted), RoomPrivacy::Public);
    }

    #[test]
    fn other_role_overwrites_do_not_affect_privacy() {
        let staff_only = room(
            Some(Permissions::VIEW_CHANNEL),
            Some(vec![role_overwrite(9, Permissions::NONE, Permissions::VIEW_CHANNEL)]),
        );
        assert_eq!(classify_room(&staff_only), RoomPrivacy::Public);
    }

    #[test]
    fn administrator_bypasses_overwrites() {
        let admin = room(
            Some(Permissions::ADMINISTRATOR),
            Some(vec![role_overwrite(1, Permissions::NONE, Permissions::VIEW_CHANNEL)]),
        );
        assert_eq!(classify_room(&admin), RoomPrivacy::Public);
    }

    #[test]
    fn unresolvable_rooms_are_public() {
        assert_eq!(classify_room(&room(None, Some(vec![]))), RoomPrivacy::Public);
        assert_eq!(
            classify_room(&room(Some(Permissions::NONE), None)),
            RoomPrivacy::Public
        );
    }

    #[test]
    fn viewer_overwrites_skip_everyone() {
        let mixed = room(
            Some(Permissions::NONE),
            Some(vec![
                role_overwrite(1, Permissions::NONE, Permissions::VIEW_CHANNEL),
                role_overwrite(20, Permissions::VIEW_CHANNEL, Permissions::NONE),
                role_overwrite(21, Permissions::NONE, Permissions::VIEW_CHANNEL),
                role_overwrite(22, Permissions::new(1 << 20), Permissions::NONE),
                PermissionOverwrite {
                    target: OverwriteTarget::Member(UserId::new(30)),
                    allow: Permissions::VIEW_CHANNEL,
                    deny: Permissions::NONE,
                },
                PermissionOverwrite {
                    target: OverwriteTarget::Member(UserId::new(31)),
                    allow: Permissions::NONE,
                    deny: Permissions::VIEW_CHANNEL,
                },
            ]),
        );

        let overwrites = ViewerOverwrites::of(&mixed);
        assert_eq!(overwrites.allow_roles, vec![RoleId::new(20)]);
        assert_eq!(overwrites.deny_roles, vec![RoleId::new(21)]);
        assert_eq!(overwrites.allow_members, vec![UserId::new(30)]);
        assert_eq!(overwrites.deny_members, vec![UserId::new(31)]);
    }
}
