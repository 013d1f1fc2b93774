//! Conversions from serenity models to Herald core types.

use herald_core::{
    ChannelId, GuildId, MemberRef, OccupancyChange, OnlineStatus, OverwriteTarget,
    PermissionOverwrite, Permissions, PresenceChange, RoleId, ThreadState, UserId, VoiceRoom,
};
use serenity::model::channel::{
    GuildChannel, PermissionOverwrite as DiscordOverwrite, PermissionOverwriteType,
};
use serenity::model::guild::{Member, Role};
use serenity::model::id as discord;
use serenity::model::user::OnlineStatus as DiscordStatus;

pub(crate) fn guild_id(id: discord::GuildId) -> GuildId {
    GuildId::new(id.get())
}

pub(crate) fn channel_id(id: discord::ChannelId) -> ChannelId {
    ChannelId::new(id.get())
}

pub(crate) fn user_id(id: discord::UserId) -> UserId {
    UserId::new(id.get())
}

pub(crate) fn to_guild(id: GuildId) -> discord::GuildId {
    discord::GuildId::new(id.get())
}

pub(crate) fn to_channel(id: ChannelId) -> discord::ChannelId {
    discord::ChannelId::new(id.get())
}

pub(crate) fn to_user(id: UserId) -> discord::UserId {
    discord::UserId::new(id.get())
}

/// Map a serenity presence status onto the core status.
pub fn online_status(status: DiscordStatus) -> OnlineStatus {
    match status {
        DiscordStatus::Online => OnlineStatus::Online,
        DiscordStatus::Idle => OnlineStatus::Idle,
        DiscordStatus::DoNotDisturb => OnlineStatus::DoNotDisturb,
        DiscordStatus::Invisible => OnlineStatus::Invisible,
        _ => OnlineStatus::Offline,
    }
}

pub(crate) fn overwrite(overwrite: &DiscordOverwrite) -> Option<PermissionOverwrite> {
    let target = match &overwrite.kind {
        PermissionOverwriteType::Member(id) => OverwriteTarget::Member(user_id(*id)),
        PermissionOverwriteType::Role(id) => OverwriteTarget::Role(RoleId::new(id.get())),
        _ => return None,
    };
    Some(PermissionOverwrite {
        target,
        allow: Permissions::new(overwrite.allow.bits()),
        deny: Permissions::new(overwrite.deny.bits()),
    })
}

/// Guild-level permissions of the @everyone role, whose id equals the guild id.
pub(crate) fn everyone_permissions(guild: GuildId, roles: &[Role]) -> Option<Permissions> {
    roles
        .iter()
        .find(|role| role.id.get() == guild.get())
        .map(|role| Permissions::new(role.permissions.bits()))
}

pub(crate) fn voice_room(channel: &GuildChannel, everyone: Option<Permissions>) -> VoiceRoom {
    VoiceRoom {
        id: channel_id(channel.id),
        guild_id: guild_id(channel.guild_id),
        name: channel.name.clone(),
        everyone_permissions: everyone,
        overwrites: Some(
            channel
                .permission_overwrites
                .iter()
                .filter_map(overwrite)
                .collect(),
        ),
    }
}

pub(crate) fn thread_state(channel: &GuildChannel) -> ThreadState {
    match channel.thread_metadata.as_ref() {
        Some(meta) => ThreadState {
            archived: meta.archived,
            locked: meta.locked,
        },
        None => ThreadState {
            archived: false,
            locked: false,
        },
    }
}

pub(crate) fn member_ref(member: &Member) -> MemberRef {
    MemberRef {
        id: user_id(member.user.id),
        is_bot: member.user.bot,
    }
}

fn roles(member: &Member) -> Vec<RoleId> {
    member.roles.iter().map(|id| RoleId::new(id.get())).collect()
}

pub(crate) fn occupancy_change(
    guild: discord::GuildId,
    old_room: Option<discord::ChannelId>,
    new_room: Option<discord::ChannelId>,
    member: &Member,
) -> OccupancyChange {
    OccupancyChange {
        guild_id: guild_id(guild),
        old_room: old_room.map(channel_id),
        new_room: new_room.map(channel_id),
        actor_id: user_id(member.user.id),
        actor_name: member.user.name.clone(),
        actor_tag: member.user.tag(),
        actor_is_service: member.user.bot,
        actor_roles: roles(member),
    }
}

pub(crate) fn presence_change(
    guild: discord::GuildId,
    member: &Member,
    previous_status: Option<OnlineStatus>,
    new_status: OnlineStatus,
) -> PresenceChange {
    PresenceChange {
        guild_id: guild_id(guild),
        actor_id: user_id(member.user.id),
        actor_name: member.user.name.clone(),
        actor_tag: member.user.tag(),
        actor_is_service: member.user.bot,
        actor_roles: roles(member),
        previous_status,
        new_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_status_mapping() {
        assert_eq!(online_status(DiscordStatus::Online), OnlineStatus::Online);
        assert_eq!(
            online_status(DiscordStatus::DoNotDisturb),
            OnlineStatus::DoNotDisturb
        );
        assert_eq!(online_status(DiscordStatus::Offline), OnlineStatus::Offline);
    }

    #[test]
    fn test_id_round_trip() {
        let id = ChannelId::new(1234);
        assert_eq!(channel_id(to_channel(id)), id);
        assert_eq!(guild_id(to_guild(GuildId::new(7))), GuildId::new(7));
        assert_eq!(user_id(to_user(UserId::new(8))), UserId::new(8));
    }
}
