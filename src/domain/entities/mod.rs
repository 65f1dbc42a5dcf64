//! Domain entity definitions.

mod ids;
mod category;
mod channel;
mod membership;
mod post;
mod preference;
mod team;
mod user;

pub use category::{CategorySorting, CategoryType, ChannelCategory};
pub use channel::{
    Channel, ChannelKind, ChannelType, DIRECT_NAME_SEPARATOR, GROUP_DISPLAY_NAME_SEPARATOR,
    TOWN_SQUARE, direct_channel_name, teammate_id_from_channel_name,
};
pub use ids::{CategoryId, ChannelId, PostId, TeamId, UserId};
pub use membership::{ChannelMembership, MarkUnread, NotifyProps};
pub use post::{Post, PostOrderBlock};
pub use preference::{
    ChannelGrouping, LegacySidebarSettings, LegacySorting, NameFormat, PREFERENCE_KEY_SEPARATOR,
    Preference, preference_key,
};
pub use team::{Team, TeamMembership};
pub use user::{SYSTEM_ADMIN_ROLE, UserProfile};
