//! Config keys and preference names read by the selectors.

/// Server config keys. Values are the strings `"true"` / `"false"` unless noted.
pub mod config {
    /// Server allows unused direct messages to be closed automatically.
    pub const CLOSE_UNUSED_DIRECT_MESSAGES: &str = "CloseUnusedDirectMessages";
    /// Town square only accepts posts from admins.
    pub const TOWN_SQUARE_IS_READ_ONLY: &str = "ExperimentalTownSquareIsReadOnly";
    /// Town square is hidden from the legacy sidebar.
    pub const HIDE_TOWN_SQUARE_IN_LHS: &str = "ExperimentalHideTownSquareinLHS";
    /// The grouped legacy sidebar replaces categories.
    pub const ENABLE_LEGACY_SIDEBAR: &str = "EnableLegacySidebar";
    /// Unread grouping default: `"disabled"`, `"default_on"` or `"default_off"`.
    pub const GROUP_UNREAD_CHANNELS: &str = "ExperimentalGroupUnreadChannels";
    /// Server-wide name format default.
    pub const TEAMMATE_NAME_DISPLAY: &str = "TeammateNameDisplay";
}

/// Preference categories.
pub mod category {
    /// Favorite marker, keyed by channel id.
    pub const FAVORITE_CHANNEL: &str = "favorite_channel";
    /// Direct channel open/closed, keyed by teammate id.
    pub const DIRECT_CHANNEL_SHOW: &str = "direct_channel_show";
    /// Group channel open/closed, keyed by channel id.
    pub const GROUP_CHANNEL_SHOW: &str = "group_channel_show";
    /// Sidebar settings.
    pub const SIDEBAR_SETTINGS: &str = "sidebar_settings";
    /// Display settings.
    pub const DISPLAY_SETTINGS: &str = "display_settings";
    /// Time a direct or group channel was opened, keyed by channel id.
    pub const CHANNEL_OPEN_TIME: &str = "channel_open_time";
    /// Approximate time a channel was last viewed, keyed by channel id.
    /// Not kept accurately by clients.
    pub const CHANNEL_APPROXIMATE_VIEW_TIME: &str = "channel_approximate_view_time";
}

/// Preference names.
pub mod name {
    /// Legacy settings JSON blob under `sidebar_settings`.
    pub const LEGACY_SIDEBAR_BLOB: &str = "";
    /// Autoclose mode under `sidebar_settings`.
    pub const CLOSE_UNUSED_DIRECT_MESSAGES: &str = "close_unused_direct_messages";
    /// Number of direct and group channels to keep visible.
    pub const LIMIT_VISIBLE_DMS_GMS: &str = "limit_visible_dms_gms";
    /// Whether the Unreads section is shown.
    pub const SHOW_UNREAD_SECTION: &str = "show_unread_section";
    /// Name format under `display_settings`.
    pub const NAME_FORMAT: &str = "name_format";
}

/// Autoclose mode that closes direct channels after a week without activity.
pub const AUTOCLOSE_AFTER_SEVEN_DAYS: &str = "after_seven_days";

/// Default number of visible direct and group channels.
pub const DEFAULT_LIMIT_VISIBLE_DMS_GMS: usize = 20;

/// Inactivity window after which the cutoff autoclose hides a direct channel.
pub const AUTOCLOSE_WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;
