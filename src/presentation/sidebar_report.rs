//! Sidebar report: what the sidebar of one team shows, as text or JSON.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::application::selectors::channels::{
    can_manage_any_channel_members_in_current_team, get_channel_unread_counts, is_channel_muted,
};
use crate::application::selectors::display_name::{DisplayNameContext, channel_display_name};
use crate::application::selectors::entities::require_current_team_id;
use crate::application::selectors::preferences::{
    get_teammate_name_display_setting, is_legacy_sidebar_enabled, should_show_unreads_category,
};
use crate::application::selectors::users::{ProfilesByUsername, UsernameMap};
use crate::application::selectors::{
    AutocloseStrategy, CategoriesForTeam, ChannelsByCategory, OrderedChannelGroups, Selector,
    SortedUnreadChannels, TeamUnreads, UnreadCounts, Unreads,
};
use crate::domain::entities::{Channel, ChannelId, TeamId};
use crate::domain::errors::SelectorError;
use crate::domain::ports::PermissionPort;
use crate::domain::state::GlobalState;

const UNREADS_SECTION: &str = "UNREADS";

/// Report options.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Team to report on instead of the current one.
    pub team_id: Option<TeamId>,
    /// Forces the legacy grouped sidebar on or off.
    pub legacy: Option<bool>,
}

/// Which sidebar produced the sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SidebarMode {
    Categories,
    Legacy,
}

/// One channel row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelLine {
    pub id: ChannelId,
    pub name: String,
    pub message_count: i64,
    pub mention_count: i64,
    pub unread: bool,
    pub muted: bool,
    pub current: bool,
}

/// One sidebar section: a category or a legacy group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub collapsed: bool,
    pub channels: Vec<ChannelLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SidebarReport {
    pub team_id: TeamId,
    pub mode: SidebarMode,
    pub sections: Vec<Section>,
    /// Counts for the reported team.
    pub unreads: UnreadCounts,
    /// Counts across every team.
    pub total_unreads: UnreadCounts,
    pub other_teams: BTreeMap<TeamId, UnreadCounts>,
    pub can_manage_members: bool,
}

/// Builds sidebar reports, keeping selector caches between builds.
#[derive(Debug)]
pub struct SidebarPresenter {
    categories: CategoriesForTeam,
    channels_by_category: ChannelsByCategory,
    groups: OrderedChannelGroups,
    unread_channels: SortedUnreadChannels,
    unreads: Unreads,
    team_unreads: TeamUnreads,
    profiles_by_username: ProfilesByUsername,
}

impl SidebarPresenter {
    #[must_use]
    pub fn new(autoclose: AutocloseStrategy) -> Self {
        Self {
            categories: CategoriesForTeam::new(),
            channels_by_category: ChannelsByCategory::channels(autoclose),
            groups: OrderedChannelGroups::new(),
            unread_channels: SortedUnreadChannels::new(),
            unreads: Unreads::new(),
            team_unreads: TeamUnreads::new(),
            profiles_by_username: ProfilesByUsername::new(),
        }
    }

    /// Uses `groups` for the legacy sidebar.
    #[must_use]
    pub fn with_legacy_groups(mut self, groups: OrderedChannelGroups) -> Self {
        self.groups = groups;
        self
    }

    /// Builds the report for the current team, or `options.team_id`.
    ///
    /// # Errors
    ///
    /// Returns `SelectorError` when no team is selected. A team without
    /// categories reports no category sections.
    pub fn build(
        &mut self,
        state: &GlobalState,
        options: &ReportOptions,
        permissions: &dyn PermissionPort,
    ) -> Result<SidebarReport, SelectorError> {
        let state = match &options.team_id {
            Some(team_id) => {
                let mut state = state.clone();
                state.entities.teams.current_team_id = Some(team_id.clone());
                Cow::Owned(state)
            }
            None => Cow::Borrowed(state),
        };
        let state = &*state;
        let team_id = require_current_team_id(state)?;

        let mode = if options.legacy.unwrap_or_else(|| is_legacy_sidebar_enabled(state)) {
            SidebarMode::Legacy
        } else {
            SidebarMode::Categories
        };
        debug!(team_id = %team_id, ?mode, "Building sidebar report");

        let sections = match mode {
            SidebarMode::Legacy => self.legacy_sections(state),
            SidebarMode::Categories => self.category_sections(state, &team_id),
        };

        let by_team = self.team_unreads.select(state, ());
        let unreads = by_team.get(&team_id).copied().unwrap_or_default();
        let other_teams = by_team
            .iter()
            .filter(|(id, _)| **id != team_id)
            .map(|(id, counts)| (id.clone(), *counts))
            .collect();

        Ok(SidebarReport {
            team_id,
            mode,
            sections,
            unreads,
            total_unreads: self.unreads.select(state, ()),
            other_teams,
            can_manage_members: can_manage_any_channel_members_in_current_team(state, permissions),
        })
    }

    fn category_sections(
        &mut self,
        state: &GlobalState,
        team_id: &TeamId,
    ) -> Vec<Section> {
        let rows = RowBuilder::new(state, &mut self.profiles_by_username);

        let mut sections = Vec::new();
        let mut shown_as_unread = HashSet::new();
        if should_show_unreads_category(state) {
            let unread = self.unread_channels.select(state, ());
            shown_as_unread.extend(unread.iter().map(|channel| channel.id().clone()));
            sections.push(Section {
                name: UNREADS_SECTION.to_owned(),
                collapsed: false,
                channels: unread.iter().map(|channel| rows.line(channel)).collect(),
            });
        }

        let by_category = self.channels_by_category.select(state, team_id);
        for category in self.categories.select(state, team_id).iter() {
            let channels = by_category
                .get(&category.id)
                .map(|channels| {
                    channels
                        .iter()
                        .filter(|channel| !shown_as_unread.contains(channel.id()))
                        .map(|channel| rows.line(channel))
                        .collect()
                })
                .unwrap_or_default();
            sections.push(Section {
                name: category.display_name.clone(),
                collapsed: category.collapsed,
                channels,
            });
        }
        sections
    }

    fn legacy_sections(&mut self, state: &GlobalState) -> Vec<Section> {
        let groups = self.groups.select(state, None);
        let rows = RowBuilder::new(state, &mut self.profiles_by_username);
        let channels = &state.entities.channels.channels;

        groups
            .iter()
            .map(|group| Section {
                name: group.name.to_owned(),
                collapsed: false,
                channels: group
                    .channel_ids
                    .iter()
                    .filter_map(|id| channels.get(id))
                    .map(|channel| rows.line(channel))
                    .collect(),
            })
            .collect()
    }
}

/// Turns channels into rows with live display names and unread state.
struct RowBuilder<'a> {
    state: &'a GlobalState,
    users_by_username: UsernameMap,
}

impl<'a> RowBuilder<'a> {
    fn new(state: &'a GlobalState, profiles_by_username: &mut ProfilesByUsername) -> Self {
        Self {
            state,
            users_by_username: profiles_by_username.select(state, ()),
        }
    }

    fn line(&self, channel: &Channel) -> ChannelLine {
        let entities = &self.state.entities;
        let ctx = DisplayNameContext {
            current_user_id: entities.users.current_user_id.as_ref(),
            users: &entities.users.profiles,
            users_by_username: &self.users_by_username,
            name_format: get_teammate_name_display_setting(self.state),
        };
        let membership = entities.channels.my_members.get(channel.id()).map(Arc::as_ref);
        let counts = get_channel_unread_counts(channel, membership);

        ChannelLine {
            id: channel.id().clone(),
            name: channel_display_name(channel, &ctx),
            message_count: counts.message_count,
            mention_count: counts.mention_count,
            unread: counts.has_unread,
            muted: is_channel_muted(membership),
            current: entities.channels.current_channel_id.as_ref() == Some(channel.id()),
        }
    }
}

/// Renders the report as indented text.
#[must_use]
pub fn render_text(report: &SidebarReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "team {}: {} unread channels, {} mentions",
        report.team_id, report.unreads.message_count, report.unreads.mention_count
    );
    for (team_id, counts) in &report.other_teams {
        let _ = writeln!(
            out,
            "  {team_id}: {} unread channels, {} mentions",
            counts.message_count, counts.mention_count
        );
    }

    for section in &report.sections {
        out.push('\n');
        out.push_str(&section.name);
        if section.collapsed {
            out.push_str(" (collapsed)");
        }
        out.push('\n');
        for line in &section.channels {
            let current = if line.current { '>' } else { ' ' };
            let unread = if line.unread { '*' } else { ' ' };
            let _ = write!(out, "{current}{unread} {}", line.name);
            if line.mention_count > 0 {
                let _ = write!(out, " @{}", line.mention_count);
            }
            if line.muted {
                out.push_str(" (muted)");
            }
            out.push('\n');
        }
    }
    out
}

/// Renders the report as pretty printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(report: &SidebarReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        CategorySorting, CategoryType, ChannelCategory, ChannelMembership, ChannelType,
        MarkUnread, Preference, Team, TeamMembership, UserId, UserProfile,
    };
    use crate::domain::ports::mocks::MockPermissionPort;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn state() -> GlobalState {
        let me = UserId::from("me");
        GlobalState::default()
            .with_current_user("me")
            .with_current_team("t1")
            .with_current_channel("general")
            .with_profiles([
                UserProfile::new("me", "me"),
                UserProfile::new("u2", "jane").with_name("Jane", "Doe"),
            ])
            .with_teams(
                [Team::new("t1", "one"), Team::new("t2", "two")],
                [
                    TeamMembership::new("t1", "me"),
                    TeamMembership::new("t2", "me").with_unreads(2, 1),
                ],
            )
            .with_channels([
                Channel::new("general", "general", ChannelType::Open)
                    .with_team("t1")
                    .with_display_name("General"),
                Channel::new("random", "random", ChannelType::Open)
                    .with_team("t1")
                    .with_display_name("Random")
                    .with_total_msg_count(3),
                Channel::new("quiet", "quiet", ChannelType::Open)
                    .with_team("t1")
                    .with_display_name("Quiet")
                    .with_total_msg_count(9),
                Channel::direct("dm", &me, &UserId::from("u2")).with_total_msg_count(1),
            ])
            .with_my_members([
                ChannelMembership::new("general", "me"),
                ChannelMembership::new("random", "me").with_mention_count(1),
                ChannelMembership::new("quiet", "me").with_mark_unread(MarkUnread::Mention),
                ChannelMembership::new("dm", "me").with_msg_count(1),
            ])
            .with_categories([
                ChannelCategory::new("chan", "t1", CategoryType::Channels, "Channels")
                    .with_channel_ids(["random", "general", "quiet"]),
                ChannelCategory::new("dms", "t1", CategoryType::DirectMessages, "Direct Messages")
                    .with_sorting(CategorySorting::Recency)
                    .with_channel_ids(["dm"]),
            ])
            .with_preferences([Preference::new("direct_channel_show", "u2", "true")])
    }

    fn names(section: &Section) -> Vec<&str> {
        section.channels.iter().map(|line| line.name.as_str()).collect()
    }

    fn no_permissions() -> MockPermissionPort {
        let mut port = MockPermissionPort::new();
        port.expect_has_channel_permission().return_const(false);
        port
    }

    #[test]
    fn test_category_report() {
        let mut presenter = SidebarPresenter::new(AutocloseStrategy::Limit);
        let report = presenter
            .build(&state(), &ReportOptions::default(), &no_permissions())
            .unwrap();

        assert_eq!(report.mode, SidebarMode::Categories);
        assert_eq!(report.sections.len(), 2);
        assert_eq!(names(&report.sections[0]), ["General", "Random", "Quiet"]);
        assert_eq!(names(&report.sections[1]), ["jane"]);
        assert_eq!(report.unreads.mention_count, 1);
        assert_eq!(report.total_unreads.mention_count, 2);
        assert_eq!(report.other_teams[&TeamId::from("t2")].message_count, 2);
        assert!(!report.can_manage_members);
    }

    #[test]
    fn test_unreads_section_takes_unread_channels() {
        let state = state().with_preferences([
            Preference::new("direct_channel_show", "u2", "true"),
            Preference::new("sidebar_settings", "show_unread_section", "true"),
        ]);
        let mut presenter = SidebarPresenter::new(AutocloseStrategy::Limit);
        let report = presenter
            .build(&state, &ReportOptions::default(), &no_permissions())
            .unwrap();

        assert_eq!(report.sections[0].name, UNREADS_SECTION);
        assert_eq!(names(&report.sections[0]), ["Random"]);
        assert_eq!(names(&report.sections[1]), ["General", "Quiet"]);
    }

    #[test]
    fn test_legacy_report_and_text() {
        let mut presenter = SidebarPresenter::new(AutocloseStrategy::Limit)
            .with_legacy_groups(OrderedChannelGroups::with_clock(|| 0));
        let options = ReportOptions {
            legacy: Some(true),
            ..ReportOptions::default()
        };
        let report = presenter.build(&state(), &options, &no_permissions()).unwrap();

        assert_eq!(report.mode, SidebarMode::Legacy);
        let headings: Vec<&str> = report.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            headings,
            [
                "UNREADS",
                "FAVORITE CHANNELS",
                "PUBLIC CHANNELS",
                "PRIVATE CHANNELS",
                "DIRECT MESSAGES"
            ]
        );
        assert_eq!(names(&report.sections[0]), ["Random"]);

        let text = render_text(&report);
        assert!(text.starts_with(
            "team t1: 1 unread channels, 1 mentions\n  t2: 2 unread channels, 1 mentions\n"
        ));
        assert!(text.contains("\nUNREADS\n * Random @1\n"));
        assert!(text.contains(">  General\n"));
        assert!(text.contains("   Quiet (muted)\n"));
    }

    #[test_case("t2" ; "team without categories")]
    #[test_case("t9" ; "unknown team")]
    fn test_team_override_without_categories(team: &str) {
        let mut presenter = SidebarPresenter::new(AutocloseStrategy::Limit);
        let options = ReportOptions {
            team_id: Some(TeamId::from(team)),
            ..ReportOptions::default()
        };
        let report = presenter.build(&state(), &options, &no_permissions()).unwrap();

        assert_eq!(report.team_id, TeamId::from(team));
        assert_eq!(report.mode, SidebarMode::Categories);
        assert!(report.sections.is_empty());
        assert!(render_text(&report).starts_with(&format!("team {team}: ")));
    }

    #[test]
    fn test_missing_current_team_is_an_error() {
        let mut state = state();
        state.entities.teams.current_team_id = None;
        let mut presenter = SidebarPresenter::new(AutocloseStrategy::Limit);
        let err = presenter
            .build(&state, &ReportOptions::default(), &no_permissions())
            .unwrap_err();
        assert_eq!(err, SelectorError::NoCurrentTeam);
    }

    #[test]
    fn test_json_report() {
        let mut presenter = SidebarPresenter::new(AutocloseStrategy::Limit);
        let report = presenter
            .build(&state(), &ReportOptions::default(), &no_permissions())
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(json["mode"], "categories");
        assert_eq!(json["sections"][0]["channels"][1]["mention_count"], 1);
        assert_eq!(json["other_teams"]["t2"]["mention_count"], 1);
    }
}
