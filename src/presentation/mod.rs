//! Presentation layer: the sidebar report printed by the binary.

/// Sidebar report building and rendering.
pub mod sidebar_report;

pub use sidebar_report::{
    ReportOptions, SidebarMode, SidebarPresenter, SidebarReport, render_json, render_text,
};
