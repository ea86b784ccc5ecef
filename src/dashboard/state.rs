//! Local view state mirroring the last successful fetch of each resource.

use crate::api::{ChatTurn, DashboardSummary, Goal, Note, Task};

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    #[default]
    Chat,
    Tasks,
    Goals,
    Notes,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Dashboard, Tab::Chat, Tab::Tasks, Tab::Goals, Tab::Notes];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Chat => "Chat",
            Self::Tasks => "Tasks",
            Self::Goals => "Goals",
            Self::Notes => "Notes",
        }
    }
}

/// Everything the renderer needs.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub summary: DashboardSummary,
    pub tasks: Vec<Task>,
    pub goals: Vec<Goal>,
    pub notes: Vec<Note>,
    /// Oldest turn first.
    pub chat: Vec<ChatTurn>,
    /// A chat message is awaiting its response.
    pub loading: bool,
    pub active_tab: Tab,
}
