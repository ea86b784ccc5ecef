//! Plain-text rendering of each dashboard tab.

use std::fmt::Write;

use chrono::NaiveDateTime;

use super::state::{Tab, ViewState};
use crate::api::{ContentKind, GoalStatus};

/// Recent items shown per dashboard card.
const RECENT_LIMIT: usize = 5;
/// Width of the goal progress bar, in cells.
const PROGRESS_WIDTH: usize = 20;

/// Render the active tab, preceded by the tab strip.
pub fn render(state: &ViewState) -> String {
    let mut out = tab_strip(state.active_tab);
    out.push('\n');
    out.push_str(&render_tab(state, state.active_tab));
    out
}

pub fn render_tab(state: &ViewState, tab: Tab) -> String {
    match tab {
        Tab::Dashboard => render_dashboard(state),
        Tab::Chat => render_chat(state),
        Tab::Tasks => render_tasks(state),
        Tab::Goals => render_goals(state),
        Tab::Notes => render_notes(state),
    }
}

fn tab_strip(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|tab| {
            if *tab == active {
                format!("[{}]", tab.label())
            } else {
                format!(" {} ", tab.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `M/D/YYYY`, or "No date".
pub fn format_date(date: Option<&NaiveDateTime>) -> String {
    match date {
        Some(d) => d.format("%-m/%-d/%Y").to_string(),
        None => "No date".to_string(),
    }
}

pub fn progress_bar(progress: u8) -> String {
    let progress = progress.min(100) as usize;
    let filled = progress * PROGRESS_WIDTH / 100;
    format!(
        "[{}{}] {progress}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

fn untitled(title: Option<&str>) -> &str {
    match title {
        Some(t) if !t.trim().is_empty() => t,
        _ => "Untitled",
    }
}

fn render_dashboard(state: &ViewState) -> String {
    let s = &state.summary;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Tasks      Total: {}  Completed: {}  Pending: {}",
        s.tasks.total, s.tasks.completed, s.tasks.pending
    );
    let _ = writeln!(
        out,
        "Goals      Total: {}  Active: {}  Completed: {}",
        s.goals.total, s.goals.active, s.goals.completed
    );
    let _ = writeln!(
        out,
        "Notes      Total: {}  Text: {}  Voice: {}",
        s.notes.total, s.notes.text, s.notes.voice
    );

    out.push_str("\nRecent Tasks\n");
    if s.tasks.recent.is_empty() {
        out.push_str("  No recent tasks\n");
    }
    for task in s.tasks.recent.iter().take(RECENT_LIMIT) {
        let _ = writeln!(out, "  {} ({})", task.title, task.status.as_str());
    }

    out.push_str("\nRecent Notes\n");
    if s.notes.recent.is_empty() {
        out.push_str("  No recent notes\n");
    }
    for note in s.notes.recent.iter().take(RECENT_LIMIT) {
        let _ = writeln!(
            out,
            "  {} ({})",
            untitled(note.title.as_deref()),
            note.note_type.as_str()
        );
    }
    out
}

fn render_chat(state: &ViewState) -> String {
    let mut out = String::new();
    for turn in &state.chat {
        let _ = writeln!(out, "you:   {}", turn.message);
        if let Some(response) = &turn.response {
            let _ = writeln!(out, "agent: {response}");
        }
        out.push('\n');
    }
    if state.loading {
        out.push_str("agent: Thinking...\n");
    }
    if out.is_empty() {
        out.push_str("No messages yet. Type to chat with Master Agent.\n");
    }
    out
}

fn render_tasks(state: &ViewState) -> String {
    let mut out = String::new();
    if state.tasks.is_empty() {
        out.push_str("No tasks.\n");
    }
    for task in &state.tasks {
        let _ = writeln!(out, "#{} {}", task.id, task.title);
        if let Some(desc) = task.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "    {desc}");
        }
        let _ = write!(out, "    [{}] [{}]", task.priority.as_str(), task.status.as_str());
        if task.due_date.is_some() {
            let _ = write!(out, " [due {}]", format_date(task.due_date.as_ref()));
        }
        out.push('\n');
    }
    out
}

fn render_goals(state: &ViewState) -> String {
    let mut out = String::new();
    if state.goals.is_empty() {
        out.push_str("No goals.\n");
    }
    for goal in &state.goals {
        let marker = if goal.status == GoalStatus::Completed { "✓" } else { "•" };
        let _ = writeln!(out, "#{} {} {} ({})", goal.id, marker, goal.title, goal.status.as_str());
        if let Some(desc) = goal.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "    {desc}");
        }
        let _ = writeln!(out, "    {}", progress_bar(goal.percent()));
        if goal.target_date.is_some() {
            let _ = writeln!(out, "    Target: {}", format_date(goal.target_date.as_ref()));
        }
    }
    out
}

fn render_notes(state: &ViewState) -> String {
    let mut out = String::new();
    if state.notes.is_empty() {
        out.push_str("No notes.\n");
    }
    for note in &state.notes {
        let kind = match note.note_type {
            ContentKind::Voice => "Voice",
            ContentKind::Text => "Text",
            ContentKind::Unknown => "Note",
        };
        let _ = writeln!(
            out,
            "#{} {} [{}] {}",
            note.id,
            untitled(note.title.as_deref()),
            kind,
            format_date(note.created_at.as_ref())
        );
        if let Some(content) = note.content.as_deref().filter(|c| !c.is_empty()) {
            let _ = writeln!(out, "    {content}");
        }
        if let Some(text) = note.transcription.as_deref().filter(|t| !t.is_empty()) {
            let _ = writeln!(out, "    Transcription: {text}");
        }
        if !note.tags.is_empty() {
            let _ = writeln!(out, "    tags: {}", note.tags.join(", "));
        }
    }
    out
}
