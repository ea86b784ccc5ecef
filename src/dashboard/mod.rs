//! Dashboard view: local state, form drafts, the controller that keeps them
//! in sync with the backend, and the text renderer.

pub mod controller;
pub mod forms;
pub mod render;
pub mod state;

pub use controller::Dashboard;
pub use forms::{GoalForm, NoteForm, TaskForm};
pub use state::{Tab, ViewState};
