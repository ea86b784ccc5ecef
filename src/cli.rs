//! CLI front end: stdin/stdout REPL over the dashboard.
//!
//! Lines starting with `/` are commands; anything else is a chat message.
//! The active tab is re-rendered to stdout after every command, prompts and
//! status lines go to stderr.

use std::io::BufRead;
use std::ops::ControlFlow;
use std::sync::Arc;

use futures::{StreamExt, stream};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::TaskStatus;
use crate::dashboard::forms::{parse_date, parse_progress, parse_tags};
use crate::dashboard::{Dashboard, GoalForm, NoteForm, Tab, TaskForm, render};
use crate::voice::VoiceRecorder;

pub const HELP: &str = "\
Commands:
  /dashboard | /chat | /tasks | /goals | /notes   switch tab
  /refresh                                        reload everything
  /task add <title> [| description [| low|medium|high [| YYYY-MM-DD]]]
  /task done <id>
  /task status <id> <pending|in_progress|completed>
  /task rm <id>
  /goal add <title> [| description [| YYYY-MM-DD]]
  /goal progress <id> <0-100>
  /goal rm <id>
  /note add <title> [| content [| tag,tag]]
  /note rm <id>
  /record                                         start/stop a voice note
  /help
  /quit
Anything else is sent to the agent as a chat message.";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Chat(String),
    ShowTab(Tab),
    Refresh,
    AddTask(TaskForm),
    SetTaskStatus { id: i64, status: TaskStatus },
    DeleteTask(i64),
    AddGoal(GoalForm),
    GoalProgress { id: i64, progress: u8 },
    DeleteGoal(i64),
    AddNote(NoteForm),
    DeleteNote(i64),
    ToggleRecording,
    Help,
    Quit,
    /// Malformed command, with a hint for the user.
    Invalid(String),
}

/// Parse one line of input.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Chat(line.to_string());
    };

    let (verb, args) = split_word(rest);
    match verb {
        "dashboard" => Command::ShowTab(Tab::Dashboard),
        "chat" => Command::ShowTab(Tab::Chat),
        "tasks" => Command::ShowTab(Tab::Tasks),
        "goals" => Command::ShowTab(Tab::Goals),
        "notes" => Command::ShowTab(Tab::Notes),
        "refresh" => Command::Refresh,
        "record" => Command::ToggleRecording,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "task" => parse_task(args),
        "goal" => parse_goal(args),
        "note" => parse_note(args),
        other => Command::Invalid(format!("Unknown command /{other}. Try /help")),
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (s, ""),
    }
}

/// Split `a | b | c` into trimmed fields.
fn fields(s: &str) -> Vec<&str> {
    s.split('|').map(str::trim).collect()
}

fn parse_id(s: &str, usage: &str) -> Result<i64, Command> {
    s.trim()
        .parse()
        .map_err(|_| Command::Invalid(format!("Expected a numeric id. Usage: {usage}")))
}

fn parse_task(args: &str) -> Command {
    let (sub, rest) = split_word(args);
    let result = match sub {
        "add" => {
            let f = fields(rest);
            let mut form = TaskForm::new(f[0]);
            if let Some(desc) = f.get(1) {
                form.description = desc.to_string();
            }
            if let Some(p) = f.get(2).filter(|p| !p.is_empty()) {
                match crate::api::Priority::parse(p) {
                    Some(priority) => form.priority = priority,
                    None => {
                        return Command::Invalid(format!(
                            "Unknown priority {p:?}; use low, medium or high"
                        ));
                    }
                }
            }
            if let Some(d) = f.get(3) {
                match parse_date(d) {
                    Ok(date) => form.due_date = date,
                    Err(_) => return Command::Invalid(format!("Bad due date {d:?}; use YYYY-MM-DD")),
                }
            }
            Ok(Command::AddTask(form))
        }
        "done" => parse_id(rest, "/task done <id>").map(|id| Command::SetTaskStatus {
            id,
            status: TaskStatus::Completed,
        }),
        "status" => {
            let (id, status) = split_word(rest);
            parse_id(id, "/task status <id> <status>").and_then(|id| {
                TaskStatus::parse(status)
                    .map(|status| Command::SetTaskStatus { id, status })
                    .ok_or_else(|| {
                        Command::Invalid(format!(
                            "Unknown status {status:?}; use pending, in_progress or completed"
                        ))
                    })
            })
        }
        "rm" | "delete" => parse_id(rest, "/task rm <id>").map(Command::DeleteTask),
        _ => Err(Command::Invalid("Usage: /task add|done|status|rm ...".into())),
    };
    result.unwrap_or_else(|invalid| invalid)
}

fn parse_goal(args: &str) -> Command {
    let (sub, rest) = split_word(args);
    let result = match sub {
        "add" => {
            let f = fields(rest);
            let mut form = GoalForm::new(f[0]);
            if let Some(desc) = f.get(1) {
                form.description = desc.to_string();
            }
            if let Some(d) = f.get(2) {
                match parse_date(d) {
                    Ok(date) => form.target_date = date,
                    Err(_) => {
                        return Command::Invalid(format!("Bad target date {d:?}; use YYYY-MM-DD"));
                    }
                }
            }
            Ok(Command::AddGoal(form))
        }
        "progress" => {
            let (id, value) = split_word(rest);
            parse_id(id, "/goal progress <id> <0-100>").and_then(|id| {
                parse_progress(value)
                    .map(|progress| Command::GoalProgress { id, progress })
                    .ok_or_else(|| Command::Invalid("Progress must be between 0 and 100".into()))
            })
        }
        "rm" | "delete" => parse_id(rest, "/goal rm <id>").map(Command::DeleteGoal),
        _ => Err(Command::Invalid("Usage: /goal add|progress|rm ...".into())),
    };
    result.unwrap_or_else(|invalid| invalid)
}

fn parse_note(args: &str) -> Command {
    let (sub, rest) = split_word(args);
    match sub {
        "add" => {
            let f = fields(rest);
            Command::AddNote(NoteForm {
                title: f[0].to_string(),
                content: f.get(1).map(|s| s.to_string()).unwrap_or_default(),
                tags: f.get(2).map(|s| parse_tags(s)).unwrap_or_default(),
            })
        }
        "rm" | "delete" => parse_id(rest, "/note rm <id>")
            .map(Command::DeleteNote)
            .unwrap_or_else(|invalid| invalid),
        _ => Command::Invalid("Usage: /note add|rm ...".into()),
    }
}

/// Interactive session over a [`Dashboard`].
pub struct Cli {
    dashboard: Arc<Dashboard>,
    recorder: Option<VoiceRecorder>,
}

impl Cli {
    pub fn new(dashboard: Arc<Dashboard>, recorder: Option<VoiceRecorder>) -> Self {
        Self {
            dashboard,
            recorder,
        }
    }

    /// Read commands from stdin until EOF or `/quit`.
    pub async fn run(self) {
        self.run_with(spawn_stdin_reader()).await;
    }

    /// Drive the session from a channel of input lines. Returns on `/quit`
    /// or once every sender is gone.
    pub async fn run_with(mut self, rx: mpsc::UnboundedReceiver<String>) {
        let mut input = Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|line| (line, rx))
        }));

        self.print_view().await;
        eprint!("> ");

        while let Some(line) = input.next().await {
            if line.trim().is_empty() {
                eprint!("> ");
                continue;
            }
            if self.execute(parse_command(&line)).await.is_break() {
                break;
            }
            eprint!("> ");
        }

        if let Some(recorder) = self.recorder.as_mut().filter(|r| r.is_recording()) {
            // Release the device even though nothing will be uploaded.
            let _ = recorder.stop();
        }
        info!("CLI session ended");
    }

    /// Apply one command and re-render.
    pub async fn execute(&mut self, command: Command) -> ControlFlow<()> {
        let dash = Arc::clone(&self.dashboard);
        match command {
            Command::Quit => return ControlFlow::Break(()),
            Command::Help => {
                eprintln!("{HELP}");
                return ControlFlow::Continue(());
            }
            Command::Invalid(hint) => {
                eprintln!("{hint}");
                return ControlFlow::Continue(());
            }
            Command::Chat(message) => {
                dash.set_tab(Tab::Chat).await;
                eprintln!("Thinking...");
                dash.send_message(&message).await;
            }
            Command::ShowTab(tab) => dash.set_tab(tab).await,
            Command::Refresh => dash.load_all().await,
            Command::AddTask(form) => {
                dash.set_tab(Tab::Tasks).await;
                dash.create_task(form).await;
            }
            Command::SetTaskStatus { id, status } => {
                dash.set_tab(Tab::Tasks).await;
                dash.update_task_status(id, status).await;
            }
            Command::DeleteTask(id) => {
                dash.set_tab(Tab::Tasks).await;
                dash.delete_task(id).await;
            }
            Command::AddGoal(form) => {
                dash.set_tab(Tab::Goals).await;
                dash.create_goal(form).await;
            }
            Command::GoalProgress { id, progress } => {
                dash.set_tab(Tab::Goals).await;
                dash.update_goal_progress(id, progress).await;
            }
            Command::DeleteGoal(id) => {
                dash.set_tab(Tab::Goals).await;
                dash.delete_goal(id).await;
            }
            Command::AddNote(form) => {
                dash.set_tab(Tab::Notes).await;
                dash.create_note(form).await;
            }
            Command::DeleteNote(id) => {
                dash.set_tab(Tab::Notes).await;
                dash.delete_note(id).await;
            }
            Command::ToggleRecording => {
                dash.set_tab(Tab::Notes).await;
                self.toggle_recording().await;
            }
        }
        self.print_view().await;
        ControlFlow::Continue(())
    }

    async fn toggle_recording(&mut self) {
        let Some(recorder) = self.recorder.as_mut() else {
            warn!("No audio source configured");
            eprintln!("⚠️  Failed to access microphone. Please check permissions.");
            return;
        };

        if !recorder.is_recording() {
            match recorder.start() {
                Ok(()) => eprintln!("🎙  Recording... /record again to stop"),
                Err(e) => eprintln!("⚠️  {}", e.alert_message()),
            }
            return;
        }

        match recorder.stop() {
            Ok(Some(clip)) => {
                eprintln!("Uploading voice note...");
                self.dashboard.upload_voice_note(clip).await;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Discarding recording");
                eprintln!("⚠️  {}", e.discard_message());
            }
        }
    }

    async fn print_view(&self) {
        let state = self.dashboard.snapshot().await;
        println!("\n{}", render::render(&state));
    }
}

/// Forward stdin lines from a plain OS thread. A blocking read there never
/// holds up runtime shutdown after `/quit`.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}
