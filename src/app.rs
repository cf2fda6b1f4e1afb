//! UI-agnostic controller behind the shell.
//!
//! Every user action runs on its own worker thread, which drives the async work on the shared
//! tokio runtime and reports back through an event channel. The UI loop owns the `App`, feeds
//! every received event to [`App::apply`] and renders it; no state is shared with workers
//! beyond the channel and the `Arc`-held manager.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::config::Config;
use crate::manager::{ManagerError, PlaylistManager, ShuffleOutcome};
use crate::models::Playlist;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    NotConnected,
    Connecting,
    Connected,
    Failed,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionStatus::NotConnected => "Not connected",
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Failed => "Connection failed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
}

impl Dialog {
    pub fn info(message: impl Into<String>) -> Self {
        Dialog { kind: DialogKind::Info, title: "Success".into(), message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Dialog { kind: DialogKind::Warning, title: "Warning".into(), message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Dialog { kind: DialogKind::Error, title: "Error".into(), message: message.into() }
    }
}

/// Sent by worker threads to the UI loop.
pub enum Event {
    /// A line for the log panel.
    Log(String),
    Busy(bool),
    Connected(Arc<PlaylistManager>),
    ConnectionFailed(String),
    PlaylistsLoaded(Vec<Playlist>),
    Finished(ShuffleOutcome),
    Dialog(Dialog),
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Log(line) => f.debug_tuple("Log").field(line).finish(),
            Event::Busy(busy) => f.debug_tuple("Busy").field(busy).finish(),
            Event::Connected(_) => f.write_str("Connected"),
            Event::ConnectionFailed(e) => f.debug_tuple("ConnectionFailed").field(e).finish(),
            Event::PlaylistsLoaded(p) => f.debug_tuple("PlaylistsLoaded").field(p).finish(),
            Event::Finished(o) => f.debug_tuple("Finished").field(o).finish(),
            Event::Dialog(d) => f.debug_tuple("Dialog").field(d).finish(),
        }
    }
}

/// Which actions the UI should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub connect: bool,
    pub load_playlists: bool,
    pub shuffle: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Controls { connect: true, load_playlists: false, shuffle: false }
    }
}

/// Runs `task` to completion on a fresh thread, driving it with the runtime behind `runtime`.
fn spawn_worker<F, Fut>(runtime: &Handle, task: F) -> JoinHandle<()>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()>,
{
    let runtime = runtime.clone();
    std::thread::spawn(move || runtime.block_on(task()))
}

struct Reporter {
    tx: UnboundedSender<Event>,
}

impl Reporter {
    fn send(&self, event: Event) {
        // The UI may already be gone; workers just finish quietly then.
        let _ = self.tx.send(event);
    }

    fn log(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!("{}", line);
        self.send(Event::Log(line));
    }

    fn fail(&self, log_prefix: &str, dialog_prefix: &str, error: impl fmt::Display) {
        tracing::error!("{}: {}", log_prefix, error);
        self.send(Event::Log(format!("{}: {}", log_prefix, error)));
        self.send(Event::Dialog(Dialog::error(format!("{}: {}", dialog_prefix, error))));
    }
}

pub struct App {
    config: Arc<Config>,
    runtime: Handle,
    events: UnboundedSender<Event>,
    manager: Option<Arc<PlaylistManager>>,
    playlists: Vec<Playlist>,
    selected: Option<usize>,
    new_name: String,
    status: ConnectionStatus,
    controls: Controls,
    busy: bool,
}

impl App {
    pub fn new(config: Config, runtime: Handle) -> (App, UnboundedReceiver<Event>) {
        let (tx, rx) = unbounded_channel();
        let app = App {
            config: Arc::new(config),
            runtime,
            events: tx,
            manager: None,
            playlists: Vec::new(),
            selected: None,
            new_name: String::new(),
            status: ConnectionStatus::NotConnected,
            controls: Controls::default(),
            busy: false,
        };
        (app, rx)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_playlist(&self) -> Option<&Playlist> {
        self.selected.and_then(|i| self.playlists.get(i))
    }

    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    pub fn set_new_name(&mut self, name: impl Into<String>) {
        self.new_name = name.into();
    }

    pub fn select(&mut self, index: usize) -> Result<(), Dialog> {
        if index >= self.playlists.len() {
            return Err(Dialog::warning(format!("There is no playlist number {}", index + 1)));
        }
        self.selected = Some(index);
        Ok(())
    }

    fn reporter(&self) -> Reporter {
        Reporter { tx: self.events.clone() }
    }

    pub fn connect(&mut self) -> JoinHandle<()> {
        self.status = ConnectionStatus::Connecting;

        let config = self.config.clone();
        let reporter = self.reporter();

        spawn_worker(&self.runtime, move || async move {
            reporter.send(Event::Busy(true));
            reporter.log("Connecting to YouTube...");

            match PlaylistManager::connect(&config).await {
                Ok(manager) => {
                    reporter.send(Event::Connected(Arc::new(manager)));
                    reporter.log("Successfully connected to YouTube!");
                }
                Err(e) => {
                    reporter.send(Event::ConnectionFailed(e.to_string()));
                    reporter.fail("Authentication failed", "Authentication failed", e);
                }
            }

            reporter.send(Event::Busy(false));
        })
    }

    pub fn load_playlists(&mut self) -> Result<JoinHandle<()>, Dialog> {
        let manager = match (&self.manager, self.controls.load_playlists) {
            (Some(manager), true) => manager.clone(),
            _ => return Err(Dialog::warning("Connect to YouTube first")),
        };
        let reporter = self.reporter();

        Ok(spawn_worker(&self.runtime, move || async move {
            reporter.send(Event::Busy(true));
            reporter.log("Loading playlists...");

            match manager.get_user_playlists().await {
                Ok(playlists) => {
                    if playlists.is_empty() {
                        reporter.log("No playlists found");
                    } else {
                        reporter.log(format!("Loaded {} playlists", playlists.len()));
                    }
                    reporter.send(Event::PlaylistsLoaded(playlists));
                }
                Err(e) => reporter.fail("Error loading playlists", "Failed to load playlists", e),
            }

            reporter.send(Event::Busy(false));
        }))
    }

    /// Validates the selection and name on the calling thread, then runs the whole
    /// fetch, shuffle, create and insert sequence on a worker.
    pub fn shuffle_and_create(&mut self) -> Result<JoinHandle<()>, Dialog> {
        let source = match self.selected_playlist() {
            Some(playlist) => playlist.clone(),
            None => return Err(Dialog::warning("Please select a playlist")),
        };

        let new_name = self.new_name.trim().to_string();
        if new_name.is_empty() {
            return Err(Dialog::warning("Please enter a name for the new playlist"));
        }

        let manager = match (&self.manager, self.controls.shuffle) {
            (Some(manager), true) => manager.clone(),
            _ => return Err(Dialog::warning("Connect to YouTube and load playlists first")),
        };
        let reporter = self.reporter();

        Ok(spawn_worker(&self.runtime, move || async move {
            reporter.send(Event::Busy(true));

            let result = manager
                .shuffle_into_new_playlist(&source, &new_name, |progress| reporter.log(progress.to_string()))
                .await;

            match result {
                Ok(outcome) => {
                    for failure in &outcome.report.failed {
                        reporter.log(format!(
                            "Video {} ({}) was not added: {}",
                            failure.position, failure.video_id, failure.error
                        ));
                    }
                    reporter.log(format!(
                        "Success! Added {}/{} videos to new playlist",
                        outcome.report.added, outcome.total
                    ));
                    reporter.send(Event::Dialog(Dialog::info(format!(
                        "Created playlist '{}' with {} videos!",
                        outcome.title, outcome.report.added
                    ))));
                    reporter.send(Event::Finished(outcome));
                }
                Err(ManagerError::EmptyPlaylist(_)) => reporter.log("No videos found in playlist"),
                Err(e) => reporter.fail("Error", "Operation failed", e),
            }

            reporter.send(Event::Busy(false));
        }))
    }

    /// Folds a worker event into the UI state.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Log(_) | Event::Dialog(_) | Event::Finished(_) => {}
            Event::Busy(busy) => self.busy = *busy,
            Event::Connected(manager) => {
                self.manager = Some(manager.clone());
                self.status = ConnectionStatus::Connected;
                self.controls.load_playlists = true;
            }
            Event::ConnectionFailed(_) => {
                self.status = ConnectionStatus::Failed;
            }
            Event::PlaylistsLoaded(playlists) => {
                self.playlists = playlists.clone();
                if self.playlists.is_empty() {
                    self.selected = None;
                    self.controls.shuffle = false;
                } else {
                    self.selected = Some(0);
                    self.controls.shuffle = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(id: &str, title: &str, count: u32) -> Playlist {
        Playlist { id: id.into(), title: title.into(), video_count: count }
    }

    fn app() -> (tokio::runtime::Runtime, App, UnboundedReceiver<Event>) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (app, rx) = App::new(Config::default(), runtime.handle().clone());
        (runtime, app, rx)
    }

    #[test]
    fn starts_with_only_connect_enabled() {
        let (_rt, app, _rx) = app();
        assert_eq!(app.status(), ConnectionStatus::NotConnected);
        assert_eq!(app.status().to_string(), "Not connected");
        assert_eq!(app.controls(), Controls { connect: true, load_playlists: false, shuffle: false });
        assert!(!app.is_busy());
    }

    #[test]
    fn load_requires_connection() {
        let (_rt, mut app, _rx) = app();
        let dialog = app.load_playlists().unwrap_err();
        assert_eq!(dialog.kind, DialogKind::Warning);
    }

    #[test]
    fn shuffle_validates_selection_then_name() {
        let (_rt, mut app, _rx) = app();
        assert_eq!(app.shuffle_and_create().unwrap_err().message, "Please select a playlist");

        app.apply(&Event::PlaylistsLoaded(vec![playlist("PL1", "Road trip", 12)]));
        app.set_new_name("   ");
        assert_eq!(
            app.shuffle_and_create().unwrap_err().message,
            "Please enter a name for the new playlist"
        );
    }

    #[test]
    fn loaded_playlists_select_first_and_enable_shuffle() {
        let (_rt, mut app, _rx) = app();
        app.apply(&Event::PlaylistsLoaded(vec![playlist("PL1", "A", 1), playlist("PL2", "B", 2)]));

        assert_eq!(app.selected(), Some(0));
        assert!(app.controls().shuffle);
        assert_eq!(app.selected_playlist().map(|p| p.id.as_str()), Some("PL1"));

        app.select(1).unwrap();
        assert_eq!(app.selected_playlist().map(|p| p.to_string()), Some("B (2 videos)".to_string()));
        assert!(app.select(2).is_err());

        app.apply(&Event::PlaylistsLoaded(Vec::new()));
        assert_eq!(app.selected(), None);
        assert!(!app.controls().shuffle);
    }

    #[test]
    fn busy_and_failure_events_update_state() {
        let (_rt, mut app, _rx) = app();
        app.apply(&Event::Busy(true));
        assert!(app.is_busy());
        app.apply(&Event::ConnectionFailed("no credentials".into()));
        assert_eq!(app.status(), ConnectionStatus::Failed);
        assert!(!app.controls().load_playlists);
    }

    #[test]
    fn connect_without_client_secrets_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let config = Config {
            client_secrets: dir.path().join("credentials.json"),
            token_cache: dir.path().join("token.json"),
            open_browser: false,
            ..Config::default()
        };
        let (mut app, mut rx) = App::new(config, runtime.handle().clone());

        app.connect().join().unwrap();
        assert_eq!(app.status(), ConnectionStatus::Connecting);

        let mut dialogs = Vec::new();
        while let Ok(event) = rx.try_recv() {
            app.apply(&event);
            if let Event::Dialog(dialog) = event {
                dialogs.push(dialog);
            }
        }

        assert_eq!(app.status(), ConnectionStatus::Failed);
        assert!(!app.is_busy());
        assert_eq!(dialogs.len(), 1);
        assert_eq!(dialogs[0].kind, DialogKind::Error);
        assert!(dialogs[0].message.starts_with("Authentication failed"));
    }
}
