//! Interactive terminal front-end for [`App`].

use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::{App, Dialog, DialogKind, Event};

const HELP: &str = "\
Commands:
  connect        authenticate with YouTube
  load           load your playlists
  list           show loaded playlists
  select <n>     pick the playlist to shuffle
  name <text>    name of the new playlist
  shuffle        shuffle the selected playlist into a new one
  status         show the current state
  help           show this help
  quit           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Load,
    List,
    /// 1-based, as shown by `list`.
    Select(usize),
    Name(String),
    Shuffle,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "connect" => Command::Connect,
        "load" => Command::Load,
        "list" | "ls" => Command::List,
        "select" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Select(n),
            _ => return Err(format!("Usage: select <n>, got '{}'", rest)),
        },
        "name" => Command::Name(rest.to_string()),
        "shuffle" => Command::Shuffle,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("Unknown command '{}'; type 'help'", other)),
    };

    Ok(Some(command))
}

pub fn render_dialog<W: Write>(out: &mut W, dialog: &Dialog) -> io::Result<()> {
    let marker = match dialog.kind {
        DialogKind::Info => "i",
        DialogKind::Warning => "!",
        DialogKind::Error => "x",
    };
    writeln!(out, "+-[{}] {} ", marker, dialog.title)?;
    for line in dialog.message.lines() {
        writeln!(out, "| {}", line)?;
    }
    writeln!(out, "+-----")
}

pub fn render_event<W: Write>(out: &mut W, event: &Event) -> io::Result<()> {
    match event {
        Event::Log(line) => writeln!(out, "{}", line),
        Event::Dialog(dialog) => render_dialog(out, dialog),
        Event::Busy(true) => writeln!(out, "(working...)"),
        _ => Ok(()),
    }
}

fn render_status<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    let controls = app.controls();
    writeln!(out, "Status: {}{}", app.status(), if app.is_busy() { " (busy)" } else { "" })?;
    match app.selected_playlist() {
        Some(playlist) => writeln!(out, "Selected: {}", playlist)?,
        None => writeln!(out, "Selected: none")?,
    }
    writeln!(out, "New playlist name: {}", if app.new_name().is_empty() { "<unset>" } else { app.new_name() })?;
    writeln!(
        out,
        "Available: connect{}{}",
        if controls.load_playlists { ", load" } else { "" },
        if controls.shuffle { ", shuffle" } else { "" }
    )
}

fn render_playlists<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    if app.playlists().is_empty() {
        return writeln!(out, "No playlists loaded");
    }
    for (i, playlist) in app.playlists().iter().enumerate() {
        let marker = if app.selected() == Some(i) { '*' } else { ' ' };
        writeln!(out, "{} {:>3}. {}", marker, i + 1, playlist)?;
    }
    Ok(())
}

/// Runs one command against the app. Worker threads are detached; their progress
/// arrives later as events.
pub fn execute<W: Write>(app: &mut App, command: Command, out: &mut W) -> io::Result<Flow> {
    let rejected = match command {
        Command::Connect => {
            app.connect();
            None
        }
        Command::Load => app.load_playlists().err(),
        Command::Shuffle => app.shuffle_and_create().err(),
        Command::List => {
            render_playlists(out, app)?;
            None
        }
        Command::Select(n) => match app.select(n - 1) {
            Ok(()) => {
                if let Some(playlist) = app.selected_playlist() {
                    writeln!(out, "Selected {}", playlist)?;
                }
                None
            }
            Err(dialog) => Some(dialog),
        },
        Command::Name(name) => {
            app.set_new_name(name);
            None
        }
        Command::Status => {
            render_status(out, app)?;
            None
        }
        Command::Help => {
            writeln!(out, "{}", HELP)?;
            None
        }
        Command::Quit => return Ok(Flow::Quit),
    };

    if let Some(dialog) = rejected {
        render_dialog(out, &dialog)?;
    }
    Ok(Flow::Continue)
}

/// Multiplexes stdin commands with worker events until `quit` or end of input.
pub async fn run(mut app: App, mut events: UnboundedReceiver<Event>) -> io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = io::stdout();

    writeln!(out, "YouTube Playlist Shuffler")?;
    writeln!(out, "{}", HELP)?;
    render_status(&mut out, &app)?;

    loop {
        out.flush()?;

        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                match parse_command(&line) {
                    Ok(Some(command)) => {
                        if execute(&mut app, command, &mut out)? == Flow::Quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => writeln!(out, "{}", message)?,
                }
            }
            Some(event) = events.recv() => {
                app.apply(&event);
                render_event(&mut out, &event)?;
            }
        }
    }

    if app.is_busy() {
        tracing::info!("Exiting while a task is still running");
    }
    Ok(())
}
