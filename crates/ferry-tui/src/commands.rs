//! Slash-command parsing for the input line.
//!
//! A line starting with `/` is a command; anything else is a text message.
//! `//` escapes a message that itself starts with a slash.

use std::path::PathBuf;

use ferry_app::AppEvent;
use ferry_core::{FileHandle, ItemId, RecordId};

use crate::mime;

/// Parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/add <path>...`: queue files.
    Add {
        /// Files to queue.
        paths: Vec<PathBuf>,
    },
    /// `/rm <id>`: remove a queued file.
    Remove {
        /// Queue item.
        id: ItemId,
    },
    /// `/send`: send everything queued.
    Send,
    /// `/copy <id>`: copy a received file.
    CopyFile {
        /// Received file record.
        record: RecordId,
    },
    /// `/copytext <id>`: copy a received message.
    CopyText {
        /// Received text record.
        record: RecordId,
    },
    /// `/quit`.
    Quit,
    /// Plain text to send.
    Message {
        /// Text, verbatim.
        content: String,
    },
    /// Command name not recognized.
    Unknown {
        /// Command as typed, without the slash.
        input: String,
    },
    /// Known command with bad arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// What was wrong.
        error: String,
    },
}

/// Parse one input line.
pub fn parse(line: &str) -> Command {
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Message { content: line.to_string() };
    };
    if rest.starts_with('/') {
        return Command::Message { content: rest.to_string() };
    }

    let mut words = rest.split_whitespace();
    let Some(name) = words.next() else {
        return Command::Unknown { input: String::new() };
    };
    let args: Vec<&str> = words.collect();

    match name {
        "add" | "a" => {
            if args.is_empty() {
                return invalid(name, "expected at least one path");
            }
            Command::Add { paths: args.into_iter().map(PathBuf::from).collect() }
        },
        "rm" => match single_id(name, &args) {
            Ok(id) => Command::Remove { id: ItemId::new(id) },
            Err(command) => command,
        },
        "send" | "s" => Command::Send,
        "copy" | "c" => match single_id(name, &args) {
            Ok(id) => Command::CopyFile { record: RecordId::new(id) },
            Err(command) => command,
        },
        "copytext" | "ct" => match single_id(name, &args) {
            Ok(id) => Command::CopyText { record: RecordId::new(id) },
            Err(command) => command,
        },
        "quit" | "q" => Command::Quit,
        _ => Command::Unknown { input: rest.to_string() },
    }
}

fn invalid(command: &str, error: impl Into<String>) -> Command {
    Command::InvalidArgs { command: command.to_string(), error: error.into() }
}

fn single_id(command: &str, args: &[&str]) -> Result<u64, Command> {
    let [arg] = args else {
        return Err(invalid(command, "expected one id"));
    };
    arg.trim_start_matches('#').parse().map_err(|_| invalid(command, format!("invalid id {arg}")))
}

impl Command {
    /// What pressing Enter on this command does, for the input line.
    pub fn preview(&self) -> String {
        match self {
            Self::Add { paths } if paths.len() == 1 => "queue 1 file".to_string(),
            Self::Add { paths } => format!("queue {} files", paths.len()),
            Self::Remove { id } => format!("remove #{id} from the queue"),
            Self::Send => "send the queue".to_string(),
            Self::CopyFile { record } => format!("copy file #{record}"),
            Self::CopyText { record } => format!("copy message #{record}"),
            Self::Quit => "quit".to_string(),
            Self::Message { content } => format!("send {} char message", content.chars().count()),
            Self::Unknown { input } => format!("unknown command /{input}"),
            Self::InvalidArgs { command, error } => format!("/{command}: {error}"),
        }
    }

    /// Command is well formed.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Unknown { .. } | Self::InvalidArgs { .. })
    }

    /// The app event this command requests.
    pub fn into_event(self) -> AppEvent {
        match self {
            Self::Add { paths } => AppEvent::FilesSelected {
                handles: paths
                    .into_iter()
                    .map(|path| {
                        let content_type = mime::content_type_for(&path);
                        FileHandle::from_path(path).with_content_type(content_type)
                    })
                    .collect(),
            },
            Self::Remove { id } => AppEvent::RemoveQueued { id },
            Self::Send => AppEvent::StartTransfer,
            Self::CopyFile { record } => AppEvent::ExportImage { record },
            Self::CopyText { record } => AppEvent::ExportText { record },
            Self::Quit => AppEvent::Quit,
            Self::Message { content } => AppEvent::SendText { content },
            Self::Unknown { input } => {
                AppEvent::Error { message: format!("unknown command: /{input}") }
            },
            Self::InvalidArgs { command, error } => {
                AppEvent::Error { message: format!("/{command}: {error}") }
            },
        }
    }
}
