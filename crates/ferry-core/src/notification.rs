//! User-facing notifications.

use std::fmt::{self, Write as _};

use crate::{clipboard::ExportOutcome, error::TransferError, executor::Progress};

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Neutral information.
    Info,
    /// Operation completed.
    Success,
    /// Operation completed in a degraded way.
    Warning,
    /// Operation failed.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Warning => "warn",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: Level,
    /// Human-readable text.
    pub message: String,
}

impl Notification {
    /// Notification with the given level and message.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }

    /// A file of the running pass was sent.
    pub fn sent(name: &str, progress: Progress) -> Self {
        let Progress { completed, total } = progress;
        Self::new(
            Level::Info,
            format!("sent {name} ({completed}/{total}, {:.0}%)", progress.percent()),
        )
    }

    /// The pass completed.
    pub fn finished(sent: usize) -> Self {
        match sent {
            0 => Self::new(Level::Info, "nothing to send"),
            1 => Self::new(Level::Success, "1 file sent"),
            n => Self::new(Level::Success, format!("{n} files sent")),
        }
    }

    /// The pass stopped at a failure.
    pub fn aborted(error: &TransferError, retained: usize) -> Self {
        let mut note = Self::from(error);
        if retained > 0 {
            let _ = write!(note.message, " ({retained} left in queue)");
        }
        note
    }

    /// Text send result.
    pub fn text_sent() -> Self {
        Self::new(Level::Success, "message sent")
    }

    /// Outcome of an image export.
    pub fn image_export(outcome: &ExportOutcome, name: &str) -> Self {
        match outcome {
            ExportOutcome::Copied => {
                Self::new(Level::Success, format!("copied {name} to clipboard"))
            },
            ExportOutcome::Unsupported => {
                Self::new(Level::Warning, "clipboard is not supported on this platform")
            },
            ExportOutcome::DegradedFallback => Self::new(
                Level::Warning,
                format!("could not copy {name} directly, opened it for manual copy"),
            ),
            ExportOutcome::Failed { reason } => {
                Self::new(Level::Error, format!("failed to copy {name}: {reason}"))
            },
        }
    }

    /// Outcome of a text export.
    pub fn text_export(outcome: &ExportOutcome) -> Self {
        match outcome {
            ExportOutcome::Copied => Self::new(Level::Success, "copied message to clipboard"),
            ExportOutcome::Unsupported => {
                Self::new(Level::Warning, "clipboard is not supported on this platform")
            },
            ExportOutcome::DegradedFallback => {
                Self::new(Level::Warning, "message opened for manual copy")
            },
            ExportOutcome::Failed { reason } => {
                Self::new(Level::Error, format!("failed to copy message: {reason}"))
            },
        }
    }
}

impl From<&TransferError> for Notification {
    fn from(error: &TransferError) -> Self {
        let mut message = error.to_string();
        if error.is_connection_issue() {
            message.push_str(", check the connection");
        }
        Self::new(Level::Error, message)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_outcomes_map_to_distinct_notifications() {
        let outcomes = [
            ExportOutcome::Copied,
            ExportOutcome::Unsupported,
            ExportOutcome::DegradedFallback,
            ExportOutcome::Failed { reason: "boom".into() },
        ];

        let notes: Vec<Notification> =
            outcomes.iter().map(|o| Notification::image_export(o, "cat.png")).collect();

        for (i, a) in notes.iter().enumerate() {
            for b in &notes[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(notes[0].level, Level::Success);
        assert_eq!(notes[2].level, Level::Warning);
        assert_eq!(notes[3].level, Level::Error);
    }

    #[test]
    fn rejected_send_tells_user_to_check_connection() {
        let note =
            Notification::aborted(&TransferError::SendRejected { name: "a.txt".into() }, 2);

        assert_eq!(note.level, Level::Error);
        assert!(note.message.contains("connection"));
        assert!(note.message.contains("2 left"));
    }

    #[test]
    fn local_failure_does_not_blame_connection() {
        let error = TransferError::Read { name: "a.txt".into(), reason: "denied".into() };
        let note = Notification::aborted(&error, 1);

        assert_eq!(note.message, "could not read a.txt: denied (1 left in queue)");
    }

    #[test]
    fn rejected_text_tells_user_to_check_connection() {
        let note = Notification::from(&TransferError::TextRejected);
        assert_eq!(note.message, "failed to send message, check the connection");
    }

    #[test]
    fn progress_notification_names_file() {
        let note = Notification::sent("a.txt", Progress { completed: 1, total: 2 });
        assert_eq!(note.message, "sent a.txt (1/2, 50%)");
    }
}
