//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The peer link is a TCP
//! [`Link`]; exports go through the [`SystemClipboard`].

use std::{
    collections::VecDeque,
    io::{self, Stdout, stdout},
    net::SocketAddr,
    path::PathBuf,
    time::Duration,
};

use bytes::Bytes;
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ferry_app::{App, AppEvent, ConnectionStatus, Driver, read_handle};
use ferry_core::{Classified, FileHandle, Notification};
use ferry_proto::TransferFrame;
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::{net::TcpStream, task::JoinHandle};

use crate::{
    InputState, KeyInput, SystemClipboard,
    link::{self, Link, LinkError, LinkMode},
    save::save_received,
    ui,
};

const TICK_INTERVAL: Duration = Duration::from_millis(250);

type Dialed = Result<(TcpStream, SocketAddr), LinkError>;

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Link error.
    #[error("link error: {0}")]
    Link(#[from] LinkError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), the TCP link to
/// the peer and the system clipboard. Owns the input state for text editing.
///
/// In listen mode a new peer is accepted whenever the current one goes
/// away. In connect mode the peer is dialed once.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    input: InputState,
    mode: LinkMode,
    link: Option<Link>,
    dialing: Option<JoinHandle<Dialed>>,
    status: ConnectionStatus,
    clipboard: SystemClipboard,
    save_dir: Option<PathBuf>,
    /// Events produced outside `poll_event`, delivered before new input.
    pending: VecDeque<AppEvent>,
}

impl TerminalDriver {
    /// Create a new terminal driver and start establishing the link.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be set up.
    pub fn new(mode: LinkMode, save_dir: Option<PathBuf>) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let clipboard = SystemClipboard::detect();

        let mut driver = Self {
            terminal,
            event_stream: EventStream::new(),
            input: InputState::new(),
            mode,
            link: None,
            dialing: None,
            status: ConnectionStatus::Disconnected,
            clipboard,
            save_dir,
            pending: VecDeque::new(),
        };
        driver.dial();
        Ok(driver)
    }

    /// Start establishing the link in the background.
    fn dial(&mut self) {
        tracing::info!(mode = %self.mode, "establishing link");
        self.status = ConnectionStatus::Connecting;
        self.dialing = Some(tokio::spawn(link::establish(self.mode.clone())));
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        // Raw mode swallows SIGINT.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(AppEvent::Quit);
        }
        Self::convert_key(key.code).and_then(|key| self.input.handle_key(key))
    }

    fn on_dialed(&mut self, dialed: Dialed) -> AppEvent {
        match dialed {
            Ok((stream, peer)) => {
                tracing::info!(%peer, "peer connected");
                self.link = Some(Link::new(stream, peer));
                self.status = ConnectionStatus::Connected { peer: peer.to_string() };
                AppEvent::Tick
            },
            Err(e) => {
                tracing::warn!(mode = %self.mode, error = %e, "link failed");
                self.status = ConnectionStatus::Disconnected;
                AppEvent::Error { message: format!("link failed: {e}") }
            },
        }
    }

    fn on_link_closed(&mut self) {
        if let Some(link) = self.link.take() {
            tracing::info!(peer = %link.peer(), "peer disconnected");
        }
        self.status = ConnectionStatus::Disconnected;
        if matches!(self.mode, LinkMode::Listen(_)) {
            self.dial();
        }
    }
}

async fn next_inbound(link: &mut Option<Link>) -> Option<TransferFrame> {
    match link {
        Some(link) => link.recv().await,
        None => std::future::pending().await,
    }
}

async fn dialed(dialing: &mut Option<JoinHandle<Dialed>>) -> Dialed {
    match dialing {
        Some(handle) => match handle.await {
            Ok(dialed) => dialed,
            Err(e) => Err(LinkError::Io(io::Error::other(e))),
        },
        None => std::future::pending().await,
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Clipboard = SystemClipboard;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }

        loop {
            tokio::select! {
                biased;

                // Terminal events
                maybe_event = self.event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            if let Some(event) = self.on_key(key) {
                                return Ok(Some(event));
                            }
                        },
                        Some(Ok(Event::Resize(..))) => return Ok(Some(AppEvent::Tick)),
                        Some(Ok(_)) => {},
                        Some(Err(e)) => return Err(TerminalError::Io(e)),
                        None => return Ok(None),
                    }
                }

                // Peer frames
                maybe_frame = next_inbound(&mut self.link) => {
                    match maybe_frame {
                        Some(frame) => return Ok(Some(AppEvent::FrameReceived(frame))),
                        None => {
                            self.on_link_closed();
                            return Ok(Some(AppEvent::Tick));
                        },
                    }
                }

                // Link established or failed
                result = dialed(&mut self.dialing) => {
                    self.dialing = None;
                    return Ok(Some(self.on_dialed(result)));
                }

                // Tick timeout
                () = tokio::time::sleep(TICK_INTERVAL) => {
                    return Ok(Some(AppEvent::Tick));
                }
            }
        }
    }

    async fn read_file(&mut self, handle: &FileHandle) -> io::Result<Bytes> {
        read_handle(handle).await
    }

    async fn send_frame(&mut self, frame: &TransferFrame) -> bool {
        let Some(link) = self.link.as_mut() else {
            tracing::debug!(kind = %frame.kind(), "no link, frame rejected");
            return false;
        };
        match link.send(frame).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(peer = %link.peer(), error = %e, "send failed");
                false
            },
        }
    }

    fn connection_status(&self) -> ConnectionStatus {
        self.status.clone()
    }

    fn clipboard(&mut self) -> &mut Self::Clipboard {
        &mut self.clipboard
    }

    async fn received(&mut self, app: &App, classified: Classified) -> Result<(), Self::Error> {
        if let Some(summary) = app.describe(classified) {
            tracing::debug!(%summary, "recorded");
        }
        let Classified::File(id) = classified else {
            return Ok(());
        };
        let (Some(dir), Some(record)) = (self.save_dir.as_deref(), app.files().get(id)) else {
            return Ok(());
        };
        let blob = match app.blobs().resolve(&record.reference) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(%id, error = %e, "received file not resolvable");
                return Ok(());
            },
        };

        match save_received(dir, &record.name, &blob.bytes).await {
            Ok(path) => tracing::info!(%id, path = %path.display(), "received file saved"),
            Err(e) => {
                tracing::warn!(%id, name = %record.name, error = %e, "save failed");
                let message = format!("could not save {}: {e}", record.name);
                self.pending.push_back(AppEvent::Error { message });
            },
        }
        Ok(())
    }

    fn notify(&mut self, notification: &Notification) {
        tracing::info!(
            level = %notification.level,
            message = %notification.message,
            "notification"
        );
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, app, &self.input);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.dialing.take() {
            handle.abort();
        }
        if let Some(link) = self.link.take() {
            link.stop();
        }
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
