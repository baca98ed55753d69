//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: transfer and UI state machine
//! - [`Driver`]: platform-specific I/O
//! - [`Environment`]: wall clock and randomness
//!
//! It is a single task. Every suspension point (reading a file, handing a
//! frame to the channel, a clipboard write) is an `.await` inside
//! [`Runtime::process_actions`], so the app never sees two operations
//! interleave.

use ferry_core::{ClipboardExporter, Environment, TransferEvent};

use crate::{App, AppAction, AppEvent, Driver, FerryConfig};

/// Generic runtime that orchestrates App and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for time and randomness
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    env: E,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a new runtime. The blob scope of the session is drawn from
    /// `env`.
    pub fn new(driver: D, env: E, config: &FerryConfig) -> Self {
        let app = App::new(config, env.random_u64());
        Self { driver, app, env }
    }

    /// Run the main event loop.
    ///
    /// This is the core orchestration loop that:
    /// 1. Polls the driver for the next event (user intent or inbound frame)
    /// 2. Mirrors link state changes into the App
    /// 3. Executes App actions, feeding results back until none are left
    ///
    /// Returns when the App asks to quit or the driver's input closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        loop {
            if self.sync_connection().await? {
                break;
            }

            let Some(event) = self.driver.poll_event().await? else {
                tracing::debug!("input closed");
                break;
            };

            let actions = self.feed(event);
            if self.process_actions(actions).await? {
                break;
            }
        }

        self.app.clear_received();
        self.driver.stop();
        Ok(())
    }

    /// Handle one event to completion.
    ///
    /// Returns `true` if the App asked to quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn dispatch(&mut self, event: AppEvent) -> Result<bool, D::Error> {
        let actions = self.feed(event);
        self.process_actions(actions).await
    }

    fn feed(&mut self, event: AppEvent) -> Vec<AppAction> {
        self.app.handle(event, self.env.now())
    }

    /// Report a changed link state to the App.
    async fn sync_connection(&mut self) -> Result<bool, D::Error> {
        let status = self.driver.connection_status();
        if &status == self.app.connection_status() {
            return Ok(false);
        }
        self.dispatch(AppEvent::ConnectionChanged(status)).await
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Notify(notification) => self.driver.notify(&notification),
                    AppAction::Received(classified) => {
                        self.driver.received(&self.app, classified).await?;
                    },

                    AppAction::ReadFile { id, handle } => {
                        let event = match self.driver.read_file(&handle).await {
                            Ok(bytes) => TransferEvent::ContentRead { id, bytes },
                            Err(e) => {
                                tracing::warn!(
                                    %id,
                                    name = handle.name(),
                                    error = %e,
                                    "read failed"
                                );
                                TransferEvent::ReadFailed { id, reason: e.to_string() }
                            },
                        };
                        pending_actions.extend(self.feed(AppEvent::Transfer(event)));
                    },
                    AppAction::SendFile { id, frame } => {
                        let accepted = self.driver.send_frame(&frame).await;
                        let event = TransferEvent::SendCompleted { id, accepted };
                        pending_actions.extend(self.feed(AppEvent::Transfer(event)));
                    },
                    AppAction::SendText { frame } => {
                        let accepted = self.driver.send_frame(&frame).await;
                        let event = TransferEvent::TextSendCompleted { accepted };
                        pending_actions.extend(self.feed(AppEvent::Transfer(event)));
                    },

                    AppAction::ExportImage { target, reference, name } => {
                        let mut exporter =
                            ClipboardExporter::new(self.driver.clipboard(), self.app.blobs());
                        let outcome = exporter.export_image(&reference, &name).await;
                        pending_actions
                            .extend(self.feed(AppEvent::ExportCompleted { target, outcome }));
                    },
                    AppAction::ExportText { target, content } => {
                        let mut exporter =
                            ClipboardExporter::new(self.driver.clipboard(), self.app.blobs());
                        let outcome = exporter.export_text(&content).await;
                        pending_actions
                            .extend(self.feed(AppEvent::ExportCompleted { target, outcome }));
                    },
                }
            }
        }
        Ok(false)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }
}
