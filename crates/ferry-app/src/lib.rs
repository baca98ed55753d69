//! Application layer for Ferry
//!
//! Pure state machine and generic runtime for transfer orchestration,
//! enabling deterministic testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI contract (queue, progress, ledgers, entry points)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`FerryConfig`]: Application settings

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod config;
mod driver;
mod event;
mod io;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use config::{DEFAULT_NOTIFICATION_HISTORY, FerryConfig};
pub use driver::Driver;
pub use event::AppEvent;
pub use io::read_handle;
pub use runtime::Runtime;
pub use state::{ConnectionStatus, ExportTarget};
