//! Terminal UI for Ferry
//!
//! A thin shell over [`ferry_app::Driver`] that provides terminal-specific
//! I/O: keyboard input and rendering, the TCP link to the peer, the system
//! clipboard and saving received files. All orchestration logic lives in the
//! generic [`ferry_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod clipboard;
pub mod commands;
pub mod input;
pub mod link;
pub mod mime;
pub mod save;
pub mod terminal;
pub mod ui;

pub use clipboard::SystemClipboard;
pub use commands::Command;
pub use ferry_app::{App, AppAction, AppEvent, Driver, FerryConfig, Runtime};
pub use input::{InputState, KeyInput};
pub use link::{Link, LinkError, LinkMode};
pub use terminal::{TerminalDriver, TerminalError};
