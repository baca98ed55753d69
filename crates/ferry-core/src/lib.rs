//! Ferry core
//!
//! Transfer orchestration for a peer-to-peer file and text link. Outgoing
//! files are queued and sent one at a time; incoming frames are classified
//! into ledgers of received files and texts; received images can be exported
//! to the platform clipboard.
//!
//! # Architecture
//!
//! Sans-IO throughout. The [`TransferExecutor`] receives events
//! ([`TransferEvent`]), advances its state machine, and returns actions
//! ([`TransferAction`]) for the caller to execute: reading file content and
//! handing frames to the channel happen outside this crate. The
//! [`InboundClassifier`] is a plain synchronous router. The only async seams
//! are [`Clipboard`] and [`BlobSource`], both traits the caller implements.
//!
//! # Components
//!
//! - [`OutboundQueue`]: ordered files waiting to be sent
//! - [`TransferExecutor`]: sequential, fail-fast send pass
//! - [`InboundClassifier`]: routes inbound frames into [`Ledger`]s
//! - [`BlobStore`]: reference-counted table of received payloads
//! - [`ClipboardExporter`]: clipboard export with a viewer fallback
//! - [`Notification`]: user-facing results of all of the above

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod blob;
pub mod classifier;
pub mod clipboard;
pub mod env;
pub mod error;
pub mod executor;
pub mod ids;
pub mod ledger;
pub mod notification;
pub mod queue;
pub mod record;

pub use blob::{Blob, BlobRef, BlobSource, BlobStore};
pub use classifier::{Classified, ClassifierConfig, DEFAULT_TIME_FORMAT, InboundClassifier};
pub use clipboard::{Clipboard, ClipboardCapabilities, ClipboardExporter, ExportOutcome};
pub use env::{Environment, SystemEnv};
pub use error::{BlobError, ClipboardError, ExecutorError, TransferError};
pub use executor::{Progress, TransferAction, TransferEvent, TransferExecutor, TransferPhase};
pub use ids::{IdGenerator, ItemId, RecordId};
pub use ledger::Ledger;
pub use notification::{Level, Notification};
pub use queue::{FileHandle, FileSource, OutboundItem, OutboundQueue};
pub use record::{ReceivedFileRecord, ReceivedTextRecord, Record};
