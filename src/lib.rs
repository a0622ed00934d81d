//! # Mailbox View
//! Reactive controller for the mailbox screen of a disposable-email web client: a message list paired with a detail pane, backed by a REST API through [`Client`].
//!
//! ## Model
//! [`Mailbox`] is a reducer. Each [`Event`] (a click, a timer tick, a finished request) replaces its [`MailboxState`] and yields the [`Effect`]s to run and the [`Signal`]s for the surrounding application. The reducer performs no I/O, so it can be driven by hand in tests or by the [`Dispatcher`], which owns it on a tokio task and runs effects against the backend.
//!
//! ## Read receipts
//! A message is only reported as seen once it has stayed on screen for the configured seen delay (1.5s by default, see [`Settings`]). Flipping through messages faster than that sends nothing.
//!
//! ## Runtime requirements
//! [`Dispatcher::spawn`] must run inside a Tokio (v1) runtime. The reducer itself is synchronous.
//!
//! ## Errors
//! Client calls surface transport failures and non-2xx statuses as [`Error::Request`] and undecodable bodies as [`Error::Json`]. Inside the state machine every failure becomes the text of a [`Signal::Error`]; no request is retried and no optimistic update is rolled back.
//!
//! ## Example
//! ```no_run
//! use mailbox_view::{Client, Dispatcher, Event, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailbox_view::Error> {
//!     let client = Client::builder()
//!         .api_url("http://localhost:9000/api/v1")
//!         .build()?;
//!     let mut handle = Dispatcher::spawn(client, "swaks", None, Settings::default());
//!
//!     handle.state.changed().await.ok();
//!     if let Some(list) = handle.state.borrow().list() {
//!         for header in list.visible() {
//!             println!("{}: {}", header.from, header.subject);
//!         }
//!     }
//!
//!     handle.events.send(Event::Purge).ok();
//!     Ok(())
//! }
//! ```

mod client;
mod dispatcher;
mod error;
mod list;
mod mailbox;
mod models;
mod seen;
mod settings;

pub use client::{Client, ClientBuilder, message_path};
pub use dispatcher::{Dispatcher, DispatcherHandle};
pub use error::Error;
pub use list::{MIN_FILTER_LEN, MessageList, filter_message_list, normalize_search, relative_date};
pub use mailbox::{
    BodyMode, Effect, Event, Mailbox, MailboxState, MessageState, Outcome, Signal, select,
};
pub use models::{Attachment, Message, MessageHeader};
pub use seen::VisibleMessage;
pub use settings::{CLOCK_INTERVAL, MARK_SEEN_DELAY, SEEN_PROBE_INTERVAL, Settings};

/// Result type alias for client operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
