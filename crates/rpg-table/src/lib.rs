//! The game table: everything between a chat message and the mechanics.
//!
//! A [`Dispatcher`] takes a [`ChatMessage`], parses it into a [`Command`],
//! checks the caller may run it, and hands it to the [`Table`], which
//! loads characters and the initiative order from a [`RoomStore`], runs the
//! mechanics, and writes the results back. Every piece of state belongs to
//! a room, and every table operation names its room explicitly.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod state;
pub mod store;
pub mod table;
pub mod templates;

pub use command::{Actor, Command, Invocation, XpTarget, title_case};
pub use config::{Campaign, TableConfig};
pub use dispatch::{Access, ChatMessage, Dispatcher, Response};
pub use error::{TableError, TableResult};
pub use state::Roster;
pub use store::{JsonFileStore, MemoryStore, RetryingStore, RoomStore, StoreKey};
pub use table::{AttackReport, Table};
pub use templates::{TemplateSource, YamlTemplates};
