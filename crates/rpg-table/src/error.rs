//! Error types for the game table.

use rpg_mechanics::MechError;
use thiserror::Error;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Errors that can occur while handling a command.
#[derive(Debug, Error)]
pub enum TableError {
    /// A rules error from the mechanics layer.
    #[error(transparent)]
    Mech(#[from] MechError),

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored value could not be read back.
    #[error("corrupt {key} in room {room}: {reason}")]
    CorruptState {
        /// Room the value belongs to.
        room: String,
        /// Key the value was stored under.
        key: String,
        /// Why it failed to deserialize.
        reason: String,
    },

    /// A character template is missing or unreadable.
    #[error("template {path}: {reason}")]
    Template {
        /// The template path.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// The configuration is invalid.
    #[error("config: {0}")]
    Config(String),

    /// The caller may not run this command.
    #[error("{caller} may not do that: {reason}")]
    Unauthorized {
        /// Who tried.
        caller: String,
        /// Why they were refused.
        reason: String,
    },
}
