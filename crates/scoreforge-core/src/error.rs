//! Error types for ScoreForge

use thiserror::Error;

/// Main error type for ScoreForge operations.
///
/// Configuration errors surface when a session or descriptor is built;
/// none of them are deferred to score calculation.
#[derive(Debug, Error)]
pub enum ScoreForgeError {
    /// Error in scoring configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Two for-each source nodes were compiled for the same declared class.
    #[error("Impossible state: duplicate for-each source node for class ({class}); node sharing failed")]
    DuplicateSourceNode { class: String },

    /// A shadow variable declares a type incompatible with its source list.
    #[error("The shadow variable ({shadow}) has type ({actual}) but its source list variable requires type ({expected})")]
    ShadowTypeMismatch {
        shadow: String,
        expected: String,
        actual: String,
    },

    /// A shadow variable references a source variable that does not exist.
    #[error("The shadow variable ({shadow}) references a source variable ({source_variable}) that does not exist")]
    MissingSourceVariable { shadow: String, source_variable: String },

    /// A shadow variable references a source variable that is not a list variable.
    #[error("The shadow variable ({shadow}) references a source variable ({source_variable}) that is not a list variable")]
    NotAListVariable { shadow: String, source_variable: String },

    /// An entity was added whose class is not a configured entity class.
    #[error("The class ({class}) is not a configured planning entity class")]
    UnknownEntityClass { class: String },

    /// A fact reference names a class id outside the solution descriptor.
    #[error("Unknown class id ({id})")]
    UnknownClass { id: usize },

    /// A score was requested while variable listener notifications were still queued.
    #[error("{count} variable listener notification(s) still pending; call trigger_variable_listeners() first")]
    PendingVariableListenerNotifications { count: usize },

    /// The incrementally maintained score diverged from a from-scratch calculation.
    #[error("Score corruption: the working score ({working}) is not the uncorrected score ({uncorrected}){analysis}")]
    ScoreCorruption {
        working: String,
        uncorrected: String,
        analysis: String,
    },

    /// Invalid operation for the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias for ScoreForge operations
pub type Result<T, E = ScoreForgeError> = std::result::Result<T, E>;
