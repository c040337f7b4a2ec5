//! Typed error values for the ingestion pipeline.
//!
//! Every failure the pipeline can encounter maps to one of five kinds, each
//! with a fixed supervision policy:
//!
//! | Kind          | Trigger                               | Policy                       |
//! |---------------|---------------------------------------|------------------------------|
//! | `Connection`  | transport drop                        | non-fatal, reconnect         |
//! | `Provider`    | RPC failure on a backfill window      | non-fatal, skip window       |
//! | `Encoding`    | unrepresentable value in normalization| non-fatal, drop record       |
//! | `Persistence` | datastore rejects a write             | non-fatal, write lost        |
//! | `Auth`        | credential rejection at startup       | fatal                        |
//!
//! Supervising loops consult [`IndexerError::is_fatal`] instead of matching
//! variants ad hoc, so the policy lives in exactly one place.

/// Pipeline error with a fixed supervision policy per kind.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// Transport-level failure on a live subscription.
    #[error("connection error: {0}")]
    Connection(String),

    /// RPC provider failure; `context` carries the event kind and block range.
    #[error("provider error ({context}): {message}")]
    Provider { context: String, message: String },

    /// A value that cannot be represented losslessly in a record.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Datastore rejected a write; `context` carries the identity key.
    #[error("persistence error ({context}): {message}")]
    Persistence { context: String, message: String },

    /// Credential rejection at startup. The only fatal kind.
    #[error("auth error: {0}")]
    Auth(String),
}

impl IndexerError {
    pub fn provider(context: impl Into<String>, message: impl ToString) -> Self {
        IndexerError::Provider {
            context: context.into(),
            message: message.to_string(),
        }
    }

    pub fn persistence(context: impl Into<String>, message: impl ToString) -> Self {
        IndexerError::Persistence {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Only `Auth` terminates a worker; everything else is logged and survived.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IndexerError::Auth(_))
    }
}
