use thiserror::Error;

use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::oracle::OracleError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The position has no move to play (checkmate, stalemate or a drawn end).
    #[error("no legal moves in the search position")]
    NoLegalMoves,
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("oracle failure: {0}")]
    Oracle(#[from] OracleError),
    #[error("oracle policy has {got} entries, expected {expected}")]
    PolicyShape { got: usize, expected: usize },
    #[error("root children have no visits to build a policy from")]
    NoSimulations,
    #[error("no search has been run")]
    NotSearched,
    #[error("invalid search config: {0}")]
    InvalidConfig(String),
    /// A position claimed to be terminal but reported no outcome.
    #[error("terminal position has no outcome")]
    MissingOutcome,
}

impl From<ConfigError> for SearchError {
    fn from(e: ConfigError) -> Self {
        SearchError::InvalidConfig(e.to_string())
    }
}
