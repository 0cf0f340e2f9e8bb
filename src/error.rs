
use crate::Delta;

/// Errors raised while preparing or running a mining job.
#[derive( Debug, thiserror::Error )]
pub enum MiningError {
    /// A raw sequence violates the input contract: negative or non-increasing timestamps, or an empty itemset.
    #[error( "malformed sequence {sequence} at event {event}: {reason}" )]
    MalformedSequence { sequence: usize, event: usize, reason: String },

    #[error( "invalid configuration: {0}" )]
    InvalidConfiguration( String ),

    /// The itemize callback gave two different labels for the same delta within one run.
    #[error( "itemizer returned {first} and later {second} for interval {delta}" )]
    ItemizerContractViolation { delta: Delta, first: String, second: String },

    #[error( "cannot parse line {line}: {reason}" )]
    Parse { line: usize, reason: String },

    #[error( transparent )]
    Io( #[from] std::io::Error ),

    #[error( transparent )]
    Json( #[from] serde_json::Error ),
}

impl MiningError {
    pub(crate) fn malformed( sequence: usize, event: usize, reason: impl Into<String> ) -> MiningError {
	MiningError::MalformedSequence { sequence, event, reason: reason.into() }
    }
}
