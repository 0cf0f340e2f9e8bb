
pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod itemize;
pub mod miner;
pub mod pattern;

use tracing::*;

pub use config::{MinerConfig, Support};
pub use data::{Count, Dataset, Delta, IntervalSequence, Itemset, RawEvent, RawSequence, Symbol, Timestamp};
pub use error::MiningError;
pub use itemize::{Bucket, Interval, Itemize, Itemizer};
pub use miner::{LevelSummary, LevelwiseMiner, Miner, Occurrences};
pub use pattern::{FrequentPattern, Gap, Pattern};

/// Objects that can be recorded in the log
pub trait Loggable {
    fn log( &self, message: &str, level: tracing::Level );
}

/// Emits a preformatted line at a level chosen at runtime.
pub(crate) fn emit( level: Level, line: &str ) {
    if level == Level::ERROR { error!( "{line}" ) }
    else if level == Level::WARN { warn!( "{line}" ) }
    else if level == Level::INFO { info!( "{line}" ) }
    else if level == Level::DEBUG { debug!( "{line}" ) }
    else { trace!( "{line}" ) }
}
