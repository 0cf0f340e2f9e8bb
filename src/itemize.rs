
use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::sync::Mutex;

use rustc_hash::FxHashMap;

use crate::{Delta, MinerConfig, MiningError, Symbol};

/// Discretizes the time between two events into an interval label.
///
/// Implementations must be total and deterministic over non-negative deltas:
/// equal deltas must give equal labels. Closures `Fn(Delta) -> L` qualify.
pub trait Itemize: Sync {
    type Label: Symbol;

    fn itemize( &self, delta: Delta ) -> Self::Label;
}

impl <F, L> Itemize for F where
    F: Fn(Delta) -> L + Sync,
    L: Symbol,
{
    type Label = L;

    fn itemize( &self, delta: Delta ) -> L {
	self( delta )
    }
}

/// Labels a delta with the number of whole buckets it spans, e.g. days for a width of 86400 seconds.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub struct Bucket {
    width: Delta,
}

impl Bucket {
    pub fn new( width: Delta ) -> Result<Bucket, MiningError> {
	if width == 0 {
	    return Err( MiningError::InvalidConfiguration( "bucket width must be positive".to_string() ));
	}
	Ok( Bucket{ width } )
    }

    pub fn width( &self ) -> Delta {
	self.width
    }
}

impl Itemize for Bucket {
    type Label = Delta;

    fn itemize( &self, delta: Delta ) -> Delta {
	delta / self.width
    }
}

/// Classification of the time between two events.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub enum Interval<L> {
    /// Within the interval limits, itemized by the callback.
    Label( L ),
    /// Shorter than the configured minimum interval.
    TooClose,
    /// Longer than the configured maximum interval. The events are unrelated.
    TooFar,
}

impl <L> Interval<L> {
    pub fn label( &self ) -> Option<&L> {
	match self {
	    Interval::Label( label ) => Some( label ),
	    _ => None,
	}
    }
}

/// Wraps the user's itemize callback for the duration of one mining run.
///
/// Deltas outside `[min_interval, max_interval]` are classified here without consulting
/// the callback. When checking is enabled, every label handed out is remembered so that
/// a callback answering differently for the same delta is reported.
pub struct Itemizer<'a, F: Itemize> {
    itemize: &'a F,
    min_interval: Delta,
    max_interval: Delta,
    /// delta -> label as first observed in this run
    observed: Option<Mutex<FxHashMap<Delta, F::Label>>>,
}

impl <'a, F: Itemize> Itemizer<'a, F> {

    pub fn new( itemize: &'a F, min_interval: Delta, max_interval: Delta ) -> Itemizer<'a, F> {
	Itemizer{ itemize, min_interval, max_interval, observed: None }
    }

    pub fn from_config( itemize: &'a F, config: &MinerConfig ) -> Itemizer<'a, F> {
	let itemizer = Itemizer::new( itemize, config.min_interval, config.max_interval );
	if config.check_itemizer { itemizer.checked() } else { itemizer }
    }

    /// Enables detection of inconsistent callbacks.
    pub fn checked( mut self ) -> Itemizer<'a, F> {
	self.observed = Some( Mutex::new( FxHashMap::default() ));
	self
    }

    /// A copy sharing the callback and limits but checking nothing.
    /// Used for counting once every delta of the dataset has been checked.
    pub fn unchecked( &self ) -> Itemizer<'a, F> {
	Itemizer::new( self.itemize, self.min_interval, self.max_interval )
    }

    pub fn is_checked( &self ) -> bool {
	self.observed.is_some()
    }

    pub fn min_interval( &self ) -> Delta {
	self.min_interval
    }

    pub fn max_interval( &self ) -> Delta {
	self.max_interval
    }

    /// Classifies a non-negative delta.
    pub fn classify( &self, delta: Delta ) -> Result<Interval<F::Label>, MiningError> {
	if delta > self.max_interval {
	    return Ok( Interval::TooFar );
	}
	if delta < self.min_interval {
	    return Ok( Interval::TooClose );
	}

	let label = self.itemize.itemize( delta );
	if let Some( observed ) = &self.observed {
	    // a panicking callback cannot leave the map half-written, so poisoning is harmless
	    let mut observed = observed.lock().unwrap_or_else( |poisoned| poisoned.into_inner() );
	    match observed.entry( delta ) {
		Entry::Occupied( first ) => if *first.get() != label {
		    return Err( MiningError::ItemizerContractViolation {
			delta,
			first: describe( first.get() ),
			second: describe( &label ),
		    });
		},
		Entry::Vacant( slot ) => { slot.insert( label.clone() ); },
	    }
	}
	Ok( Interval::Label( label ))
    }
}

fn describe<L: Debug>( label: &L ) -> String {
    format!( "{label:?}" )
}
