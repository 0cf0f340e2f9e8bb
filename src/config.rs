
use std::str::FromStr;

use crate::{Count, Delta, MiningError};

/// Minimum number of sequences a pattern must occur in.
#[derive( Debug, Clone, Copy, PartialEq )]
pub enum Support {
    /// An absolute number of sequences, at least 1.
    Absolute( Count ),
    /// A fraction of all sequences in (0, 1], rounded up.
    Relative( f64 ),
}

impl Support {

    pub fn validate( &self ) -> Result<(), MiningError> {
	match *self {
	    Support::Absolute( 0 ) => Err( invalid( "minimum support must be at least 1" )),
	    Support::Relative( fraction ) if !( fraction > 0.0 && fraction <= 1.0 ) =>
		Err( invalid( format!( "relative minimum support {fraction} is not in (0, 1]" ))),
	    _ => Ok( () ),
	}
    }

    /// Converts the threshold into a sequence count for a dataset of the given size.
    pub fn resolve( &self, number_sequences: usize ) -> Result<Count, MiningError> {
	self.validate()?;
	let count = match *self {
	    Support::Absolute( count ) => count,
	    Support::Relative( fraction ) => ( fraction * number_sequences as f64 ).ceil() as Count,
	};
	Ok( count.max( 1 ))
    }
}

impl FromStr for Support {
    type Err = MiningError;

    /// Integers are absolute counts, decimals are fractions, e.g. "3" or "0.25".
    fn from_str( text: &str ) -> Result<Support, MiningError> {
	let text = text.trim();
	let support = if text.contains( '.' ) {
	    text.parse::<f64>().map( Support::Relative )
		.map_err( |err| invalid( format!( "minimum support {text:?}: {err}" )))?
	} else {
	    text.parse::<Count>().map( Support::Absolute )
		.map_err( |err| invalid( format!( "minimum support {text:?}: {err}" )))?
	};
	support.validate()?;
	Ok( support )
    }
}

/// Parameters of one mining run.
#[derive( Debug, Clone, PartialEq )]
pub struct MinerConfig {
    pub min_support: Support,
    /// Intervals longer than this separate unrelated events.
    pub max_interval: Delta,
    /// Intervals shorter than this are not matched by any gap.
    pub min_interval: Delta,
    /// Longest time from the first to the last matched event of a pattern occurrence.
    pub max_span: Option<Delta>,
    /// Shortest such time for a pattern to be reported. Patterns below it are still mined
    /// and extended, since a longer pattern can span more.
    pub min_span: Option<Delta>,
    /// Stop after patterns with this many items.
    pub max_length: Option<usize>,
    /// Normalize and count supports on the rayon thread pool.
    pub parallel: bool,
    /// Verify that the itemize callback answers consistently.
    pub check_itemizer: bool,
}

impl MinerConfig {

    pub fn new( min_support: Support, max_interval: Delta ) -> MinerConfig {
	MinerConfig {
	    min_support,
	    max_interval,
	    min_interval: 0,
	    max_span: None,
	    min_span: None,
	    max_length: None,
	    parallel: false,
	    check_itemizer: true,
	}
    }

    pub fn with_min_interval( mut self, min_interval: Delta ) -> MinerConfig {
	self.min_interval = min_interval;
	self
    }

    pub fn with_max_span( mut self, max_span: Delta ) -> MinerConfig {
	self.max_span = Some( max_span );
	self
    }

    pub fn with_min_span( mut self, min_span: Delta ) -> MinerConfig {
	self.min_span = Some( min_span );
	self
    }

    pub fn with_max_length( mut self, max_length: usize ) -> MinerConfig {
	self.max_length = Some( max_length );
	self
    }

    pub fn parallel( mut self, parallel: bool ) -> MinerConfig {
	self.parallel = parallel;
	self
    }

    pub fn check_itemizer( mut self, check: bool ) -> MinerConfig {
	self.check_itemizer = check;
	self
    }

    /// Checks the parameters before any data is touched.
    pub fn validate( &self ) -> Result<(), MiningError> {
	self.min_support.validate()?;
	if self.min_interval > self.max_interval {
	    return Err( invalid( format!( "minimum interval {} exceeds maximum interval {}", self.min_interval, self.max_interval )));
	}
	if let (Some( min ), Some( max )) = (self.min_span, self.max_span) {
	    if min > max {
		return Err( invalid( format!( "minimum span {min} exceeds maximum span {max}" )));
	    }
	}
	if self.max_length == Some( 0 ) {
	    return Err( invalid( "maximum pattern length must be at least 1" ));
	}
	Ok( () )
    }
}

fn invalid( reason: impl Into<String> ) -> MiningError {
    MiningError::InvalidConfiguration( reason.into() )
}
