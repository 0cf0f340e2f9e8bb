
use crate::itemize::{Interval, Itemize, Itemizer};
use crate::MiningError;

use super::{Delta, Itemset, RawSequence, Symbol, Timestamp};

/// A raw sequence in normalized form: itemsets interleaved with the classified
/// intervals between adjacent events.
///
/// The absolute timestamps are retained, because matching a pattern that skips
/// events must re-itemize the elapsed time between the matched events.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct IntervalSequence<I, L> {
    timestamps: Vec<Timestamp>,
    itemsets: Vec<Itemset<I>>,
    /// intervals[i] lies between itemsets[i] and itemsets[i + 1]
    intervals: Vec<Interval<L>>,
}

impl <I: Symbol, L: Symbol> IntervalSequence<I, L> {

    /// Normalizes the raw sequence with the given index.
    ///
    /// Fails if a timestamp is negative, timestamps do not strictly increase
    /// or an itemset is empty.
    pub fn normalize <F> ( index: usize, raw: &RawSequence<I>, itemizer: &Itemizer<F> ) -> Result<IntervalSequence<I, L>, MiningError> where
	F: Itemize<Label = L>,
    {
	let mut timestamps = Vec::with_capacity( raw.len() );
	let mut itemsets = Vec::with_capacity( raw.len() );
	let mut intervals = Vec::with_capacity( raw.len().saturating_sub( 1 ));

	for (position, event) in raw.iter().enumerate() {
	    if event.timestamp < 0 {
		return Err( MiningError::malformed( index, position, format!( "negative timestamp {}", event.timestamp )));
	    }
	    if event.items.is_empty() {
		return Err( MiningError::malformed( index, position, "empty itemset" ));
	    }
	    if let Some( previous ) = timestamps.last().copied() {
		if event.timestamp <= previous {
		    return Err( MiningError::malformed( index, position,
			format!( "timestamp {} does not follow {previous}", event.timestamp )));
		}
		intervals.push( itemizer.classify( elapsed( previous, event.timestamp ))? );
	    }
	    timestamps.push( event.timestamp );
	    itemsets.push( event.items.clone() );
	}

	Ok( IntervalSequence{ timestamps, itemsets, intervals } )
    }
}

impl <I, L> IntervalSequence<I, L> {

    /// Number of events
    pub fn len( &self ) -> usize {
	self.itemsets.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.itemsets.is_empty()
    }

    pub fn timestamp( &self, position: usize ) -> Timestamp {
	self.timestamps[ position ]
    }

    pub fn itemset( &self, position: usize ) -> &Itemset<I> {
	&self.itemsets[ position ]
    }

    pub fn itemsets( &self ) -> &[Itemset<I>] {
	&self.itemsets
    }

    pub fn intervals( &self ) -> &[Interval<L>] {
	&self.intervals
    }

    /// Time elapsed from the event at `from` to the event at `to`.
    /// Pre: from <= to
    pub fn elapsed( &self, from: usize, to: usize ) -> Delta {
	elapsed( self.timestamps[ from ], self.timestamps[ to ] )
    }
}

/// Pre: earlier <= later
fn elapsed( earlier: Timestamp, later: Timestamp ) -> Delta {
    later.abs_diff( earlier )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Bucket, RawEvent};

    const DAY: Delta = 86400;

    #[test]
    fn normalize_interleaves_intervals() {
	let raw = vec!(
	    RawEvent::new( 0, vec!( "a" )),
	    RawEvent::new( 86400, vec!( "a", "b", "c" )),
	    RawEvent::new( 259200, vec!( "a", "c" )),
	);
	let days = Bucket::new( DAY ).unwrap();
	let itemizer = Itemizer::new( &days, 0, 2 * DAY );
	let sequence = IntervalSequence::normalize( 0, &raw, &itemizer ).unwrap();

	assert_eq!( sequence.len(), 3 );
	assert_eq!( sequence.intervals(), &[Interval::Label( 1 ), Interval::Label( 2 )] );
	assert_eq!( sequence.itemset( 1 ), &Itemset::new( vec!( "c", "b", "a" )));
	assert_eq!( sequence.elapsed( 0, 2 ), 3 * DAY );
    }

    fn events<I, L>( sequence: &IntervalSequence<I, L> ) -> usize {
	sequence.itemsets().len()
    }

    #[test]
    fn accessors_need_no_symbol_bounds() {
	let raw = vec!( RawEvent::new( 0, vec!( "a" )), RawEvent::new( 5, vec!( "b" )) );
	let identity = |delta: Delta| delta;
	let itemizer = Itemizer::new( &identity, 0, 10 );
	let sequence = IntervalSequence::normalize( 0, &raw, &itemizer ).unwrap();
	assert_eq!( events( &sequence ), 2 );
    }

    #[test]
    fn long_gaps_become_too_far() {
	let raw = vec!(
	    RawEvent::new( 0, vec!( 1 )),
	    RawEvent::new( 10, vec!( 2 )),
	    RawEvent::new( 11, vec!( 3 )),
	);
	let identity = |delta: Delta| delta;
	let itemizer = Itemizer::new( &identity, 0, 5 );
	let sequence = IntervalSequence::normalize( 0, &raw, &itemizer ).unwrap();
	assert_eq!( sequence.intervals(), &[Interval::TooFar, Interval::Label( 1 )] );
    }

    #[test]
    fn single_event_has_no_intervals() {
	let raw = vec!( RawEvent::new( 0, vec!( "a" )) );
	let identity = |delta: Delta| delta;
	let itemizer = Itemizer::new( &identity, 0, 0 );
	let sequence = IntervalSequence::normalize( 0, &raw, &itemizer ).unwrap();
	assert_eq!( sequence.len(), 1 );
	assert!( sequence.intervals().is_empty() );
    }

    #[test]
    fn equal_timestamps_are_rejected() {
	let raw = vec!( RawEvent::new( 5, vec!( "a" )), RawEvent::new( 5, vec!( "b" )) );
	let identity = |delta: Delta| delta;
	let itemizer = Itemizer::new( &identity, 0, 100 );
	match IntervalSequence::normalize( 3, &raw, &itemizer ) {
	    Err( MiningError::MalformedSequence { sequence, event, .. } ) => {
		assert_eq!( sequence, 3 );
		assert_eq!( event, 1 );
	    },
	    other => panic!( "expected malformed sequence, got {other:?}" ),
	}
    }

    #[test]
    fn decreasing_negative_and_empty_are_rejected() {
	let identity = |delta: Delta| delta;
	let itemizer = Itemizer::new( &identity, 0, 100 );

	let decreasing = vec!( RawEvent::new( 7, vec!( "a" )), RawEvent::new( 3, vec!( "b" )) );
	let negative = vec!( RawEvent::new( -1, vec!( "a" )) );
	let empty = vec!( RawEvent::new( 0, vec!( "a" )), RawEvent::new( 1, Vec::<&str>::new() ));

	for raw in [decreasing, negative, empty] {
	    let result = IntervalSequence::normalize( 0, &raw, &itemizer );
	    assert!( matches!( result, Err( MiningError::MalformedSequence { .. } )), "{result:?}" );
	}
    }
}
