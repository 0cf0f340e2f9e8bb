
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;

use bit_set::BitSet;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::itemize::{Itemize, Itemizer};
use crate::MiningError;

mod itemset;
mod sequence;

pub use itemset::Itemset;
pub use sequence::IntervalSequence;

/// Absolute time of an event, in the caller's unit.
pub type Timestamp = i64;
/// Non-negative time between two events.
pub type Delta = u64;
pub type Count = u64;

/// Bound for items and interval labels: opaque values that can be ordered, hashed and shared between threads.
pub trait Symbol: Clone + Ord + Hash + Debug + Send + Sync {}

impl <T> Symbol for T where T: Clone + Ord + Hash + Debug + Send + Sync {}

/// One itemset observed at a timestamp.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct RawEvent<I> {
    pub timestamp: Timestamp,
    pub items: Itemset<I>,
}

/// Events ordered by strictly increasing timestamp.
pub type RawSequence<I> = Vec<RawEvent<I>>;

impl <I: Symbol> RawEvent<I> {
    pub fn new <T> ( timestamp: Timestamp, items: T ) -> RawEvent<I> where T: IntoIterator<Item = I> {
	RawEvent{ timestamp, items: Itemset::new( items ) }
    }
}

/// The normalized sequences of one mining run, kept resident for all levels.
pub struct Dataset<I, L> {
    sequences: Vec<IntervalSequence<I, L>>,
    /// identifiers of the sequences containing each item
    item_index: FxHashMap<I, BitSet>,
    /// every label between two events of one sequence, sorted
    labels: Vec<L>,
}

impl <I: Symbol, L: Symbol> Dataset<I, L> {

    /// Normalizes all raw sequences. Any malformed sequence fails the whole build.
    pub fn build <F> ( raw: &[RawSequence<I>], itemizer: &Itemizer<F>, parallel: bool ) -> Result<Dataset<I, L>, MiningError> where
	F: Itemize<Label = L>,
    {
	let normalize = |(index, sequence): (usize, &RawSequence<I>)| IntervalSequence::normalize( index, sequence, itemizer );
	let sequences: Vec<IntervalSequence<I, L>> = if parallel {
	    raw.par_iter().enumerate().map( normalize ).collect::<Result<Vec<_>, _>>()?
	} else {
	    raw.iter().enumerate().map( normalize ).collect::<Result<Vec<_>, _>>()?
	};

	let item_index = index_items( &sequences );
	let labels = collect_labels( &sequences, itemizer )?;
	debug!( "Dataset of {} sequences, {} distinct items, {} interval labels", sequences.len(), item_index.len(), labels.len() );

	Ok( Dataset{ sequences, item_index, labels } )
    }

    /// Number of sequences
    pub fn len( &self ) -> usize {
	self.sequences.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.sequences.is_empty()
    }

    pub fn sequences( &self ) -> &[IntervalSequence<I, L>] {
	&self.sequences
    }

    pub fn sequence( &self, identifier: usize ) -> &IntervalSequence<I, L> {
	&self.sequences[ identifier ]
    }

    /// All distinct items in ascending order
    pub fn items( &self ) -> Vec<I> {
	let mut items: Vec<I> = self.item_index.keys().cloned().collect();
	items.sort();
	items
    }

    /// Labels occurring between any two events of a sequence within the interval limits
    pub fn labels( &self ) -> &[L] {
	&self.labels
    }

    /// Returns the sequences that contain every given item somewhere.
    /// A pattern can only be contained in these.
    pub fn sequences_with_items <'a, It> ( &self, items: It ) -> BitSet where
	It: IntoIterator<Item = &'a I>,
	I: 'a,
    {
	let mut selection: Option<BitSet> = None;
	for item in items {
	    let holders = match self.item_index.get( item ) {
		Some( holders ) => holders,
		None => return BitSet::new(),
	    };
	    match selection.as_mut() {
		Some( selected ) => selected.intersect_with( holders ),
		None => selection = Some( holders.clone() ),
	    }
	}
	selection.unwrap_or_else( || (0 .. self.sequences.len()).collect() )
    }
}

fn index_items<I: Symbol, L>( sequences: &[IntervalSequence<I, L>] ) -> FxHashMap<I, BitSet> {
    let mut index: FxHashMap<I, BitSet> = FxHashMap::default();
    for (identifier, sequence) in sequences.iter().enumerate() {
	for item in sequence.itemsets().iter().flat_map( |itemset| itemset.iter() ) {
	    index.entry( item.clone() ).or_default().insert( identifier );
	}
    }
    index
}

/// Classifies the delta of every event pair that lies within the interval limits.
/// Pairs further apart than the maximum interval are skipped without classification.
fn collect_labels<I, L, F>( sequences: &[IntervalSequence<I, L>], itemizer: &Itemizer<F> ) -> Result<Vec<L>, MiningError> where
    I: Symbol,
    L: Symbol,
    F: Itemize<Label = L>,
{
    let mut labels: BTreeSet<L> = BTreeSet::new();
    for sequence in sequences {
	for from in 0 .. sequence.len() {
	    for to in from + 1 .. sequence.len() {
		let delta = sequence.elapsed( from, to );
		if delta > itemizer.max_interval() {
		    break;
		}
		if let Some( label ) = itemizer.classify( delta )?.label() {
		    labels.insert( label.clone() );
		}
	    }
	}
    }
    Ok( labels.into_iter().collect() )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Bucket;

    fn build( raw: &[RawSequence<&'static str>], max_interval: Delta ) -> Dataset<&'static str, Delta> {
	let days = Bucket::new( 86400 ).unwrap();
	let itemizer = Itemizer::new( &days, 0, max_interval );
	Dataset::build( raw, &itemizer, false ).unwrap()
    }

    fn scenario() -> Vec<RawSequence<&'static str>> {
	vec!(
	    vec!( RawEvent::new( 0, vec!( "a" )), RawEvent::new( 86400, vec!( "a", "b", "c" )), RawEvent::new( 259200, vec!( "a", "c" )) ),
	    vec!( RawEvent::new( 0, vec!( "a", "d" )), RawEvent::new( 259200, vec!( "c" )) ),
	    vec!( RawEvent::new( 0, vec!( "a", "e", "f" )), RawEvent::new( 172800, vec!( "a", "b" )) ),
	)
    }

    #[test]
    fn items_are_indexed_by_sequence() {
	let dataset = build( &scenario(), 172800 );
	assert_eq!( dataset.len(), 3 );
	assert_eq!( dataset.items(), vec!( "a", "b", "c", "d", "e", "f" ));

	let with_b = dataset.sequences_with_items( [&"b"] );
	assert_eq!( with_b.iter().collect::<Vec<_>>(), vec!( 0, 2 ));
	let with_b_and_c = dataset.sequences_with_items( [&"b", &"c"] );
	assert_eq!( with_b_and_c.iter().collect::<Vec<_>>(), vec!( 0 ));
	assert!( dataset.sequences_with_items( [&"z"] ).is_empty() );
	assert_eq!( dataset.sequences_with_items( Vec::<&&str>::new() ).len(), 3 );
    }

    #[test]
    fn labels_include_non_adjacent_pairs() {
	// adjacent gaps are one and two days; the pair spanning three days is too far
	let dataset = build( &scenario(), 172800 );
	assert_eq!( dataset.labels(), &[1, 2] );

	// with a longer horizon the three day pair appears as well
	let dataset = build( &scenario(), 3 * 86400 );
	assert_eq!( dataset.labels(), &[1, 2, 3] );
    }

    #[test]
    fn malformed_sequence_fails_whole_build() {
	let mut raw = scenario();
	raw.push( vec!( RawEvent::new( 5, vec!( "a" )), RawEvent::new( 5, vec!( "b" )) ));
	let days = Bucket::new( 86400 ).unwrap();
	let itemizer = Itemizer::new( &days, 0, 172800 );
	for parallel in [false, true] {
	    match Dataset::build( &raw, &itemizer, parallel ) {
		Err( MiningError::MalformedSequence { sequence, .. } ) => assert_eq!( sequence, 3 ),
		Err( other ) => panic!( "unexpected error {other}" ),
		Ok( _ ) => panic!( "malformed input accepted" ),
	    }
	}
    }
}
