
use bit_set::BitSet;
use rayon::prelude::*;

use crate::itemize::{Itemize, Itemizer};
use crate::{Count, Dataset, Delta, IntervalSequence, MiningError, Pattern, Symbol};

/// Decides whether sequences contain patterns and counts supports.
pub struct Matcher<'a, F: Itemize> {
    itemizer: &'a Itemizer<'a, F>,
    max_span: Option<Delta>,
    min_span: Option<Delta>,
}

/// A partial occurrence: the itemset `slot` of the pattern is matched at `position`.
#[derive( Debug, Clone, Copy )]
struct State {
    slot: usize,
    position: usize,
}

/// Buffers of the search, reused across starts
struct Search {
    /// (slot, position) states whose continuations were already searched
    explored: BitSet,
    frontier: Vec<State>,
    successors: Vec<State>,
}

/// How a pattern occurs in a dataset.
#[derive( Debug, Clone, Copy, Default, PartialEq, Eq )]
pub struct Occurrences {
    /// sequences with at least one occurrence
    pub support: Count,
    /// events an occurrence starts at, over all sequences
    pub count: Count,
    /// time from the first to the last event of the first occurrence found
    pub whole_interval: Delta,
}

impl <'a, F: Itemize> Matcher<'a, F> {

    pub fn new( itemizer: &'a Itemizer<'a, F>, max_span: Option<Delta> ) -> Matcher<'a, F> {
	Matcher{ itemizer, max_span, min_span: None }
    }

    /// Only occurrences lasting at least this long are found.
    pub fn with_min_span( mut self, min_span: Option<Delta> ) -> Matcher<'a, F> {
	self.min_span = min_span;
	self
    }

    /// Whether the sequence has an order preserving embedding of the pattern
    /// whose intervals satisfy the pattern's gaps.
    ///
    /// The interval between two matched events is classified from their actual
    /// time difference, so events skipped by the embedding count towards it.
    pub fn contains <I: Symbol> ( &self, pattern: &Pattern<I, F::Label>, sequence: &IntervalSequence<I, F::Label> ) -> Result<bool, MiningError> {
	let mut search = Search::new( pattern.slots(), sequence.len() );
	for start in first_matches( pattern, sequence ) {
	    if self.max_span.is_some() || self.min_span.is_some() {
		// continuations depend on the start once the span is bounded
		search.explored.clear();
	    }
	    if self.occurrence_from( pattern, sequence, start, &mut search )?.is_some() {
		return Ok( true );
	    }
	}
	Ok( false )
    }

    /// Span of the leftmost occurrence starting at each event, for every event an occurrence starts at.
    pub fn occurrence_spans <I: Symbol> ( &self, pattern: &Pattern<I, F::Label>, sequence: &IntervalSequence<I, F::Label> ) -> Result<Vec<Delta>, MiningError> {
	let mut search = Search::new( pattern.slots(), sequence.len() );
	let mut spans = Vec::new();
	for start in first_matches( pattern, sequence ) {
	    // a successful start leaves states marked whose continuations may succeed again
	    search.explored.clear();
	    if let Some( span ) = self.occurrence_from( pattern, sequence, start, &mut search )? {
		spans.push( span );
	    }
	}
	Ok( spans )
    }

    /// Number of sequences of the dataset containing the pattern. Each sequence counts at most once.
    pub fn support <I: Symbol> ( &self, pattern: &Pattern<I, F::Label>, dataset: &Dataset<I, F::Label> ) -> Result<Count, MiningError> {
	let mut support = 0;
	for identifier in dataset.sequences_with_items( pattern.items() ).iter() {
	    if self.contains( pattern, dataset.sequence( identifier ))? {
		support += 1;
	    }
	}
	Ok( support )
    }

    /// Support, occurrence count and whole interval of the pattern.
    pub fn occurrences <I: Symbol> ( &self, pattern: &Pattern<I, F::Label>, dataset: &Dataset<I, F::Label> ) -> Result<Occurrences, MiningError> {
	let mut found = Occurrences::default();
	for identifier in dataset.sequences_with_items( pattern.items() ).iter() {
	    let spans = self.occurrence_spans( pattern, dataset.sequence( identifier ))?;
	    if let Some( span ) = spans.first() {
		if found.support == 0 {
		    found.whole_interval = *span;
		}
		found.support += 1;
		found.count += spans.len() as Count;
	    }
	}
	Ok( found )
    }

    /// Supports of all candidates, in candidate order.
    /// The candidate list is fixed before counting starts.
    pub fn count_all <I: Symbol> ( &self, candidates: &[Pattern<I, F::Label>], dataset: &Dataset<I, F::Label>, parallel: bool ) -> Result<Vec<Count>, MiningError> {
	if parallel {
	    candidates.par_iter().map( |candidate| self.support( candidate, dataset )).collect()
	} else {
	    candidates.iter().map( |candidate| self.support( candidate, dataset )).collect()
	}
    }

    /// Occurrences of all patterns, in pattern order.
    pub fn describe_all <I: Symbol> ( &self, patterns: &[Pattern<I, F::Label>], dataset: &Dataset<I, F::Label>, parallel: bool ) -> Result<Vec<Occurrences>, MiningError> {
	if parallel {
	    patterns.par_iter().map( |pattern| self.occurrences( pattern, dataset )).collect()
	} else {
	    patterns.iter().map( |pattern| self.occurrences( pattern, dataset )).collect()
	}
    }

    /// Depth first search for an occurrence at `start`, leftmost choices first.
    /// Returns the time from its first to its last event.
    fn occurrence_from <I: Symbol> ( &self, pattern: &Pattern<I, F::Label>, sequence: &IntervalSequence<I, F::Label>, start: usize, search: &mut Search ) -> Result<Option<Delta>, MiningError> {
	let length = sequence.len();
	let slots = pattern.slots();
	let elements = pattern.elements();
	search.frontier.clear();
	search.frontier.push( State{ slot: 0, position: start } );

	while let Some( state ) = search.frontier.pop() {
	    if state.slot + 1 == slots {
		let span = sequence.elapsed( start, state.position );
		if self.min_span.map_or( true, |min| span >= min ) {
		    return Ok( Some( span ));
		}
		continue;
	    }
	    if !search.explored.insert( state.slot * length + state.position ) {
		continue;
	    }

	    let next = state.slot + 1;
	    let gap = &pattern.gaps()[ state.slot ];
	    search.successors.clear();
	    for position in state.position + 1 .. length {
		let delta = sequence.elapsed( state.position, position );
		if delta > self.itemizer.max_interval() || self.exceeds_span( sequence, start, position ) {
		    break; // later events are even further away
		}
		if !elements[ next ].is_subset_of( sequence.itemset( position )) {
		    continue;
		}
		if gap.admits( &self.itemizer.classify( delta )? ) {
		    search.successors.push( State{ slot: next, position } );
		}
	    }
	    // leftmost successor on top of the stack
	    search.frontier.extend( search.successors.drain( .. ).rev() );
	}
	Ok( None )
    }

    fn exceeds_span <I: Symbol> ( &self, sequence: &IntervalSequence<I, F::Label>, start: usize, position: usize ) -> bool {
	match self.max_span {
	    Some( span ) => sequence.elapsed( start, position ) > span,
	    None => false,
	}
    }
}

impl Search {
    fn new( slots: usize, length: usize ) -> Search {
	Search {
	    explored: BitSet::with_capacity( slots * length ),
	    frontier: Vec::new(),
	    successors: Vec::new(),
	}
    }
}

/// Events where the first itemset of the pattern matches and enough events follow for the rest.
fn first_matches <I: Symbol, L> ( pattern: &Pattern<I, L>, sequence: &IntervalSequence<I, L> ) -> Vec<usize> {
    let slots = pattern.slots();
    if slots > sequence.len() {
	return Vec::new();
    }
    let first = &pattern.elements()[ 0 ];
    ( 0 .. sequence.len() - slots + 1 )
	.filter( |start| first.is_subset_of( sequence.itemset( *start )))
	.collect()
}
