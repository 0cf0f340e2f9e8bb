
use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::{Gap, Pattern, Symbol};

/// Produces the candidates of the next level from the frequent patterns of one level.
pub struct CandidateGenerator<'a, I, L> {
    /// frequent patterns of the current level, all with the same number of items
    frequent: FxHashSet<&'a Pattern<I, L>>,
    /// labels that may specialize a wildcard gap
    labels: &'a [L],
}

impl <'a, I: Symbol, L: Symbol> CandidateGenerator<'a, I, L> {

    pub fn new <P> ( frequent: P, labels: &'a [L] ) -> CandidateGenerator<'a, I, L> where
	P: IntoIterator<Item = &'a Pattern<I, L>>,
    {
	CandidateGenerator{ frequent: frequent.into_iter().collect(), labels }
    }

    /// Joins, deduplicates and prunes. The result is sorted and free of duplicates.
    pub fn generate( &self ) -> Vec<Pattern<I, L>> {
	let length = match self.frequent.iter().next() {
	    Some( pattern ) => pattern.len(),
	    None => return Vec::new(),
	};

	let joined = if length == 1 { self.join_items() } else { self.join() };
	let number_joined = joined.len();
	let candidates: Vec<Pattern<I, L>> = joined.into_iter()
	    .filter( |candidate| self.has_frequent_subpatterns( candidate ))
	    .collect();
	trace!( "{number_joined} joined candidates of length {}, {} survive pruning", length + 1, candidates.len() );
	candidates
    }

    /// Candidates with two items from frequent single items: both items in one itemset,
    /// or the second item one interval later, with the interval left open or refined to every label.
    fn join_items( &self ) -> BTreeSet<Pattern<I, L>> {
	let mut items: Vec<&I> = self.frequent.iter().map( |pattern| pattern.first_item() ).collect();
	items.sort();

	let mut candidates = BTreeSet::new();
	for first in &items {
	    let seed = Pattern::singleton( (*first).clone() );
	    for second in &items {
		if first < second {
		    candidates.insert( seed.extended_within( (*second).clone() ));
		}
		candidates.insert( seed.extended_by( Gap::Any, (*second).clone() ));
		for label in self.labels {
		    candidates.insert( seed.extended_by( Gap::Exact( label.clone() ), (*second).clone() ));
		}
	    }
	}
	candidates
    }

    /// Joins P and Q whenever P without its first item equals Q without its last item,
    /// gaps included. The candidate is P extended by the last item of Q, placed the way Q places it.
    fn join( &self ) -> BTreeSet<Pattern<I, L>> {
	let mut by_prefix: FxHashMap<Pattern<I, L>, Vec<&Pattern<I, L>>> = FxHashMap::default();
	for q in &self.frequent {
	    if let Some( prefix ) = q.drop_last_item() {
		by_prefix.entry( prefix ).or_default().push( *q );
	    }
	}

	let mut candidates = BTreeSet::new();
	for p in &self.frequent {
	    let suffix = match p.drop_first_item() {
		Some( suffix ) => suffix,
		None => continue,
	    };
	    for q in by_prefix.get( &suffix ).into_iter().flatten() {
		let item = q.last_item().clone();
		let candidate = if q.ends_with_singleton() {
		    let gap = q.gaps().last().cloned().expect( "a pattern of several items ending in a singleton has a gap" );
		    p.extended_by( gap, item )
		} else {
		    p.extended_within( item )
		};
		candidates.insert( candidate );
	    }
	}
	candidates
    }

    /// Apriori pruning over contiguous sub-patterns.
    fn has_frequent_subpatterns( &self, candidate: &Pattern<I, L> ) -> bool {
	candidate.contiguous_subpatterns().iter().all( |sub| self.frequent.contains( sub ))
    }
}
