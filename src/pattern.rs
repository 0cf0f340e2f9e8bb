
use std::fmt;

use serde::Serialize;
use tracing::Level;

use crate::itemize::Interval;
use crate::{emit, Count, Delta, Itemset, Loggable, Symbol};

/// Requirement on the interval between two consecutive itemsets of a pattern.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize )]
#[serde( rename_all = "lowercase" )]
pub enum Gap<L> {
    /// Any interval within the limits.
    Any,
    /// Exactly this label.
    Exact( L ),
}

impl <L: PartialEq> Gap<L> {
    /// Whether the classified interval between two matched events satisfies this gap.
    /// Intervals outside the limits never do.
    pub fn admits( &self, interval: &Interval<L> ) -> bool {
	match (self, interval) {
	    (_, Interval::TooFar) | (_, Interval::TooClose) => false,
	    (Gap::Any, Interval::Label( _ )) => true,
	    (Gap::Exact( wanted ), Interval::Label( found )) => wanted == found,
	}
    }
}

/// An interval sequential pattern: itemsets separated by gap requirements.
///
/// Invariants: there is at least one itemset, no itemset is empty
/// and there is exactly one gap less than there are itemsets.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize )]
pub struct Pattern<I, L> {
    elements: Vec<Itemset<I>>,
    gaps: Vec<Gap<L>>,
}

/// A pattern together with the number of sequences containing it.
#[derive( Debug, Clone, PartialEq, Eq, Serialize )]
pub struct FrequentPattern<I, L> {
    pub pattern: Pattern<I, L>,
    pub support: Count,
    /// number of events an occurrence starts at, over all sequences
    pub occurrences: Count,
    /// time from the first to the last event of the first occurrence found
    pub whole_interval: Delta,
}

impl <I, L> Pattern<I, L> {

    /// Number of items over all itemsets. This is the mining level the pattern belongs to.
    pub fn len( &self ) -> usize {
	self.elements.iter().map( |element| element.len() ).sum()
    }

    /// False for every pattern built through this type.
    pub fn is_empty( &self ) -> bool {
	self.elements.is_empty()
    }

    /// Number of itemsets
    pub fn slots( &self ) -> usize {
	self.elements.len()
    }

    pub fn elements( &self ) -> &[Itemset<I>] {
	&self.elements
    }

    pub fn gaps( &self ) -> &[Gap<L>] {
	&self.gaps
    }

    pub fn items( &self ) -> impl Iterator<Item = &I> {
	self.elements.iter().flat_map( |element| element.iter() )
    }
}

impl <I: Symbol, L: Symbol> Pattern<I, L> {

    pub fn singleton( item: I ) -> Pattern<I, L> {
	Pattern{ elements: vec!( Itemset::single( item )), gaps: Vec::new() }
    }

    /// Builds a pattern from its parts.
    /// Returns None if the parts violate the pattern invariants.
    pub fn from_parts( elements: Vec<Itemset<I>>, gaps: Vec<Gap<L>> ) -> Option<Pattern<I, L>> {
	let valid = !elements.is_empty()
	    && elements.iter().all( |element| !element.is_empty() )
	    && gaps.len() + 1 == elements.len();
	if valid { Some( Pattern{ elements, gaps } ) } else { None }
    }

    /// Smallest item of the first itemset
    pub fn first_item( &self ) -> &I {
	self.elements[ 0 ].first().expect( "itemsets are not empty" )
    }

    /// Greatest item of the last itemset
    pub fn last_item( &self ) -> &I {
	self.elements[ self.elements.len() - 1 ].last().expect( "itemsets are not empty" )
    }

    /// Whether the last itemset holds a single item, i.e. the last item opened its own slot.
    pub fn ends_with_singleton( &self ) -> bool {
	self.elements[ self.elements.len() - 1 ].len() == 1
    }

    /// Removes the first item. A first itemset that becomes empty is dropped with its gap.
    /// Returns None for single item patterns.
    pub fn drop_first_item( &self ) -> Option<Pattern<I, L>> {
	self.without_item( 0, 0 )
    }

    /// Removes the last item. A last itemset that becomes empty is dropped with its gap.
    /// Returns None for single item patterns.
    pub fn drop_last_item( &self ) -> Option<Pattern<I, L>> {
	let slot = self.elements.len() - 1;
	self.without_item( slot, self.elements[ slot ].len() - 1 )
    }

    /// Adds the item to the last itemset.
    pub fn extended_within( &self, item: I ) -> Pattern<I, L> {
	let mut extended = self.clone();
	let last = extended.elements.len() - 1;
	extended.elements[ last ].insert( item );
	extended
    }

    /// Appends a new itemset holding only the item, reached via the gap.
    pub fn extended_by( &self, gap: Gap<L>, item: I ) -> Pattern<I, L> {
	let mut extended = self.clone();
	extended.gaps.push( gap );
	extended.elements.push( Itemset::single( item ));
	extended
    }

    /// The sub-patterns with one item less that every sequence containing this pattern also contains.
    ///
    /// An item may go from any itemset holding several items. A singleton itemset may go only at
    /// either end, together with its gap: removing one in the middle would merge two gaps into an
    /// interval that can exceed the maximum.
    pub fn contiguous_subpatterns( &self ) -> Vec<Pattern<I, L>> {
	let last_slot = self.elements.len() - 1;
	let mut subpatterns = Vec::new();
	for (slot, element) in self.elements.iter().enumerate() {
	    if element.len() > 1 {
		for position in 0 .. element.len() {
		    subpatterns.extend( self.without_item( slot, position ));
		}
	    } else if slot == 0 || slot == last_slot {
		subpatterns.extend( self.without_item( slot, 0 ));
	    }
	}
	subpatterns
    }

    fn without_item( &self, slot: usize, position: usize ) -> Option<Pattern<I, L>> {
	if self.len() <= 1 {
	    return None;
	}
	let mut elements = self.elements.clone();
	let mut gaps = self.gaps.clone();
	if elements[ slot ].len() > 1 {
	    elements[ slot ] = elements[ slot ].without( position );
	} else {
	    elements.remove( slot );
	    // the gap towards the remaining neighbour goes with the itemset
	    gaps.remove( if slot == 0 { 0 } else { slot - 1 } );
	}
	Some( Pattern{ elements, gaps } )
    }
}

impl <I: fmt::Display, L: fmt::Display> fmt::Display for Pattern<I, L> {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
	for (slot, element) in self.elements.iter().enumerate() {
	    if slot > 0 {
		match &self.gaps[ slot - 1 ] {
		    Gap::Any => write!( f, " -[*]-> " )?,
		    Gap::Exact( label ) => write!( f, " -[{label}]-> " )?,
		}
	    }
	    write!( f, "{element}" )?;
	}
	Ok( () )
    }
}

impl <I: fmt::Display, L: fmt::Display> Loggable for Pattern<I, L> {
    fn log( &self, message: &str, level: Level ) {
	emit( level, &format!( "{message} {self}" ));
    }
}
