
use std::fmt;

use serde::Serialize;

use super::Symbol;

/// A set of items occurring at one timestamp.
/// Invariant: items are sorted ascending and distinct.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize )]
#[serde( transparent )]
pub struct Itemset<I> {
    items: Vec<I>,
}

impl <I> Itemset<I> {

    pub fn len( &self ) -> usize {
	self.items.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.items.is_empty()
    }

    pub fn first( &self ) -> Option<&I> {
	self.items.first()
    }

    pub fn last( &self ) -> Option<&I> {
	self.items.last()
    }

    pub fn iter( &self ) -> std::slice::Iter<'_, I> {
	self.items.iter()
    }
}

impl <I: Symbol> Itemset<I> {

    /// Collects items into a set, dropping duplicates.
    pub fn new <T> ( items: T ) -> Itemset<I> where T: IntoIterator<Item = I> {
	let mut items: Vec<I> = items.into_iter().collect();
	items.sort();
	items.dedup();
	Itemset{ items }
    }

    pub fn single( item: I ) -> Itemset<I> {
	Itemset{ items: vec!( item ) }
    }

    pub fn contains( &self, item: &I ) -> bool {
	self.items.binary_search( item ).is_ok()
    }

    /// Whether every item of this set also occurs in other.
    /// Walks both sorted vectors once.
    pub fn is_subset_of( &self, other: &Itemset<I> ) -> bool {
	if self.items.len() > other.items.len() {
	    return false;
	}
	let mut candidates = other.items.iter();
	'outer: for item in &self.items {
	    for candidate in candidates.by_ref() {
		match candidate.cmp( item ) {
		    std::cmp::Ordering::Less => continue,
		    std::cmp::Ordering::Equal => continue 'outer,
		    std::cmp::Ordering::Greater => return false,
		}
	    }
	    return false;
	}
	true
    }

    /// Adds an item, keeping the order. Returns false if it was present.
    pub fn insert( &mut self, item: I ) -> bool {
	match self.items.binary_search( &item ) {
	    Ok( _ ) => false,
	    Err( position ) => {
		self.items.insert( position, item );
		true
	    }
	}
    }

    /// Copy of this set without the item at the given position.
    pub fn without( &self, position: usize ) -> Itemset<I> {
	let mut items = self.items.clone();
	items.remove( position );
	Itemset{ items }
    }
}

impl <'a, I> IntoIterator for &'a Itemset<I> {
    type Item = &'a I;
    type IntoIter = std::slice::Iter<'a, I>;

    fn into_iter( self ) -> Self::IntoIter {
	self.items.iter()
    }
}

impl <I: fmt::Display> fmt::Display for Itemset<I> {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
	write!( f, "(" )?;
	for (index, item) in self.items.iter().enumerate() {
	    if index > 0 {
		write!( f, ", " )?;
	    }
	    write!( f, "{item}" )?;
	}
	write!( f, ")" )
    }
}
