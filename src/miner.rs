
use tracing::*;

use crate::*;

mod candidates;
mod matcher;

pub use candidates::CandidateGenerator;
pub use matcher::{Matcher, Occurrences};

pub trait Miner {
    type Label;

    /// Mines every frequent pattern of the sequences, together with its support.
    fn mine <I: Symbol> ( &mut self, sequences: &[RawSequence<I>] ) -> Result<Vec<FrequentPattern<I, Self::Label>>, MiningError>;
}

/// Book keeping for one level of a mining run
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub struct LevelSummary {
    /// number of items in the patterns of this level
    pub level: usize,
    pub candidates: usize,
    pub frequent: usize,
}

/// Generalized sequential pattern miner with interval gaps.
///
/// Mines level by level: the frequent patterns with k items are joined into candidates
/// with k + 1 items, which are pruned, counted against all sequences and filtered by
/// support, until a level yields nothing frequent.
pub struct LevelwiseMiner<F> {
    config: MinerConfig,
    itemize: F,
    /// levels of the last run
    levels: Vec<LevelSummary>,
}

impl <F: Itemize> Miner for LevelwiseMiner<F> {
    type Label = F::Label;

    fn mine <I: Symbol> ( &mut self, sequences: &[RawSequence<I>] ) -> Result<Vec<FrequentPattern<I, F::Label>>, MiningError> {
	self.config.validate()?;
	self.levels.clear();

	// scoped to this run, so observed labels never leak into the next one
	let itemizer = Itemizer::from_config( &self.itemize, &self.config );
	let dataset = Dataset::build( sequences, &itemizer, self.config.parallel )?;
	let min_support = self.config.min_support.resolve( dataset.len() )?;
	debug!( "Minimum support {min_support} of {} sequences", dataset.len() );

	// every delta the matcher meets was checked while building the dataset
	let counting = itemizer.unchecked();
	let matcher = Matcher::new( &counting, self.config.max_span );
	let reporter = Matcher::new( &counting, self.config.max_span ).with_min_span( self.config.min_span );
	let mut patterns: Vec<FrequentPattern<I, F::Label>> = Vec::new();
	let mut candidates: Vec<Pattern<I, F::Label>> = dataset.items().into_iter().map( Pattern::singleton ).collect();
	let mut level = 1;

	while !candidates.is_empty() {
	    let level_span = info_span!( "level", number = level );
	    let _entered = level_span.enter();

	    let (frequent, counted) = select_frequent( &matcher, candidates, &dataset, min_support, self.config.parallel )?;
	    let summary = LevelSummary{ level, candidates: counted, frequent: frequent.len() };
	    summary.log( "level complete", Level::INFO );
	    self.levels.push( summary );

	    let reported = describe( &reporter, &frequent, &dataset, min_support, self.config.parallel )?;
	    let at_max_length = self.config.max_length.map_or( false, |max| level >= max );
	    candidates = if at_max_length {
		Vec::new()
	    } else {
		CandidateGenerator::new( &frequent, dataset.labels() ).generate()
	    };
	    patterns.extend( reported );
	    level += 1;
	}

	patterns.sort_by( |left, right| left.pattern.len().cmp( &right.pattern.len() ).then_with( || left.pattern.cmp( &right.pattern )));
	info!( "Found {} frequent patterns in {} levels", patterns.len(), self.levels.len() );
	Ok( patterns )
    }
}

impl <F: Itemize> LevelwiseMiner<F> {
    pub fn new( config: MinerConfig, itemize: F ) -> LevelwiseMiner<F> {
	LevelwiseMiner {
	    config,
	    itemize,
	    levels: Vec::new(),
	}
    }

    pub fn config( &self ) -> &MinerConfig {
	&self.config
    }

    /// Per level statistics of the last run
    pub fn levels( &self ) -> &[LevelSummary] {
	&self.levels
    }
}

/// Counts all candidates and keeps the frequent ones.
/// Returns them with the number of candidates counted.
fn select_frequent<I, F>( matcher: &Matcher<F>, candidates: Vec<Pattern<I, F::Label>>, dataset: &Dataset<I, F::Label>, min_support: Count, parallel: bool ) -> Result<(Vec<Pattern<I, F::Label>>, usize), MiningError> where
    I: Symbol,
    F: Itemize,
{
    let number_candidates = candidates.len();
    let supports = matcher.count_all( &candidates, dataset, parallel )?;
    let frequent = candidates.into_iter().zip( supports )
	.filter( |(_, support)| *support >= min_support )
	.map( |(pattern, _)| pattern )
	.collect();
    Ok( (frequent, number_candidates) )
}

/// Collects the occurrence statistics of the frequent patterns for output.
/// With a minimum span only occurrences lasting that long count, so some patterns drop out here.
fn describe<I, F>( reporter: &Matcher<F>, frequent: &[Pattern<I, F::Label>], dataset: &Dataset<I, F::Label>, min_support: Count, parallel: bool ) -> Result<Vec<FrequentPattern<I, F::Label>>, MiningError> where
    I: Symbol,
    F: Itemize,
{
    let occurrences = reporter.describe_all( frequent, dataset, parallel )?;
    let reported = frequent.iter().zip( occurrences )
	.filter( |(_, found)| found.support >= min_support )
	.map( |(pattern, found)| FrequentPattern {
	    pattern: pattern.clone(),
	    support: found.support,
	    occurrences: found.count,
	    whole_interval: found.whole_interval,
	})
	.collect();
    Ok( reported )
}

impl Loggable for LevelSummary {
    fn log( &self, message: &str, level: Level ) {
	emit( level, &format!( "{message}: {} of {} candidates with {} items are frequent", self.frequent, self.candidates, self.level ));
    }
}
