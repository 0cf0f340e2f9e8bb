use tracing::{info,debug};

use rand::prelude::*;
use statrs::distribution::{DiscreteUniform, Exp};

use std::time::*;

use gspmine::*;

const HOUR: Delta = 3600;

fn main() -> Result<(), String> {
    prepare_logging();

    let sequences = generate_sequences( 2000, 12, 40, 6.0 * HOUR as f64 )?;

    benchmark_mining( &sequences, false )?;
    benchmark_mining( &sequences, true )?;

    Result::Ok( () )
}

fn benchmark_mining( sequences: &[RawSequence<u32>], parallel: bool ) -> Result<(), String> {
    let config = MinerConfig::new( Support::Relative( 0.05 ), 24 * HOUR )
	.with_max_length( 4 )
	.parallel( parallel );
    let mut miner = LevelwiseMiner::new( config, Bucket::new( 6 * HOUR ).map_err( |err| err.to_string() )? );

    info!( "Start benchmark: mining {} sequences, parallel {parallel}", sequences.len() );
    let start = Instant::now();
    let patterns = miner.mine( sequences ).map_err( |err| err.to_string() )?;
    let time_spent = Instant::now().duration_since( start );
    info!( "Result: {} patterns took {}ms", patterns.len(), time_spent.as_millis() );

    for summary in miner.levels() {
	summary.log( "level", tracing::Level::INFO );
    }
    Ok( () )
}

/// Sequences of uniformly drawn length, with uniformly drawn items and exponentially distributed gaps.
fn generate_sequences( number_sequences: usize, max_events: i64, number_items: i64, mean_gap: f64 ) -> Result<Vec<RawSequence<u32>>, String> {
    let length_distribution = DiscreteUniform::new( 1, max_events ).map_err( |err| err.to_string() )?;
    let itemset_distribution = DiscreteUniform::new( 1, 3 ).map_err( |err| err.to_string() )?;
    let item_distribution = DiscreteUniform::new( 0, number_items - 1 ).map_err( |err| err.to_string() )?;
    let gap_distribution = Exp::new( 1.0 / mean_gap ).map_err( |err| err.to_string() )?;
    let mut gen = thread_rng();

    let mut sequences = Vec::with_capacity( number_sequences );
    for _ in 0 .. number_sequences {
	let length = length_distribution.sample( &mut gen ) as usize;
	let mut timestamp: Timestamp = 0;
	let mut sequence = RawSequence::with_capacity( length );
	for _ in 0 .. length {
	    let size = itemset_distribution.sample( &mut gen ) as usize;
	    let items: Vec<u32> = ( 0 .. size ).map( |_| item_distribution.sample( &mut gen ) as u32 ).collect();
	    sequence.push( RawEvent::new( timestamp, items ));
	    // strictly increasing
	    timestamp += 1 + gap_distribution.sample( &mut gen ) as Timestamp;
	}
	sequences.push( sequence );
    }
    let events: usize = sequences.iter().map( |sequence| sequence.len() ).sum();
    debug!( "generated {number_sequences} sequences with {events} events" );
    Ok( sequences )
}

fn prepare_logging() {
    let tracer = tracing_subscriber::fmt::fmt()
	.with_max_level( tracing_subscriber::filter::LevelFilter::INFO )
	.finish();
    if let Err( err ) = tracing::subscriber::set_global_default( tracer ) {
	eprintln!( "cannot install logger: {err}" );
    }
}
