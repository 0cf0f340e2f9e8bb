use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use gspmine::*;
use gspmine::io::{PatternFormatter, PrettyFormatter};

/// Mines frequent interval sequential patterns from a sequence file.
#[derive( Parser, Debug )]
#[command( name = "miner", version, about )]
struct Cli {
    /// Sequence file, one sequence per line as `timestamp:item item; ...`
    input: PathBuf,

    /// Absolute count such as 3, or a fraction of all sequences such as 0.25
    #[arg( short = 's', long, default_value = "2" )]
    min_support: Support,

    /// Longest time between two consecutive itemsets of a pattern
    #[arg( short = 'x', long )]
    max_interval: Delta,

    /// Shortest time between two consecutive itemsets of a pattern
    #[arg( long, default_value_t = 0 )]
    min_interval: Delta,

    /// Longest time from the first to the last itemset of a pattern
    #[arg( long )]
    max_span: Option<Delta>,

    /// Shortest time from the first to the last itemset of a reported pattern
    #[arg( long )]
    min_span: Option<Delta>,

    /// Largest number of items in a pattern
    #[arg( long )]
    max_length: Option<usize>,

    /// Intervals are labelled by the number of whole buckets of this width
    #[arg( short = 'w', long, default_value_t = 1 )]
    bucket_width: Delta,

    /// Normalize and count on all cores
    #[arg( short, long )]
    parallel: bool,

    /// Do not check that interval labels stay consistent during the run
    #[arg( long )]
    trust_itemizer: bool,

    /// Also write the patterns as JSON to this file
    #[arg( short, long )]
    output: Option<PathBuf>,

    /// Log at debug level
    #[arg( short, long )]
    verbose: bool,
}

impl Cli {
    fn config( &self ) -> MinerConfig {
	let mut config = MinerConfig::new( self.min_support, self.max_interval )
	    .with_min_interval( self.min_interval )
	    .parallel( self.parallel )
	    .check_itemizer( !self.trust_itemizer );
	if let Some( span ) = self.max_span {
	    config = config.with_max_span( span );
	}
	if let Some( span ) = self.min_span {
	    config = config.with_min_span( span );
	}
	if let Some( length ) = self.max_length {
	    config = config.with_max_length( length );
	}
	config
    }
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    prepare_logging( cli.verbose );

    let bucket = Bucket::new( cli.bucket_width ).map_err( |err| err.to_string() )?;
    let sequences = io::read_sequences( &cli.input ).map_err( |err| err.to_string() )?;
    info!( "Read {} sequences from {}", sequences.len(), cli.input.display() );

    let mut miner = LevelwiseMiner::new( cli.config(), bucket );
    let patterns = miner.mine( &sequences ).map_err( |err| err.to_string() )?;

    print!( "{}", PatternFormatter::default().format_pretty( &patterns ));
    if let Some( path ) = &cli.output {
	io::write_patterns( &patterns, path ).map_err( |err| err.to_string() )?;
	info!( "Wrote {} patterns to {}", patterns.len(), path.display() );
    }

    Ok( () )
}

fn prepare_logging( verbose: bool ) {
    let level = if verbose {
	tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
	tracing_subscriber::filter::LevelFilter::INFO
    };
    let tracer = tracing_subscriber::fmt::fmt()
	.with_max_level( level )
	.with_writer( std::io::stderr )
	.finish();
    if let Err( err ) = tracing::subscriber::set_global_default( tracer ) {
	eprintln!( "cannot install logger: {err}" );
    }
}
