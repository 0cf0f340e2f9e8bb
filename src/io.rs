use std::fmt::Display;
use std::path::Path;
use std::fs::File;
use std::io::{BufReader, BufRead, Write};

use serde::Serialize;

use crate::{FrequentPattern, MiningError, RawEvent, RawSequence, Timestamp};

/// Converts a structure into a string
pub trait PrettyFormatter<T> {
    fn format_pretty( &self, object: &T ) -> String;
}

/// Reads a sequence file: one sequence per line, events separated by `;`,
/// each event a timestamp followed by `:` and its items separated by whitespace,
/// e.g. `0:a b; 86400:c`. Blank lines and lines starting with `#` are skipped.
pub fn read_sequences<P: AsRef<Path>>( path: P ) -> Result<Vec<RawSequence<String>>, MiningError> {
    let file = File::open( path )?;
    parse_sequences( BufReader::new( file ))
}

/// Parses all sequences of a reader in the format of `read_sequences`
pub fn parse_sequences<R: BufRead>( reader: R ) -> Result<Vec<RawSequence<String>>, MiningError> {
    let mut sequences = Vec::new();
    for (index, line) in reader.lines().enumerate() {
	let line = line?;
	let line = line.trim();
	if line.is_empty() || line.starts_with( '#' ) {
	    continue;
	}
	sequences.push( parse_sequence( line, index + 1 )? );
    }
    Ok( sequences )
}

/// Parses one line into a sequence. Line numbers start at 1 and are only used for errors.
/// Timestamps are not checked here, the miner rejects malformed sequences.
pub fn parse_sequence( line: &str, line_number: usize ) -> Result<RawSequence<String>, MiningError> {
    let mut sequence = RawSequence::new();
    // a trailing separator is tolerated
    for chunk in line.split( ';' ).map( str::trim ).filter( |chunk| !chunk.is_empty() ) {
	let (timestamp, items) = chunk.split_once( ':' )
	    .ok_or_else( || parse_error( line_number, format!( "event {chunk:?} has no ':' after its timestamp" )))?;
	let timestamp = timestamp.trim().parse::<Timestamp>()
	    .map_err( |err| parse_error( line_number, format!( "timestamp {timestamp:?}: {err}" )))?;
	sequence.push( RawEvent::new( timestamp, items.split_whitespace().map( String::from )));
    }
    Ok( sequence )
}

fn parse_error( line: usize, reason: String ) -> MiningError {
    MiningError::Parse { line, reason }
}

/// Renders frequent patterns as `support  pattern`, one per line
#[derive( Debug, Clone, Copy )]
pub struct PatternFormatter {
    pub show_support: bool,
    /// prefix the number of items in square brackets
    pub show_length: bool,
}

impl Default for PatternFormatter {
    fn default() -> PatternFormatter {
	PatternFormatter{ show_support: true, show_length: false }
    }
}

impl <I: Display, L: Display> PrettyFormatter<FrequentPattern<I, L>> for PatternFormatter {
    fn format_pretty( &self, found: &FrequentPattern<I, L> ) -> String {
	let mut line = String::new();
	if self.show_support {
	    line.push_str( &format!( "{}  ", found.support ));
	}
	if self.show_length {
	    line.push_str( &format!( "[{}]  ", found.pattern.len() ));
	}
	line.push_str( &found.pattern.to_string() );
	line
    }
}

impl <I: Display, L: Display> PrettyFormatter<Vec<FrequentPattern<I, L>>> for PatternFormatter {
    fn format_pretty( &self, patterns: &Vec<FrequentPattern<I, L>> ) -> String {
	let join_lines = |mut text: String, found: &FrequentPattern<I, L>| {
	    text.push_str( &self.format_pretty( found ));
	    text.push( '\n' );
	    text
	};
	patterns.iter().fold( String::new(), join_lines )
    }
}

/// Writes the frequent patterns to a file as a JSON array
pub fn write_patterns<I, L, P>( patterns: &[FrequentPattern<I, L>], path: P ) -> Result<(), MiningError> where
    I: Serialize,
    L: Serialize,
    P: AsRef<Path>,
{
    let text = serde_json::to_string( patterns )?;
    let mut file = File::create( path )?;
    writeln!( file, "{text}" )?;
    Ok( () )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Gap, Itemset, Pattern};

    fn found() -> Vec<FrequentPattern<String, u64>> {
	let a = Itemset::single( "a".to_string() );
	let ac = Itemset::new( vec!( "c".to_string(), "a".to_string() ));
	vec!(
	    FrequentPattern{ pattern: Pattern::singleton( "a".to_string() ), support: 3, occurrences: 6, whole_interval: 0 },
	    FrequentPattern{ pattern: Pattern::from_parts( vec!( a, ac ), vec!( Gap::Exact( 2 )) ).unwrap(), support: 2, occurrences: 2, whole_interval: 172800 },
	)
    }

    #[test]
    fn parse_events() {
	let sequence = parse_sequence( "0:a; 86400: a b  c ;259200:c a;", 1 ).unwrap();
	assert_eq!( sequence.len(), 3 );
	assert_eq!( sequence[ 1 ].timestamp, 86400 );
	assert_eq!( sequence[ 1 ].items, Itemset::new( vec!( "a".to_string(), "b".to_string(), "c".to_string() )) );
	assert_eq!( sequence[ 2 ].items.first(), Some( &"a".to_string() ));
    }

    #[test]
    fn skip_comments_and_blank_lines() {
	let text = "# sessions\n0:a; 5:b\n\n   \n# end\n3:c\n";
	let sequences = parse_sequences( text.as_bytes() ).unwrap();
	assert_eq!( sequences.len(), 2 );
	assert_eq!( sequences[ 1 ], vec!( RawEvent::new( 3, vec!( "c".to_string() ))) );
    }

    #[test]
    fn report_line_of_syntax_errors() {
	let text = "0:a\n# fine\n0:a; 4 b\n";
	match parse_sequences( text.as_bytes() ) {
	    Err( MiningError::Parse { line, .. } ) => assert_eq!( line, 3 ),
	    other => panic!( "expected parse error, got {other:?}" ),
	}
	assert!( matches!( parse_sequence( "x:a", 7 ), Err( MiningError::Parse { line: 7, .. } )));
    }

    #[test]
    fn format_patterns() {
	let formatter = PatternFormatter::default();
	assert_eq!( formatter.format_pretty( &found() ), "3  (a)\n2  (a) -[2]-> (a, c)\n" );
	let formatter = PatternFormatter{ show_support: false, show_length: true };
	assert_eq!( formatter.format_pretty( &found()[ 1 ] ), "[3]  (a) -[2]-> (a, c)" );
    }

    #[test]
    fn write_json() {
	let path = std::env::temp_dir().join( format!( "gspmine-io-{}.json", std::process::id() ));
	write_patterns( &found(), &path ).unwrap();
	let text = std::fs::read_to_string( &path ).unwrap();
	std::fs::remove_file( &path ).unwrap();

	let value: serde_json::Value = serde_json::from_str( &text ).unwrap();
	assert_eq!( value[ 1 ][ "support" ], 2 );
	assert_eq!( value[ 1 ][ "occurrences" ], 2 );
	assert_eq!( value[ 1 ][ "whole_interval" ], 172800 );
	assert_eq!( value[ 1 ][ "pattern" ][ "elements" ], serde_json::json!( [["a"], ["a", "c"]] ));
	assert_eq!( value[ 1 ][ "pattern" ][ "gaps" ], serde_json::json!( [{ "exact": 2 }] ));
	assert_eq!( value[ 0 ][ "pattern" ][ "gaps" ], serde_json::json!( [] ));
    }
}
