//! Small demo/debugging CLI: reads newline-separated strings from stdin,
//! builds a [`dawg_rs::DawgBuilder`], and reports the scenario-1-style
//! summary (size, node/transition counts after compression) that the
//! library's own tests assert against.
//!
//! Not part of the library's public API surface — a binary, so (unlike
//! `lib.rs`) it's the right place to install a `tracing-subscriber`.

use std::io::stdin;
use std::io::BufReader;

use dawg_rs::builder::DawgBuilder;
use dawg_rs::ingest::ingest_lines;

fn main() {
	tracing_subscriber::fmt().init();

	let mut builder = DawgBuilder::new();
	let added = ingest_lines(BufReader::new(stdin().lock()), &mut builder).expect("reading stdin");
	println!("added {added} new string(s)");
	println!("size: {}", builder.len());

	let compact = builder.compress();
	println!("compact nodes: {}", compact.node_count());
	println!("max length: {}", compact.max_length());
}
