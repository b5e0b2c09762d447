//! File-ingest helper (spec.md §1/§5, `[ADDED]`): an external collaborator
//! that reads a byte stream line-by-line and feeds it to a
//! [`crate::builder::DawgBuilder`]. Strictly a convenience over
//! `BufRead::lines` plus [`crate::symbol::to_symbols`] — it owns no state of
//! its own and contributes no algorithm, matching spec.md §1's "external
//! collaborators" framing for everything outside the builder/search core.
//!
//! Synchronous only (spec.md §5: "No operation suspends on I/O except the
//! optional file-ingest helper, which reads line-by-line from a byte stream
//! synchronously").

use std::io::BufRead;

use crate::builder::DawgBuilder;
use crate::error::DawgError;
use crate::symbol::to_symbols;

/// Reads every line from `reader` and adds it to `builder`, returning the
/// number of lines that were newly inserted.
///
/// Lines are read in file order; if they happen to already be sorted
/// ascending, [`DawgBuilder::add_all`]'s delayed-minimization optimization
/// applies transparently since this just forwards to `add_all`. A failure
/// partway through propagates as [`DawgError::Io`] (spec.md §7's
/// `IoFailure`); everything successfully read before the failure has already
/// been added.
#[tracing::instrument(skip(reader, builder))]
pub fn ingest_lines(reader: impl BufRead, builder: &mut DawgBuilder) -> Result<usize, DawgError> {
	let before = builder.len();
	for line in reader.lines() {
		let line = line?;
		debug!("ingest: read line of {} chars", line.chars().count());
		builder.add(&to_symbols(&line));
	}
	Ok(builder.len() - before)
}
