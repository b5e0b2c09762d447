//! Public error type.
//!
//! Kept as a flat hand-rolled enum (no `thiserror`/`anyhow`), following the
//! teacher's own hand-rolled `NfaError`: one doc comment per variant stating
//! when it's raised, not why the variant exists.

use std::fmt;

/// Errors raised by the public API of this crate.
#[derive(Debug)]
pub enum DawgError {
	/// A string passed to a map/multi-map facade (`put`, `get`, `remove`,
	/// ...) contains [`crate::symbol::SEPARATOR`].
	SeparatorInInput,
	/// An element was added to, or queried through, a sub-view
	/// (`subSet`/`headSet`/`tailSet`/`prefixSet`) while lying outside that
	/// sub-view's bounds.
	OutOfRange,
	/// The underlying byte source failed during file ingest.
	Io(std::io::Error),
	/// The operation requires mutation but was attempted on a structurally
	/// immutable [`crate::compact::CompactDawg`], or attempted through a
	/// read-only iterator.
	NotSupported,
}

impl fmt::Display for DawgError {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::SeparatorInInput => fmt.write_str("input contains the reserved key/value separator"),
			Self::OutOfRange => fmt.write_str("element lies outside the sub-view's range"),
			Self::Io(err) => write!(fmt, "I/O failure during ingest: {err}"),
			Self::NotSupported => fmt.write_str("operation not supported on this representation"),
		}
	}
}

impl std::error::Error for DawgError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for DawgError {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}
