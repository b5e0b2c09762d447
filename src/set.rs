//! Set/`NavigableSet` facade (spec.md §4.6's derivatives, component C8).
//!
//! Every operation here is a thin projection over [`EnumerateSpec`]; a
//! sub-view stores only the bounds it adds on top of its parent and always
//! re-delegates to the backing automaton, so mutation through one view is
//! immediately visible through any other (spec.md §8's "sub-view
//! liveness").

use crate::builder::DawgBuilder;
use crate::error::DawgError;
use crate::search::EnumerateSpec;
use crate::symbol::Symbol;

/// A live, range-restricted view over a [`DawgBuilder`] (spec.md §4.6's
/// `NavigableSet` derivatives: `subSet`/`headSet`/`tailSet`/`prefixSet`).
#[derive(Debug, Clone)]
pub struct DawgSubSet<'a> {
	builder: &'a DawgBuilder,
	prefix: Vec<Symbol>,
	from: Option<(Vec<Symbol>, bool)>,
	to: Option<(Vec<Symbol>, bool)>,
}

impl<'a> DawgSubSet<'a> {
	pub fn whole(builder: &'a DawgBuilder) -> Self {
		Self { builder, prefix: Vec::new(), from: None, to: None }
	}

	pub fn prefix_set(builder: &'a DawgBuilder, prefix: Vec<Symbol>) -> Self {
		Self { builder, prefix, from: None, to: None }
	}

	fn in_range(&self, w: &[Symbol]) -> bool {
		if !w.starts_with(self.prefix.as_slice()) {
			return false;
		}
		if let Some((from, incl)) = &self.from {
			let ord = w.cmp(from.as_slice());
			if ord == std::cmp::Ordering::Less || (ord == std::cmp::Ordering::Equal && !incl) {
				return false;
			}
		}
		if let Some((to, incl)) = &self.to {
			let ord = w.cmp(to.as_slice());
			if ord == std::cmp::Ordering::Greater || (ord == std::cmp::Ordering::Equal && !incl) {
				return false;
			}
		}
		true
	}

	fn spec(&self, descending: bool) -> EnumerateSpec {
		let mut spec = EnumerateSpec::all().with_prefix(self.prefix.clone()).descending(descending);
		if let Some((from, incl)) = &self.from {
			spec = spec.with_from(from.clone(), *incl);
		}
		if let Some((to, incl)) = &self.to {
			spec = spec.with_to(to.clone(), *incl);
		}
		spec
	}

	pub fn contains(&self, s: &[Symbol]) -> bool {
		self.in_range(s) && self.builder.contains(s)
	}

	/// Adds `s` to the backing set. Rejected with [`DawgError::OutOfRange`]
	/// if `s` lies outside this view's bounds (spec.md §7).
	pub fn add(&self, builder: &mut DawgBuilder, s: &[Symbol]) -> Result<bool, DawgError> {
		if !self.in_range(s) {
			return Err(DawgError::OutOfRange);
		}
		debug_assert!(std::ptr::eq(self.builder, builder), "view must wrap the same builder being mutated");
		Ok(builder.add(s))
	}

	pub fn iter(&self) -> impl Iterator<Item = Vec<Symbol>> + 'a {
		self.builder.enumerate(&self.spec(false))
	}

	pub fn descending_iter(&self) -> impl Iterator<Item = Vec<Symbol>> + 'a {
		self.builder.enumerate(&self.spec(true))
	}

	pub fn sub_set(&self, from: Vec<Symbol>, incl_from: bool, to: Vec<Symbol>, incl_to: bool) -> Self {
		Self { builder: self.builder, prefix: self.prefix.clone(), from: Some((from, incl_from)), to: Some((to, incl_to)) }
	}

	pub fn head_set(&self, to: Vec<Symbol>, inclusive: bool) -> Self {
		Self { builder: self.builder, prefix: self.prefix.clone(), from: self.from.clone(), to: Some((to, inclusive)) }
	}

	pub fn tail_set(&self, from: Vec<Symbol>, inclusive: bool) -> Self {
		Self { builder: self.builder, prefix: self.prefix.clone(), from: Some((from, inclusive)), to: self.to.clone() }
	}

	pub fn first(&self) -> Option<Vec<Symbol>> {
		self.iter().next()
	}

	pub fn last(&self) -> Option<Vec<Symbol>> {
		self.descending_iter().next()
	}

	/// Strictly less than `key`, in range.
	pub fn lower(&self, key: &[Symbol]) -> Option<Vec<Symbol>> {
		self.head_set(key.to_vec(), false).last()
	}

	/// Less than or equal to `key`, in range.
	pub fn floor(&self, key: &[Symbol]) -> Option<Vec<Symbol>> {
		self.head_set(key.to_vec(), true).last()
	}

	/// Greater than or equal to `key`, in range.
	pub fn ceiling(&self, key: &[Symbol]) -> Option<Vec<Symbol>> {
		self.tail_set(key.to_vec(), true).first()
	}

	/// Strictly greater than `key`, in range.
	pub fn higher(&self, key: &[Symbol]) -> Option<Vec<Symbol>> {
		self.tail_set(key.to_vec(), false).first()
	}

	pub fn poll_first(&self, builder: &mut DawgBuilder) -> Option<Vec<Symbol>> {
		let first = self.first()?;
		builder.remove(&first);
		Some(first)
	}

	pub fn poll_last(&self, builder: &mut DawgBuilder) -> Option<Vec<Symbol>> {
		let last = self.last()?;
		builder.remove(&last);
		Some(last)
	}
}
