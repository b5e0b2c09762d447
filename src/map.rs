//! Map/`MultiValuedMap` facades (spec.md §4.7, component C8): a key and its
//! value(s) are joined into one stored string with [`SEPARATOR`] and handed
//! to the ordinary string automaton, so every ordering/range guarantee the
//! set already has (lexicographic key order, live sub-views) comes along
//! for free — no separate index structure is needed.

use crate::builder::DawgBuilder;
use crate::error::DawgError;
use crate::symbol::Symbol;
use crate::symbol::SEPARATOR;

fn encode(key: &[Symbol], value: &[Symbol]) -> Vec<Symbol> {
	let mut out = Vec::with_capacity(key.len() + 1 + value.len());
	out.extend_from_slice(key);
	out.push(SEPARATOR);
	out.extend_from_slice(value);
	out
}

/// Splits a stored `key ∥ SEPARATOR ∥ value` string back into its two parts.
///
/// `key` itself is never allowed to contain `SEPARATOR` (enforced by every
/// insertion path here), so the *first* occurrence always marks the split.
fn decode(stored: &[Symbol]) -> (&[Symbol], &[Symbol]) {
	let sep = stored.iter().position(|&c| c == SEPARATOR).expect("stored entry is missing its separator");
	(&stored[..sep], &stored[sep + 1..])
}

fn key_bounds(key: &[Symbol]) -> Vec<Symbol> {
	let mut bound = key.to_vec();
	bound.push(SEPARATOR);
	bound
}

/// A single key paired with at most one value (spec.md §4.7's `DawgMap`).
///
/// Re-inserting a key with a new value first removes whatever entry the key
/// already had, so `put` behaves like `HashMap::insert` rather than adding a
/// second stored string.
#[derive(Debug, Default)]
pub struct DawgMap {
	inner: DawgBuilder,
}

impl DawgMap {
	pub fn new() -> Self {
		Self { inner: DawgBuilder::new() }
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn get(&self, key: &[Symbol]) -> Option<Vec<Symbol>> {
		let prefix = key_bounds(key);
		let stored = self.inner.enumerate(&crate::search::EnumerateSpec::all().with_prefix(prefix)).next()?;
		Some(decode(&stored).1.to_vec())
	}

	pub fn contains_key(&self, key: &[Symbol]) -> bool {
		self.get(key).is_some()
	}

	/// Associates `key` with `value`, replacing any prior value. Returns the
	/// replaced value, if there was one.
	///
	/// Rejected with [`DawgError::SeparatorInInput`] if `key` or `value`
	/// contains [`SEPARATOR`] (spec.md §4.2's "In the map facades, sequences
	/// containing the separator are rejected with `ArgumentInvalid`").
	pub fn put(&mut self, key: &[Symbol], value: &[Symbol]) -> Result<Option<Vec<Symbol>>, DawgError> {
		if key.contains(&SEPARATOR) || value.contains(&SEPARATOR) {
			return Err(DawgError::SeparatorInInput);
		}
		let previous = self.remove(key);
		self.inner.add(&encode(key, value));
		Ok(previous)
	}

	pub fn remove(&mut self, key: &[Symbol]) -> Option<Vec<Symbol>> {
		let existing = self.get(key)?;
		self.inner.remove(&encode(key, &existing));
		Some(existing)
	}

	/// Every `(key, value)` pair in ascending key order.
	pub fn iter(&self) -> impl Iterator<Item = (Vec<Symbol>, Vec<Symbol>)> + '_ {
		self.inner.enumerate(&crate::search::EnumerateSpec::all()).map(|stored| {
			let (k, v) = decode(&stored);
			(k.to_vec(), v.to_vec())
		})
	}

	/// Largest stored key strictly less than `key`.
	pub fn lower_key(&self, key: &[Symbol]) -> Option<Vec<Symbol>> {
		let bound = key_bounds(key);
		let spec = crate::search::EnumerateSpec::all().with_to(bound, false).descending(true);
		self.inner.enumerate(&spec).next().map(|stored| decode(&stored).0.to_vec())
	}

	/// Largest stored key less than or equal to `key`.
	pub fn floor_key(&self, key: &[Symbol]) -> Option<Vec<Symbol>> {
		if self.contains_key(key) {
			return Some(key.to_vec());
		}
		self.lower_key(key)
	}

	/// Smallest stored key greater than or equal to `key`.
	pub fn ceiling_key(&self, key: &[Symbol]) -> Option<Vec<Symbol>> {
		if self.contains_key(key) {
			return Some(key.to_vec());
		}
		self.higher_key(key)
	}

	/// Smallest stored key strictly greater than `key`.
	///
	/// `key ∥ SEPARATOR` sorts before every entry sharing `key` (any value
	/// extends it) and before every entry of a strictly greater key, so a
	/// plain upper bound can't tell the two apart — walk forward from there
	/// and skip same-key entries instead.
	pub fn higher_key(&self, key: &[Symbol]) -> Option<Vec<Symbol>> {
		let bound = key_bounds(key);
		let spec = crate::search::EnumerateSpec::all().with_from(bound, true);
		self.inner
			.enumerate(&spec)
			.map(|stored| decode(&stored).0.to_vec())
			.find(|k| k.as_slice() != key)
	}
}

/// A key paired with a set of values (spec.md §4.7's `DawgMultiMap`): each
/// `(key, value)` pair is its own stored string, so a key's values are simply
/// the value half of every stored entry sharing that key prefix.
#[derive(Debug, Default)]
pub struct DawgMultiMap {
	inner: DawgBuilder,
}

impl DawgMultiMap {
	pub fn new() -> Self {
		Self { inner: DawgBuilder::new() }
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Rejected with [`DawgError::SeparatorInInput`] if `key` or `value`
	/// contains [`SEPARATOR`].
	pub fn put(&mut self, key: &[Symbol], value: &[Symbol]) -> Result<bool, DawgError> {
		if key.contains(&SEPARATOR) || value.contains(&SEPARATOR) {
			return Err(DawgError::SeparatorInInput);
		}
		Ok(self.inner.add(&encode(key, value)))
	}

	pub fn remove(&mut self, key: &[Symbol], value: &[Symbol]) -> bool {
		self.inner.remove(&encode(key, value))
	}

	pub fn contains_entry(&self, key: &[Symbol], value: &[Symbol]) -> bool {
		self.inner.contains(&encode(key, value))
	}

	/// Every value stored under `key`, in ascending order.
	pub fn get(&self, key: &[Symbol]) -> impl Iterator<Item = Vec<Symbol>> + '_ {
		let prefix = key_bounds(key);
		self.inner
			.enumerate(&crate::search::EnumerateSpec::all().with_prefix(prefix))
			.map(|stored| decode(&stored).1.to_vec())
	}

	pub fn contains_key(&self, key: &[Symbol]) -> bool {
		self.get(key).next().is_some()
	}

	/// Every `(key, value)` pair in ascending order, keys then values.
	pub fn iter(&self) -> impl Iterator<Item = (Vec<Symbol>, Vec<Symbol>)> + '_ {
		self.inner.enumerate(&crate::search::EnumerateSpec::all()).map(|stored| {
			let (k, v) = decode(&stored);
			(k.to_vec(), v.to_vec())
		})
	}
}
