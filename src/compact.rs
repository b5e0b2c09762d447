//! Compact representation (spec.md §4.5, component C6): the immutable,
//! structurally-shareable flat-array automaton produced by
//! [`crate::compress::compress`].
//!
//! Record `i` describes the node reached by the edge that led to it: word 0
//! packs its incoming label with its accept flag, word 1 is the start of
//! *its own* children's block, and the remaining words are a bitmap of the
//! labels occurring in that block (so the block's length — its arity — is
//! the bitmap's popcount, per spec.md §4.4). Record [`ROOT`] is the one
//! exception: nothing leads to the source, so slot 0 is reserved for it at
//! compress time instead of being written from some parent's block.

use std::cell::Cell;
use std::hash::Hash;
use std::hash::Hasher;

use crate::error::DawgError;
use crate::search::EnumerateSpec;
use crate::symbol::Symbol;

/// The record index describing the source node (spec.md §4.5's entry
/// point). Reserved at compress time; see the module docs.
pub(crate) const ROOT: u32 = 0;

const ACCEPT_BIT: u32 = 1 << 16;
const LABEL_MASK: u32 = 0xFFFF;

#[derive(Debug, Clone)]
pub struct CompactDawg {
	records: Vec<u32>,
	width: usize,
	alphabet: Vec<Symbol>,
	with_incoming: bool,
	size_cache: Cell<Option<usize>>,
	len_cache: Cell<Option<usize>>,
	max_length_cache: Cell<Option<usize>>,
}

impl CompactDawg {
	pub(crate) fn from_parts(records: Vec<u32>, width: usize, alphabet: Vec<Symbol>, with_incoming: bool) -> Self {
		Self {
			records,
			width,
			alphabet,
			with_incoming,
			size_cache: Cell::new(None),
			len_cache: Cell::new(None),
			max_length_cache: Cell::new(None),
		}
	}

	fn record_label(&self, record: u32) -> Symbol {
		(self.records[record as usize * self.width] & LABEL_MASK) as Symbol
	}

	fn record_accept(&self, record: u32) -> bool {
		self.records[record as usize * self.width] & ACCEPT_BIT != 0
	}

	fn record_block_start(&self, record: u32) -> u32 {
		self.records[record as usize * self.width + 1]
	}

	fn record_arity(&self, record: u32) -> u32 {
		let base = record as usize * self.width + 2;
		self.records[base..base + (self.width - 2)].iter().map(|w| w.count_ones()).sum()
	}

	/// Binary search over `node`'s child block for `label` (spec.md §4.5's
	/// lookup primitive).
	fn find_child(&self, node: u32, label: Symbol) -> Option<u32> {
		let block_start = self.record_block_start(node);
		let arity = self.record_arity(node);
		let mut lo = 0u32;
		let mut hi = arity;
		while lo < hi {
			let mid = lo + (hi - lo) / 2;
			let candidate = block_start + mid;
			match self.record_label(candidate).cmp(&label) {
				std::cmp::Ordering::Less => lo = mid + 1,
				std::cmp::Ordering::Greater => hi = mid,
				std::cmp::Ordering::Equal => return Some(candidate),
			}
		}
		None
	}

	fn children_ascending(&self, node: u32) -> Vec<(Symbol, u32)> {
		let block_start = self.record_block_start(node);
		let arity = self.record_arity(node);
		(0..arity).map(|i| (self.record_label(block_start + i), block_start + i)).collect()
	}

	pub fn contains(&self, s: &[Symbol]) -> bool {
		let mut node = ROOT;
		for &ch in s {
			match self.find_child(node, ch) {
				Some(next) => node = next,
				None => return false,
			}
		}
		self.record_accept(node)
	}

	pub fn enumerate(&self, spec: &EnumerateSpec) -> impl Iterator<Item = Vec<Symbol>> + '_ {
		let walk = move |node: u32, s: &[Symbol]| -> Option<u32> {
			let mut cur = node;
			for &ch in s {
				cur = self.find_child(cur, ch)?;
			}
			Some(cur)
		};
		let accept = move |node: u32| self.record_accept(node);
		let children = move |node: u32| self.children_ascending(node);
		crate::search::Enumeration::new(ROOT, walk, accept, children, spec.clone())
	}

	/// Reachable node count (spec.md §4.5: "memoized on first call"),
	/// computed purely from `records` so it survives a byte round-trip.
	///
	/// Distinct *nodes*, not records: a shared (confluence) node gets one
	/// record per incoming edge, so node identity is its own block start
	/// rather than the record index that happened to lead to it here.
	pub fn node_count(&self) -> usize {
		if let Some(n) = self.size_cache.get() {
			return n;
		}
		let n = self.node_graph().len();
		self.size_cache.set(Some(n));
		n
	}

	/// Number of stored strings (memoized on first call, like
	/// [`CompactDawg::node_count`]).
	///
	/// A minimal DAWG merges equivalent suffixes, so distinct stored strings
	/// routinely share one accept *node* (e.g. `{a,xe,xes,xs}` has 4 strings
	/// but only 2 accept nodes). The count that matters is therefore
	/// accepting *paths* from the source, not accepting nodes: `paths(source)
	/// = 1`, `paths(n) = Σ paths(parents)` over every distinct incoming edge,
	/// `len = Σ paths(n)` over every accepting `n`.
	pub fn len(&self) -> usize {
		if let Some(n) = self.len_cache.get() {
			return n;
		}
		let n = self.count_accepting_paths();
		self.len_cache.set(Some(n));
		n
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn max_length(&self) -> usize {
		if let Some(n) = self.max_length_cache.get() {
			return n;
		}
		let mut memo = std::collections::HashMap::new();
		let n = self.longest_path(ROOT, &mut memo);
		self.max_length_cache.set(Some(n));
		n
	}

	fn longest_path(&self, node: u32, memo: &mut std::collections::HashMap<u32, usize>) -> usize {
		if let Some(&cached) = memo.get(&node) {
			return cached;
		}
		let mut best = 0;
		for (_, child) in self.children_ascending(node) {
			best = best.max(1 + self.longest_path(child, memo));
		}
		memo.insert(node, best);
		best
	}

	/// Maps each reachable node's own block-start identity to `(accept,
	/// child-node identities)`. Every record pointing at a given node shares
	/// that node's block-start and arity (see [`crate::compress::compress`]),
	/// so any one of its incoming records is equally good for reading its
	/// own children back out; `seen_records` just keeps the traversal from
	/// re-expanding a node it already visited through a different edge.
	fn node_graph(&self) -> std::collections::HashMap<u32, (bool, Vec<u32>)> {
		let mut graph = std::collections::HashMap::new();
		let mut seen_records = std::collections::HashSet::new();
		let mut stack = vec![ROOT];
		seen_records.insert(ROOT);
		while let Some(record) = stack.pop() {
			let key = self.record_block_start(record);
			if graph.contains_key(&key) {
				continue;
			}
			let children = self.children_ascending(record);
			let child_keys: Vec<u32> = children.iter().map(|&(_, child)| self.record_block_start(child)).collect();
			graph.insert(key, (self.record_accept(record), child_keys));
			for (_, child) in children {
				if seen_records.insert(child) {
					stack.push(child);
				}
			}
		}
		graph
	}

	/// The path-counting DP documented on [`CompactDawg::len`], driven by a
	/// Kahn's-algorithm topological pass over [`CompactDawg::node_graph`]
	/// (the automaton is an acyclic single-source DAG, so every reachable
	/// node other than the source has at least one incoming edge).
	fn count_accepting_paths(&self) -> usize {
		let graph = self.node_graph();

		let mut indegree: std::collections::HashMap<u32, usize> = std::collections::HashMap::new();
		for (_, children) in graph.values() {
			for &child in children {
				*indegree.entry(child).or_insert(0) += 1;
			}
		}

		let source_key = self.record_block_start(ROOT);
		let mut paths: std::collections::HashMap<u32, usize> = std::collections::HashMap::new();
		paths.insert(source_key, 1);

		let mut queue: std::collections::VecDeque<u32> =
			graph.keys().copied().filter(|key| indegree.get(key).copied().unwrap_or(0) == 0).collect();

		let mut total = 0usize;
		while let Some(node) = queue.pop_front() {
			let count = paths.get(&node).copied().unwrap_or(0);
			let (accept, children) = &graph[&node];
			if *accept {
				total += count;
			}
			for &child in children {
				*paths.entry(child).or_insert(0) += count;
				let remaining = indegree.get_mut(&child).expect("every non-source node has a recorded indegree");
				*remaining -= 1;
				if *remaining == 0 {
					queue.push_back(child);
				}
			}
		}
		total
	}

	pub fn has_incoming_index(&self) -> bool {
		self.with_incoming
	}

	/// Replays every stored string into a fresh builder (spec.md §6's
	/// `uncompress()`).
	pub fn uncompress(&self) -> crate::builder::DawgBuilder {
		let mut builder = crate::builder::DawgBuilder::with_config(crate::builder::BuilderConfig {
			with_incoming: self.with_incoming,
		});
		let all: Vec<Vec<Symbol>> = self.enumerate(&EnumerateSpec::all()).collect();
		builder.add_all(all);
		builder.flush_pending();
		builder
	}

	/// Serializes per spec.md §6's persisted layout: `with_incoming`, the
	/// alphabet table, then the flat record array — everything else
	/// (source node, size, max-length) is recomputed on load.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(4 + 4 + self.alphabet.len() * 4 + 4 + self.records.len() * 4);
		out.extend_from_slice(&(self.with_incoming as u32).to_le_bytes());
		out.extend_from_slice(&(self.alphabet.len() as u32).to_le_bytes());
		for &s in &self.alphabet {
			out.extend_from_slice(&(s as u32).to_le_bytes());
		}
		out.extend_from_slice(&(self.records.len() as u32).to_le_bytes());
		for &w in &self.records {
			out.extend_from_slice(&w.to_le_bytes());
		}
		out
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self, DawgError> {
		let mut cursor = 0usize;
		let with_incoming = read_u32(bytes, &mut cursor)? != 0;

		let alphabet_len = read_u32(bytes, &mut cursor)? as usize;
		let mut alphabet = Vec::with_capacity(alphabet_len);
		for _ in 0..alphabet_len {
			alphabet.push(read_u32(bytes, &mut cursor)? as Symbol);
		}

		let record_words = read_u32(bytes, &mut cursor)? as usize;
		let mut records = Vec::with_capacity(record_words);
		for _ in 0..record_words {
			records.push(read_u32(bytes, &mut cursor)?);
		}

		let width = 2 + alphabet.len().div_ceil(32);
		if width == 0 || record_words % width != 0 {
			return Err(malformed("record array length is not a multiple of the record width"));
		}

		Ok(Self::from_parts(records, width, alphabet, with_incoming))
	}
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> Result<u32, DawgError> {
	let slice = bytes.get(*cursor..*cursor + 4).ok_or_else(|| malformed("truncated compact automaton"))?;
	*cursor += 4;
	Ok(u32::from_le_bytes(slice.try_into().expect("slice has exactly 4 bytes")))
}

fn malformed(message: &str) -> DawgError {
	DawgError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, message.to_string()))
}

impl PartialEq for CompactDawg {
	fn eq(&self, other: &Self) -> bool {
		self.width == other.width
			&& self.with_incoming == other.with_incoming
			&& self.alphabet == other.alphabet
			&& self.records == other.records
	}
}

impl Eq for CompactDawg {}

impl Hash for CompactDawg {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.width.hash(state);
		self.with_incoming.hash(state);
		self.alphabet.hash(state);
		self.records.hash(state);
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::builder::DawgBuilder;
	use crate::symbol::to_symbols;

	fn build(words: &[&str]) -> CompactDawg {
		let mut b = DawgBuilder::new();
		for w in words {
			b.add(&to_symbols(w));
		}
		crate::compress::compress(&b)
	}

	#[test]
	fn round_trip_through_bytes() {
		let compact = build(&["a", "xe", "xes", "xs"]);
		let bytes = compact.to_bytes();
		let restored = CompactDawg::from_bytes(&bytes).unwrap();
		assert_eq!(compact, restored);
		assert!(restored.contains(&to_symbols("xes")));
	}

	#[test]
	fn from_bytes_rejects_truncated_input() {
		assert!(CompactDawg::from_bytes(&[1, 0]).is_err());
	}

	#[test]
	fn uncompress_round_trips_contents() {
		let words = ["tet", "tetatet"];
		let compact = build(&words);
		let builder = compact.uncompress();
		for w in words {
			assert!(builder.contains(&to_symbols(w)));
		}
		assert_eq!(builder.len(), words.len());
	}

	#[test]
	fn max_length_and_node_count_match_scenario_one() {
		let compact = build(&["a", "xe", "xes", "xs"]);
		assert_eq!(compact.len(), 4);
		assert_eq!(compact.node_count(), 4);
		assert_eq!(compact.max_length(), 3);
	}
}
