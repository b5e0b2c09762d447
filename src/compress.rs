//! Compressor (spec.md §4.4, component C5): projects a minimal mutable
//! automaton into the flat-array compact form.
//!
//! Every reachable node gets a fixed slot in the output array once, laid out
//! depth-first in ascending label order (spec.md: "the layout is therefore a
//! function of the graph's structure only, not of traversal timing") — this
//! is what gives [`crate::compact::CompactDawg::eq`] its order-invariance.
//!
//! One layout decision not spelled out by the component description: the
//! source has no incoming edge, so it can't be described by a record
//! written from some parent's block the way every other node is. Slot 0 is
//! reserved for it (label field unused, accept/block-start/bitmap filled in
//! exactly like any other node's record) rather than carrying it as an
//! out-of-band field — this keeps every piece of recomputable state
//! (source node, size, max-length, alphabet index) truly derivable from
//! `(with_incoming, alphabet, records)` alone, per spec.md §6's persisted
//! layout.

use std::collections::BTreeSet;
use std::collections::HashSet;

use crate::builder::DawgBuilder;
use crate::compact::CompactDawg;
use crate::compact::ROOT;
use crate::node::NodeId;
use crate::symbol::Symbol;

#[tracing::instrument(skip(builder))]
pub fn compress(builder: &DawgBuilder) -> CompactDawg {
	let arena = &builder.arena;
	let source = arena.source;
	debug!("compressing builder of size {}", builder.len());

	let mut alphabet: BTreeSet<Symbol> = BTreeSet::new();
	let mut order: Vec<NodeId> = Vec::new();
	let mut visited: HashSet<NodeId> = HashSet::new();
	let mut stack = vec![source];
	visited.insert(source);
	while let Some(node) = stack.pop() {
		order.push(node);
		let children = &arena.get(node).children;
		for &label in children.keys() {
			alphabet.insert(label);
		}
		for (_, &child) in children.iter().rev() {
			if visited.insert(child) {
				stack.push(child);
			}
		}
	}

	let alphabet: Vec<Symbol> = alphabet.into_iter().collect();
	let label_index: std::collections::HashMap<Symbol, usize> =
		alphabet.iter().enumerate().map(|(i, &s)| (s, i)).collect();
	let bitmap_words = alphabet.len().div_ceil(32);
	let width = 2 + bitmap_words;

	// Slot 0 is reserved for the source; every other node's block is
	// assigned in DFS-pop order starting at 1. A node's own scratch value
	// doubles as its identity (e.g. for `CompactDawg::node_count`), so an
	// arity-0 leaf still needs a slot reserved for it — otherwise it would
	// share the next node's block-start and the two would be
	// indistinguishable downstream.
	let mut next_slot: u32 = 1;
	for &node in &order {
		let arity = arena.get(node).children.len() as u32;
		arena.get(node).scratch.set(next_slot);
		next_slot += arity.max(1);
	}
	let record_count = next_slot;

	let mut records = vec![0u32; (record_count as usize + 1) * width];
	let write_record = |records: &mut [u32], index: u32, label: Symbol, accept: bool, block_start: u32, bitmap_labels: &[Symbol]| {
		let base = index as usize * width;
		let accept_bit = if accept { 1u32 << 16 } else { 0 };
		records[base] = label as u32 | accept_bit;
		records[base + 1] = block_start;
		for &l in bitmap_labels {
			let idx = label_index[&l];
			records[base + 2 + idx / 32] |= 1 << (idx % 32);
		}
	};

	for &node in &order {
		let block_start = arena.get(node).scratch.get();
		let own_labels: Vec<Symbol> = arena.get(node).children.keys().copied().collect();
		for (j, &child) in arena.get(node).children.values().enumerate() {
			let child_node = arena.get(child);
			let child_labels: Vec<Symbol> = child_node.children.keys().copied().collect();
			let label = own_labels[j];
			write_record(&mut records, block_start + j as u32, label, child_node.accept, child_node.scratch.get(), &child_labels);
		}
	}

	let source_node = arena.get(source);
	let source_labels: Vec<Symbol> = source_node.children.keys().copied().collect();
	write_record(&mut records, ROOT, 0, source_node.accept, source_node.scratch.get(), &source_labels);

	let sentinel_base = record_count as usize * width;
	records[sentinel_base + 1] = record_count;

	for &node in &order {
		arena.get(node).scratch.set(0);
	}

	CompactDawg::from_parts(records, width, alphabet, builder.has_incoming_index())
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::symbol::to_symbols;

	#[test]
	fn compresses_minimal_construction_scenario() {
		let mut b = DawgBuilder::new();
		for w in ["a", "xe", "xes", "xs"] {
			b.add(&to_symbols(w));
		}
		let compact = compress(&b);
		for w in ["a", "xe", "xes", "xs"] {
			assert!(compact.contains(&to_symbols(w)), "missing {w}");
		}
		assert!(!compact.contains(&to_symbols("x")));
		assert_eq!(compact.len(), 4);
	}

	#[test]
	fn order_stability_same_array_regardless_of_insertion_order() {
		let words = ["assiez", "assions", "eriez", "erions", "eront", "iez", "ions"];
		let mut a = DawgBuilder::new();
		for w in words {
			a.add(&to_symbols(w));
		}
		let mut b = DawgBuilder::new();
		for w in words.iter().rev() {
			b.add(&to_symbols(w));
		}
		assert_eq!(compress(&a), compress(&b));
	}
}
