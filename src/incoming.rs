//! Incoming-transition index (spec.md §4.3, component C4).
//!
//! Opt-in: enabling it roughly doubles mutable memory footprint (spec.md
//! §9), so a [`crate::builder::DawgBuilder`] only maintains one when
//! constructed with `with_incoming: true`. It exists solely to accelerate
//! suffix queries (§4.6's suffix-mode): given a suffix, we can start from the
//! accept states that end in it and walk backward, instead of enumerating
//! every stored string.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::node::NodeId;
use crate::symbol::Symbol;

/// Per-node reverse edges, plus the virtual end node's incoming labels
/// (spec.md §3: "for every accept-node N and every label L on an edge
/// entering N, an entry `(L, N)` exists in the end node's incoming index").
#[derive(Debug, Default)]
pub(crate) struct IncomingIndex {
	/// `node -> (label -> predecessors)`.
	reverse: BTreeMap<NodeId, BTreeMap<Symbol, BTreeSet<NodeId>>>,
	/// The virtual end node: `label -> accept nodes reached by an edge
	/// labeled L`.
	end: BTreeMap<Symbol, BTreeSet<NodeId>>,
}

impl IncomingIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_transition(&mut self, from: NodeId, label: Symbol, to: NodeId, to_is_accept: bool) {
		self.reverse.entry(to).or_default().entry(label).or_default().insert(from);
		if to_is_accept {
			self.end.entry(label).or_default().insert(to);
		}
	}

	pub fn remove_transition(&mut self, from: NodeId, label: Symbol, to: NodeId, to_is_accept: bool) {
		if let Some(by_label) = self.reverse.get_mut(&to) {
			if let Some(preds) = by_label.get_mut(&label) {
				preds.remove(&from);
				if preds.is_empty() {
					by_label.remove(&label);
				}
			}
			if by_label.is_empty() {
				self.reverse.remove(&to);
			}
		}
		if to_is_accept {
			if let Some(ends) = self.end.get_mut(&label) {
				ends.remove(&to);
				if ends.is_empty() {
					self.end.remove(&label);
				}
			}
		}
	}

	/// Called when `node`'s accept flag flips; `predecessors_by_label` is
	/// `node`'s set of incoming `(label, predecessor)` pairs (the caller
	/// already has this, since it maintains `reverse`).
	pub fn set_accept(&mut self, node: NodeId, accept: bool) {
		let Some(by_label) = self.reverse.get(&node) else {
			return;
		};
		let labels: Vec<(Symbol, BTreeSet<NodeId>)> =
			by_label.iter().map(|(&label, preds)| (label, preds.clone())).collect();
		for (label, preds) in labels {
			if preds.is_empty() {
				continue;
			}
			if accept {
				self.end.entry(label).or_default().insert(node);
			} else if let Some(ends) = self.end.get_mut(&label) {
				ends.remove(&node);
				if ends.is_empty() {
					self.end.remove(&label);
				}
			}
		}
	}

	pub fn predecessors(&self, node: NodeId, label: Symbol) -> impl Iterator<Item = NodeId> + '_ {
		self
			.reverse
			.get(&node)
			.and_then(|by_label| by_label.get(&label))
			.into_iter()
			.flatten()
			.copied()
	}

	/// Accept nodes reachable by an edge labeled `label` — the starting
	/// point for suffix-mode's backward walk once the suffix is exhausted by
	/// one character.
	pub fn end_predecessors(&self, label: Symbol) -> impl Iterator<Item = NodeId> + '_ {
		self.end.get(&label).into_iter().flatten().copied()
	}

	pub fn all_incoming_labels(&self, node: NodeId) -> impl Iterator<Item = Symbol> + '_ {
		self.reverse.get(&node).into_iter().flat_map(|by_label| by_label.keys().copied())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn id(n: u32) -> NodeId {
		NodeId::for_test(n)
	}

	#[test]
	fn tracks_end_node_incoming_labels() {
		let mut idx = IncomingIndex::new();
		let parent = id(0);
		let accept_child = id(1);
		idx.add_transition(parent, b's' as Symbol, accept_child, true);
		assert_eq!(idx.end_predecessors(b's' as Symbol).collect::<Vec<_>>(), vec![accept_child]);

		idx.remove_transition(parent, b's' as Symbol, accept_child, true);
		assert_eq!(idx.end_predecessors(b's' as Symbol).collect::<Vec<_>>(), vec![]);
	}

	#[test]
	fn set_accept_updates_end_index() {
		let mut idx = IncomingIndex::new();
		let parent = id(0);
		let child = id(1);
		idx.add_transition(parent, b'x' as Symbol, child, false);
		assert_eq!(idx.end_predecessors(b'x' as Symbol).collect::<Vec<_>>(), vec![]);

		idx.set_accept(child, true);
		assert_eq!(idx.end_predecessors(b'x' as Symbol).collect::<Vec<_>>(), vec![child]);

		idx.set_accept(child, false);
		assert_eq!(idx.end_predecessors(b'x' as Symbol).collect::<Vec<_>>(), vec![]);
	}
}
