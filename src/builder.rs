//! Builder engine (spec.md §4.2, component C3): online add/remove with
//! path-cloning at confluence nodes and the `replaceOrRegister`
//! minimization pass that keeps the automaton minimal after every
//! operation completes.

use crate::incoming::IncomingIndex;
use crate::node::Arena;
use crate::node::NodeId;
use crate::search::EnumerateSpec;
use crate::symbol::Symbol;

/// Configuration fixed at construction time (spec.md §4.3: the incoming
/// index "is guarded by a flag set before the first insertion").
#[derive(Debug, Clone, Copy, Default)]
pub struct BuilderConfig {
	pub with_incoming: bool,
}

/// The mutable, online-minimized automaton (spec.md §4.2).
///
/// Exclusive-owner writable (spec.md §5): nothing here is `Sync`, and the
/// type intentionally exposes no interior mutability, so the borrow checker
/// enforces "must not be concurrently written and read" for free.
#[derive(Debug)]
pub struct DawgBuilder {
	pub(crate) arena: Arena,
	pub(crate) incoming: Option<IncomingIndex>,
	size: usize,
	/// Delayed batch minimization state (spec.md §4.2): the path walked for
	/// the most recently added string in the current `add_all` call, not
	/// yet minimized past its point of divergence from whatever comes next.
	pending_previous: Vec<Symbol>,
	pending_path: Vec<NodeId>,
}

impl DawgBuilder {
	pub fn new() -> Self {
		Self::with_config(BuilderConfig::default())
	}

	pub fn with_config(config: BuilderConfig) -> Self {
		let arena = Arena::new();
		let source = arena.source;
		Self {
			arena,
			incoming: config.with_incoming.then(IncomingIndex::new),
			size: 0,
			pending_previous: Vec::new(),
			pending_path: vec![source],
		}
	}

	pub fn len(&self) -> usize {
		self.size
	}

	pub fn is_empty(&self) -> bool {
		self.size == 0
	}

	pub fn has_incoming_index(&self) -> bool {
		self.incoming.is_some()
	}

	/// Projects this (minimal) builder into the compact flat-array
	/// representation (spec.md §4.4/§6's `compress()`). Does not mutate the
	/// builder's observable state; per-node scratch fields are reset once
	/// layout completes.
	pub fn compress(&self) -> crate::compact::CompactDawg {
		crate::compress::compress(self)
	}

	/// Rebuilds the alphabet table after deletions (spec.md §6's
	/// `optimizeLetters()`). Per spec.md §9, this is "observable only
	/// through memory usage, not behavior" — there is no persistent
	/// per-builder alphabet table to shrink here (the compact form computes
	/// its alphabet fresh at [`DawgBuilder::compress`] time), so this is a
	/// documented no-op kept for interface parity with spec.md §6.
	pub fn optimize_letters(&mut self) {}

	pub(crate) fn source(&self) -> NodeId {
		self.arena.source
	}

	// ---- membership ----------------------------------------------------

	pub fn contains(&self, s: &[Symbol]) -> bool {
		match self.walk(self.arena.source, s) {
			Some(node) => self.arena.get(node).accept,
			None => false,
		}
	}

	fn walk(&self, mut node: NodeId, s: &[Symbol]) -> Option<NodeId> {
		for &ch in s {
			node = *self.arena.get(node).children.get(&ch)?;
		}
		Some(node)
	}

	// ---- add -------------------------------------------------------------

	/// Adds `s`, returning `true` if it was not already present.
	///
	/// Flushes any pending batch state first: mixing `add` and `add_all` is
	/// safe, just forfeits the delayed-minimization speedup across the
	/// boundary.
	pub fn add(&mut self, s: &[Symbol]) -> bool {
		self.flush_pending();
		self.add_one(s)
	}

	fn add_one(&mut self, s: &[Symbol]) -> bool {
		let mut path = vec![self.arena.source];
		let changed = self.insert_from(&mut path, s, 0);
		if changed {
			self.freeze_path(&path, s, 0);
			self.size += 1;
		}
		changed
	}

	/// Adds every string produced by `iter`. When fed in non-decreasing
	/// lexicographic order, applies the delayed batch minimization
	/// optimization of spec.md §4.2: minimization of a previously-added
	/// string is deferred until the point where it's known to diverge from
	/// whatever comes next.
	pub fn add_all<I, S>(&mut self, iter: I) -> bool
	where
		I: IntoIterator<Item = S>,
		S: AsRef<[Symbol]>,
	{
		let mut any = false;
		for item in iter {
			let curr = item.as_ref();
			if curr >= self.pending_previous.as_slice() {
				any |= self.add_sorted_continuation(curr);
			} else {
				// Out-of-order: flush what we had open, fall back to a
				// plain add, and start tracking again from here.
				self.flush_pending();
				any |= self.add_one(curr);
				self.pending_previous = curr.to_vec();
				self.pending_path = self.walk_full_path(curr);
			}
		}
		any
	}

	fn add_sorted_continuation(&mut self, curr: &[Symbol]) -> bool {
		let j = mps_index(&self.pending_previous, curr);
		let mut path = std::mem::take(&mut self.pending_path);
		let previous = std::mem::take(&mut self.pending_previous);

		// Freeze everything beyond the point where `previous` and `curr`
		// diverge: it will never be extended again.
		self.freeze_path(&path, &previous, j);
		path.truncate(j + 1);

		let changed = self.insert_from(&mut path, curr, j);
		if changed {
			self.size += 1;
		}

		self.pending_previous = curr.to_vec();
		self.pending_path = path;
		changed
	}

	fn walk_full_path(&self, s: &[Symbol]) -> Vec<NodeId> {
		let mut path = Vec::with_capacity(s.len() + 1);
		path.push(self.arena.source);
		let mut node = self.arena.source;
		for &ch in s {
			node = *self.arena.get(node).children.get(&ch).expect("walked path must exist after insertion");
			path.push(node);
		}
		path
	}

	/// Commits any delayed-batch state: minimizes the currently-open path
	/// all the way back to the source. Safe to call when nothing is
	/// pending (no-op).
	pub fn flush_pending(&mut self) {
		if self.pending_path.len() <= 1 {
			return;
		}
		let path = std::mem::take(&mut self.pending_path);
		let previous = std::mem::take(&mut self.pending_previous);
		self.freeze_path(&path, &previous, 0);
		self.pending_path = vec![self.arena.source];
	}

	/// Implements spec.md §4.2 steps 1-3: walk the longest existing prefix
	/// of `s[start..]` from `path[start]`, confluence-clone if the walk
	/// crosses a shared node, then append a fresh chain for whatever
	/// remains. `path` already holds `path[start]` as its last element and
	/// is extended in place to length `s.len() + 1`.
	///
	/// Returns `false` if `s` was already a member (no structural change).
	fn insert_from(&mut self, path: &mut Vec<NodeId>, s: &[Symbol], start: usize) -> bool {
		let mut pos = start;
		while pos < s.len() {
			let cur = *path.last().unwrap();
			let Some(&child) = self.arena.get(cur).children.get(&s[pos]) else {
				break;
			};
			path.push(child);
			pos += 1;
		}

		if pos == s.len() {
			let end = *path.last().unwrap();
			if self.arena.get(end).accept {
				return false;
			}
			self.set_accept(end, true);
			return true;
		}

		self.clone_confluent_suffix(path, s, start, pos);

		// Append a fresh linear chain for the remaining symbols.
		for &ch in &s[pos..] {
			let parent = *path.last().unwrap();
			let child = self.arena.new_node();
			self.link(parent, ch, child);
			path.push(child);
		}
		self.set_accept(*path.last().unwrap(), true);
		true
	}

	/// Clones `path[k..=pos]` (the first confluence node found in
	/// `path[start+1..=pos]` and everything below it) so that the edge about
	/// to be extended belongs exclusively to `s` (spec.md §4.2's
	/// "confluence cloning" / "splitTransitionPath").
	fn clone_confluent_suffix(&mut self, path: &mut [NodeId], labels: &[Symbol], start: usize, pos: usize) {
		let Some(k) = (start + 1..=pos).find(|&i| self.arena.get(path[i]).incoming >= 2) else {
			return;
		};
		debug!("cloning confluent path from index {k} to {pos}");

		let mut clones = Vec::with_capacity(pos - k + 1);
		for i in k..=pos {
			let orig = path[i];
			let clone = self.arena.new_node();
			let (accept, children) = {
				let node = self.arena.get(orig);
				(node.accept, node.children.clone())
			};
			self.arena.get_mut(clone).accept = accept;
			clones.push((clone, children));
		}

		// Wire up children now that every clone id is known: the edge
		// continuing along `s`'s path is retargeted to the next clone
		// instead of the original next node; every other edge is preserved
		// and shared with the original.
		for (idx, (clone, children)) in clones.iter().enumerate() {
			for (&label, &child) in children.iter() {
				let target = if idx + 1 < clones.len() && label == labels[k + idx] {
					clones[idx + 1].0
				} else {
					child
				};
				self.arena.get_mut(*clone).children.insert(label, target);
				self.arena.incref(target);
				if let Some(idx_incoming) = &mut self.incoming {
					let target_accept = self.arena.get(target).accept;
					idx_incoming.add_transition(*clone, label, target, target_accept);
				}
			}
		}

		let parent = path[k - 1];
		let label = labels[k - 1];
		let old_target = path[k];
		let new_target = clones[0].0;
		self.arena.unregister(parent);
		self.arena.get_mut(parent).children.insert(label, new_target);
		self.arena.get_mut(parent).invalidate();
		self.arena.incref(new_target);
		self.arena.decref(old_target);
		if let Some(idx) = &mut self.incoming {
			let old_accept = self.arena.get(old_target).accept;
			let new_accept = self.arena.get(new_target).accept;
			idx.remove_transition(parent, label, old_target, old_accept);
			idx.add_transition(parent, label, new_target, new_accept);
		}

		for (offset, (clone, _)) in clones.into_iter().enumerate() {
			path[k + offset] = clone;
		}
	}

	/// Links `parent -label-> child` as a brand-new transition (`child` has
	/// no other incoming edge yet). `parent` may already be a registered
	/// equivalence-class representative (e.g. a previously-terminal accept
	/// leaf gaining its first child), so it must be unregistered before its
	/// signature changes, same as every other mutator in this module.
	fn link(&mut self, parent: NodeId, label: Symbol, child: NodeId) {
		self.arena.unregister(parent);
		self.arena.get_mut(parent).children.insert(label, child);
		self.arena.get_mut(parent).invalidate();
		self.arena.incref(child);
		if let Some(idx) = &mut self.incoming {
			idx.add_transition(parent, label, child, false);
		}
	}

	fn set_accept(&mut self, node: NodeId, accept: bool) {
		self.arena.unregister(node);
		self.arena.get_mut(node).accept = accept;
		self.arena.get_mut(node).invalidate();
		if let Some(idx) = &mut self.incoming {
			idx.set_accept(node, accept);
		}
	}

	/// `replaceOrRegister` (spec.md §4.2): post-order pass over
	/// `path[from+1..]`, merging each node into an existing equivalence
	/// class if one exists, else registering it as the new representative.
	/// `labels[i]` is the symbol transitioning `path[i] -> path[i+1]`.
	#[tracing::instrument(skip(self, path, labels))]
	fn freeze_path(&mut self, path: &[NodeId], labels: &[Symbol], from: usize) {
		for i in (from + 1..path.len()).rev() {
			let node = path[i];
			if let Some(equiv) = self.arena.find_equivalent(node) {
				if equiv != node {
					trace!("registry hit: merging {node:?} into {equiv:?}");
					let parent = path[i - 1];
					let label = labels[i - 1];
					self.retarget(parent, label, node, equiv);
				}
			} else {
				trace!("registry miss: registering {node:?} as canonical");
				self.arena.register(node);
			}
		}
	}

	fn retarget(&mut self, parent: NodeId, label: Symbol, old: NodeId, new: NodeId) {
		self.arena.unregister(parent);
		self.arena.get_mut(parent).children.insert(label, new);
		self.arena.get_mut(parent).invalidate();
		self.arena.incref(new);
		self.arena.decref(old);
		if let Some(idx) = &mut self.incoming {
			let old_accept = self.arena.get(old).accept;
			let new_accept = self.arena.get(new).accept;
			idx.remove_transition(parent, label, old, old_accept);
			idx.add_transition(parent, label, new, new_accept);
		}
	}

	// ---- remove ------------------------------------------------------

	pub fn remove(&mut self, s: &[Symbol]) -> bool {
		self.flush_pending();

		if s.is_empty() {
			let source = self.arena.source;
			if !self.arena.get(source).accept {
				return false;
			}
			self.set_accept(source, false);
			self.size -= 1;
			return true;
		}

		let mut path = self.walk_full_path_checked(s);
		let Some(path) = &mut path else {
			return false;
		};
		let end = *path.last().unwrap();
		if !self.arena.get(end).accept {
			return false;
		}

		// Make every node on `s`'s path exclusively owned by `s` before
		// mutating it, so siblings sharing a confluence node are unaffected.
		self.clone_confluent_suffix(path, s, 0, s.len());

		let end = *path.last().unwrap();
		if !self.arena.get(end).children.is_empty() {
			self.set_accept(end, false);
		} else {
			self.trim_sole_path(path, s);
		}

		self.freeze_path(path, s, 0);
		self.size -= 1;
		true
	}

	fn walk_full_path_checked(&self, s: &[Symbol]) -> Option<Vec<NodeId>> {
		let mut path = Vec::with_capacity(s.len() + 1);
		path.push(self.arena.source);
		let mut node = self.arena.source;
		for &ch in s {
			node = *self.arena.get(node).children.get(&ch)?;
			path.push(node);
		}
		Some(path)
	}

	/// Deletes the longest dangling tail of `path` (each node having at
	/// most one child and not being itself an accept state), then removes
	/// the single edge at the split point (spec.md §4.2's "sole-path
	/// length") and truncates `path` to the surviving prefix — everything
	/// past the cut is freed here, so callers must not look at it again.
	fn trim_sole_path(&mut self, path: &mut Vec<NodeId>, labels: &[Symbol]) {
		// `split` is the parent whose outgoing edge gets cut; everything from
		// `path[split + 1]` on (including the terminal accept node itself,
		// whose own accept flag is irrelevant here since it's the node being
		// removed) is the dangling tail that drops via `decref`. Starting at
		// the terminal's immediate parent (L = 0) and walking split back
		// towards the source extends the tail past any ancestor that is
		// itself exclusively part of this path and not an accept state for
		// some other, shorter string.
		let mut split = labels.len() - 1;
		while split > 0 {
			let n = self.arena.get(path[split]);
			if n.children.len() <= 1 && !n.accept {
				split -= 1;
			} else {
				break;
			}
		}

		let parent = path[split];
		let label = labels[split];
		self.arena.unregister(parent);
		let old = self.arena.get_mut(parent).children.remove(&label).expect("edge must exist");
		self.arena.get_mut(parent).invalidate();
		if let Some(idx) = &mut self.incoming {
			let old_accept = self.arena.get(old).accept;
			idx.remove_transition(parent, label, old, old_accept);
		}
		self.arena.decref(old);
		path.truncate(split + 1);
	}

	// ---- enumeration ---------------------------------------------------

	pub fn enumerate(&self, spec: &EnumerateSpec) -> impl Iterator<Item = Vec<Symbol>> + '_ {
		crate::search::enumerate_mutable(self, spec)
	}

	// ---- graph iteration (spec.md §6's GraphViz contract) --------------

	/// `(label, child)` pairs leaving `node`, in label order — the iterable
	/// contract spec.md §6 names as sufficient to render a graph.
	pub(crate) fn outgoing_transitions(&self, node: NodeId) -> impl Iterator<Item = (Symbol, NodeId)> + '_ {
		self.arena.get(node).children.iter().map(|(&label, &child)| (label, child))
	}

	/// `(label, parent)` pairs entering `node`, if an incoming index was
	/// built. Optional per spec.md §6 ("and optionally `incomingTransitions`").
	pub(crate) fn incoming_transitions(&self, node: NodeId) -> Option<impl Iterator<Item = (Symbol, NodeId)> + '_> {
		let idx = self.incoming.as_ref()?;
		Some(idx.all_incoming_labels(node).flat_map(move |label| idx.predecessors(node, label).map(move |pred| (label, pred))))
	}

	pub(crate) fn is_accept(&self, node: NodeId) -> bool {
		self.arena.get(node).accept
	}
}

impl Default for DawgBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// "Most probable split" index (spec.md §4.2's `mpsIndex`): the first index
/// at which `prev` and `curr` differ, or `prev.len()` if `prev` is a prefix
/// of `curr` ("do not minimize anything yet").
fn mps_index(prev: &[Symbol], curr: &[Symbol]) -> usize {
	prev.iter().zip(curr.iter()).take_while(|(a, b)| a == b).count()
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::symbol::to_symbols;

	fn sym(s: &str) -> Vec<Symbol> {
		to_symbols(s)
	}

	#[test]
	fn mps_index_on_prefix_defers() {
		assert_eq!(mps_index(&sym("ab"), &sym("abc")), 2);
		assert_eq!(mps_index(&sym("abc"), &sym("abd")), 2);
		assert_eq!(mps_index(&sym(""), &sym("x")), 0);
	}

	#[test]
	fn basic_add_contains() {
		let mut b = DawgBuilder::new();
		assert!(b.add(&sym("a")));
		assert!(!b.add(&sym("a")));
		assert!(b.contains(&sym("a")));
		assert!(!b.contains(&sym("ab")));
		assert_eq!(b.len(), 1);
	}

	#[test]
	fn minimal_construction_scenario() {
		let mut b = DawgBuilder::new();
		for w in ["a", "xe", "xes", "xs"] {
			b.add(&sym(w));
		}
		assert_eq!(b.len(), 4);
		for w in ["a", "xe", "xes", "xs"] {
			assert!(b.contains(&sym(w)));
		}
		assert!(!b.contains(&sym("x")));
	}

	#[test]
	fn overlap_with_empty_string() {
		let mut b = DawgBuilder::new();
		for w in ["", "add", "a", "ad"] {
			b.add(&sym(w));
		}
		assert_eq!(b.len(), 4);
		assert!(b.remove(&sym("")));
		assert_eq!(b.len(), 3);
		assert!(!b.contains(&sym("")));
		assert!(b.contains(&sym("a")));
		assert!(b.contains(&sym("ad")));
		assert!(b.contains(&sym("add")));
	}

	#[test]
	fn delete_by_confluence() {
		let mut b = DawgBuilder::new();
		b.add(&sym("ant"));
		b.add(&sym("ants"));
		assert!(b.remove(&sym("ants")));
		assert!(b.contains(&sym("ant")));
		assert!(!b.contains(&sym("ants")));

		let mut fresh = DawgBuilder::new();
		fresh.add(&sym("ant"));
		assert_eq!(b.len(), fresh.len());
	}

	#[test]
	fn add_all_sorted_matches_add_one_by_one() {
		let words = ["assiez", "assions", "eriez", "erions", "eront", "iez", "ions"];
		let mut sorted = words.to_vec();
		sorted.sort_unstable();

		let mut batched = DawgBuilder::new();
		batched.add_all(sorted.iter().map(|w| sym(w)));
		batched.flush_pending();

		let mut one_by_one = DawgBuilder::new();
		for w in &sorted {
			one_by_one.add(&sym(w));
		}

		assert_eq!(batched.len(), one_by_one.len());
		assert_eq!(batched.len(), words.len());
		for w in &words {
			assert!(batched.contains(&sym(w)));
		}
	}

	#[test]
	fn add_all_handles_out_of_order_input() {
		let mut b = DawgBuilder::new();
		b.add_all(["xs", "a", "xe", "xes"].map(|w| sym(w)));
		b.flush_pending();
		assert_eq!(b.len(), 4);
		for w in ["a", "xe", "xes", "xs"] {
			assert!(b.contains(&sym(w)));
		}
	}

	#[test]
	fn remove_nonexistent_is_noop() {
		let mut b = DawgBuilder::new();
		b.add(&sym("a"));
		assert!(!b.remove(&sym("b")));
		assert_eq!(b.len(), 1);
	}

	#[test]
	fn compress_method_matches_free_function() {
		let mut b = DawgBuilder::new();
		b.add(&sym("a"));
		b.add(&sym("xe"));
		assert_eq!(b.compress(), crate::compress::compress(&b));
	}

	#[test]
	fn optimize_letters_is_a_harmless_no_op() {
		let mut b = DawgBuilder::new();
		b.add(&sym("a"));
		b.optimize_letters();
		assert!(b.contains(&sym("a")));
	}

	#[test]
	fn with_incoming_index_is_optional() {
		let mut b = DawgBuilder::new();
		assert!(!b.has_incoming_index());
		let mut b = DawgBuilder::with_config(BuilderConfig { with_incoming: true });
		assert!(b.has_incoming_index());
		b.add(&sym("tet"));
		b.add(&sym("tetatet"));
		assert!(b.contains(&sym("tetatet")));
	}
}
