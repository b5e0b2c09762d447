//! Node arena and equivalence registry (spec.md §4.1, components C1/C2).
//!
//! The mutable graph is stored as an arena indexed by [`NodeId`] rather than
//! as a graph of `Rc`/`RefCell` nodes: transitions are acyclic, so an arena
//! plus an explicit `incoming` counter gives us confluence detection and
//! reference-counted freeing without fighting the borrow checker.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::symbol::Symbol;

/// Identifies a node in a [`Arena`]. Indices are reused once a node is
/// freed, so an id is only meaningful relative to the arena that minted it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
	pub(crate) fn index(self) -> usize {
		self.0 as usize
	}

	#[cfg(test)]
	pub(crate) fn for_test(n: u32) -> Self {
		Self(n)
	}
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
	pub accept: bool,
	/// Ascending by construction (`BTreeMap`), matching the "keys kept in
	/// ascending order" requirement of spec.md §3.
	pub children: BTreeMap<Symbol, NodeId>,
	pub incoming: u32,
	/// Memoized structural hash; `None` means "needs recomputing". Must be
	/// invalidated (`Node::invalidate`) whenever `accept` or `children`
	/// changes, per spec.md §4.1.
	cached_hash: Cell<Option<u64>>,
	/// Scratch field used only during compression (spec.md §3's "scratch
	/// field used during compression").
	pub scratch: Cell<u32>,
}

impl Node {
	fn empty() -> Self {
		Self {
			accept: false,
			children: BTreeMap::new(),
			incoming: 0,
			cached_hash: Cell::new(None),
			scratch: Cell::new(0),
		}
	}

	pub fn invalidate(&mut self) {
		self.cached_hash.set(None);
	}
}

/// A node's identity signature: its accept flag plus the ordered list of
/// `(label, child)` pairs. Two nodes with equal signatures are, by the
/// minimality invariant (children are already canonical once this node is
/// being minimized), equivalent — spec.md §4.1's "signature depends on
/// accept-state and the set of `(label, child-signature)` pairs" reduces to
/// comparing child *identity* rather than recursing, because children are
/// always canonicalized bottom-up before their parent is considered.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct Signature {
	accept: bool,
	transitions: Vec<(Symbol, NodeId)>,
}

fn signature_of(node: &Node) -> Signature {
	Signature {
		accept: node.accept,
		transitions: node.children.iter().map(|(&label, &child)| (label, child)).collect(),
	}
}

fn hash_of(sig: &Signature) -> u64 {
	use std::hash::Hash;
	use std::hash::Hasher;
	let mut hasher = std::collections::hash_map::DefaultHasher::new();
	sig.hash(&mut hasher);
	hasher.finish()
}

/// The node arena (C1) and equivalence registry (C2) in one structure: the
/// registry needs to inspect node structure to resolve hash collisions, so
/// keeping them together avoids threading an extra reference everywhere.
#[derive(Debug)]
pub(crate) struct Arena {
	nodes: Vec<Option<Node>>,
	free: Vec<NodeId>,
	/// Hash buckets; candidates within a bucket are disambiguated by exact
	/// signature comparison, so hash collisions never cause two
	/// non-equivalent nodes to be merged.
	registry: HashMap<u64, Vec<NodeId>>,
	pub source: NodeId,
}

impl Arena {
	pub fn new() -> Self {
		let mut nodes = Vec::new();
		nodes.push(Some(Node::empty()));
		Self {
			nodes,
			free: Vec::new(),
			registry: HashMap::new(),
			source: NodeId(0),
		}
	}

	pub fn get(&self, id: NodeId) -> &Node {
		self.nodes[id.index()].as_ref().expect("dangling NodeId")
	}

	pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
		self.nodes[id.index()].as_mut().expect("dangling NodeId")
	}

	/// Allocates a fresh node, not yet registered in the equivalence
	/// registry (callers build up its transitions first, then call
	/// [`Arena::register`] once it's final).
	pub fn new_node(&mut self) -> NodeId {
		if let Some(id) = self.free.pop() {
			self.nodes[id.index()] = Some(Node::empty());
			id
		} else {
			let id = NodeId(self.nodes.len() as u32);
			self.nodes.push(Some(Node::empty()));
			id
		}
	}

	/// Increments `id`'s incoming-transition count. Called whenever a new
	/// edge is made to target `id` (including edges created by confluence
	/// cloning, per spec.md §4.2).
	pub fn incref(&mut self, id: NodeId) {
		self.get_mut(id).incoming += 1;
	}

	/// Decrements `id`'s incoming-transition count; if it reaches zero, `id`
	/// is no longer reachable and is dropped, recursively releasing its own
	/// children the same way (spec.md §4.1: "drops them when no edge
	/// references them").
	pub fn decref(&mut self, id: NodeId) {
		let node = self.get_mut(id);
		assert!(node.incoming > 0, "incoming-count underflow on {id:?}");
		node.incoming -= 1;
		if node.incoming == 0 {
			self.free_node(id);
		}
	}

	fn free_node(&mut self, id: NodeId) {
		self.unregister(id);
		let node = self.nodes[id.index()].take().expect("dangling NodeId");
		self.free.push(id);
		for child in node.children.into_values() {
			self.decref(child);
		}
	}

	/// Looks up a node structurally equivalent to `id`, if the registry
	/// holds one (and it isn't `id` itself).
	pub fn find_equivalent(&self, id: NodeId) -> Option<NodeId> {
		let node = self.get(id);
		let sig = signature_of(node);
		let hash = self.hash_cached(id, &sig);
		let bucket = self.registry.get(&hash)?;
		bucket
			.iter()
			.copied()
			.find(|&candidate| candidate != id && signature_of(self.get(candidate)) == sig)
	}

	/// Registers `id` as the canonical representative of its equivalence
	/// class. Callers must have already confirmed (via
	/// [`Arena::find_equivalent`]) that no representative exists.
	pub fn register(&mut self, id: NodeId) {
		let sig = signature_of(self.get(id));
		let hash = self.hash_cached(id, &sig);
		self.registry.entry(hash).or_default().push(id);
	}

	/// Removes `id` from the registry (its structure is about to change, or
	/// it's being dropped). A no-op if `id` was never registered.
	pub fn unregister(&mut self, id: NodeId) {
		let node = self.get(id);
		let sig = signature_of(node);
		let hash = self.hash_cached(id, &sig);
		if let Some(bucket) = self.registry.get_mut(&hash) {
			bucket.retain(|&candidate| candidate != id);
			if bucket.is_empty() {
				self.registry.remove(&hash);
			}
		}
	}

	fn hash_cached(&self, id: NodeId, sig: &Signature) -> u64 {
		let node = self.get(id);
		if let Some(hash) = node.cached_hash.get() {
			return hash;
		}
		let hash = hash_of(sig);
		node.cached_hash.set(Some(hash));
		hash
	}
}

impl Default for Arena {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn equivalent_leaves_share_no_identity_but_compare_equal() {
		let mut arena = Arena::new();
		let a = arena.new_node();
		arena.get_mut(a).accept = true;
		arena.register(a);

		let b = arena.new_node();
		arena.get_mut(b).accept = true;

		assert_eq!(arena.find_equivalent(b), Some(a));
	}

	#[test]
	fn distinct_accept_flags_are_not_equivalent() {
		let mut arena = Arena::new();
		let a = arena.new_node();
		arena.get_mut(a).accept = true;
		arena.register(a);

		let b = arena.new_node();
		assert_eq!(arena.find_equivalent(b), None);
	}

	#[test]
	fn invalidate_forces_hash_recompute() {
		let mut arena = Arena::new();
		let a = arena.new_node();
		arena.register(a);
		assert!(arena.get(a).cached_hash.get().is_some());
		arena.get_mut(a).invalidate();
		assert!(arena.get(a).cached_hash.get().is_none());
	}
}
